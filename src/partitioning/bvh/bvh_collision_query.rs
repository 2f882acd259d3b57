use super::{BvNode, BvNodeId, Bvh};
use crate::bounding_volume::{Aabb, BoundingVolume, Obb};
use crate::math::{Isometry, Real};
use crate::utils::IsometryOps;
use smallvec::SmallVec;

const TRAVERSAL_STACK_SIZE: usize = 32;

/// Whether a collision query should keep going after a leaf pair was reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalAction {
    /// Keep traversing the remaining node pairs.
    Continue,
    /// Stop the query right away.
    EarlyExit,
}

/// The volume overlap test performed on each node pair of a collision query.
///
/// The volumes of the first hierarchy are moved into the frame of the second one before being
/// tested. Because the same node of the first hierarchy is typically tested against many nodes
/// of the second one, the moved volume is computed once per query by [`OverlapTest::transform`]
/// and cached.
pub trait OverlapTest {
    /// The representation of a volume moved by a rigid transform.
    type Cached: Clone + core::fmt::Debug;

    /// Moves a volume of the first hierarchy by `pos_ab`.
    fn transform(&self, volume: &Aabb, pos_ab: &Isometry<Real>) -> Self::Cached;

    /// Tests a moved volume against a volume of the second hierarchy.
    fn overlaps(&self, moved: &Self::Cached, volume: &Aabb) -> bool;
}

/// Overlap test between the AABB enclosing the moved volume and the other volume.
///
/// Cheap but conservative: rotations inflate the moved boxes.
#[derive(Copy, Clone, Debug, Default)]
pub struct AabbOverlap;

impl OverlapTest for AabbOverlap {
    type Cached = Aabb;

    #[inline]
    fn transform(&self, volume: &Aabb, pos_ab: &Isometry<Real>) -> Aabb {
        volume.transform_by(pos_ab)
    }

    #[inline]
    fn overlaps(&self, moved: &Aabb, volume: &Aabb) -> bool {
        moved.intersects(volume)
    }
}

/// Exact box-box overlap test, using the separating axis theorem on the oriented moved volume.
#[derive(Copy, Clone, Debug, Default)]
pub struct ObbSatOverlap;

impl OverlapTest for ObbSatOverlap {
    type Cached = Obb;

    #[inline]
    fn transform(&self, volume: &Aabb, pos_ab: &Isometry<Real>) -> Obb {
        Obb::from_aabb(volume).transform_by(pos_ab)
    }

    #[inline]
    fn overlaps(&self, moved: &Obb, volume: &Aabb) -> bool {
        moved.intersects_aabb(volume)
    }
}

/// Receives the pairs of leaves whose volumes overlap during a collision query.
///
/// This is where the narrow phase usually runs, on the geometry referenced by both leaves.
pub trait CollisionReport {
    /// Called on a pair of overlapping leaves, `leaf_a` from the first hierarchy and `leaf_b`
    /// from the second one.
    fn report(
        &mut self,
        leaf_a: BvNodeId,
        node_a: &BvNode,
        leaf_b: BvNodeId,
        node_b: &BvNode,
    ) -> TraversalAction;
}

impl<F> CollisionReport for F
where
    F: FnMut(BvNodeId, &BvNode, BvNodeId, &BvNode) -> TraversalAction,
{
    fn report(
        &mut self,
        leaf_a: BvNodeId,
        node_a: &BvNode,
        leaf_b: BvNodeId,
        node_b: &BvNode,
    ) -> TraversalAction {
        self(leaf_a, node_a, leaf_b, node_b)
    }
}

/// A report collecting every overlapping leaf pair.
#[derive(Clone, Debug, Default)]
pub struct CollectPairs {
    /// The pairs collected so far, in traversal order.
    pub pairs: Vec<(BvNodeId, BvNodeId)>,
}

impl CollisionReport for CollectPairs {
    fn report(&mut self, leaf_a: BvNodeId, _: &BvNode, leaf_b: BvNodeId, _: &BvNode) -> TraversalAction {
        self.pairs.push((leaf_a, leaf_b));
        TraversalAction::Continue
    }
}

/// Counters of the last query run by a [`CollisionQuery`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// The number of node pairs whose volumes were tested.
    pub volume_tests: usize,
    /// The number of moved volumes read back from the cache.
    pub cache_hits: usize,
    /// The number of moved volumes computed.
    pub cache_misses: usize,
    /// The number of leaf pairs handed to the report.
    pub leaf_pairs: usize,
}

#[derive(Clone, Debug)]
struct CachedVolume<C> {
    stamp: u64,
    pos_ab: Isometry<Real>,
    moved: C,
}

/// Dual-tree collision query between two hierarchies.
///
/// The query owns a cache of the moved volumes of the first hierarchy, indexed by node. An
/// entry is only valid for the query that computed it: it is keyed by the query stamp and by
/// the transform it was computed with, and the stamp is bumped at the start of each query.
/// Neither hierarchy is modified, so several queries may run concurrently on the same
/// hierarchies as long as each uses its own `CollisionQuery`.
#[derive(Clone, Debug)]
pub struct CollisionQuery<O: OverlapTest = AabbOverlap> {
    overlap: O,
    stamp: u64,
    cache: Vec<Option<CachedVolume<O::Cached>>>,
    stats: QueryStats,
}

impl<O: OverlapTest + Default> Default for CollisionQuery<O> {
    fn default() -> Self {
        Self::new(O::default())
    }
}

impl<O: OverlapTest> CollisionQuery<O> {
    /// Creates a query performing the given overlap test on node volumes.
    pub fn new(overlap: O) -> Self {
        Self {
            overlap,
            stamp: 0,
            cache: Vec::new(),
            stats: QueryStats::default(),
        }
    }

    /// The overlap test used by this query.
    pub fn overlap(&self) -> &O {
        &self.overlap
    }

    /// The stamp of the last query run, zero if none ran yet.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    /// The counters of the last query run.
    pub fn stats(&self) -> QueryStats {
        self.stats
    }

    /// Drops every cached volume.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Reports every pair of overlapping leaves of `a` and `b`.
    ///
    /// `pos_ab` maps the frame of `a` into the frame of `b`. Leaf pairs are reported at most
    /// once each. Returns [`TraversalAction::EarlyExit`] if the report stopped the query.
    pub fn query(
        &mut self,
        pos_ab: &Isometry<Real>,
        a: &Bvh,
        b: &Bvh,
        report: &mut impl CollisionReport,
    ) -> TraversalAction {
        self.stamp += 1;
        self.stats = QueryStats::default();

        let (Some(root_a), Some(root_b)) = (a.root(), b.root()) else {
            log::warn!("Collision query on a hierarchy without root, nothing to report.");
            return TraversalAction::Continue;
        };

        let mut stack: SmallVec<[(BvNodeId, BvNodeId); TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push((root_a, root_b));

        while let Some((id_a, id_b)) = stack.pop() {
            let node_a = a.node(id_a);
            let node_b = b.node(id_b);

            if !self.test_volumes(id_a, node_a.volume(), pos_ab, node_b.volume()) {
                continue;
            }

            match (node_a.is_leaf(), node_b.is_leaf()) {
                (true, true) => {
                    self.stats.leaf_pairs += 1;
                    if report.report(id_a, node_a, id_b, node_b) == TraversalAction::EarlyExit {
                        return TraversalAction::EarlyExit;
                    }
                }
                (true, false) => {
                    stack.extend(node_b.children().iter().rev().map(|child| (id_a, *child)));
                }
                (false, true) => {
                    stack.extend(node_a.children().iter().rev().map(|child| (*child, id_b)));
                }
                (false, false) => {
                    // Descend into the larger volume.
                    if node_a.volume().half_area() >= node_b.volume().half_area() {
                        stack.extend(node_a.children().iter().rev().map(|child| (*child, id_b)));
                    } else {
                        stack.extend(node_b.children().iter().rev().map(|child| (id_a, *child)));
                    }
                }
            }
        }

        log::trace!(
            "Collision query #{}: {} volume tests, {} cache hits, {} leaf pairs.",
            self.stamp,
            self.stats.volume_tests,
            self.stats.cache_hits,
            self.stats.leaf_pairs
        );

        TraversalAction::Continue
    }

    /// Collects every pair of overlapping leaves of `a` and `b`.
    pub fn query_pairs(
        &mut self,
        pos_ab: &Isometry<Real>,
        a: &Bvh,
        b: &Bvh,
    ) -> Vec<(BvNodeId, BvNodeId)> {
        let mut pairs = CollectPairs::default();
        let _ = self.query(pos_ab, a, b, &mut pairs);
        pairs.pairs
    }

    fn test_volumes(
        &mut self,
        id_a: BvNodeId,
        volume_a: &Aabb,
        pos_ab: &Isometry<Real>,
        volume_b: &Aabb,
    ) -> bool {
        self.stats.volume_tests += 1;

        let i = id_a.index();
        if i >= self.cache.len() {
            self.cache.resize(i + 1, None);
        }

        let valid = self.cache[i]
            .as_ref()
            .is_some_and(|entry| entry.stamp == self.stamp && entry.pos_ab.bitwise_eq(pos_ab));

        let moved = match &mut self.cache[i] {
            Some(entry) if valid => {
                self.stats.cache_hits += 1;
                &entry.moved
            }
            slot => {
                self.stats.cache_misses += 1;
                let moved = self.overlap.transform(volume_a, pos_ab);
                &slot
                    .insert(CachedVolume {
                        stamp: self.stamp,
                        pos_ab: *pos_ab,
                        moved,
                    })
                    .moved
            }
        };

        self.overlap.overlaps(moved, volume_b)
    }
}

use super::{fit_volume, BvNodeId, Bvh, BvhError};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;
use crate::shape::Primitive;
use core::ops::Range;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// The sub-ranges a partition is split into.
pub type PartitionSplit = SmallVec<[Range<usize>; 4]>;

/// Strategy deciding how the top-down builder fits and splits partitions.
///
/// A partition is a slice of primitive indices. The policy may reorder that slice freely
/// while splitting it.
pub trait PartitionPolicy {
    /// Fits the volume of a node over the primitives of `partition`.
    fn fit<P: Primitive>(&mut self, primitives: &[P], partition: &[u32]) -> Aabb {
        fit_volume(core::iter::empty(), primitives, partition.iter().copied())
    }

    /// Splits `partition`, which holds at least two primitives.
    ///
    /// The returned ranges index into `partition`. They must be non-empty, contiguous, in
    /// increasing order, and cover the whole slice with at least two parts.
    fn split<P: Primitive>(&mut self, primitives: &[P], partition: &mut [u32]) -> PartitionSplit;
}

/// Splits a partition into near-equal index ranges after sorting it along its widest axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MedianSplit {
    branching: usize,
}

impl Default for MedianSplit {
    fn default() -> Self {
        Self::new(2)
    }
}

impl MedianSplit {
    /// A policy splitting each partition into (at most) `branching` parts.
    ///
    /// `branching` is clamped to at least 2.
    pub fn new(branching: usize) -> Self {
        Self {
            branching: branching.max(2),
        }
    }

    /// The maximum number of children of each node.
    pub fn branching(&self) -> usize {
        self.branching
    }
}

/// Sorts `partition` along the axis where the centroids spread the most.
///
/// The sort is stable, so primitives with equal centroid coordinates keep their order.
fn sort_along_widest_centroid_axis<P: Primitive>(primitives: &[P], partition: &mut [u32]) {
    let centroids = Aabb::from_points(partition.iter().map(|i| primitives[*i as usize].centroid()));
    let axis = centroids.longest_axis();
    partition.sort_by(|a, b| {
        let ca = primitives[*a as usize].centroid()[axis];
        let cb = primitives[*b as usize].centroid()[axis];
        ca.total_cmp(&cb)
    });
}

/// Splits `0..len` into `parts` contiguous ranges whose lengths differ by at most one.
fn near_equal_ranges(len: usize, parts: usize) -> PartitionSplit {
    let parts = parts.min(len);
    let base = len / parts;
    let extra = len % parts;
    let mut start = 0;

    (0..parts)
        .map(|i| {
            let end = start + base + (i < extra) as usize;
            let range = start..end;
            start = end;
            range
        })
        .collect()
}

impl PartitionPolicy for MedianSplit {
    fn split<P: Primitive>(&mut self, primitives: &[P], partition: &mut [u32]) -> PartitionSplit {
        sort_along_widest_centroid_axis(primitives, partition);
        near_equal_ranges(partition.len(), self.branching)
    }
}

/// Binary split selected with the surface area heuristic over centroid bins.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BinnedSahSplit {
    bins: usize,
}

impl Default for BinnedSahSplit {
    fn default() -> Self {
        Self::new(8)
    }
}

impl BinnedSahSplit {
    /// A policy evaluating `bins - 1` candidate splitting planes. `bins` is clamped to at
    /// least 2.
    pub fn new(bins: usize) -> Self {
        Self { bins: bins.max(2) }
    }
}

#[derive(Copy, Clone, Debug)]
struct SahBin {
    aabb: Aabb,
    count: usize,
}

impl Default for SahBin {
    fn default() -> Self {
        Self {
            aabb: Aabb::new_invalid(),
            count: 0,
        }
    }
}

impl SahBin {
    fn cost(&self) -> Real {
        if self.count == 0 {
            0.0
        } else {
            self.aabb.half_area() * self.count as Real
        }
    }
}

impl PartitionPolicy for BinnedSahSplit {
    fn split<P: Primitive>(&mut self, primitives: &[P], partition: &mut [u32]) -> PartitionSplit {
        const BIN_EPSILON: Real = 1.0e-5;

        let num_bins = self.bins;
        let centroid_aabb =
            Aabb::from_points(partition.iter().map(|i| primitives[*i as usize].centroid()));
        let axis = centroid_aabb.longest_axis();
        let width = centroid_aabb.maxs[axis] - centroid_aabb.mins[axis];

        // In degenerate cases where all the centroids coincide, just split the range in two.
        if width <= 0.0 {
            return near_equal_ranges(partition.len(), 2);
        }

        let k1 = num_bins as Real * (1.0 - BIN_EPSILON) / width;
        let k0 = centroid_aabb.mins[axis];
        let bin_of = |prim: u32| -> usize {
            let c = primitives[prim as usize].centroid()[axis];
            ((k1 * (c - k0)) as usize).min(num_bins - 1)
        };

        let mut bins = vec![SahBin::default(); num_bins];
        for prim in &*partition {
            let bin = &mut bins[bin_of(*prim)];
            bin.aabb.merge(&primitives[*prim as usize].local_aabb());
            bin.count += 1;
        }

        // Accumulate from the right so each plane's right side is available in O(1).
        let mut right_merges = bins.clone();
        for i in (0..num_bins - 1).rev() {
            let next = right_merges[i + 1];
            right_merges[i].aabb.merge(&next.aabb);
            right_merges[i].count += next.count;
        }

        let mut best_cost = Real::MAX;
        let mut best_plane = 0;
        let mut best_left_count = 0;
        let mut left_merge = SahBin::default();

        for plane in 0..num_bins - 1 {
            left_merge.aabb.merge(&bins[plane].aabb);
            left_merge.count += bins[plane].count;
            let cost = left_merge.cost() + right_merges[plane + 1].cost();

            if cost < best_cost {
                best_cost = cost;
                best_plane = plane;
                best_left_count = left_merge.count;
            }
        }

        if best_left_count == 0 || best_left_count == partition.len() {
            sort_along_widest_centroid_axis(primitives, partition);
            return near_equal_ranges(partition.len(), 2);
        }

        // Stable partition: bins up to `best_plane` go left.
        let (left, right): (Vec<u32>, Vec<u32>) =
            partition.iter().partition(|prim| bin_of(**prim) <= best_plane);
        partition[..left.len()].copy_from_slice(&left);
        partition[left.len()..].copy_from_slice(&right);

        smallvec::smallvec![0..left.len(), left.len()..partition.len()]
    }
}

/// Builds a hierarchy by recursively partitioning the set of primitives, from the root down.
///
/// Partitions are processed in breadth-first order. Each partition becomes one node, whose
/// volume is fitted by the policy; partitions with a single primitive become annotated
/// leaves referencing it.
#[derive(Clone, Debug, Default)]
pub struct TopDownBuilder<S = MedianSplit> {
    /// The strategy used to fit and split partitions.
    pub policy: S,
}

impl TopDownBuilder<MedianSplit> {
    /// A builder splitting every partition in two halves around the median centroid.
    pub fn median() -> Self {
        Self::new(MedianSplit::default())
    }
}

impl<S: PartitionPolicy> TopDownBuilder<S> {
    /// Creates a builder using the given partition policy.
    pub fn new(policy: S) -> Self {
        Self { policy }
    }

    /// Builds a new hierarchy over `primitives`.
    ///
    /// Fails with [`BvhError::EmptyInput`] if there is no primitive.
    pub fn build<P: Primitive>(&mut self, primitives: &[P]) -> Result<Bvh, BvhError> {
        if primitives.is_empty() {
            return Err(BvhError::EmptyInput);
        }

        let mut bvh = Bvh::new();
        self.run(primitives, &mut bvh)?;
        Ok(bvh)
    }

    /// Clears `bvh` and fills it with a hierarchy over `primitives`.
    ///
    /// Leaf `geometry` indices refer to positions in `primitives`. An empty set of primitives
    /// leaves `bvh` empty.
    pub fn run<P: Primitive>(&mut self, primitives: &[P], bvh: &mut Bvh) -> Result<(), BvhError> {
        bvh.clear();

        if primitives.is_empty() {
            return Ok(());
        }

        let mut indices: Vec<u32> = (0..primitives.len() as u32).collect();
        let mut queue: VecDeque<(Range<usize>, Option<BvNodeId>)> = VecDeque::new();
        queue.push_back((0..indices.len(), None));

        while let Some((range, parent)) = queue.pop_front() {
            let partition = &mut indices[range.clone()];

            if partition.is_empty() {
                return Err(BvhError::EmptyPartition { parent });
            }

            let volume = self.policy.fit(primitives, partition);
            let id = bvh.insert(parent, volume)?;

            if let [prim] = partition {
                bvh.annotate(id, [*prim])?;
                continue;
            }

            let len = partition.len();
            let split = self.policy.split(primitives, partition);
            check_split(&split, len, id)?;

            for sub in split {
                queue.push_back((range.start + sub.start..range.start + sub.end, Some(id)));
            }
        }

        log::debug!(
            "Top-down build: {} primitives, {} nodes, depth {}.",
            primitives.len(),
            bvh.len(),
            bvh.depth()
        );

        Ok(())
    }
}

fn check_split(split: &[Range<usize>], len: usize, parent: BvNodeId) -> Result<(), BvhError> {
    if split.iter().any(|range| range.is_empty()) {
        return Err(BvhError::EmptyPartition {
            parent: Some(parent),
        });
    }

    let mut expected_start = 0;
    for range in split {
        if range.start != expected_start {
            return Err(BvhError::DegenerateSplit { len });
        }
        expected_start = range.end;
    }

    if split.len() < 2 || expected_start != len {
        return Err(BvhError::DegenerateSplit { len });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::{near_equal_ranges, PartitionPolicy, PartitionSplit, TopDownBuilder};
    use crate::math::Point;
    use crate::partitioning::BvhError;
    use crate::shape::Primitive;

    struct EmptyPartFirst;

    impl PartitionPolicy for EmptyPartFirst {
        fn split<P: Primitive>(&mut self, _: &[P], partition: &mut [u32]) -> PartitionSplit {
            smallvec::smallvec![0..0, 0..partition.len()]
        }
    }

    struct Overlapping;

    impl PartitionPolicy for Overlapping {
        fn split<P: Primitive>(&mut self, _: &[P], partition: &mut [u32]) -> PartitionSplit {
            smallvec::smallvec![0..1, 0..partition.len()]
        }
    }

    #[test]
    fn near_equal_ranges_cover_everything() {
        assert_eq!(near_equal_ranges(7, 3).as_slice(), &[0..3, 3..5, 5..7]);
        assert_eq!(near_equal_ranges(2, 4).as_slice(), &[0..1, 1..2]);
    }

    #[test]
    fn misbehaving_policies_are_reported() {
        let points = [Point::origin(), Point::new(1.0, 0.0, 0.0)];

        let err = TopDownBuilder::new(EmptyPartFirst).build(&points).unwrap_err();
        assert!(matches!(err, BvhError::EmptyPartition { parent: Some(_) }));

        let err = TopDownBuilder::new(Overlapping).build(&points).unwrap_err();
        assert_eq!(err, BvhError::DegenerateSplit { len: 2 });

        let empty: [Point<crate::math::Real>; 0] = [];
        assert_eq!(
            TopDownBuilder::median().build(&empty)
                .unwrap_err(),
            BvhError::EmptyInput
        );
    }
}

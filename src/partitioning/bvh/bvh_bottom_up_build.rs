use super::{fit_volume, BvNodeId, Bvh, BvhError, ConstructionGraph, GraphEdgeId, GraphNodeId};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::Real;
use crate::shape::Primitive;
use core::cmp::Reverse;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Strategy ordering the edge collapses of the bottom-up builder.
pub trait MergePolicy {
    /// Builds whatever ordering structure the policy needs over the edges of `graph`.
    ///
    /// Called once, after every graph node got its initial volume.
    fn init(&mut self, graph: &ConstructionGraph);

    /// The next edge to collapse, or `None` if there is no edge left to collapse.
    fn next_edge(&mut self, graph: &ConstructionGraph) -> Option<GraphEdgeId>;

    /// Should the cluster `node` be materialized as a new internal hierarchy node?
    fn is_mature(&self, graph: &ConstructionGraph, node: GraphNodeId) -> bool;

    /// Updates the ordering structure after `merged` received a collapsed node.
    fn update(&mut self, graph: &ConstructionGraph, merged: GraphNodeId);
}

/// The quantity minimized by the [`GreedyMergePolicy`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum MergeCost {
    /// Half the surface area of the merged volume.
    #[default]
    SurfaceArea,
    /// The volume of the merged volume.
    Volume,
    /// The number of primitives covered by the merged cluster, favoring balanced trees.
    Balance,
}

impl MergeCost {
    fn eval(self, merged: &Aabb, covered: usize) -> Real {
        match self {
            MergeCost::SurfaceArea => merged.half_area(),
            MergeCost::Volume => merged.volume(),
            MergeCost::Balance => covered as Real,
        }
    }
}

/// Collapses the cheapest edge first.
///
/// Edges are kept in a binary min-heap keyed by `(cost, edge)`. When a collapse changes an
/// edge, the old heap entry is left in place and discarded when popped, based on the edge
/// generation.
#[derive(Clone, Debug)]
pub struct GreedyMergePolicy {
    branching: usize,
    cost: MergeCost,
    heap: BinaryHeap<Reverse<(OrderedFloat<Real>, GraphEdgeId, u32)>>,
}

impl Default for GreedyMergePolicy {
    fn default() -> Self {
        Self::new(2, MergeCost::SurfaceArea)
    }
}

impl GreedyMergePolicy {
    /// A policy materializing a hierarchy node once `branching` clusters were merged.
    ///
    /// `branching` is clamped to at least 2.
    pub fn new(branching: usize, cost: MergeCost) -> Self {
        Self {
            branching: branching.max(2),
            cost,
            heap: BinaryHeap::new(),
        }
    }

    fn push_edge(&mut self, graph: &ConstructionGraph, id: GraphEdgeId) {
        let Some(edge) = graph.edge(id) else {
            return;
        };
        let (a, b) = edge.nodes();

        if let (Some(a), Some(b)) = (graph.node(a), graph.node(b)) {
            let merged = a.volume().merged(b.volume());
            let covered = a.coverage().len() + b.coverage().len();
            let cost = self.cost.eval(&merged, covered);
            self.heap
                .push(Reverse((OrderedFloat(cost), id, edge.generation())));
        }
    }
}

impl MergePolicy for GreedyMergePolicy {
    fn init(&mut self, graph: &ConstructionGraph) {
        self.heap.clear();
        for (id, _) in graph.live_edges() {
            self.push_edge(graph, id);
        }
    }

    fn next_edge(&mut self, graph: &ConstructionGraph) -> Option<GraphEdgeId> {
        while let Some(Reverse((_, id, generation))) = self.heap.pop() {
            if graph
                .edge(id)
                .is_some_and(|edge| edge.generation() == generation)
            {
                return Some(id);
            }
        }

        None
    }

    fn is_mature(&self, graph: &ConstructionGraph, node: GraphNodeId) -> bool {
        graph
            .node(node)
            .is_some_and(|node| node.sub_node_count() >= self.branching)
    }

    fn update(&mut self, graph: &ConstructionGraph, merged: GraphNodeId) {
        for edge in graph.edges_of(merged) {
            self.push_edge(graph, *edge);
        }
    }
}

/// Summary of a bottom-up build.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BottomUpStats {
    /// The number of edges collapsed.
    pub collapses: usize,
    /// The number of internal hierarchy nodes created.
    pub internal_nodes: usize,
}

/// Builds a hierarchy by agglomerating the nodes of a [`ConstructionGraph`], from the leaves up.
///
/// Every graph node first becomes a leaf. Edges are then collapsed in the order given by the
/// merge policy, and a new internal node is created over the pending sub-trees of a cluster
/// each time the policy deems it mature. Each collapse removes exactly one graph node, so a
/// connected graph with `n` nodes is reduced to its root in `n - 1` collapses.
#[derive(Clone, Debug, Default)]
pub struct BottomUpBuilder<M = GreedyMergePolicy> {
    /// The strategy ordering edge collapses.
    pub policy: M,
}

impl<M: MergePolicy> BottomUpBuilder<M> {
    /// Creates a builder using the given merge policy.
    pub fn new(policy: M) -> Self {
        Self { policy }
    }

    /// Clears `bvh` and fills it by collapsing `graph`.
    ///
    /// The graph coverage refers to indices in `primitives`. The graph is consumed: only the
    /// root cluster is left in it once this returns successfully.
    ///
    /// Fails with [`BvhError::Disconnected`] if the graph has several connected components,
    /// see [`ConstructionGraph::connect_components`], and with [`BvhError::InvalidPrimitive`]
    /// if a node covers an index out of `primitives`. Both are detected before `graph` and
    /// `bvh` are modified.
    pub fn run<P: Primitive>(
        &mut self,
        graph: &mut ConstructionGraph,
        primitives: &[P],
        bvh: &mut Bvh,
    ) -> Result<BottomUpStats, BvhError> {
        // Validate everything before touching `graph` or `bvh`.
        for (_, node) in graph.live_nodes() {
            if let Some(bad) = node.coverage().iter().find(|i| **i as usize >= primitives.len()) {
                return Err(BvhError::InvalidPrimitive(*bad));
            }
        }

        let components = graph.connected_components().len();
        if components > 1 {
            return Err(BvhError::Disconnected { components });
        }

        bvh.clear();
        let mut stats = BottomUpStats::default();

        // Leaf seeding.
        let seeds: Vec<_> = graph
            .live_nodes()
            .map(|(id, node)| (id, node.coverage().to_vec()))
            .collect();

        for (id, coverage) in seeds {
            let volume = fit_volume(core::iter::empty(), primitives, coverage.iter().copied());
            let leaf = bvh.insert_detached(volume);

            if !coverage.is_empty() {
                bvh.annotate(leaf, coverage)?;
            }

            graph.set_volume(id, volume)?;
            graph.set_pending(id, [leaf])?;
        }

        self.policy.init(graph);

        // Collapse loop.
        while let Some(edge) = self.policy.next_edge(graph) {
            let merged = graph.collapse_edge(edge)?.kept;
            stats.collapses += 1;

            let pending = graph
                .node(merged)
                .ok_or(BvhError::InvalidGraphNode(merged))?
                .pending()
                .to_vec();
            let volume = fit_volume(
                pending.iter().map(|id| *bvh.node(*id).volume()),
                &[] as &[Aabb],
                [],
            );
            graph.set_volume(merged, volume)?;

            if self.policy.is_mature(graph, merged) {
                let parent = materialize(bvh, volume, &pending)?;
                stats.internal_nodes += 1;
                graph.set_pending(merged, [parent])?;
            }

            self.policy.update(graph, merged);
        }

        if graph.node_count() > 1 {
            // Only reachable with a policy dropping edges of a connected graph.
            bvh.clear();
            return Err(BvhError::Disconnected {
                components: graph.node_count(),
            });
        }

        // Root materialization.
        if let Some((_, last)) = graph.live_nodes().next() {
            let root = match last.pending() {
                [single] => *single,
                pending => {
                    stats.internal_nodes += 1;
                    materialize(bvh, *last.volume(), pending)?
                }
            };
            bvh.set_root(root)?;
        }

        log::debug!(
            "Bottom-up build: {} primitives, {} nodes, depth {}, {} collapses.",
            primitives.len(),
            bvh.len(),
            bvh.depth(),
            stats.collapses
        );

        Ok(stats)
    }
}

/// Creates a detached internal node adopting all of `children`.
fn materialize(bvh: &mut Bvh, volume: Aabb, children: &[BvNodeId]) -> Result<BvNodeId, BvhError> {
    let parent = bvh.insert_detached(volume);
    for child in children {
        bvh.attach(parent, *child)?;
    }
    Ok(parent)
}

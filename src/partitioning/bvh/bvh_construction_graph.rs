use super::{BvNodeId, BvhError};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real};
use crate::shape::Primitive;
use crate::utils::hashmap::{Entry, HashMap};
use crate::utils::SortedPair;
use slab::Slab;
use smallvec::SmallVec;

/// The index of a node of a [`ConstructionGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GraphNodeId(pub(crate) u32);

/// The index of an edge of a [`ConstructionGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GraphEdgeId(pub(crate) u32);

impl GraphNodeId {
    /// The index of this node in the graph's node arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl GraphEdgeId {
    /// The index of this edge in the graph's edge arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of a construction graph: one primitive, or a cluster of merged primitives.
#[derive(Clone, Debug, Default)]
pub struct GraphNode {
    coverage: Vec<u32>,
    volume: Aabb,
    edges: SmallVec<[GraphEdgeId; 6]>,
    pending: SmallVec<[BvNodeId; 4]>,
}

impl GraphNode {
    /// Indices of the original primitives covered by this node.
    #[inline]
    pub fn coverage(&self) -> &[u32] {
        &self.coverage
    }

    /// The accumulated volume of the primitives covered by this node.
    ///
    /// Invalid until the bottom-up builder seeds the graph.
    #[inline]
    pub fn volume(&self) -> &Aabb {
        &self.volume
    }

    /// The edges incident to this node, in insertion order.
    #[inline]
    pub fn edges(&self) -> &[GraphEdgeId] {
        &self.edges
    }

    /// Hierarchy nodes built for this cluster that do not have a parent yet.
    #[inline]
    pub fn pending(&self) -> &[BvNodeId] {
        &self.pending
    }

    /// The number of sub-nodes collapsed into this node since its last materialization.
    #[inline]
    pub fn sub_node_count(&self) -> usize {
        self.pending.len()
    }
}

/// An undirected candidate merge between two graph nodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    nodes: SortedPair<GraphNodeId>,
    generation: u32,
}

impl GraphEdge {
    /// The two endpoints of this edge, lowest identifier first.
    #[inline]
    pub fn nodes(&self) -> (GraphNodeId, GraphNodeId) {
        self.nodes.as_tuple()
    }

    /// A number that changes every time an endpoint of this edge changes.
    ///
    /// Priority structures keyed by edge can compare generations to detect stale entries.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// The outcome of [`ConstructionGraph::collapse_edge`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Collapse {
    /// The node that received the merged cluster.
    pub kept: GraphNodeId,
    /// The node that was merged into `kept`, and no longer exists.
    pub removed: GraphNodeId,
}

/// A graph of candidate merges, consumed by the [`BottomUpBuilder`](super::BottomUpBuilder).
///
/// Nodes are clusters of primitives, edges connect clusters that may be merged (typically
/// because they are spatially adjacent). The graph never holds self-edges nor parallel edges:
/// both are dropped as soon as they would appear.
#[derive(Clone, Debug, Default)]
pub struct ConstructionGraph {
    nodes: Slab<GraphNode>,
    edges: Slab<GraphEdge>,
    edge_keys: HashMap<SortedPair<GraphNodeId>, GraphEdgeId>,
    next_generation: u32,
}

impl ConstructionGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph with one node per primitive, node `i` covering primitive `i`, and no edge.
    pub fn with_primitives(count: usize) -> Self {
        let mut graph = Self::new();
        for i in 0..count as u32 {
            let _ = graph.add_node([i]);
        }
        graph
    }

    /// A graph with one node per triangle, and an edge between triangles sharing a mesh edge.
    pub fn from_triangles(indices: &[[u32; 3]]) -> Self {
        let mut graph = Self::with_primitives(indices.len());
        let mut owners: HashMap<SortedPair<u32>, SmallVec<[u32; 2]>> = HashMap::default();

        for (tri_id, tri) in indices.iter().enumerate() {
            for (i, j) in [(0, 1), (1, 2), (2, 0)] {
                let key = SortedPair::new(tri[i], tri[j]);
                let entry = owners.entry(key).or_default();
                for other in entry.iter() {
                    let _ = graph.add_edge(GraphNodeId(*other), GraphNodeId(tri_id as u32));
                }
                entry.push(tri_id as u32);
            }
        }

        graph
    }

    /// A graph with one node per tetrahedron, and an edge between tetrahedra sharing a face.
    pub fn from_tetrahedra(indices: &[[u32; 4]]) -> Self {
        const FACES: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

        let mut graph = Self::with_primitives(indices.len());
        let mut owners: HashMap<[u32; 3], SmallVec<[u32; 2]>> = HashMap::default();

        for (tet_id, tet) in indices.iter().enumerate() {
            for face in FACES {
                let mut key = face.map(|i| tet[i]);
                key.sort_unstable();
                let entry = owners.entry(key).or_default();
                for other in entry.iter() {
                    let _ = graph.add_edge(GraphNodeId(*other), GraphNodeId(tet_id as u32));
                }
                entry.push(tet_id as u32);
            }
        }

        graph
    }

    /// A graph with one node per voxel, and an edge between voxels sharing a face.
    ///
    /// Duplicate voxel coordinates are connected to each other too.
    pub fn from_voxels(coords: &[[i32; 3]]) -> Self {
        let mut graph = Self::with_primitives(coords.len());
        let mut occupied: HashMap<[i32; 3], SmallVec<[u32; 1]>> = HashMap::default();

        for (i, coord) in coords.iter().enumerate() {
            occupied.entry(*coord).or_default().push(i as u32);
        }

        for (i, coord) in coords.iter().enumerate() {
            let me = GraphNodeId(i as u32);
            let neighbors = [
                *coord,
                [coord[0] + 1, coord[1], coord[2]],
                [coord[0], coord[1] + 1, coord[2]],
                [coord[0], coord[1], coord[2] + 1],
            ];

            for neighbor in neighbors {
                if let Some(others) = occupied.get(&neighbor) {
                    for other in others {
                        let _ = graph.add_edge(me, GraphNodeId(*other));
                    }
                }
            }
        }

        graph
    }

    /// Adds a node covering the given primitives.
    pub fn add_node(&mut self, coverage: impl IntoIterator<Item = u32>) -> GraphNodeId {
        let node = GraphNode {
            coverage: coverage.into_iter().collect(),
            ..Default::default()
        };
        GraphNodeId(self.nodes.insert(node) as u32)
    }

    /// Adds an edge between `a` and `b`.
    ///
    /// Returns `Ok(None)` if `a == b`, and the existing edge if `a` and `b` are already
    /// connected.
    pub fn add_edge(
        &mut self,
        a: GraphNodeId,
        b: GraphNodeId,
    ) -> Result<Option<GraphEdgeId>, BvhError> {
        for id in [a, b] {
            if !self.nodes.contains(id.index()) {
                return Err(BvhError::InvalidGraphNode(id));
            }
        }

        let key = SortedPair::new(a, b);
        if key.is_loop() {
            return Ok(None);
        }

        if let Some(existing) = self.edge_keys.get(&key) {
            return Ok(Some(*existing));
        }

        let edge = GraphEdge {
            nodes: key,
            generation: self.bump_generation(),
        };
        let id = GraphEdgeId(self.edges.insert(edge) as u32);
        let _ = self.edge_keys.insert(key, id);
        self.nodes[a.index()].edges.push(id);
        self.nodes[b.index()].edges.push(id);
        Ok(Some(id))
    }

    fn bump_generation(&mut self) -> u32 {
        self.next_generation += 1;
        self.next_generation
    }

    /// The node with the given identifier, if it still exists.
    #[inline]
    pub fn node(&self, id: GraphNodeId) -> Option<&GraphNode> {
        self.nodes.get(id.index())
    }

    /// The edge with the given identifier, if it still exists.
    #[inline]
    pub fn edge(&self, id: GraphEdgeId) -> Option<&GraphEdge> {
        self.edges.get(id.index())
    }

    /// The edge connecting `a` and `b`, if any.
    pub fn edge_between(&self, a: GraphNodeId, b: GraphNodeId) -> Option<GraphEdgeId> {
        self.edge_keys.get(&SortedPair::new(a, b)).copied()
    }

    /// The edges incident to `id`. Empty if the node doesn't exist.
    pub fn edges_of(&self, id: GraphNodeId) -> &[GraphEdgeId] {
        self.node(id).map(|node| node.edges()).unwrap_or(&[])
    }

    /// The number of nodes left in this graph.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of edges left in this graph.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates through the nodes of this graph, in identifier order.
    pub fn live_nodes(&self) -> impl Iterator<Item = (GraphNodeId, &GraphNode)> {
        self.nodes.iter().map(|(i, node)| (GraphNodeId(i as u32), node))
    }

    /// Iterates through the edges of this graph, in identifier order.
    pub fn live_edges(&self) -> impl Iterator<Item = (GraphEdgeId, &GraphEdge)> {
        self.edges.iter().map(|(i, edge)| (GraphEdgeId(i as u32), edge))
    }

    pub(crate) fn node_mut(&mut self, id: GraphNodeId) -> Result<&mut GraphNode, BvhError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(BvhError::InvalidGraphNode(id))
    }

    pub(crate) fn set_volume(&mut self, id: GraphNodeId, volume: Aabb) -> Result<(), BvhError> {
        self.node_mut(id)?.volume = volume;
        Ok(())
    }

    pub(crate) fn set_pending(
        &mut self,
        id: GraphNodeId,
        pending: impl IntoIterator<Item = BvNodeId>,
    ) -> Result<(), BvhError> {
        let node = self.node_mut(id)?;
        node.pending.clear();
        node.pending.extend(pending);
        Ok(())
    }

    fn remove_edge(&mut self, id: GraphEdgeId) -> GraphEdge {
        let edge = self.edges.remove(id.index());
        let _ = self.edge_keys.remove(&edge.nodes);
        let (a, b) = edge.nodes();
        for endpoint in [a, b] {
            if let Some(node) = self.nodes.get_mut(endpoint.index()) {
                node.edges.retain(|e| *e != id);
            }
        }
        edge
    }

    /// Collapses an edge, merging its two endpoints into the one with the lowest identifier.
    ///
    /// The kept node receives the coverage, volume, and pending hierarchy nodes of the
    /// removed node. The edges of the removed node are moved to the kept node, except those
    /// that would become self-edges or duplicate an existing edge of the kept node: these are
    /// deleted. Every edge of the kept node gets a new generation.
    ///
    /// Fails with [`BvhError::StaleEdge`] if `id` is not an edge of this graph anymore.
    pub fn collapse_edge(&mut self, id: GraphEdgeId) -> Result<Collapse, BvhError> {
        if !self.edges.contains(id.index()) {
            return Err(BvhError::StaleEdge(id));
        }

        let (kept, removed) = self.remove_edge(id).nodes();
        let removed_node = self.nodes.remove(removed.index());

        for edge_id in removed_node.edges {
            let old_key = self.edges[edge_id.index()].nodes;
            let other = old_key
                .other(removed)
                .ok_or(BvhError::StaleEdge(edge_id))?;
            let new_key = SortedPair::new(kept, other);

            if new_key.is_loop() || self.edge_keys.contains_key(&new_key) {
                let _ = self.edges.remove(edge_id.index());
                let _ = self.edge_keys.remove(&old_key);
                if let Some(node) = self.nodes.get_mut(other.index()) {
                    node.edges.retain(|e| *e != edge_id);
                }
            } else {
                let _ = self.edge_keys.remove(&old_key);
                let _ = self.edge_keys.insert(new_key, edge_id);
                self.edges[edge_id.index()].nodes = new_key;
                self.nodes[kept.index()].edges.push(edge_id);
            }
        }

        let kept_node = &mut self.nodes[kept.index()];
        kept_node.coverage.extend(removed_node.coverage);
        kept_node.volume.merge(&removed_node.volume);
        kept_node.pending.extend(removed_node.pending);

        let kept_edges = kept_node.edges.clone();
        for edge_id in kept_edges {
            let generation = self.bump_generation();
            self.edges[edge_id.index()].generation = generation;
        }

        Ok(Collapse { kept, removed })
    }

    /// Connects the connected components of this graph into a single one.
    ///
    /// Components are ordered by their lowest node identifier, and each component is bridged
    /// to the next one through the pair of nodes whose coverage centroids are the closest to
    /// the other component's center (lowest identifier on ties). Returns the number of
    /// bridging edges added.
    pub fn connect_components<P: Primitive>(&mut self, primitives: &[P]) -> usize {
        let components = self.connected_components();
        let centroid = |node: &GraphNode| -> Option<Point<Real>> {
            let mut aabb = Aabb::new_invalid();
            for prim in &node.coverage {
                aabb.take_point(primitives.get(*prim as usize)?.centroid());
            }
            aabb.is_valid().then(|| aabb.center())
        };

        let centers: Vec<Point<Real>> = components
            .iter()
            .map(|comp| {
                let mut aabb = Aabb::new_invalid();
                for id in comp {
                    if let Some(c) = centroid(&self.nodes[id.index()]) {
                        aabb.take_point(c);
                    }
                }
                if aabb.is_valid() {
                    aabb.center()
                } else {
                    Point::origin()
                }
            })
            .collect();

        let closest_to = |comp: &[GraphNodeId], target: &Point<Real>| -> GraphNodeId {
            let mut best = comp[0];
            let mut best_dist = Real::MAX;
            for id in comp {
                let dist = centroid(&self.nodes[id.index()])
                    .map(|c| na::distance_squared(&c, target))
                    .unwrap_or(Real::MAX);
                if dist < best_dist {
                    best_dist = dist;
                    best = *id;
                }
            }
            best
        };

        let bridges: Vec<_> = components
            .windows(2)
            .zip(centers.windows(2))
            .map(|(comps, centers)| {
                (
                    closest_to(&comps[0], &centers[1]),
                    closest_to(&comps[1], &centers[0]),
                )
            })
            .collect();

        let mut added = 0;
        for (a, b) in bridges {
            log::trace!("Bridging construction graph components with {:?} - {:?}.", a, b);
            if let Ok(Some(_)) = self.add_edge(a, b) {
                added += 1;
            }
        }

        added
    }

    /// The connected components of this graph, each sorted by node identifier, ordered by
    /// their lowest node identifier.
    pub fn connected_components(&self) -> Vec<Vec<GraphNodeId>> {
        let mut component_of: HashMap<GraphNodeId, usize> = HashMap::default();
        let mut components = vec![];

        for (start, _) in self.live_nodes() {
            let Entry::Vacant(entry) = component_of.entry(start) else {
                continue;
            };
            let _ = entry.insert(components.len());

            let mut component = vec![start];
            let mut stack = vec![start];

            while let Some(id) = stack.pop() {
                for edge in self.edges_of(id) {
                    let Some(other) = self.edges[edge.index()].nodes.other(id) else {
                        continue;
                    };
                    if let Entry::Vacant(entry) = component_of.entry(other) {
                        let _ = entry.insert(components.len());
                        component.push(other);
                        stack.push(other);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        components
    }
}

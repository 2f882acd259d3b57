use super::{BvNodeId, GraphEdgeId, GraphNodeId};

/// Errors raised while building or editing a bounding volume hierarchy.
///
/// All of these denote a misuse of the API or a misbehaving policy. None of them can be
/// caused by the geometry itself.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BvhError {
    /// A node without parent was inserted while the hierarchy already has a root.
    #[error("the hierarchy already has a root")]
    RootAlreadySet,
    /// The node identifier does not belong to this hierarchy.
    #[error("the node {0:?} does not belong to this hierarchy")]
    InvalidNode(BvNodeId),
    /// The node already has a parent, or is the root.
    #[error("the node {0:?} is already attached to the hierarchy")]
    AlreadyAttached(BvNodeId),
    /// A partition policy produced an empty sub-partition.
    #[error("a partition policy produced an empty sub-partition (parent: {parent:?})")]
    EmptyPartition {
        /// The node the empty partition would have been attached to.
        parent: Option<BvNodeId>,
    },
    /// A partition policy did not split a range into at least two contiguous parts covering it.
    #[error("a partition policy returned a degenerate split of a range of {len} primitives")]
    DegenerateSplit {
        /// Length of the range that had to be split.
        len: usize,
    },
    /// No primitive was given to a builder.
    #[error("cannot build a hierarchy from an empty set of primitives")]
    EmptyInput,
    /// A merge policy selected an edge that no longer exists in the construction graph.
    #[error("the construction graph edge {0:?} has already been collapsed")]
    StaleEdge(GraphEdgeId),
    /// The node identifier does not belong to the construction graph.
    #[error("the construction graph node {0:?} does not exist")]
    InvalidGraphNode(GraphNodeId),
    /// The construction graph could not be collapsed to a single node.
    #[error("the construction graph has {components} connected components left")]
    Disconnected {
        /// The number of graph nodes left once no edge remained.
        components: usize,
    },
    /// A primitive index referenced by the graph is out of bounds.
    #[error("the primitive index {0} is out of bounds")]
    InvalidPrimitive(u32),
}

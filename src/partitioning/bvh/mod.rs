pub use bvh_bottom_up_build::{
    BottomUpBuilder, BottomUpStats, GreedyMergePolicy, MergeCost, MergePolicy,
};
pub use bvh_collision_query::{
    AabbOverlap, CollectPairs, CollisionQuery, CollisionReport, ObbSatOverlap, OverlapTest,
    QueryStats, TraversalAction,
};
pub use bvh_construction_graph::{
    Collapse, ConstructionGraph, GraphEdge, GraphEdgeId, GraphNode, GraphNodeId,
};
pub use bvh_error::BvhError;
pub use bvh_fit::fit_volume;
pub use bvh_node::{BvNode, BvNodeFlags, BvNodeId};
pub use bvh_top_down_build::{
    BinnedSahSplit, MedianSplit, PartitionPolicy, PartitionSplit, TopDownBuilder,
};
pub use bvh_tree::Bvh;

mod bvh_bottom_up_build;
mod bvh_collision_query;
mod bvh_construction_graph;
mod bvh_error;
mod bvh_fit;
mod bvh_node;
mod bvh_top_down_build;
mod bvh_tree;
mod bvh_validation;

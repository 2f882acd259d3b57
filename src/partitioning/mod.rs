//! Spatial partitioning tools.

pub use self::bvh::{
    fit_volume, AabbOverlap, BinnedSahSplit, BottomUpBuilder, BottomUpStats, BvNode, BvNodeFlags,
    BvNodeId, Bvh, BvhError, Collapse, CollectPairs, CollisionQuery, CollisionReport,
    ConstructionGraph, GraphEdge, GraphEdgeId, GraphNode, GraphNodeId, GreedyMergePolicy,
    MedianSplit, MergeCost, MergePolicy, ObbSatOverlap, OverlapTest, PartitionPolicy,
    PartitionSplit, QueryStats, TopDownBuilder, TraversalAction,
};

mod bvh;

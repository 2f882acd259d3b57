//! Narrow-phase reports plugged into [`CollisionQuery`](crate::partitioning::CollisionQuery).
//!
//! Each report runs an exact test on the primitives referenced by both leaves of every
//! overlapping leaf pair, and records the pairs of primitives that really intersect.

use crate::math::{Isometry, Real, DEFAULT_EPSILON};
use crate::partitioning::{BvNode, BvNodeId, CollisionReport, TraversalAction};
use crate::query::gjk::{self, GjkParams};
use crate::query::sat;
use crate::shape::{SupportMap, Triangle};

/// Reports the pairs of triangles of two meshes that intersect.
///
/// Triangles of the first mesh are moved by `pos_ab` into the frame of the second one, which
/// must be the transform given to the query. Touching triangles, and triangles only sharing a
/// vertex or an edge, are not reported. Coplanar triangles are reported if their areas overlap.
#[derive(Clone, Debug)]
pub struct TriangleOverlapReport<'a> {
    triangles_a: &'a [Triangle],
    triangles_b: &'a [Triangle],
    pos_ab: Isometry<Real>,
    /// The penetration along every separating axis required to report a pair.
    pub tolerance: Real,
    /// Stop the query at the first intersecting pair.
    pub first_only: bool,
    /// The intersecting pairs found so far, as `(index in a, index in b)`.
    pub pairs: Vec<(u32, u32)>,
}

impl<'a> TriangleOverlapReport<'a> {
    /// A report over the triangles referenced by the leaves of both hierarchies.
    pub fn new(triangles_a: &'a [Triangle], triangles_b: &'a [Triangle], pos_ab: Isometry<Real>) -> Self {
        Self {
            triangles_a,
            triangles_b,
            pos_ab,
            tolerance: DEFAULT_EPSILON * 100.0,
            first_only: false,
            pairs: vec![],
        }
    }
}

impl CollisionReport for TriangleOverlapReport<'_> {
    fn report(&mut self, _: BvNodeId, node_a: &BvNode, _: BvNodeId, node_b: &BvNode) -> TraversalAction {
        for ia in node_a.geometry() {
            let Some(tri_a) = self.triangles_a.get(*ia as usize) else {
                continue;
            };
            let tri_a = tri_a.transformed(&self.pos_ab);

            for ib in node_b.geometry() {
                let Some(tri_b) = self.triangles_b.get(*ib as usize) else {
                    continue;
                };

                if sat::triangle_triangle_intersect(&tri_a, tri_b, self.tolerance) {
                    self.pairs.push((*ia, *ib));

                    if self.first_only {
                        return TraversalAction::EarlyExit;
                    }
                }
            }
        }

        TraversalAction::Continue
    }
}

/// Reports the pairs of convex shapes of two sets that touch or intersect, using GJK.
///
/// Shapes of the first set are expressed in the frame of the first hierarchy, and shapes of the
/// second set in the frame of the second one.
#[derive(Clone, Debug)]
pub struct ConvexOverlapReport<'a, S1, S2> {
    shapes_a: &'a [S1],
    shapes_b: &'a [S2],
    pos_ab: Isometry<Real>,
    /// The GJK tolerances.
    pub params: GjkParams,
    /// The touching or intersecting pairs found so far, as `(index in a, index in b)`.
    pub pairs: Vec<(u32, u32)>,
}

impl<'a, S1, S2> ConvexOverlapReport<'a, S1, S2> {
    /// A report over the shapes referenced by the leaves of both hierarchies.
    pub fn new(shapes_a: &'a [S1], shapes_b: &'a [S2], pos_ab: Isometry<Real>) -> Self {
        Self {
            shapes_a,
            shapes_b,
            pos_ab,
            params: GjkParams::default(),
            pairs: vec![],
        }
    }
}

impl<S1: SupportMap, S2: SupportMap> CollisionReport for ConvexOverlapReport<'_, S1, S2> {
    fn report(&mut self, _: BvNodeId, node_a: &BvNode, _: BvNodeId, node_b: &BvNode) -> TraversalAction {
        for ia in node_a.geometry() {
            let Some(shape_a) = self.shapes_a.get(*ia as usize) else {
                continue;
            };

            for ib in node_b.geometry() {
                let Some(shape_b) = self.shapes_b.get(*ib as usize) else {
                    continue;
                };

                // Run in the frame of the second hierarchy, where `shape_a` sits at `pos_ab`.
                if gjk::intersection_test(&self.pos_ab, shape_b, shape_a, &self.params) {
                    self.pairs.push((*ia, *ib));
                }
            }
        }

        TraversalAction::Continue
    }
}

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{Primitive, SupportMap};
use crate::utils;

/// The convex hull of a set of points, represented implicitly by its support function.
#[derive(PartialEq, Debug, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConvexPointCloud {
    points: Vec<Point<Real>>,
}

impl ConvexPointCloud {
    /// Creates the convex hull of a non-empty set of points.
    ///
    /// Returns `None` if `points` is empty.
    pub fn new(points: Vec<Point<Real>>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points })
        }
    }

    /// The points this hull is built on.
    #[inline]
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }
}

impl Primitive for ConvexPointCloud {
    fn local_aabb(&self) -> Aabb {
        Aabb::from_points(self.points.iter().copied())
    }
}

impl SupportMap for ConvexPointCloud {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        utils::point_cloud_support_point(dir, &self.points)
    }
}

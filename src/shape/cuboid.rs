//! Support mapping based Cuboid shape.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DIM};
use crate::shape::{Primitive, SupportMap};

/// Shape of a box, centered at the origin of its local frame.
#[derive(PartialEq, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Cuboid {
    /// The half-extents of the cuboid.
    pub half_extents: Vector<Real>,
}

impl Cuboid {
    /// Creates a new box from its half-extents. Half-extents are the box half-width along each
    /// axis. Each half-extent must be positive.
    #[inline]
    pub fn new(half_extents: Vector<Real>) -> Cuboid {
        Cuboid { half_extents }
    }

    /// The AABB of this cuboid in its local frame.
    #[inline]
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_half_extents(Point::origin(), self.half_extents)
    }
}

impl Primitive for Cuboid {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        Cuboid::local_aabb(self)
    }
}

impl SupportMap for Cuboid {
    /// The support point of this box.
    ///
    /// A zero component of `dir` selects the centered coordinate on that axis, so ties are
    /// resolved to the centroid of the supporting face or edge.
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let mut res = Point::origin();

        for i in 0..DIM {
            if dir[i] > 0.0 {
                res[i] = self.half_extents[i];
            } else if dir[i] < 0.0 {
                res[i] = -self.half_extents[i];
            }
        }

        res
    }
}

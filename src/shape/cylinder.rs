//! Support mapping based Cylinder shape.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{Primitive, SupportMap};
use na;
use num::Zero;

/// Cylinder shape with its principal axis aligned with the `y` axis.
#[derive(PartialEq, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct Cylinder {
    /// The half-height of the cylinder.
    pub half_height: Real,
    /// The radius of the cylinder.
    pub radius: Real,
}

impl Cylinder {
    /// Creates a new cylinder.
    ///
    /// # Arguments:
    /// * `half_height` - the half length of the cylinder along the `y` axis.
    /// * `radius` - the length of the cylinder along all other axis.
    pub fn new(half_height: Real, radius: Real) -> Cylinder {
        assert!(half_height.is_sign_positive() && radius.is_sign_positive());

        Cylinder {
            half_height,
            radius,
        }
    }
}

impl Primitive for Cylinder {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        let half_extents = Vector::new(self.radius, self.half_height, self.radius);
        Aabb::from_half_extents(Point::origin(), half_extents)
    }
}

impl SupportMap for Cylinder {
    /// The support point of this cylinder.
    ///
    /// Directions parallel to the axis select the center of a cap, and directions
    /// orthogonal to it select a point of the equator.
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let mut vres = *dir;

        vres[1] = 0.0;

        if vres.normalize_mut().is_zero() {
            vres = na::zero()
        } else {
            vres *= self.radius;
        }

        if dir[1] > 0.0 {
            vres[1] = self.half_height;
        } else if dir[1] < 0.0 {
            vres[1] = -self.half_height;
        }

        Point::from(vres)
    }
}

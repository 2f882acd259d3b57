use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{Primitive, SupportMap};

/// An axis-aligned ellipsoid centered at the origin of its local frame.
#[derive(PartialEq, Debug, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Ellipsoid {
    /// The semi-axis lengths along `x`, `y` and `z`.
    pub radii: Vector<Real>,
}

impl Ellipsoid {
    /// Creates a new ellipsoid from its semi-axis lengths.
    pub fn new(radii: Vector<Real>) -> Self {
        Self { radii }
    }
}

impl Primitive for Ellipsoid {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        Aabb::from_half_extents(Point::origin(), self.radii)
    }
}

impl SupportMap for Ellipsoid {
    /// The support point `R² d / |R d|`, with `R` the diagonal matrix of radii.
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let scaled = self.radii.component_mul(dir);
        let norm = scaled.norm();

        if norm == 0.0 {
            Point::origin()
        } else {
            Point::from(self.radii.component_mul(&scaled) / norm)
        }
    }
}

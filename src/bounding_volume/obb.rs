//! Oriented Bounding Box.

use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Translation, Vector};
use crate::query::sat;
use crate::shape::Cuboid;

/// An Oriented Bounding Box (OBB).
///
/// A box centered at `pos.translation` whose axes are the columns of `pos.rotation`.
/// Transforming an OBB by a rigid motion is exact, unlike transforming an [`Aabb`] which
/// has to re-enclose the rotated box.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Obb {
    /// The position of the box center and its orientation.
    pub pos: Isometry<Real>,
    /// The half-extents of the box along its local axes.
    pub half_extents: Vector<Real>,
}

impl Obb {
    /// Creates a new OBB from its pose and half-extents.
    #[inline]
    pub fn new(pos: Isometry<Real>, half_extents: Vector<Real>) -> Self {
        Self { pos, half_extents }
    }

    /// The OBB exactly matching the given AABB.
    #[inline]
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(
            Isometry::from(Translation::from(aabb.center().coords)),
            aabb.half_extents(),
        )
    }

    /// The center of this OBB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from(self.pos.translation.vector)
    }

    /// This OBB after the rigid motion `m`.
    #[inline]
    pub fn transform_by(&self, m: &Isometry<Real>) -> Self {
        Self::new(m * self.pos, self.half_extents)
    }

    /// The smallest AABB enclosing this OBB.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_half_extents(Point::origin(), self.half_extents).transform_by(&self.pos)
    }

    /// The eight corners of this OBB.
    pub fn vertices(&self) -> [Point<Real>; 8] {
        Aabb::from_half_extents(Point::origin(), self.half_extents)
            .vertices()
            .map(|pt| self.pos * pt)
    }

    /// Separating-axis overlap test against an AABB expressed in the same frame.
    ///
    /// Touching boxes are considered intersecting.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let cuboid1 = Cuboid::new(aabb.half_extents());
        let cuboid2 = Cuboid::new(self.half_extents);
        let pos12 = Translation::from(-aabb.center().coords) * self.pos;
        sat::cuboid_cuboid_intersect(&pos12, &cuboid1, &cuboid2)
    }

    /// Separating-axis overlap test against another OBB expressed in the same frame.
    pub fn intersects(&self, other: &Obb) -> bool {
        let cuboid1 = Cuboid::new(self.half_extents);
        let cuboid2 = Cuboid::new(other.half_extents);
        let pos12 = self.pos.inv_mul(&other.pos);
        sat::cuboid_cuboid_intersect(&pos12, &cuboid1, &cuboid2)
    }
}

#[cfg(test)]
mod test {
    use super::Obb;
    use crate::bounding_volume::{Aabb, BoundingVolume};
    use crate::math::{Isometry, Point, Real, Vector};

    #[test]
    fn rotated_obb_is_tighter_than_its_aabb() {
        let unit = Aabb::from_half_extents(Point::origin(), Vector::repeat(1.0));
        let rot = Isometry::rotation(Vector::z() * (std::f64::consts::FRAC_PI_4 as Real));
        let obb = Obb::from_aabb(&unit).transform_by(&rot);

        // Lies in the corner of the rotated box's AABB, but outside of the rotated box.
        let probe = Aabb::from_half_extents(Point::new(1.3, 1.3, 0.0), Vector::repeat(0.05));
        assert!(obb.aabb().intersects(&probe));
        assert!(!obb.intersects_aabb(&probe));

        let inside = Aabb::from_half_extents(Point::new(1.3, 0.0, 0.0), Vector::repeat(0.05));
        assert!(obb.intersects_aabb(&inside));
    }

    #[test]
    fn obb_aabb_agree_without_rotation() {
        let a = Aabb::from_half_extents(Point::new(0.5, 0.0, 0.0), Vector::new(1.0, 2.0, 0.5));
        let b = Aabb::from_half_extents(Point::new(2.0, 1.0, 0.0), Vector::new(0.4, 0.4, 0.4));
        let c = Aabb::from_half_extents(Point::new(2.0, 3.0, 0.0), Vector::new(0.4, 0.4, 0.4));
        assert_eq!(Obb::from_aabb(&a).intersects_aabb(&b), a.intersects(&b));
        assert_eq!(Obb::from_aabb(&a).intersects_aabb(&c), a.intersects(&c));
        assert!(!Obb::from_aabb(&a).intersects(&Obb::from_aabb(&b)));

        let d = Aabb::from_half_extents(Point::new(1.5, 1.0, 0.0), Vector::repeat(0.4));
        assert!(a.intersects(&d));
        assert!(Obb::from_aabb(&a).intersects_aabb(&d));
        assert!(Obb::from_aabb(&a).intersects(&Obb::from_aabb(&d)));
    }
}

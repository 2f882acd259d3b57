use crate::math::{Isometry, Point, Real, Vector};
use crate::shape::SupportMap;
use core::ops::Sub;
use na::Unit;

/// A point of the Minkowski difference of two shapes.
///
/// Each point of that difference, also called the Configuration-Space Obstacle, is the
/// difference of one point of each shape. Both original points are kept alongside so the
/// closest points on the shapes can be recovered from a simplex.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CsoPoint {
    /// The point of the difference, `orig1 - orig2`.
    pub point: Point<Real>,
    /// The point of the first shape.
    pub orig1: Point<Real>,
    /// The point of the second shape, expressed in the frame of the first shape.
    pub orig2: Point<Real>,
}

impl CsoPoint {
    /// Initializes a point of the difference with `orig1 - orig2`.
    pub fn new(orig1: Point<Real>, orig2: Point<Real>) -> Self {
        CsoPoint {
            point: Point::from(orig1 - orig2),
            orig1,
            orig2,
        }
    }

    /// A point of the difference of a shape and the origin.
    pub fn single_point(point: Point<Real>) -> Self {
        Self::new(point, Point::origin())
    }

    /// The support point of the difference of `g1` and `g2` toward `dir`.
    ///
    /// `pos12` is the position of `g2` relative to `g1`. The result is expressed in the frame
    /// of `g1`.
    pub fn from_shapes<G1, G2>(pos12: &Isometry<Real>, g1: &G1, g2: &G2, dir: &Vector<Real>) -> Self
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let sp1 = g1.local_support_point(dir);
        let sp2 = g2.support_point(pos12, &-*dir);

        CsoPoint::new(sp1, sp2)
    }

    /// The support point of the difference of `g1` and `g2` toward the unit direction `dir`.
    pub fn from_shapes_toward<G1, G2>(
        pos12: &Isometry<Real>,
        g1: &G1,
        g2: &G2,
        dir: &Unit<Vector<Real>>,
    ) -> Self
    where
        G1: ?Sized + SupportMap,
        G2: ?Sized + SupportMap,
    {
        let sp1 = g1.local_support_point_toward(dir);
        let sp2 = g2.support_point_toward(pos12, &-*dir);

        CsoPoint::new(sp1, sp2)
    }
}

impl Sub<CsoPoint> for CsoPoint {
    type Output = Vector<Real>;

    #[inline]
    fn sub(self, rhs: CsoPoint) -> Vector<Real> {
        self.point - rhs.point
    }
}

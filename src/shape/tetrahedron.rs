//! Definition of the tetrahedron shape.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{Primitive, SupportMap, Triangle};

/// A tetrahedron with 4 vertices.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tetrahedron {
    /// The tetrahedron first point.
    pub a: Point<Real>,
    /// The tetrahedron second point.
    pub b: Point<Real>,
    /// The tetrahedron third point.
    pub c: Point<Real>,
    /// The tetrahedron fourth point.
    pub d: Point<Real>,
}

impl Tetrahedron {
    /// Creates a tetrahedron from four points.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>, d: Point<Real>) -> Tetrahedron {
        Tetrahedron { a, b, c, d }
    }

    /// The four vertices of this tetrahedron.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Local vertex indices of the four faces, each face being opposite to the vertex
    /// missing from it: `[BCD, ACD, ABD, ABC]`.
    pub const FACES: [[usize; 3]; 4] = [[1, 2, 3], [0, 2, 3], [0, 1, 3], [0, 1, 2]];

    /// The four faces of this tetrahedron, in the order of [`Self::FACES`].
    pub fn faces(&self) -> [Triangle; 4] {
        let vtx = self.vertices();
        Self::FACES.map(|[i, j, k]| Triangle::new(vtx[i], vtx[j], vtx[k]))
    }

    /// Computes the signed volume of this tetrahedron.
    ///
    /// If it is positive, `d` is on the half-space pointed by the normal of the oriented
    /// triangle `(a, b, c)`.
    #[inline]
    pub fn signed_volume(&self) -> Real {
        let p1p2 = self.b - self.a;
        let p1p3 = self.c - self.a;
        let p1p4 = self.d - self.a;

        p1p2.cross(&p1p3).dot(&p1p4) / 6.0
    }

    /// The center of mass of this tetrahedron.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from((self.a.coords + self.b.coords + self.c.coords + self.d.coords) / 4.0)
    }
}

impl Primitive for Tetrahedron {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        Aabb::from_points(self.vertices())
    }

    #[inline]
    fn centroid(&self) -> Point<Real> {
        self.center()
    }
}

impl SupportMap for Tetrahedron {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        crate::utils::point_cloud_support_point(dir, &self.vertices())
    }
}

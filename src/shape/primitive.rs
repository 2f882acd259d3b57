use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Vector};
use crate::shape::SupportMap;

/// A geometric primitive a bounding volume hierarchy can be built on.
///
/// Constructors only need to bound a primitive and to locate it; everything else about
/// the geometry stays with its owner.
pub trait Primitive {
    /// The smallest AABB enclosing this primitive.
    fn local_aabb(&self) -> Aabb;

    /// A representative point used to sort and bin primitives.
    fn centroid(&self) -> Point<Real> {
        self.local_aabb().center()
    }
}

impl Primitive for Point<Real> {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        Aabb::new(*self, *self)
    }

    #[inline]
    fn centroid(&self) -> Point<Real> {
        *self
    }
}

impl Primitive for Aabb {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        *self
    }
}

impl<P: Primitive + ?Sized> Primitive for &P {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        (**self).local_aabb()
    }

    #[inline]
    fn centroid(&self) -> Point<Real> {
        (**self).centroid()
    }
}

/// A shape placed somewhere in space.
///
/// The `shape` is described in its own local frame, and `pos` maps it to the frame of the
/// hierarchy it belongs to.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Placed<S> {
    /// The position of the shape.
    pub pos: Isometry<Real>,
    /// The shape, in its local frame.
    pub shape: S,
}

impl<S> Placed<S> {
    /// Places `shape` at the position `pos`.
    pub fn new(pos: Isometry<Real>, shape: S) -> Self {
        Self { pos, shape }
    }
}

impl<S: Primitive> Primitive for Placed<S> {
    #[inline]
    fn local_aabb(&self) -> Aabb {
        self.shape.local_aabb().transform_by(&self.pos)
    }

    #[inline]
    fn centroid(&self) -> Point<Real> {
        self.pos * self.shape.centroid()
    }
}

impl<S: SupportMap> SupportMap for Placed<S> {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        self.shape.support_point(&self.pos, dir)
    }
}

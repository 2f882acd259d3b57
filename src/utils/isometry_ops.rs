use crate::math::{Isometry, Real, Vector};

/// Extra operations with isometries.
pub trait IsometryOps {
    /// Transform a vector by the absolute value of the homogeneous matrix
    /// equivalent to `self`.
    fn absolute_transform_vector(&self, v: &Vector<Real>) -> Vector<Real>;

    /// Exact equality of both the rotation and translation parts.
    ///
    /// Used to key caches of transformed volumes: two isometries compare equal
    /// only if they would produce bitwise-identical transformed results.
    fn bitwise_eq(&self, other: &Self) -> bool;
}

impl IsometryOps for Isometry<Real> {
    #[inline]
    fn absolute_transform_vector(&self, v: &Vector<Real>) -> Vector<Real> {
        self.rotation.to_rotation_matrix().into_inner().abs() * *v
    }

    #[inline]
    fn bitwise_eq(&self, other: &Self) -> bool {
        self.translation.vector == other.translation.vector
            && self.rotation.coords == other.rotation.coords
    }
}

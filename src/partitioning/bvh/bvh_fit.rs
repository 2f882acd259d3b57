use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::shape::Primitive;

/// Fits an axis-aligned volume over a mix of already-built child volumes and raw geometry.
///
/// The result is the component-wise min/max of every child volume corner and every
/// primitive's bounds: the tightest AABB of the union. Both constructors fit each node with
/// this function, bottom-up, and never adjust a volume incrementally afterward.
///
/// Returns an invalid AABB (see [`Aabb::new_invalid`]) if there is nothing to fit.
pub fn fit_volume<P: Primitive>(
    child_volumes: impl IntoIterator<Item = Aabb>,
    primitives: &[P],
    geometry: impl IntoIterator<Item = u32>,
) -> Aabb {
    let mut result = Aabb::new_invalid();

    for volume in child_volumes {
        result.merge(&volume);
    }

    for id in geometry {
        result.merge(&primitives[id as usize].local_aabb());
    }

    result
}

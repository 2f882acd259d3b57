use crate::math::{Real, Vector, DEFAULT_EPSILON};
use crate::shape::Triangle;
use arrayvec::ArrayVec;
use na::Unit;

/// Computes the separation of two triangles along the unit vector `axis`.
///
/// The separation is the gap between the projection intervals of both triangles: positive
/// if they are disjoint along `axis`, zero if they touch, negative if they overlap.
#[inline]
pub fn triangle_triangle_compute_separation_wrt_axis(
    triangle1: &Triangle,
    triangle2: &Triangle,
    axis: &Vector<Real>,
) -> Real {
    let (min1, max1) = triangle1.extents_on_dir(axis);
    let (min2, max2) = triangle2.extents_on_dir(axis);
    (min2 - max1).max(min1 - max2)
}

/// Finds the axis with the largest separation between two triangles in the same frame.
///
/// The candidate axes are both face normals, and the 9 cross products of an edge of
/// `triangle1` with an edge of `triangle2`. Near-zero axes (degenerate triangles, parallel
/// edges) are skipped. Returns `-Real::MAX` and a zero vector if no candidate axis is left.
pub fn triangle_triangle_find_separating_axis(
    triangle1: &Triangle,
    triangle2: &Triangle,
) -> (Real, Vector<Real>) {
    let mut axes = ArrayVec::<Vector<Real>, 11>::new();

    for normal in [triangle1.normal(), triangle2.normal()].into_iter().flatten() {
        axes.push(normal.into_inner());
    }

    for e1 in triangle1.edges_scaled_directions() {
        for e2 in triangle2.edges_scaled_directions() {
            if let Some(axis) = Unit::try_new(e1.cross(&e2), DEFAULT_EPSILON) {
                axes.push(axis.into_inner());
            }
        }
    }

    max_separation(triangle1, triangle2, &axes)
}

/// Finds the in-plane axis with the largest separation between two coplanar triangles.
///
/// The candidate axes are the 6 directions lying in the plane of normal `normal` and
/// orthogonal to an edge of either triangle. Returns `-Real::MAX` and a zero vector if every
/// edge is degenerate.
pub fn triangle_triangle_find_coplanar_separating_axis(
    triangle1: &Triangle,
    triangle2: &Triangle,
    normal: &Unit<Vector<Real>>,
) -> (Real, Vector<Real>) {
    let mut axes = ArrayVec::<Vector<Real>, 6>::new();

    for edge in triangle1
        .edges_scaled_directions()
        .into_iter()
        .chain(triangle2.edges_scaled_directions())
    {
        if let Some(axis) = Unit::try_new(normal.cross(&edge), DEFAULT_EPSILON) {
            axes.push(axis.into_inner());
        }
    }

    max_separation(triangle1, triangle2, &axes)
}

fn max_separation(
    triangle1: &Triangle,
    triangle2: &Triangle,
    axes: &[Vector<Real>],
) -> (Real, Vector<Real>) {
    let mut best_separation = -Real::MAX;
    let mut best_dir = Vector::zeros();

    for axis in axes {
        let separation = triangle_triangle_compute_separation_wrt_axis(triangle1, triangle2, axis);

        if separation > best_separation {
            best_separation = separation;
            best_dir = *axis;
        }
    }

    (best_separation, best_dir)
}

/// Strict intersection test between two triangles expressed in the same frame.
///
/// The triangles intersect only if they overlap by more than `tolerance` along every
/// candidate separating axis. Triangles sharing a vertex or an edge, and touching triangles,
/// are not considered intersecting, and neither are degenerate triangles.
///
/// If every vertex of `triangle2` lies within `tolerance` of the plane of `triangle1`, both
/// are tested as coplanar: they intersect if their areas overlap by more than `tolerance`
/// within that plane.
pub fn triangle_triangle_intersect(
    triangle1: &Triangle,
    triangle2: &Triangle,
    tolerance: Real,
) -> bool {
    let (Some(normal1), Some(_)) = (triangle1.normal(), triangle2.normal()) else {
        return false;
    };

    let coplanar = triangle2
        .vertices()
        .iter()
        .all(|pt| normal1.dot(&(pt - triangle1.a)).abs() <= tolerance);

    let separation = if coplanar {
        triangle_triangle_find_coplanar_separating_axis(triangle1, triangle2, &normal1).0
    } else {
        triangle_triangle_find_separating_axis(triangle1, triangle2).0
    };

    separation < -tolerance
}

#[cfg(test)]
mod test {
    use super::triangle_triangle_intersect;
    use crate::math::Point;
    use crate::shape::Triangle;

    const TOL: f64 = 1.0e-5;

    fn base() -> Triangle {
        Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        )
    }

    #[test]
    fn piercing_triangles_intersect() {
        let pierce = Triangle::new(
            Point::new(0.5, 0.5, -1.0),
            Point::new(0.5, 0.5, 1.0),
            Point::new(0.6, 0.4, 1.0),
        );
        assert!(triangle_triangle_intersect(&base(), &pierce, TOL as _));
    }

    #[test]
    fn shared_vertex_is_not_an_intersection() {
        let fan = Triangle::new(
            Point::new(0.0, 0.0, 0.0),
            Point::new(-1.0, 0.0, 1.0),
            Point::new(0.0, -1.0, 1.0),
        );
        assert!(!triangle_triangle_intersect(&base(), &fan, TOL as _));
    }

    #[test]
    fn overlapping_coplanar_triangles_intersect() {
        let shifted = Triangle::new(
            Point::new(0.5, 0.5, 0.0),
            Point::new(2.5, 0.5, 0.0),
            Point::new(0.5, 2.5, 0.0),
        );
        assert!(triangle_triangle_intersect(&base(), &shifted, TOL as _));
        assert!(triangle_triangle_intersect(&shifted, &base(), TOL as _));

        // Coplanar, sharing the hypotenuse of `base` only.
        let mirrored = Triangle::new(
            Point::new(2.0, 0.0, 0.0),
            Point::new(2.0, 2.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        );
        assert!(!triangle_triangle_intersect(&base(), &mirrored, TOL as _));

        let far = Triangle::new(
            Point::new(3.0, 3.0, 0.0),
            Point::new(4.0, 3.0, 0.0),
            Point::new(3.0, 4.0, 0.0),
        );
        assert!(!triangle_triangle_intersect(&base(), &far, TOL as _));
    }

    #[test]
    fn distant_triangles_do_not_intersect() {
        let above = Triangle::new(
            Point::new(0.0, 0.0, 3.0),
            Point::new(2.0, 0.0, 3.0),
            Point::new(0.0, 2.0, 3.0),
        );
        assert!(!triangle_triangle_intersect(&base(), &above, TOL as _));
    }
}

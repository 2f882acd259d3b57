use crate::math::{Point, Real, Vector};

/// Computes the index of the support point of a cloud of points.
///
/// Ties are broken in favor of the lowest index: a later point only replaces
/// the current best if it is strictly farther along `dir`.
///
/// # Panics
/// Panics if `points` is empty.
#[inline]
pub fn point_cloud_support_point_id(dir: &Vector<Real>, points: &[Point<Real>]) -> usize {
    let mut best_pt = 0;
    let mut best_dot = points[0].coords.dot(dir);

    for (i, p) in points.iter().enumerate().skip(1) {
        let dot = p.coords.dot(dir);

        if dot > best_dot {
            best_dot = dot;
            best_pt = i;
        }
    }

    best_pt
}

/// Computes the support point of a cloud of points.
#[inline]
pub fn point_cloud_support_point(dir: &Vector<Real>, points: &[Point<Real>]) -> Point<Real> {
    points[point_cloud_support_point_id(dir, points)]
}

#[cfg(test)]
mod test {
    use super::point_cloud_support_point_id;
    use crate::math::{Point, Vector};

    #[test]
    fn support_point_ties_pick_lowest_index() {
        let pts = [
            Point::new(1.0, 1.0, 0.0),
            Point::new(1.0, -1.0, 0.0),
            Point::new(-1.0, 0.0, 0.0),
        ];
        assert_eq!(point_cloud_support_point_id(&Vector::x(), &pts), 0);
        assert_eq!(point_cloud_support_point_id(&-Vector::y(), &pts), 1);
        assert_eq!(point_cloud_support_point_id(&-Vector::x(), &pts), 2);
    }
}

use crate::math::{Point, Real, Vector};
use crate::query::gjk::{self, Simplex};
use arrayvec::ArrayVec;

/// Strategy projecting the origin on a simplex.
pub trait SimplexSolver {
    /// Computes the point of `simplex` closest to the origin, and reduces `simplex` to the
    /// smallest sub-simplex containing it.
    ///
    /// The weights of the remaining slots are set to the barycentric coordinates of the
    /// returned point. Returns the origin if the origin lies inside a full tetrahedron.
    fn project_origin_and_reduce(&mut self, simplex: &mut Simplex) -> Point<Real>;
}

/// Projects the origin with a case analysis over the Voronoi regions of the simplex features.
///
/// Ties between features are broken in favor of the lowest slots. Degenerate simplices are
/// handled as their best non-degenerate feature: a zero-length segment as its first vertex, a
/// zero-area triangle as its closest edge, and a flat tetrahedron as its closest face.
#[derive(Copy, Clone, Debug, Default)]
pub struct VoronoiSimplexSolver;

/// A projection of the origin: the projected point and the weight of each contributing slot.
#[derive(Clone, Debug)]
struct Projection {
    point: Point<Real>,
    weights: ArrayVec<(usize, Real), 4>,
}

impl Projection {
    fn sq_dist(&self) -> Real {
        self.point.coords.norm_squared()
    }
}

impl SimplexSolver for VoronoiSimplexSolver {
    fn project_origin_and_reduce(&mut self, simplex: &mut Simplex) -> Point<Real> {
        let mut slots = ArrayVec::<usize, 4>::new();
        let mut pts = ArrayVec::<Point<Real>, 4>::new();

        for (slot, pt, _) in simplex.points() {
            slots.push(slot);
            pts.push(pt.point);
        }

        let local = match pts.len() {
            0 => return Point::origin(),
            1 => vertex(&pts, 0),
            2 => project_on_segment(&pts, [0, 1]),
            3 => project_on_triangle(&pts, [0, 1, 2]),
            _ => project_on_tetrahedron(&pts),
        };

        let kept: ArrayVec<(usize, Real), 4> = local
            .weights
            .iter()
            .map(|(i, w)| (slots[*i], *w))
            .collect();
        simplex.reduce(&kept);

        local.point
    }
}

fn vertex(pts: &[Point<Real>], a: usize) -> Projection {
    let mut weights = ArrayVec::new();
    weights.push((a, 1.0));
    Projection {
        point: pts[a],
        weights,
    }
}

fn on_segment(pts: &[Point<Real>], [a, b]: [usize; 2], t: Real) -> Projection {
    let mut weights = ArrayVec::new();
    weights.push((a, 1.0 - t));
    weights.push((b, t));
    Projection {
        point: pts[a] + (pts[b] - pts[a]) * t,
        weights,
    }
}

fn project_on_segment(pts: &[Point<Real>], [a, b]: [usize; 2]) -> Projection {
    let ab = pts[b] - pts[a];
    let sq_len = ab.norm_squared();

    if sq_len <= gjk::eps_tol() * gjk::eps_tol() {
        return vertex(pts, a);
    }

    let t = -pts[a].coords.dot(&ab) / sq_len;

    if t <= 0.0 {
        vertex(pts, a)
    } else if t >= 1.0 {
        vertex(pts, b)
    } else {
        on_segment(pts, [a, b], t)
    }
}

fn is_flat_triangle(ab: &Vector<Real>, ac: &Vector<Real>) -> bool {
    // Squared sine of the angle at `a` below the tolerance.
    ab.cross(ac).norm_squared() <= gjk::eps_tol() * ab.norm_squared() * ac.norm_squared()
}

fn closest(candidates: impl IntoIterator<Item = Projection>) -> Option<Projection> {
    let mut best: Option<Projection> = None;

    for candidate in candidates {
        // Strict comparison: the first of equally close candidates wins.
        if best
            .as_ref()
            .map_or(true, |best| candidate.sq_dist() < best.sq_dist())
        {
            best = Some(candidate);
        }
    }

    best
}

fn project_on_triangle(pts: &[Point<Real>], [a, b, c]: [usize; 3]) -> Projection {
    let (pa, pb, pc) = (pts[a], pts[b], pts[c]);
    let ab = pb - pa;
    let ac = pc - pa;

    if is_flat_triangle(&ab, &ac) {
        let edges = [[a, b], [a, c], [b, c]].map(|edge| project_on_segment(pts, edge));
        return closest(edges).unwrap_or_else(|| vertex(pts, a));
    }

    // Vertex region of `a`.
    let ap = -pa.coords;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return vertex(pts, a);
    }

    // Vertex region of `b`.
    let bp = -pb.coords;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return vertex(pts, b);
    }

    // Edge region of `ab`.
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return on_segment(pts, [a, b], d1 / (d1 - d3));
    }

    // Vertex region of `c`.
    let cp = -pc.coords;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return vertex(pts, c);
    }

    // Edge region of `ac`.
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return on_segment(pts, [a, c], d2 / (d2 - d6));
    }

    // Edge region of `bc`.
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && d4 - d3 >= 0.0 && d5 - d6 >= 0.0 {
        return on_segment(pts, [b, c], (d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    // Face region.
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    let mut weights = ArrayVec::new();
    weights.push((a, 1.0 - v - w));
    weights.push((b, v));
    weights.push((c, w));

    Projection {
        point: pa + ab * v + ac * w,
        weights,
    }
}

fn project_on_tetrahedron(pts: &[Point<Real>]) -> Projection {
    // Each face with the vertex it is opposite to, in slot order.
    const FACES: [([usize; 3], usize); 4] = [
        ([0, 1, 2], 3),
        ([0, 1, 3], 2),
        ([0, 2, 3], 1),
        ([1, 2, 3], 0),
    ];

    let ab = pts[1] - pts[0];
    let ac = pts[2] - pts[0];
    let ad = pts[3] - pts[0];
    let det = ab.cross(&ac).dot(&ad);
    let flat = det * det <= gjk::eps_tol() * ab.norm_squared() * ac.norm_squared() * ad.norm_squared();

    let mut outside = ArrayVec::<[usize; 3], 4>::new();
    for (face, opposite) in FACES {
        if flat || origin_outside_of_face(pts, face, opposite) {
            outside.push(face);
        }
    }

    if outside.is_empty() {
        // The origin is inside: weights are the ratios of the sub-volumes.
        let sub_volume = |i: usize| {
            let mut sub = [pts[0], pts[1], pts[2], pts[3]];
            sub[i] = Point::origin();
            (sub[1] - sub[0]).cross(&(sub[2] - sub[0])).dot(&(sub[3] - sub[0]))
        };
        let weights = (0..4).map(|i| (i, sub_volume(i) / det)).collect();

        return Projection {
            point: Point::origin(),
            weights,
        };
    }

    closest(outside.into_iter().map(|face| project_on_triangle(pts, face)))
        .unwrap_or_else(|| vertex(pts, 0))
}

fn origin_outside_of_face(pts: &[Point<Real>], [a, b, c]: [usize; 3], opposite: usize) -> bool {
    let n = (pts[b] - pts[a]).cross(&(pts[c] - pts[a]));
    let sign_origin = n.dot(&-pts[a].coords);
    let sign_opposite = n.dot(&(pts[opposite] - pts[a]));
    sign_origin * sign_opposite < 0.0
}

#[cfg(test)]
mod test {
    use super::{SimplexSolver, VoronoiSimplexSolver};
    use crate::math::{Point, Real};
    use crate::query::gjk::{CsoPoint, Simplex};

    fn simplex(pts: &[[Real; 3]]) -> Simplex {
        let pts: Vec<_> = pts
            .iter()
            .map(|p| CsoPoint::single_point(Point::new(p[0], p[1], p[2])))
            .collect();
        Simplex::from_points(&pts).unwrap()
    }

    #[test]
    fn segment_regions() {
        let mut solver = VoronoiSimplexSolver;

        let mut s = simplex(&[[-1.0, 1.0, 0.0], [1.0, 1.0, 0.0]]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::new(0.0, 1.0, 0.0));
        assert_eq!(s.dimension(), 2);
        assert_relative_eq!(s.weight(0), 0.5);

        let mut s = simplex(&[[1.0, 1.0, 0.0], [2.0, 1.0, 0.0]]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::new(1.0, 1.0, 0.0));
        assert_eq!(s.dimension(), 1);
        assert!(s.point(0).is_some());

        // Zero-length segments keep their first vertex.
        let mut s = simplex(&[[1.0, 1.0, 0.0], [1.0, 1.0, 0.0]]);
        let _ = solver.project_origin_and_reduce(&mut s);
        assert_eq!(s.dimension(), 1);
        assert!(s.point(0).is_some());
    }

    #[test]
    fn triangle_regions() {
        let mut solver = VoronoiSimplexSolver;

        // Face region.
        let mut s = simplex(&[[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [0.0, 1.0, 1.0]]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::new(0.0, 0.0, 1.0), epsilon = 1.0e-6);
        assert_eq!(s.dimension(), 3);
        assert_relative_eq!(s.projection(), proj, epsilon = 1.0e-6);

        // Edge region.
        let mut s = simplex(&[[-1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 3.0, 0.0]]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::new(0.0, 1.0, 0.0), epsilon = 1.0e-6);
        assert_eq!(s.dimension(), 2);
        assert!(s.point(2).is_none());

        // Collinear points are handled as their closest edge.
        let mut s = simplex(&[[-1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::new(0.0, 1.0, 0.0), epsilon = 1.0e-6);
        assert!(s.dimension() <= 2);
    }

    #[test]
    fn tetrahedron_regions() {
        let mut solver = VoronoiSimplexSolver;

        // Origin inside.
        let mut s = simplex(&[
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [0.0, 1.0, -1.0],
            [0.0, 0.0, 1.0],
        ]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::origin());
        assert_eq!(s.dimension(), 4);
        let total: Real = (0..4).map(|i| s.weight(i)).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(s.projection(), Point::origin(), epsilon = 1.0e-5);

        // Origin beyond the face opposite to the last vertex.
        let mut s = simplex(&[
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 3.0],
        ]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::new(0.0, 0.0, 1.0), epsilon = 1.0e-6);
        assert_eq!(s.dimension(), 3);
        assert!(s.point(3).is_none());

        // Flat tetrahedra are handled as their closest face.
        let mut s = simplex(&[
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0],
        ]);
        let proj = solver.project_origin_and_reduce(&mut s);
        assert_relative_eq!(proj, Point::new(0.0, 0.0, 1.0), epsilon = 1.0e-5);
        assert!(s.dimension() <= 3);
    }
}

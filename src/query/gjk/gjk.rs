//! The Gilbert-Johnson-Keerthi distance algorithm.
//!
//! GJK works on the Minkowski difference of two convex shapes, also called the
//! Configuration-Space Obstacle (CSO). The distance between the shapes is the distance between
//! the origin and the CSO. GJK refines a simplex of CSO points, queried from the support
//! functions of both shapes, until the point of the simplex closest to the origin is close
//! enough to the point of the CSO closest to the origin.
//!
//! GJK only certifies that two shapes do not intersect: when they do, it reports an
//! intersection but no penetration depth.

use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use crate::query::gjk::{CsoPoint, Simplex, SimplexSolver, VoronoiSimplexSolver};
use crate::query::GjkError;
use crate::shape::SupportMap;
use na::{ComplexField, Unit};
use num::Bounded;

/// The absolute tolerance used by the GJK algorithm by default.
pub fn eps_tol() -> Real {
    DEFAULT_EPSILON * 10.0
}

/// Tolerances and iteration cap of the GJK algorithm.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GjkParams {
    /// Distance under which both shapes are considered touching.
    pub abs_tol: Real,
    /// Convergence is reached once the gap between the upper and lower bounds of the distance
    /// is smaller than `rel_tol` times the upper bound.
    pub rel_tol: Real,
    /// The algorithm stops if an iteration decreases the distance estimate by less than this.
    pub stagnation_tol: Real,
    /// The maximum number of simplex expansions.
    pub max_iterations: usize,
}

impl Default for GjkParams {
    fn default() -> Self {
        let abs_tol = eps_tol();
        Self {
            abs_tol,
            rel_tol: ComplexField::sqrt(abs_tol),
            stagnation_tol: DEFAULT_EPSILON,
            max_iterations: 100,
        }
    }
}

/// How the GJK algorithm stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum GjkStatus {
    /// The distance found is within tolerance of the exact distance, or the shapes intersect.
    Converged,
    /// The iteration cap was hit. The output is the best estimate found.
    MaxIterationsReached,
    /// An iteration failed to improve the distance estimate. The output is the best estimate
    /// found.
    Stagnated,
}

/// The result of the GJK algorithm.
///
/// Points are expressed in the frame of the first shape.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GjkOutput {
    /// The closest point on the first shape.
    pub point1: Point<Real>,
    /// The closest point on the second shape.
    pub point2: Point<Real>,
    /// The distance between the shapes, zero if they intersect.
    pub distance: Real,
    /// The number of simplex expansions performed.
    pub iterations: usize,
    /// How the algorithm stopped.
    pub status: GjkStatus,
    /// Whether the shapes were found touching or intersecting.
    pub intersecting: bool,
}

impl GjkOutput {
    fn new(
        simplex: &Simplex,
        distance: Real,
        iterations: usize,
        status: GjkStatus,
        intersecting: bool,
    ) -> Self {
        let (point1, point2) = simplex.closest_points();
        GjkOutput {
            point1,
            point2,
            distance: if intersecting { 0.0 } else { distance },
            iterations,
            status,
            intersecting,
        }
    }
}

/// Computes the closest points between two convex shapes.
///
/// `pos12` is the position of `g2` relative to `g1`, and `simplex` holds the initial CSO points,
/// typically a single support point. The simplex is left in its final state.
///
/// Fails only if `simplex` is empty. Not converging within `params` is reported by
/// [`GjkOutput::status`].
pub fn closest_points<G1, G2, S>(
    pos12: &Isometry<Real>,
    g1: &G1,
    g2: &G2,
    simplex: &mut Simplex,
    solver: &mut S,
    params: &GjkParams,
) -> Result<GjkOutput, GjkError>
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
    S: SimplexSolver,
{
    closest_points_with_observer(pos12, g1, g2, simplex, solver, params, |_, _| {})
}

/// Same as [`closest_points`], but calls `observer` with the iteration number and the distance
/// between the origin and the simplex, every time the simplex is reduced.
///
/// Every estimate is observed, including the last one of a stagnating run which is rejected
/// for not improving on its predecessor. On convex shapes, estimates never increase.
pub fn closest_points_with_observer<G1, G2, S>(
    pos12: &Isometry<Real>,
    g1: &G1,
    g2: &G2,
    simplex: &mut Simplex,
    solver: &mut S,
    params: &GjkParams,
    mut observer: impl FnMut(usize, Real),
) -> Result<GjkOutput, GjkError>
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
    S: SimplexSolver,
{
    if simplex.dimension() == 0 {
        return Err(GjkError::EmptySimplex);
    }

    let mut proj = solver.project_origin_and_reduce(simplex);
    let mut best = *simplex;
    let mut max_bound = Real::max_value();
    let mut iterations = 0;

    loop {
        let Some((dir, dist)) = Unit::try_new_and_get(-proj.coords, params.abs_tol) else {
            // The origin is on the simplex.
            return Ok(GjkOutput::new(simplex, 0.0, iterations, GjkStatus::Converged, true));
        };

        observer(iterations, dist);

        if dist > max_bound - params.stagnation_tol {
            // No progress: keep whichever estimate is the best.
            if dist < max_bound {
                best = *simplex;
                max_bound = dist;
            }
            return Ok(finish(&best, max_bound, iterations, GjkStatus::Stagnated));
        }

        max_bound = dist;
        best = *simplex;
        log::trace!("GJK iteration {}: distance estimate {}.", iterations, dist);

        if iterations >= params.max_iterations {
            return Ok(finish(&best, max_bound, iterations, GjkStatus::MaxIterationsReached));
        }

        let cso_point = CsoPoint::from_shapes_toward(pos12, g1, g2, &dir);
        let min_bound = -dir.dot(&cso_point.point.coords);

        if max_bound - min_bound <= params.rel_tol * max_bound {
            return Ok(finish(&best, max_bound, iterations, GjkStatus::Converged));
        }

        if !simplex.add_point(cso_point) {
            // The support point is already part of the simplex.
            return Ok(finish(&best, max_bound, iterations, GjkStatus::Converged));
        }

        iterations += 1;
        proj = solver.project_origin_and_reduce(simplex);

        if simplex.dimension() == 4 {
            if min_bound >= params.abs_tol {
                // The origin was certified outside, the enclosing simplex is a numerical artifact.
                return Ok(finish(&best, max_bound, iterations, GjkStatus::Converged));
            }

            return Ok(GjkOutput::new(simplex, 0.0, iterations, GjkStatus::Converged, true));
        }
    }
}

fn finish(best: &Simplex, distance: Real, iterations: usize, status: GjkStatus) -> GjkOutput {
    if status != GjkStatus::Converged {
        log::debug!(
            "GJK stopped without converging ({:?}) after {} iterations, distance estimate {}.",
            status,
            iterations,
            distance
        );
    }

    GjkOutput::new(best, distance, iterations, status, false)
}

/// Computes the closest points between two convex shapes placed in world space.
///
/// The simplex is seeded with the support point of the CSO along the vector from the first to
/// the second shape position, and the returned points are expressed in world space.
pub fn closest_points_between<G1, G2>(
    pos1: &Isometry<Real>,
    g1: &G1,
    pos2: &Isometry<Real>,
    g2: &G2,
    params: &GjkParams,
) -> GjkOutput
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
{
    let pos12 = pos1.inv_mul(pos2);
    let mut output = local_closest_points(&pos12, g1, g2, params);
    output.point1 = pos1 * output.point1;
    output.point2 = pos1 * output.point2;
    output
}

/// Tests whether two convex shapes touch or intersect.
///
/// `pos12` is the position of `g2` relative to `g1`.
pub fn intersection_test<G1, G2>(
    pos12: &Isometry<Real>,
    g1: &G1,
    g2: &G2,
    params: &GjkParams,
) -> bool
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
{
    local_closest_points(pos12, g1, g2, params).intersecting
}

fn local_closest_points<G1, G2>(
    pos12: &Isometry<Real>,
    g1: &G1,
    g2: &G2,
    params: &GjkParams,
) -> GjkOutput
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
{
    let seed_dir = if pos12.translation.vector == Vector::zeros() {
        Vector::x()
    } else {
        pos12.translation.vector
    };
    let mut simplex = Simplex::from_point(CsoPoint::from_shapes(pos12, g1, g2, &seed_dir));
    let mut solver = VoronoiSimplexSolver;

    match closest_points(pos12, g1, g2, &mut simplex, &mut solver, params) {
        Ok(output) => output,
        // A seeded simplex is never empty.
        Err(_) => GjkOutput {
            point1: Point::origin(),
            point2: Point::origin(),
            distance: Real::max_value(),
            iterations: 0,
            status: GjkStatus::Stagnated,
            intersecting: false,
        },
    }
}

#[cfg(test)]
mod test {
    use super::{closest_points, closest_points_with_observer, GjkParams, GjkStatus};
    use crate::math::{Isometry, Point, Real, Vector};
    use crate::query::gjk::{CsoPoint, Simplex, SimplexSolver, VoronoiSimplexSolver};
    use crate::query::GjkError;
    use crate::shape::{Ball, Cuboid};

    #[test]
    fn empty_simplex_is_an_error() {
        let cuboid = Cuboid::new(Vector::repeat(1.0));
        let result = closest_points(
            &Isometry::identity(),
            &cuboid,
            &cuboid,
            &mut Simplex::new(),
            &mut VoronoiSimplexSolver,
            &GjkParams::default(),
        );
        assert_eq!(result, Err(GjkError::EmptySimplex));
    }

    #[test]
    fn balls_from_a_poor_seed() {
        let ball = Ball::new(1.0);
        let pos12 = Isometry::translation(3.0, 4.0, 0.0);
        // Seeding along an arbitrary direction still converges.
        let seed = CsoPoint::from_shapes(&pos12, &ball, &ball, &Vector::new(0.0, 0.0, 1.0));
        let mut simplex = Simplex::from_point(seed);

        let output = closest_points(
            &pos12,
            &ball,
            &ball,
            &mut simplex,
            &mut VoronoiSimplexSolver,
            &GjkParams::default(),
        )
        .unwrap();

        assert_eq!(output.status, GjkStatus::Converged);
        assert!(!output.intersecting);
        assert_relative_eq!(output.distance, 3.0, epsilon = 1.0e-2);
        assert_relative_eq!(output.point1, Point::new(0.6, 0.8, 0.0), epsilon = 5.0e-2);
        assert_relative_eq!(output.point2, Point::new(2.4, 3.2, 0.0), epsilon = 5.0e-2);
    }

    #[test]
    fn max_iterations_returns_best_estimate() {
        let ball = Ball::new(1.0);
        let pos12 = Isometry::translation(3.0, 4.0, 0.0);
        let seed = CsoPoint::from_shapes(&pos12, &ball, &ball, &Vector::new(0.0, 0.0, 1.0));
        let params = GjkParams {
            max_iterations: 0,
            ..GjkParams::default()
        };

        let output = closest_points(
            &pos12,
            &ball,
            &ball,
            &mut Simplex::from_point(seed),
            &mut VoronoiSimplexSolver,
            &params,
        )
        .unwrap();

        assert_eq!(output.status, GjkStatus::MaxIterationsReached);
        assert_eq!(output.iterations, 0);
        assert!(output.distance >= 3.0);
    }

    /// Projects correctly, then moves every later projection away from the origin.
    struct Receding {
        calls: usize,
    }

    impl SimplexSolver for Receding {
        fn project_origin_and_reduce(&mut self, simplex: &mut Simplex) -> Point<Real> {
            let proj = VoronoiSimplexSolver.project_origin_and_reduce(simplex);
            self.calls += 1;
            proj * self.calls as Real
        }
    }

    #[test]
    fn increasing_estimate_is_observed_and_stagnates() {
        let ball = Ball::new(1.0);
        let pos12 = Isometry::translation(3.0, 4.0, 0.0);
        let seed = CsoPoint::from_shapes(&pos12, &ball, &ball, &Vector::new(0.0, 0.0, 1.0));
        let mut estimates = vec![];

        let output = closest_points_with_observer(
            &pos12,
            &ball,
            &ball,
            &mut Simplex::from_point(seed),
            &mut Receding { calls: 0 },
            &GjkParams::default(),
            |_, dist| estimates.push(dist),
        )
        .unwrap();

        assert_eq!(estimates.len(), 2);
        assert!(estimates[1] > estimates[0]);
        assert_eq!(output.status, GjkStatus::Stagnated);
        assert_eq!(output.distance, estimates[0]);
    }
}

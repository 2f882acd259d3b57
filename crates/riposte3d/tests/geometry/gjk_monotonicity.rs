use na::Unit;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use riposte3d::math::{Isometry, Point, Real, Vector};
use riposte3d::query::gjk::{self, CsoPoint, GjkParams, GjkStatus, Simplex, VoronoiSimplexSolver};
use riposte3d::shape::{Ball, ConvexPointCloud, Cylinder, Ellipsoid, SupportMap};

fn random_cloud(rng: &mut StdRng, len: usize) -> ConvexPointCloud {
    let points = (0..len)
        .map(|_| {
            let dir = Vector::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            Point::from(dir.normalize() * rng.gen_range(0.2..1.0))
        })
        .collect();
    ConvexPointCloud::new(points).unwrap()
}

fn random_pos(rng: &mut StdRng, dist: Real) -> Isometry<Real> {
    let dir = Unit::new_normalize(Vector::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    ));
    let axisangle = Vector::new(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-3.0..3.0),
    );
    Isometry::new(dir.into_inner() * dist, axisangle)
}

/// Floating-point slack allowed between two successive estimates.
const ROUNDING: Real = 1.0e-5;

fn assert_never_increase(estimates: &[Real]) {
    for pair in estimates.windows(2) {
        assert!(pair[1] <= pair[0] + ROUNDING, "estimates increased: {:?}", estimates);
    }
}

/// Runs GJK from a seed along the x axis, and returns every distance estimate it computed.
fn run_observed<G1: SupportMap, G2: SupportMap>(
    pos12: &Isometry<Real>,
    g1: &G1,
    g2: &G2,
) -> (gjk::GjkOutput, Vec<Real>) {
    let seed = CsoPoint::from_shapes(pos12, g1, g2, &Vector::x());
    let mut simplex = Simplex::from_point(seed);
    let mut estimates = vec![];
    let output = gjk::closest_points_with_observer(
        pos12,
        g1,
        g2,
        &mut simplex,
        &mut VoronoiSimplexSolver,
        &GjkParams::default(),
        |_, dist| estimates.push(dist),
    )
    .unwrap();

    (output, estimates)
}

#[test]
fn point_cloud_distance_estimates_never_increase() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let cloud1 = random_cloud(&mut rng, 20);
        let cloud2 = random_cloud(&mut rng, 20);
        let pos12 = random_pos(&mut rng, 5.0);
        let (output, estimates) = run_observed(&pos12, &cloud1, &cloud2);

        assert!(!estimates.is_empty());
        assert_never_increase(&estimates);
        assert_eq!(output.status, GjkStatus::Converged);

        assert!(!output.intersecting);
        assert_relative_eq!(output.distance, estimates.iter().copied().fold(Real::MAX, Real::min));

        // The distance between the hulls is at most the distance between any two vertices.
        let vertex_dist = cloud1
            .points()
            .iter()
            .flat_map(|p1| cloud2.points().iter().map(move |p2| (p1, p2)))
            .map(|(p1, p2)| na::distance(p1, &(pos12 * p2)))
            .fold(Real::MAX, Real::min);
        let params = GjkParams::default();
        assert!(output.distance <= vertex_dist * (1.0 + params.rel_tol));
        assert!(output.distance >= 3.0 - 1.0e-4);
    }
}

#[test]
fn smooth_shapes_distance_estimates_never_increase() {
    let mut rng = StdRng::seed_from_u64(7);
    let ellipsoid = Ellipsoid::new(Vector::new(1.0, 0.5, 0.8));
    let cylinder = Cylinder::new(0.9, 0.6);

    for _ in 0..100 {
        let pos12 = random_pos(&mut rng, 4.0);
        let (output, estimates) = run_observed(&pos12, &ellipsoid, &cylinder);

        assert_never_increase(&estimates);
        assert_ne!(output.status, GjkStatus::MaxIterationsReached);
        assert!(!output.intersecting);
        assert!(output.distance > 0.0);
    }
}

#[test]
fn ball_distance_matches_analytic_value() {
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..100 {
        let r1 = rng.gen_range(0.1..1.5);
        let r2 = rng.gen_range(0.1..1.5);
        let dist = rng.gen_range(3.5..10.0);
        let pos12 = random_pos(&mut rng, dist);
        let (output, _) = run_observed(&pos12, &Ball::new(r1), &Ball::new(r2));

        assert_relative_eq!(output.distance, dist - r1 - r2, epsilon = 2.0e-2);
    }
}

use riposte3d::math::{Isometry, Point, Vector};
use riposte3d::query::gjk::{self, GjkParams, GjkStatus};
use riposte3d::shape::Cuboid;

fn unit_cube() -> Cuboid {
    Cuboid::new(Vector::repeat(1.0))
}

#[test]
fn touching_cuboids() {
    let cube = unit_cube();
    let output = gjk::closest_points_between(
        &Isometry::identity(),
        &cube,
        &Isometry::translation(2.0, 0.0, 0.0),
        &cube,
        &GjkParams::default(),
    );

    assert!(output.intersecting);
    assert_eq!(output.status, GjkStatus::Converged);
    assert_relative_eq!(output.distance, 0.0, epsilon = GjkParams::default().abs_tol);
    assert_relative_eq!(output.point1, Point::new(1.0, 0.0, 0.0), epsilon = 1.0e-5);
    assert_relative_eq!(output.point2, Point::new(1.0, 0.0, 0.0), epsilon = 1.0e-5);
}

#[test]
fn disjoint_cuboids() {
    let cube = unit_cube();
    let output = gjk::closest_points_between(
        &Isometry::identity(),
        &cube,
        &Isometry::translation(5.0, 0.0, 0.0),
        &cube,
        &GjkParams::default(),
    );

    assert!(!output.intersecting);
    assert_eq!(output.status, GjkStatus::Converged);
    assert_relative_eq!(output.distance, 3.0, epsilon = 1.0e-4);
    assert_relative_eq!(output.point1.x, 1.0, epsilon = 1.0e-4);
    assert_relative_eq!(output.point2.x, 4.0, epsilon = 1.0e-4);
}

#[test]
fn disjoint_cuboids_in_world_space() {
    let cube = unit_cube();
    let pos1 = Isometry::translation(10.0, -3.0, 2.0);
    let pos2 = pos1 * Isometry::translation(0.0, 0.0, 4.5);
    let output = gjk::closest_points_between(&pos1, &cube, &pos2, &cube, &GjkParams::default());

    assert_relative_eq!(output.distance, 2.5, epsilon = 1.0e-4);
    assert_relative_eq!(output.point1.z, 3.0, epsilon = 1.0e-4);
    assert_relative_eq!(output.point2.z, 5.5, epsilon = 1.0e-4);
}

#[test]
fn rotated_cuboid_corner() {
    // The second cube points one of its edges toward the first one.
    let cube = unit_cube();
    let pos12 = Isometry::new(
        Vector::new(4.0, 0.0, 0.0),
        Vector::z() * std::f32::consts::FRAC_PI_4,
    );
    let output = gjk::closest_points_between(
        &Isometry::identity(),
        &cube,
        &pos12,
        &cube,
        &GjkParams::default(),
    );

    assert_relative_eq!(output.distance, 3.0 - 2.0f32.sqrt(), epsilon = 1.0e-3);
}

#[test]
fn penetrating_cuboids() {
    let cube = unit_cube();
    assert!(gjk::intersection_test(
        &Isometry::translation(0.5, 0.3, -0.2),
        &cube,
        &cube,
        &GjkParams::default()
    ));
    assert!(!gjk::intersection_test(
        &Isometry::translation(0.5, 2.3, -0.2),
        &cube,
        &cube,
        &GjkParams::default()
    ));
}

use riposte3d::math::{Isometry, Real, Vector};
use riposte3d::partitioning::{AabbOverlap, CollisionQuery, TopDownBuilder};
use riposte3d::query::ConvexOverlapReport;
use riposte3d::shape::{Ball, Cuboid, Placed};

fn row_of_balls(count: usize, spacing: Real) -> Vec<Placed<Ball>> {
    (0..count)
        .map(|i| {
            Placed::new(
                Isometry::translation(i as Real * spacing, 0.0, 0.0),
                Ball::new(0.5),
            )
        })
        .collect()
}

#[test]
fn convex_report_keeps_only_touching_pairs() {
    let balls = row_of_balls(8, 2.0);
    let boxes = vec![
        Placed::new(Isometry::translation(4.0, 0.9, 0.0), Cuboid::new(Vector::repeat(0.5))),
        Placed::new(Isometry::translation(9.0, 0.0, 0.0), Cuboid::new(Vector::repeat(0.25))),
        Placed::new(Isometry::translation(50.0, 0.0, 0.0), Cuboid::new(Vector::repeat(1.0))),
    ];

    let bvh_balls = TopDownBuilder::median().build(&balls).unwrap();
    let bvh_boxes = TopDownBuilder::median().build(&boxes).unwrap();

    // The balls are moved up by 0.2: ball 2 reaches the first box.
    let pos_ab = Isometry::translation(0.0, 0.2, 0.0);
    let mut report = ConvexOverlapReport::new(&balls, &boxes, pos_ab);
    let _ = CollisionQuery::<AabbOverlap>::default().query(&pos_ab, &bvh_balls, &bvh_boxes, &mut report);

    let mut pairs = report.pairs;
    pairs.sort();
    assert_eq!(pairs, vec![(2, 0)]);
}

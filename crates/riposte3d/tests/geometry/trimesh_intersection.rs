use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use riposte3d::math::{Isometry, Point, Real, Vector};
use riposte3d::partitioning::{
    AabbOverlap, BottomUpBuilder, Bvh, CollisionQuery, ConstructionGraph, GreedyMergePolicy,
    ObbSatOverlap, OverlapTest, TopDownBuilder,
};
use riposte3d::query::{sat, TriangleOverlapReport};
use riposte3d::shape::Triangle;

fn quad(origin: [Real; 2]) -> Vec<Triangle> {
    let [x, y] = origin;
    vec![
        Triangle::new(
            Point::new(x, y, 0.0),
            Point::new(x + 1.0, y, 0.0),
            Point::new(x, y + 1.0, 0.0),
        ),
        Triangle::new(
            Point::new(x + 1.0, y, 0.0),
            Point::new(x + 1.0, y + 1.0, 0.0),
            Point::new(x, y + 1.0, 0.0),
        ),
    ]
}

fn intersecting_pairs<O: OverlapTest + Default>(
    tris_a: &[Triangle],
    tris_b: &[Triangle],
    pos_ab: &Isometry<Real>,
) -> Vec<(u32, u32)> {
    let bvh_a = TopDownBuilder::median().build(tris_a).unwrap();
    let bvh_b = TopDownBuilder::median().build(tris_b).unwrap();
    let mut report = TriangleOverlapReport::new(tris_a, tris_b, *pos_ab);
    let mut query = CollisionQuery::<O>::default();
    let _ = query.query(pos_ab, &bvh_a, &bvh_b, &mut report);

    let mut pairs = report.pairs;
    pairs.sort();
    pairs
}

fn both_overlap_tests(tris_a: &[Triangle], tris_b: &[Triangle], pos_ab: &Isometry<Real>) -> Vec<(u32, u32)> {
    let aabb = intersecting_pairs::<AabbOverlap>(tris_a, tris_b, pos_ab);
    let obb = intersecting_pairs::<ObbSatOverlap>(tris_a, tris_b, pos_ab);
    assert_eq!(aabb, obb);
    aabb
}

#[test]
fn meshes_sharing_a_vertex_do_not_intersect() {
    let a = quad([0.0, 0.0]);
    let mut b = quad([1.0, 1.0]);
    // A triangle leaving the plane from the shared corner.
    b.push(Triangle::new(
        Point::new(1.0, 1.0, 0.0),
        Point::new(2.0, 1.0, 1.0),
        Point::new(1.0, 2.0, 1.0),
    ));

    assert!(both_overlap_tests(&a, &b, &Isometry::identity()).is_empty());
}

#[test]
fn meshes_sharing_an_edge_do_not_intersect() {
    let a = quad([0.0, 0.0]);
    let b = quad([1.0, 0.0]);

    assert!(both_overlap_tests(&a, &b, &Isometry::identity()).is_empty());
}

#[test]
fn piercing_triangle_is_reported_exactly() {
    let a = quad([0.0, 0.0]);
    let b = vec![
        Triangle::new(
            Point::new(5.0, 5.0, 0.0),
            Point::new(6.0, 5.0, 0.0),
            Point::new(5.0, 6.0, 0.0),
        ),
        Triangle::new(
            Point::new(0.25, 0.2, -1.0),
            Point::new(0.25, 0.2, 1.0),
            Point::new(0.3, 0.15, 1.0),
        ),
    ];

    assert_eq!(both_overlap_tests(&a, &b, &Isometry::identity()), vec![(0, 1)]);

    // Same configuration, with mesh `a` described in a moved frame.
    for pos_ab in [
        Isometry::translation(3.0, -2.0, 7.0),
        Isometry::new(Vector::new(0.5, 1.0, -0.3), Vector::new(0.2, 1.3, -0.7)),
    ] {
        let local_a: Vec<_> = a.iter().map(|tri| tri.transformed(&pos_ab.inverse())).collect();
        assert_eq!(both_overlap_tests(&local_a, &b, &pos_ab), vec![(0, 1)]);
    }
}

fn random_soup(rng: &mut StdRng, len: usize) -> Vec<Triangle> {
    let mut point = |center: &Vector<Real>| {
        Point::from(
            center
                + Vector::new(
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.5..0.5),
                ),
        )
    };

    let mut result = vec![];
    for i in 0..len {
        let center = Vector::new((i % 5) as Real, (i / 5 % 5) as Real, (i / 25) as Real) * 0.7;
        let tri = Triangle::new(point(&center), point(&center), point(&center));
        result.push(tri);
    }
    result
}

#[test]
fn query_finds_every_intersecting_pair() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..10 {
        let a = random_soup(&mut rng, 40);
        let b = random_soup(&mut rng, 40);
        let pos_ab = Isometry::new(
            Vector::new(
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
            ),
            Vector::new(
                rng.gen_range(-0.3..0.3),
                rng.gen_range(-0.3..0.3),
                rng.gen_range(-0.3..0.3),
            ),
        );

        let mut expected = vec![];
        for (ia, tri_a) in a.iter().enumerate() {
            let tri_a = tri_a.transformed(&pos_ab);
            for (ib, tri_b) in b.iter().enumerate() {
                if sat::triangle_triangle_intersect(&tri_a, tri_b, Real::EPSILON * 100.0) {
                    expected.push((ia as u32, ib as u32));
                }
            }
        }

        assert!(!expected.is_empty());
        assert_eq!(both_overlap_tests(&a, &b, &pos_ab), expected);
    }
}

#[test]
fn bottom_up_hierarchies_answer_the_same_queries() {
    // Two 3x3 grids of quads, the second one tilted through the first.
    let mut vertices = vec![];
    let mut indices = vec![];
    for i in 0..4u32 {
        for j in 0..4u32 {
            vertices.push(Point::new(i as Real, j as Real, 0.0));
        }
    }
    for i in 0..3u32 {
        for j in 0..3u32 {
            let v = i * 4 + j;
            indices.push([v, v + 4, v + 1]);
            indices.push([v + 4, v + 5, v + 1]);
        }
    }
    let tris: Vec<_> = indices
        .iter()
        .map(|idx| Triangle::from_indexed(&vertices, *idx))
        .collect();
    let pos_ab = Isometry::new(Vector::new(0.3, 0.2, 1.0), Vector::new(0.0, 0.9, 0.0));

    let mut graph = ConstructionGraph::from_triangles(&indices);
    let mut bottom_up = Bvh::new();
    let _ = BottomUpBuilder::<GreedyMergePolicy>::default()
        .run(&mut graph, &tris, &mut bottom_up)
        .unwrap();
    bottom_up.assert_well_formed();

    let mut report = TriangleOverlapReport::new(&tris, &tris, pos_ab);
    let _ = CollisionQuery::<ObbSatOverlap>::default().query(&pos_ab, &bottom_up, &bottom_up, &mut report);
    let mut pairs = report.pairs;
    pairs.sort();

    assert!(!pairs.is_empty());
    assert_eq!(pairs, both_overlap_tests(&tris, &tris, &pos_ab));
}

use riposte3d::bounding_volume::Aabb;
use riposte3d::math::{Point, Real, Vector};
use riposte3d::partitioning::{
    BottomUpBuilder, Bvh, BvhError, ConstructionGraph, GreedyMergePolicy, MergeCost,
};
use riposte3d::shape::Tetrahedron;

fn voxel_aabbs(coords: &[[i32; 3]]) -> Vec<Aabb> {
    coords
        .iter()
        .map(|c| {
            let center = Point::new(c[0] as Real, c[1] as Real, c[2] as Real);
            Aabb::from_half_extents(center, Vector::repeat(0.5))
        })
        .collect()
}

#[test]
fn voxel_grid_collapses_to_a_single_root() {
    let mut coords = vec![];
    for i in 0..4 {
        for j in 0..3 {
            for k in 0..2 {
                coords.push([i, j, k]);
            }
        }
    }
    let aabbs = voxel_aabbs(&coords);

    for policy in [
        GreedyMergePolicy::default(),
        GreedyMergePolicy::new(8, MergeCost::Volume),
    ] {
        let mut graph = ConstructionGraph::from_voxels(&coords);
        let mut bvh = Bvh::new();
        let stats = BottomUpBuilder::new(policy)
            .run(&mut graph, &aabbs, &mut bvh)
            .unwrap();

        assert_eq!(stats.collapses, coords.len() - 1);
        assert_eq!(bvh.leaf_count(), coords.len());
        bvh.assert_well_formed();
        assert!(bvh.check_containment(&aabbs));

        let root = bvh.root().unwrap();
        assert_eq!(
            *bvh.node(root).volume(),
            Aabb::new(Point::new(-0.5, -0.5, -0.5), Point::new(3.5, 2.5, 1.5))
        );
    }
}

#[test]
fn separate_voxel_islands_need_bridging() {
    let coords = [[0, 0, 0], [1, 0, 0], [10, 0, 0], [11, 0, 0], [30, 5, 0]];
    let aabbs = voxel_aabbs(&coords);
    let mut graph = ConstructionGraph::from_voxels(&coords);
    let mut bvh = Bvh::new();

    let err = BottomUpBuilder::<GreedyMergePolicy>::default()
        .run(&mut graph, &aabbs, &mut bvh)
        .unwrap_err();
    assert_eq!(err, BvhError::Disconnected { components: 3 });
    assert_eq!(graph.node_count(), coords.len());
    assert!(bvh.is_empty());

    assert_eq!(graph.connect_components(&aabbs), 2);
    let stats = BottomUpBuilder::<GreedyMergePolicy>::default()
        .run(&mut graph, &aabbs, &mut bvh)
        .unwrap();

    assert_eq!(stats.collapses, coords.len() - 1);
    bvh.assert_well_formed();
    assert!(bvh.leaf_of_each_primitive(coords.len()).is_some());
}

#[test]
fn tetrahedral_mesh_collapses_to_a_single_root() {
    // A cube split into 6 tetrahedra around its main diagonal.
    let vertices: Vec<Point<Real>> = (0..8)
        .map(|i| Point::new((i & 1) as Real, ((i >> 1) & 1) as Real, ((i >> 2) & 1) as Real))
        .collect();
    let indices = [
        [0, 1, 3, 7],
        [0, 1, 5, 7],
        [0, 2, 3, 7],
        [0, 2, 6, 7],
        [0, 4, 5, 7],
        [0, 4, 6, 7],
    ];
    let tets: Vec<_> = indices
        .iter()
        .map(|t: &[u32; 4]| {
            Tetrahedron::new(
                vertices[t[0] as usize],
                vertices[t[1] as usize],
                vertices[t[2] as usize],
                vertices[t[3] as usize],
            )
        })
        .collect();

    let mut graph = ConstructionGraph::from_tetrahedra(&indices);
    assert_eq!(graph.connected_components().len(), 1);

    let mut bvh = Bvh::new();
    let stats = BottomUpBuilder::<GreedyMergePolicy>::default()
        .run(&mut graph, &tets, &mut bvh)
        .unwrap();

    assert_eq!(stats.collapses, tets.len() - 1);
    bvh.assert_well_formed();
    assert!(bvh.check_containment(&tets));
}

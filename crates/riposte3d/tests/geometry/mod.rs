extern crate nalgebra as na;
#[macro_use]
extern crate approx;

mod bottom_up_graphs;
mod convex_overlap;
mod gjk_cuboid_cuboid;
mod gjk_monotonicity;
mod trimesh_intersection;

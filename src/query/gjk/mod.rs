//! The GJK algorithm for distance computation.

pub use self::cso_point::CsoPoint;
pub use self::gjk::{
    closest_points, closest_points_between, closest_points_with_observer, eps_tol,
    intersection_test, GjkOutput, GjkParams, GjkStatus,
};
pub use self::simplex::{Simplex, SimplexMask};
pub use self::voronoi_simplex::{SimplexSolver, VoronoiSimplexSolver};

mod cso_point;
mod gjk;
mod simplex;
mod voronoi_simplex;

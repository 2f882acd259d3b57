//! Application of the Separating Axis Theorem (SAT) for collision detection.
//!
//! Two convex shapes do not intersect if and only if there exists an axis onto which their
//! projections do not overlap. For polyhedra, a finite set of candidate axes is enough:
//! the face normals of both shapes, and the cross products of their edge directions.
//!
//! Every function here returns a separation: positive if the shapes are disjoint along the
//! returned axis, negative if they overlap along every tested axis.

pub use self::sat_cuboid_cuboid::*;
pub use self::sat_triangle_triangle::*;

mod sat_cuboid_cuboid;
mod sat_triangle_triangle;

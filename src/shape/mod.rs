//! Shapes supported by this crate.
//!
//! Shapes only carry the geometric queries the collision core needs: an AABB and a centroid
//! for hierarchy construction ([`Primitive`]), and a support function for GJK
//! ([`SupportMap`]).

pub use self::ball::Ball;
pub use self::convex_point_cloud::ConvexPointCloud;
pub use self::cuboid::Cuboid;
pub use self::cylinder::Cylinder;
pub use self::ellipsoid::Ellipsoid;
pub use self::primitive::{Placed, Primitive};
pub use self::support_map::SupportMap;
pub use self::tetrahedron::Tetrahedron;
pub use self::triangle::Triangle;

mod ball;
mod convex_point_cloud;
mod cuboid;
mod cylinder;
mod ellipsoid;
mod primitive;
mod support_map;
mod tetrahedron;
mod triangle;

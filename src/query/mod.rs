//! Non-persistent geometric queries.
//!
//! * [`gjk`] computes the closest points between two convex shapes given by their support
//!   functions.
//! * [`sat`] holds separating-axis tests between boxes and between triangles.
//! * [`leaf_pairs`] holds the narrow-phase reports to plug into a
//!   [`CollisionQuery`](crate::partitioning::CollisionQuery).

pub use self::error::GjkError;
pub use self::leaf_pairs::{ConvexOverlapReport, TriangleOverlapReport};

mod error;
pub mod gjk;
pub mod leaf_pairs;
pub mod sat;

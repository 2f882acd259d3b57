//! Various unsorted geometrical and logical operators.

pub use self::isometry_ops::IsometryOps;
pub use self::point_cloud_support_point::{
    point_cloud_support_point, point_cloud_support_point_id,
};
pub use self::sorted_pair::SortedPair;

pub mod hashmap;
pub mod hashset;
mod isometry_ops;
mod point_cloud_support_point;
mod sorted_pair;

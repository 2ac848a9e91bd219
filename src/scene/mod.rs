//! Skeleton and pose module
//!
//! - [`Skeleton`]: bone arena implementing the [`BoneHierarchy`] query surface
//! - [`Pose`]: per-bone transforms with a sparse bone-to-slot table
//! - [`ScaledTransform`]: translation, rotation and scale of one bone
//! - `transform_system`: local/global conversion walkers

pub mod pose;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use pose::Pose;
pub use skeleton::{Bone, BoneHierarchy, BoneId, Skeleton};
pub use transform::ScaledTransform;
pub use transform_system::{LevelOrderBatches, build_level_order_batches};

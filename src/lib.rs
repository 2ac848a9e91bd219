#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod errors;
pub mod expression;
pub mod scene;
pub mod settings;

pub use animation::{
    Animation, AnimationFlags, Channel, ChannelKey, ChannelType, ChannelValue, ChannelValues, ChannelView,
    InterpolationMode, TargetPath, ValueType,
};
pub use errors::{AnimationError, Result};
pub use expression::{ExpressionError, ValueExpression};
pub use scene::{BoneHierarchy, BoneId, Pose, ScaledTransform, Skeleton};
pub use settings::SplineBoundary;

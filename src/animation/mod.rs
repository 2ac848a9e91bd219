pub mod binding;
pub mod channel;
pub mod clip;
pub mod tracks;
pub mod value_type;
pub mod values;

pub use binding::{TargetPath, TransformComponent};
pub use channel::{BlendFn, Channel, ChannelView};
pub use clip::{Animation, AnimationFlags, ChannelKey};
pub use tracks::{InterpolationIndices, InterpolationMode, find_interpolation_indices};
pub use value_type::{ChannelType, ChannelValue, ChannelValues, ValueType};
pub use values::Interpolatable;

use std::fmt;

use glam::{Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::animation::values::Interpolatable;
use crate::scene::ScaledTransform;

/// Tag for the closed set of value kinds a channel can store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    Transform,
}

impl ValueType {
    /// The value freshly created slots are filled with.
    #[must_use]
    pub fn default_value(self) -> ChannelValue {
        match self {
            Self::Bool => ChannelValue::Bool(<bool as ChannelType>::DEFAULT),
            Self::Int => ChannelValue::Int(<i32 as ChannelType>::DEFAULT),
            Self::Float => ChannelValue::Float(<f32 as ChannelType>::DEFAULT),
            Self::Vec2 => ChannelValue::Vec2(<Vec2 as ChannelType>::DEFAULT),
            Self::Vec3 => ChannelValue::Vec3(<Vec3 as ChannelType>::DEFAULT),
            Self::Vec4 => ChannelValue::Vec4(<Vec4 as ChannelType>::DEFAULT),
            Self::Quat => ChannelValue::Quat(<Quat as ChannelType>::DEFAULT),
            Self::Transform => ChannelValue::Transform(<ScaledTransform as ChannelType>::DEFAULT),
        }
    }

    /// Whether a value expression can be bound to channels of this type.
    #[inline]
    #[must_use]
    pub fn supports_expression(self) -> bool {
        !matches!(self, Self::Transform)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Quat => "quat",
            Self::Transform => "transform",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single tagged channel value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChannelValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Quat(Quat),
    Transform(ScaledTransform),
}

impl ChannelValue {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Vec4(_) => ValueType::Vec4,
            Self::Quat(_) => ValueType::Quat,
            Self::Transform(_) => ValueType::Transform,
        }
    }
}

/// Homogeneous value storage of a channel: one `Vec` per supported type,
/// selected by the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChannelValues {
    Bool(Vec<bool>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Vec2(Vec<Vec2>),
    Vec3(Vec<Vec3>),
    Vec4(Vec<Vec4>),
    Quat(Vec<Quat>),
    Transform(Vec<ScaledTransform>),
}

/// Runs `$body` with `$v` bound to the inner `Vec` of whichever variant is active.
macro_rules! with_values {
    ($values:expr, $v:ident => $body:expr) => {
        match $values {
            ChannelValues::Bool($v) => $body,
            ChannelValues::Int($v) => $body,
            ChannelValues::Float($v) => $body,
            ChannelValues::Vec2($v) => $body,
            ChannelValues::Vec3($v) => $body,
            ChannelValues::Vec4($v) => $body,
            ChannelValues::Quat($v) => $body,
            ChannelValues::Transform($v) => $body,
        }
    };
}

impl ChannelValues {
    #[must_use]
    pub fn new(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Bool => Self::Bool(Vec::new()),
            ValueType::Int => Self::Int(Vec::new()),
            ValueType::Float => Self::Float(Vec::new()),
            ValueType::Vec2 => Self::Vec2(Vec::new()),
            ValueType::Vec3 => Self::Vec3(Vec::new()),
            ValueType::Vec4 => Self::Vec4(Vec::new()),
            ValueType::Quat => Self::Quat(Vec::new()),
            ValueType::Transform => Self::Transform(Vec::new()),
        }
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Vec4(_) => ValueType::Vec4,
            Self::Quat(_) => ValueType::Quat,
            Self::Transform(_) => ValueType::Transform,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Truncates or extends; new slots hold the type's default value.
    pub fn resize(&mut self, len: usize) {
        fn resize_with_default<T: ChannelType>(v: &mut Vec<T>, len: usize) {
            v.resize(len, T::DEFAULT);
        }
        with_values!(self, v => resize_with_default(v, len));
    }

    /// Returns the value at `index` as a tagged value.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ChannelValue> {
        with_values!(self, v => v.get(index).map(|x| ChannelType::into_value(*x)))
    }

    /// Appends a tagged value; returns `false` if its type does not match.
    pub fn push(&mut self, value: ChannelValue) -> bool {
        fn push_typed<T: ChannelType>(v: &mut Vec<T>, value: ChannelValue) -> bool {
            match T::from_value(value) {
                Some(x) => {
                    v.push(x);
                    true
                }
                None => false,
            }
        }
        with_values!(self, v => push_typed(v, value))
    }
}

/// Maps a Rust type onto its [`ValueType`] and typed storage.
///
/// Implemented for every variant of the closed value set; the typed channel
/// API is generic over this trait.
pub trait ChannelType: Interpolatable + PartialEq + fmt::Debug + 'static {
    const VALUE_TYPE: ValueType;
    /// Default for newly created slots (identity rotation, zero vector, ...).
    const DEFAULT: Self;

    fn slice(values: &ChannelValues) -> Option<&[Self]>;
    fn vec_mut(values: &mut ChannelValues) -> Option<&mut Vec<Self>>;
    fn into_value(self) -> ChannelValue;
    fn from_value(value: ChannelValue) -> Option<Self>;
}

macro_rules! impl_channel_type {
    ($ty:ty, $variant:ident, $default:expr) => {
        impl ChannelType for $ty {
            const VALUE_TYPE: ValueType = ValueType::$variant;
            const DEFAULT: Self = $default;

            #[inline]
            fn slice(values: &ChannelValues) -> Option<&[Self]> {
                match values {
                    ChannelValues::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            #[inline]
            fn vec_mut(values: &mut ChannelValues) -> Option<&mut Vec<Self>> {
                match values {
                    ChannelValues::$variant(v) => Some(v),
                    _ => None,
                }
            }

            #[inline]
            fn into_value(self) -> ChannelValue {
                ChannelValue::$variant(self)
            }

            #[inline]
            fn from_value(value: ChannelValue) -> Option<Self> {
                match value {
                    ChannelValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_channel_type!(bool, Bool, false);
impl_channel_type!(i32, Int, 0);
impl_channel_type!(f32, Float, 0.0);
impl_channel_type!(Vec2, Vec2, Vec2::ZERO);
impl_channel_type!(Vec3, Vec3, Vec3::ZERO);
impl_channel_type!(Vec4, Vec4, Vec4::ZERO);
impl_channel_type!(Quat, Quat, Quat::IDENTITY);
impl_channel_type!(ScaledTransform, Transform, ScaledTransform::IDENTITY);

use std::fmt;

use serde::{Deserialize, Serialize};

/// Transform component a channel path can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformComponent {
    Position, // Maps to transform.translation
    Rotation, // Maps to transform.rotation
    Scale,    // Maps to transform.scale
}

impl TransformComponent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Position => TargetPath::POSITION,
            Self::Rotation => TargetPath::ROTATION,
            Self::Scale => TargetPath::SCALE,
        }
    }
}

/// Identifies the property a channel drives, e.g. `bone/spine/rotation`.
///
/// The path is opaque to sampling; it is only used to look channels up.
/// Segments are separated by `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetPath(String);

impl TargetPath {
    pub const POSITION: &'static str = "position";
    pub const ROTATION: &'static str = "rotation";
    pub const SCALE: &'static str = "scale";

    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-empty `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The last segment: the property name.
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Recognizes paths ending in one of the standard transform components.
    #[must_use]
    pub fn transform_component(&self) -> Option<TransformComponent> {
        match self.property()? {
            Self::POSITION => Some(TransformComponent::Position),
            Self::ROTATION => Some(TransformComponent::Rotation),
            Self::SCALE => Some(TransformComponent::Scale),
            _ => None,
        }
    }
}

impl From<&str> for TargetPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for TargetPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

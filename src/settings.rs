//! Sampling Settings
//!
//! Tunable policies for channel sampling.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_animation::settings::SplineBoundary;
//!
//! let mut channel = Channel::new("bone/spine/position", ValueType::Vec3);
//! channel.interpolation = InterpolationMode::CubicSpline;
//! channel.spline_boundary = SplineBoundary::Clamped;
//! ```

use serde::{Deserialize, Serialize};

/// Number of neighbouring intervals scanned around the pivot index (in the
/// direction of travel) before falling back to a binary search.
///
/// Sequential playback almost always lands in the pivot interval or the one
/// right after it, so a small window keeps lookups O(1) amortized.
pub const SEARCH_SCAN_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
// SplineBoundary
// ---------------------------------------------------------------------------

/// Tangent policy for cubic-spline segments that touch the first or last
/// sample of a channel.
///
/// Interior segments derive both tangents from the neighbouring samples
/// (Catmull-Rom with non-uniform spacing). A boundary segment is missing one
/// neighbour; this policy decides what happens there.
///
/// | Policy    | Boundary segment behaviour                                    |
/// |-----------|---------------------------------------------------------------|
/// | `Linear`  | The whole segment is linearly interpolated                     |
/// | `Clamped` | The missing tangent is the segment's own slope (one-sided)     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplineBoundary {
    /// Fall back to linear interpolation on boundary segments.
    #[default]
    Linear,
    /// Use a one-sided finite difference for the missing tangent.
    Clamped,
}

impl SplineBoundary {
    /// Returns `true` if boundary segments are still evaluated as splines.
    #[inline]
    #[must_use]
    pub fn keeps_spline(self) -> bool {
        matches!(self, Self::Clamped)
    }
}

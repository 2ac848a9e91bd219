//! Error Types
//!
//! This module defines the error types used throughout the animation crate.
//!
//! # Overview
//!
//! The main error type [`AnimationError`] covers all failure modes including:
//! - Sampling an empty channel
//! - Requesting a value type the channel does not store
//! - Malformed persisted channel data
//! - Value-expression compile failures
//! - Skeleton construction errors
//!
//! Soft misses (reading a bone the pose has no data for, writing to an
//! unmapped bone) are *not* errors; they surface as `None` or a no-op.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, AnimationError>`.
//!
//! ```rust,ignore
//! use myth_animation::errors::{AnimationError, Result};
//!
//! fn sample(channel: &Channel) -> Result<f32> {
//!     channel.interpolated_value::<f32>(0.5, &mut 0)
//! }
//! ```

use thiserror::Error;

use crate::animation::ValueType;
use crate::expression::ExpressionError;
use crate::scene::BoneId;

/// The main error type for the animation crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    // ========================================================================
    // Channel Sampling Errors
    // ========================================================================
    /// The channel holds no samples, so there is nothing to interpolate.
    #[error("Channel '{0}' has no samples")]
    EmptyChannel(String),

    /// The requested value type differs from the channel's stored type.
    #[error("Value type mismatch: channel stores {actual:?}, requested {expected:?}")]
    TypeMismatch {
        /// The type the caller asked for
        expected: ValueType,
        /// The type the channel actually stores
        actual: ValueType,
    },

    // ========================================================================
    // Channel Data Errors
    // ========================================================================
    /// Times and values arrays differ in length.
    #[error("Channel data length mismatch: {times} times, {values} values")]
    LengthMismatch {
        /// Number of sample times
        times: usize,
        /// Number of sample values
        values: usize,
    },

    /// Sample times are not in non-decreasing order.
    #[error("Channel times must be non-decreasing (index {index})")]
    UnsortedTimes {
        /// First index whose time is smaller than its predecessor
        index: usize,
    },

    // ========================================================================
    // Expression Errors
    // ========================================================================
    /// The value expression failed to compile.
    #[error("Expression error: {0}")]
    Expression(#[from] ExpressionError),

    /// The channel's value type cannot carry a value expression.
    #[error("Value expressions are not supported for {0:?} channels")]
    ExpressionUnsupported(ValueType),

    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// A bone referenced by ID does not exist in the skeleton.
    #[error("Bone not found: {0}")]
    BoneNotFound(BoneId),
}

/// Alias for `Result<T, AnimationError>`.
pub type Result<T> = std::result::Result<T, AnimationError>;

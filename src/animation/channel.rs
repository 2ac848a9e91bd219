use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::{InterpolationIndices, InterpolationMode, find_interpolation_indices, sample_at};
use crate::animation::value_type::{ChannelType, ChannelValues, ValueType};
use crate::errors::{AnimationError, Result};
use crate::expression::ValueExpression;
use crate::settings::SplineBoundary;

/// Custom blend operator accepted by [`Channel::interpolated_value_with`].
pub type BlendFn<T> = fn(&T, &T, f32) -> T;

/// A typed, time-ordered sequence of samples driving one animated property.
///
/// `times` and the stored values always have equal length and `times` is
/// non-decreasing; samples must be appended in time order. The value type is
/// fixed until [`set_value_type`](Self::set_value_type) discards the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChannelData", into = "ChannelData")]
pub struct Channel {
    pub interpolation: InterpolationMode,
    pub target_path: TargetPath,
    pub spline_boundary: SplineBoundary,

    times: Vec<f32>,
    values: ChannelValues,
    expression: Option<ValueExpression>,
}

impl Channel {
    pub fn new(target_path: impl Into<TargetPath>, value_type: ValueType) -> Self {
        Self {
            interpolation: InterpolationMode::default(),
            target_path: target_path.into(),
            spline_boundary: SplineBoundary::default(),
            times: Vec::new(),
            values: ChannelValues::new(value_type),
            expression: None,
        }
    }

    /// Builds a channel from parallel arrays, e.g. decoded asset data.
    ///
    /// Fails if the lengths differ or `times` decreases anywhere.
    pub fn from_parts(
        target_path: impl Into<TargetPath>,
        interpolation: InterpolationMode,
        times: Vec<f32>,
        values: ChannelValues,
    ) -> Result<Self> {
        if times.len() != values.len() {
            return Err(AnimationError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        if let Some(index) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(AnimationError::UnsortedTimes { index: index + 1 });
        }

        Ok(Self {
            interpolation,
            target_path: target_path.into(),
            spline_boundary: SplineBoundary::default(),
            times,
            values,
            expression: None,
        })
    }

    // ========================================================================
    // Type & Size
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.values.value_type()
    }

    /// Switches the stored value type. Existing samples and the value
    /// expression are discarded; a no-op if the type is unchanged.
    pub fn set_value_type(&mut self, value_type: ValueType) {
        if value_type == self.value_type() {
            return;
        }
        log::debug!(
            "Channel '{}': value type {} -> {}, dropping {} samples",
            self.target_path,
            self.value_type(),
            value_type,
            self.times.len()
        );
        self.values = ChannelValues::new(value_type);
        self.times.clear();
        self.expression = None;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Truncates or extends both sequences. New times repeat the last time
    /// (or `0.0`), new values hold the type's default.
    pub fn resize(&mut self, len: usize) {
        let fill = self.times.last().copied().unwrap_or(0.0);
        self.times.resize(len, fill);
        self.values.resize(len);
    }

    // ========================================================================
    // Sample Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn time(&self, index: usize) -> Option<f32> {
        self.times.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    /// Time of the last sample.
    #[must_use]
    pub fn end_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Mutable access to a sample time. The caller keeps `times` ordered.
    pub fn time_mut(&mut self, index: usize) -> Option<&mut f32> {
        self.times.get_mut(index)
    }

    pub fn values<T: ChannelType>(&self) -> Result<&[T]> {
        T::slice(&self.values).ok_or_else(|| self.mismatch::<T>())
    }

    #[inline]
    #[must_use]
    pub fn raw_values(&self) -> &ChannelValues {
        &self.values
    }

    pub fn value<T: ChannelType>(&self, index: usize) -> Result<Option<&T>> {
        Ok(self.values::<T>()?.get(index))
    }

    pub fn value_mut<T: ChannelType>(&mut self, index: usize) -> Result<Option<&mut T>> {
        let actual = self.value_type();
        let values = T::vec_mut(&mut self.values).ok_or(AnimationError::TypeMismatch {
            expected: T::VALUE_TYPE,
            actual,
        })?;
        Ok(values.get_mut(index))
    }

    /// Iterates `(time, value)` pairs in sample order.
    pub fn iter<T: ChannelType>(&self) -> Result<impl Iterator<Item = (f32, &T)>> {
        Ok(self.times.iter().copied().zip(self.values::<T>()?))
    }

    /// Appends a sample and returns its index. Times are not re-sorted.
    pub fn add_value<T: ChannelType>(&mut self, time: f32, value: T) -> Result<usize> {
        let actual = self.value_type();
        let values = T::vec_mut(&mut self.values).ok_or(AnimationError::TypeMismatch {
            expected: T::VALUE_TYPE,
            actual,
        })?;
        values.push(value);
        self.times.push(time);
        Ok(self.times.len() - 1)
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    /// Bracketing samples for `time`, searching outward from `pivot`.
    pub fn find_interpolation_indices(&self, time: f32, pivot: usize) -> Result<InterpolationIndices> {
        find_interpolation_indices(&self.times, time, pivot).ok_or_else(|| self.empty())
    }

    /// Same as [`find_interpolation_indices`](Self::find_interpolation_indices)
    /// with the search starting at the middle sample.
    pub fn find_interpolation_indices_at(&self, time: f32) -> Result<InterpolationIndices> {
        self.find_interpolation_indices(time, self.len() / 2)
    }

    /// Samples the channel at `time`, validating the requested type.
    ///
    /// `pivot` is the caller's search hint; it is updated to the lower
    /// bracketing index for the next call.
    pub fn interpolated_value<T: ChannelType>(&self, time: f32, pivot: &mut usize) -> Result<T> {
        Ok(self.typed::<T>()?.interpolated_value(time, pivot))
    }

    /// Samples without a pivot hint.
    pub fn interpolated_value_at<T: ChannelType>(&self, time: f32) -> Result<T> {
        let mut pivot = self.len() / 2;
        self.interpolated_value(time, &mut pivot)
    }

    /// Samples with `blend` replacing the built-in interpolation operator.
    /// `Step` channels still hold the lower sample.
    pub fn interpolated_value_with<T: ChannelType>(
        &self,
        time: f32,
        pivot: &mut usize,
        blend: BlendFn<T>,
    ) -> Result<T> {
        Ok(self.typed::<T>()?.interpolated_value_with(time, pivot, blend))
    }

    /// Validates the value type and emptiness once and returns a view that
    /// samples without further checks.
    pub fn typed<T: ChannelType>(&self) -> Result<ChannelView<'_, T>> {
        let values = self.values::<T>()?;
        if values.is_empty() {
            return Err(self.empty());
        }
        Ok(ChannelView {
            times: &self.times,
            values,
            interpolation: self.interpolation,
            spline_boundary: self.spline_boundary,
            expression: self.expression.as_ref(),
        })
    }

    // ========================================================================
    // Value Expression
    // ========================================================================

    /// Compiles `source` for this channel's value type and attaches it.
    ///
    /// On failure the previously attached expression stays in place.
    pub fn set_value_expression(&mut self, source: &str) -> Result<()> {
        let value_type = self.value_type();
        if !value_type.supports_expression() {
            return Err(AnimationError::ExpressionUnsupported(value_type));
        }
        match ValueExpression::compile(source, value_type) {
            Ok(expression) => {
                log::debug!("Channel '{}': value expression set to '{source}'", self.target_path);
                self.expression = Some(expression);
                Ok(())
            }
            Err(err) => {
                log::warn!("Channel '{}': rejected value expression '{source}': {err}", self.target_path);
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn value_expression(&self) -> Option<&str> {
        self.expression.as_ref().map(ValueExpression::source)
    }

    pub fn clear_value_expression(&mut self) {
        self.expression = None;
    }

    /// Runs the attached expression on `value`, if any.
    pub fn apply_value_expression<T: ChannelType>(&self, time: f32, time_index: usize, value: &mut T) {
        if let Some(expression) = &self.expression {
            expression.apply(f64::from(time), time_index, value);
        }
    }

    fn mismatch<T: ChannelType>(&self) -> AnimationError {
        AnimationError::TypeMismatch {
            expected: T::VALUE_TYPE,
            actual: self.value_type(),
        }
    }

    fn empty(&self) -> AnimationError {
        AnimationError::EmptyChannel(self.target_path.to_string())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Channel '{}' ({}, {:?}, {} samples",
            self.target_path,
            self.value_type(),
            self.interpolation,
            self.len()
        )?;
        if let Some(expression) = &self.expression {
            write!(f, ", expression '{expression}'")?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// ChannelView
// ============================================================================

/// A type-checked, non-empty borrow of a [`Channel`].
///
/// Obtained from [`Channel::typed`]; sampling through the view skips the type
/// and emptiness checks, which suits per-frame loops over many samples.
#[derive(Debug, Clone, Copy)]
pub struct ChannelView<'a, T: ChannelType> {
    times: &'a [f32],
    values: &'a [T],
    interpolation: InterpolationMode,
    spline_boundary: SplineBoundary,
    expression: Option<&'a ValueExpression>,
}

impl<'a, T: ChannelType> ChannelView<'a, T> {
    #[inline]
    #[must_use]
    pub fn times(&self) -> &'a [f32] {
        self.times
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &'a [T] {
        self.values
    }

    pub fn interpolated_value(&self, time: f32, pivot: &mut usize) -> T {
        self.sample(time, pivot, None)
    }

    pub fn interpolated_value_with(&self, time: f32, pivot: &mut usize, blend: BlendFn<T>) -> T {
        self.sample(time, pivot, Some(blend))
    }

    fn sample(&self, time: f32, pivot: &mut usize, blend: Option<BlendFn<T>>) -> T {
        let Some(indices) = find_interpolation_indices(self.times, time, *pivot) else {
            // Views are never empty.
            return T::DEFAULT;
        };
        *pivot = indices.idx0;

        let mut value = sample_at(
            self.times,
            self.values,
            indices,
            self.interpolation,
            self.spline_boundary,
            blend,
        );
        if let Some(expression) = self.expression {
            expression.apply(f64::from(time), indices.idx0, &mut value);
        }
        value
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// Serialized form of a [`Channel`].
#[derive(Serialize, Deserialize)]
struct ChannelData {
    path: TargetPath,
    #[serde(default)]
    interpolation: InterpolationMode,
    #[serde(default)]
    spline_boundary: SplineBoundary,
    values: ChannelValues,
    times: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expression: Option<String>,
}

impl TryFrom<ChannelData> for Channel {
    type Error = AnimationError;

    fn try_from(data: ChannelData) -> Result<Self> {
        let mut channel = Channel::from_parts(data.path, data.interpolation, data.times, data.values)
            .inspect_err(|err| log::warn!("Malformed channel data: {err}"))?;
        channel.spline_boundary = data.spline_boundary;
        if let Some(source) = data.expression {
            channel.set_value_expression(&source)?;
        }
        Ok(channel)
    }
}

impl From<Channel> for ChannelData {
    fn from(channel: Channel) -> Self {
        Self {
            expression: channel.value_expression().map(str::to_owned),
            path: channel.target_path,
            interpolation: channel.interpolation,
            spline_boundary: channel.spline_boundary,
            values: channel.values,
            times: channel.times,
        }
    }
}

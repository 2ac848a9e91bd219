// src/animation/tracks.rs
use serde::{Deserialize, Serialize};

use crate::animation::values::Interpolatable;
use crate::settings::{SEARCH_SCAN_WINDOW, SplineBoundary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

/// Result of a keyframe lookup: the bracketing sample pair and the blend
/// factor between them.
///
/// `idx0 == idx1` means no blending is needed (before the first sample,
/// after the last one, or a single-sample channel); `factor` is then `0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationIndices {
    pub idx0: usize,
    pub idx1: usize,
    pub factor: f32,
}

impl InterpolationIndices {
    #[inline]
    fn clamped(index: usize) -> Self {
        Self {
            idx0: index,
            idx1: index,
            factor: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn needs_blend(&self) -> bool {
        self.idx0 != self.idx1
    }
}

/// Finds the interval of `times` containing `time`, starting at `pivot`.
///
/// Returns `None` only for an empty slice. The result is the same for every
/// pivot; the pivot only decides how quickly it is found:
/// - the interval at the pivot and the next few in the direction of travel are
///   scanned linearly (O(1) for sequential playback),
/// - otherwise a binary search over the whole slice is used (O(log N)).
///
/// A pivot outside the slice is clamped.
#[must_use]
pub fn find_interpolation_indices(times: &[f32], time: f32, pivot: usize) -> Option<InterpolationIndices> {
    let len = times.len();
    let first = *times.first()?;
    let last = times[len - 1];

    // 1. Boundary cases. NaN holds the first key.
    if time.is_nan() || time <= first {
        return Some(InterpolationIndices::clamped(0));
    }
    if time >= last {
        return Some(InterpolationIndices::clamped(len - 1));
    }

    // From here on first < time < last, so len >= 2 and the answer is the
    // unique idx with times[idx] <= time < times[idx + 1].
    let start = pivot.min(len - 2);

    let idx = scan_from_pivot(times, time, start).unwrap_or_else(|| {
        // Large jump (scrubbing / loop reset): global binary search.
        // partition_point returns the first index with t > time.
        log::trace!("keyframe scan missed at pivot {start}, falling back to binary search");
        times.partition_point(|&t| t <= time).saturating_sub(1).min(len - 2)
    });

    let t0 = times[idx];
    let t1 = times[idx + 1];
    let dt = t1 - t0;

    // Prevent division by zero
    let factor = if dt > 0.0 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

    Some(InterpolationIndices {
        idx0: idx,
        idx1: idx + 1,
        factor,
    })
}

/// Linear scan of at most `SEARCH_SCAN_WINDOW` intervals around `start`.
///
/// Requires `times[0] < time < times[len - 1]` and `start <= len - 2`.
fn scan_from_pivot(times: &[f32], time: f32, start: usize) -> Option<usize> {
    let last_interval = times.len() - 2;

    if time >= times[start] {
        // === Case A: normal playback or fast-forward (time increasing) ===
        // We know time >= times[idx], so only the right boundary is checked.
        let end = (start + SEARCH_SCAN_WINDOW).min(last_interval);
        (start..=end).find(|&idx| time < times[idx + 1])
    } else {
        // === Case B: reverse playback or loop reset (time decreasing) ===
        // Each step already knows time < times[idx + 1], only the left
        // boundary is checked.
        (1..=SEARCH_SCAN_WINDOW)
            .take_while(|&offset| offset <= start)
            .map(|offset| start - offset)
            .find(|&idx| time >= times[idx])
    }
}

/// Evaluates the blend described by `indices`.
///
/// `times` and `values` must have equal length and `indices` must come from
/// [`find_interpolation_indices`] on the same `times`.
pub(crate) fn sample_at<T: Interpolatable>(
    times: &[f32],
    values: &[T],
    indices: InterpolationIndices,
    mode: InterpolationMode,
    boundary: SplineBoundary,
    blend: Option<fn(&T, &T, f32) -> T>,
) -> T {
    let InterpolationIndices { idx0, idx1, factor } = indices;
    if idx0 == idx1 {
        return values[idx0];
    }

    let v0 = values[idx0];
    let v1 = values[idx1];

    if mode == InterpolationMode::Step {
        return v0;
    }
    if let Some(blend) = blend {
        return blend(&v0, &v1, factor);
    }

    match mode {
        InterpolationMode::CubicSpline if T::SUPPORTS_SPLINE => {
            sample_cubic(times, values, idx0, idx1, factor, boundary)
        }
        _ => T::interpolate_linear(v0, v1, factor),
    }
}

/// Catmull-Rom style Hermite blend; tangents come from the neighbouring
/// samples, scaled for non-uniform spacing.
fn sample_cubic<T: Interpolatable>(
    times: &[f32],
    values: &[T],
    idx0: usize,
    idx1: usize,
    factor: f32,
    boundary: SplineBoundary,
) -> T {
    let v0 = values[idx0];
    let v1 = values[idx1];
    let dt = times[idx1] - times[idx0];

    let has_prev = idx0 > 0;
    let has_next = idx1 + 1 < values.len();

    if !(has_prev && has_next) && !boundary.keeps_spline() {
        return T::interpolate_linear(v0, v1, factor);
    }

    let out_tangent0 = if has_prev {
        T::tangent(values[idx0 - 1], v1, times[idx1] - times[idx0 - 1])
    } else {
        T::tangent(v0, v1, dt)
    };
    let in_tangent1 = if has_next {
        T::tangent(v0, values[idx1 + 1], times[idx1 + 1] - times[idx0])
    } else {
        T::tangent(v0, v1, dt)
    };

    T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, factor, dt)
}

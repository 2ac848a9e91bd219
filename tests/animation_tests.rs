//! Animation System Tests
//!
//! Tests for:
//! - Channel linear/step/cubic interpolation
//! - Interpolatable trait implementations (f32, i32, bool, Vec3, Quat, ScaledTransform)
//! - Pivot-hinted index lookup and binary search fallback
//! - Typed access, validation errors and the unchecked `ChannelView` path
//! - Animation container bookkeeping

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use glam::{Quat, Vec3};

use myth_animation::animation::tracks::find_interpolation_indices;
use myth_animation::animation::values::Interpolatable;
use myth_animation::animation::{Animation, AnimationFlags, Channel, ChannelValues, InterpolationMode, ValueType};
use myth_animation::errors::AnimationError;
use myth_animation::scene::ScaledTransform;
use myth_animation::settings::SplineBoundary;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn float_channel(times: &[f32], values: &[f32], mode: InterpolationMode) -> Channel {
    Channel::from_parts("test/value", mode, times.to_vec(), ChannelValues::Float(values.to_vec())).unwrap()
}

// ============================================================================
// Channel: Linear Interpolation (f32)
// ============================================================================

#[test]
fn channel_linear_f32_scenario() {
    let channel = float_channel(&[0.0, 1.0, 2.0], &[0.0, 10.0, 20.0], InterpolationMode::Linear);

    let mut pivot = 0;
    assert!(approx(channel.interpolated_value::<f32>(0.5, &mut pivot).unwrap(), 5.0));
    assert!(approx(channel.interpolated_value::<f32>(-1.0, &mut pivot).unwrap(), 0.0));
    assert!(approx(channel.interpolated_value::<f32>(3.0, &mut pivot).unwrap(), 20.0));
}

#[test]
fn channel_linear_f32_exact_keyframes() {
    let channel = float_channel(&[0.0, 1.0, 2.0], &[0.0, 10.0, 20.0], InterpolationMode::Linear);

    for (t, expected) in [(0.0, 0.0), (1.0, 10.0), (2.0, 20.0)] {
        let v: f32 = channel.interpolated_value_at(t).unwrap();
        assert!(approx(v, expected), "t={t}: expected {expected}, got {v}");
    }
}

#[test]
fn channel_updates_pivot_to_lower_index() {
    let channel = float_channel(&[0.0, 1.0, 2.0, 3.0], &[0.0; 4], InterpolationMode::Linear);

    let mut pivot = 0;
    channel.interpolated_value::<f32>(2.5, &mut pivot).unwrap();
    assert_eq!(pivot, 2);
    channel.interpolated_value::<f32>(0.5, &mut pivot).unwrap();
    assert_eq!(pivot, 0);
    channel.interpolated_value::<f32>(10.0, &mut pivot).unwrap();
    assert_eq!(pivot, 3);
}

#[test]
fn channel_single_sample_is_constant() {
    let channel = float_channel(&[1.0], &[7.0], InterpolationMode::Linear);

    for t in [-5.0, 1.0, 5.0] {
        assert!(approx(channel.interpolated_value_at::<f32>(t).unwrap(), 7.0));
    }
}

// ============================================================================
// Channel: Step Interpolation
// ============================================================================

#[test]
fn channel_step_never_blends() {
    let channel = float_channel(&[0.0, 1.0, 2.0], &[0.0, 10.0, 20.0], InterpolationMode::Step);

    let mut pivot = 0;
    for i in 1..20 {
        let t = i as f32 * 0.05;
        assert_eq!(channel.interpolated_value::<f32>(t, &mut pivot).unwrap(), 0.0, "t={t}");
        assert_eq!(channel.interpolated_value::<f32>(1.0 + t, &mut pivot).unwrap(), 10.0, "t={}", 1.0 + t);
    }
}

#[test]
fn channel_step_ignores_custom_blend() {
    let channel = float_channel(&[0.0, 1.0], &[0.0, 10.0], InterpolationMode::Step);

    let mut pivot = 0;
    let v = channel
        .interpolated_value_with::<f32>(0.5, &mut pivot, |_, _, _| 99.0)
        .unwrap();
    assert_eq!(v, 0.0);
}

#[test]
fn channel_custom_blend_overrides_builtin() {
    let channel = float_channel(&[0.0, 1.0], &[0.0, 10.0], InterpolationMode::Linear);

    let mut pivot = 0;
    let v = channel
        .interpolated_value_with::<f32>(0.25, &mut pivot, |a, b, f| if f < 0.5 { *a } else { *b })
        .unwrap();
    assert_eq!(v, 0.0);

    // Exact keyframes bypass the blend entirely
    let v = channel
        .interpolated_value_with::<f32>(1.0, &mut pivot, |_, _, _| 99.0)
        .unwrap();
    assert_eq!(v, 10.0);
}

// ============================================================================
// Channel: Vector / Quaternion / Discrete Types
// ============================================================================

#[test]
fn channel_linear_vec3() {
    let mut channel = Channel::new("bone/hip/position", ValueType::Vec3);
    channel.add_value(0.0, Vec3::ZERO).unwrap();
    channel.add_value(2.0, Vec3::new(2.0, 4.0, -6.0)).unwrap();

    let v: Vec3 = channel.interpolated_value_at(1.0).unwrap();
    assert!(v.abs_diff_eq(Vec3::new(1.0, 2.0, -3.0), EPSILON), "got {v}");
}

#[test]
fn channel_linear_quat_slerp() {
    let mut channel = Channel::new("bone/hip/rotation", ValueType::Quat);
    channel.add_value(0.0, Quat::IDENTITY).unwrap();
    channel.add_value(1.0, Quat::from_rotation_z(FRAC_PI_2)).unwrap();

    let q: Quat = channel.interpolated_value_at(0.5).unwrap();
    let expected = Quat::from_rotation_z(FRAC_PI_4);
    assert!(q.angle_between(expected) < 1e-4, "got {q}");
    assert!(approx(q.length(), 1.0));
}

#[test]
fn channel_int_rounds_and_bool_holds() {
    let mut ints = Channel::new("frame", ValueType::Int);
    ints.add_value(0.0, 0_i32).unwrap();
    ints.add_value(1.0, 10_i32).unwrap();
    assert_eq!(ints.interpolated_value_at::<i32>(0.46).unwrap(), 5);
    assert_eq!(ints.interpolated_value_at::<i32>(0.44).unwrap(), 4);

    let mut flags = Channel::new("visible", ValueType::Bool);
    flags.add_value(0.0, false).unwrap();
    flags.add_value(1.0, true).unwrap();
    assert!(!flags.interpolated_value_at::<bool>(0.99).unwrap());
    assert!(flags.interpolated_value_at::<bool>(1.0).unwrap());
}

#[test]
fn channel_transform_blends_per_component() {
    let a = ScaledTransform::IDENTITY;
    let b = ScaledTransform::new(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(FRAC_PI_2), Vec3::splat(3.0));

    let mut channel = Channel::new("bone/root", ValueType::Transform);
    channel.add_value(0.0, a).unwrap();
    channel.add_value(1.0, b).unwrap();

    let t: ScaledTransform = channel.interpolated_value_at(0.5).unwrap();
    assert!(t.translation.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPSILON));
    assert!(t.scale.abs_diff_eq(Vec3::splat(2.0), EPSILON));
    assert!(t.rotation.angle_between(Quat::from_rotation_y(FRAC_PI_4)) < 1e-4);
}

// ============================================================================
// Channel: Cubic Spline
// ============================================================================

#[test]
fn channel_cubic_passes_through_keyframes() {
    let channel = float_channel(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 4.0, 9.0], InterpolationMode::CubicSpline);

    for (t, expected) in [(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)] {
        assert!(approx(channel.interpolated_value_at::<f32>(t).unwrap(), expected));
    }
}

#[test]
fn channel_cubic_interior_segment_is_smooth() {
    // Catmull-Rom on samples of x^2 reproduces the parabola on interior segments
    let channel = float_channel(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 4.0, 9.0], InterpolationMode::CubicSpline);

    let v: f32 = channel.interpolated_value_at(1.5).unwrap();
    assert!(approx(v, 2.25), "got {v}");
}

#[test]
fn channel_cubic_boundary_policy() {
    let mut channel =
        float_channel(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 4.0, 9.0], InterpolationMode::CubicSpline);

    // Linear (default): boundary segments blend linearly
    assert_eq!(channel.spline_boundary, SplineBoundary::Linear);
    assert!(approx(channel.interpolated_value_at::<f32>(0.5).unwrap(), 0.5));

    // Clamped: the missing tangent is the segment's own slope
    channel.spline_boundary = SplineBoundary::Clamped;
    let v: f32 = channel.interpolated_value_at(0.5).unwrap();
    assert!(approx(v, 0.375), "got {v}");
}

#[test]
fn channel_cubic_quat_stays_normalized() {
    let mut channel = Channel::new("bone/arm/rotation", ValueType::Quat);
    channel.interpolation = InterpolationMode::CubicSpline;
    for (i, angle) in [0.0_f32, 0.5, 1.5, 1.7].into_iter().enumerate() {
        channel.add_value(i as f32, Quat::from_rotation_x(angle)).unwrap();
    }

    let mut pivot = 0;
    for i in 0..=30 {
        let q: Quat = channel.interpolated_value(i as f32 * 0.1, &mut pivot).unwrap();
        assert!(approx(q.length(), 1.0), "t={}: |q|={}", i as f32 * 0.1, q.length());
    }
}

// ============================================================================
// Index Lookup
// ============================================================================

fn generated_times(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32 * 0.5 + (i % 3) as f32 * 0.1).collect()
}

#[test]
fn lookup_is_independent_of_pivot() {
    let times = generated_times(40);
    let last = times[times.len() - 1];

    let mut t = -1.0_f32;
    while t < last + 1.0 {
        let reference = find_interpolation_indices(&times, t, times.len() / 2).unwrap();
        for pivot in [0, 1, 5, 17, 38, 39, 40, 1000] {
            let ix = find_interpolation_indices(&times, t, pivot).unwrap();
            assert_eq!(ix, reference, "t={t} pivot={pivot}");
        }

        if t <= times[0] {
            assert_eq!((reference.idx0, reference.idx1), (0, 0));
        } else if t >= last {
            assert_eq!((reference.idx0, reference.idx1), (39, 39));
        } else {
            assert_eq!(reference.idx1, reference.idx0 + 1);
            assert!(times[reference.idx0] <= t && t < times[reference.idx1], "t={t}");
            let expected = (t - times[reference.idx0]) / (times[reference.idx1] - times[reference.idx0]);
            assert!(approx(reference.factor, expected));
        }
        t += 0.037;
    }
}

#[test]
fn lookup_sequential_forward_and_back() {
    let times = generated_times(20);

    let mut pivot = 0;
    let mut t = 0.01;
    while t < 9.0 {
        let ix = find_interpolation_indices(&times, t, pivot).unwrap();
        assert!(ix.idx0 >= pivot, "forward playback never moves the pivot back");
        pivot = ix.idx0;
        t += 0.1;
    }

    // Jump back to the start (loop reset)
    let ix = find_interpolation_indices(&times, 0.2, pivot).unwrap();
    assert_eq!(ix.idx0, 0);
}

#[test]
fn lookup_zero_width_interval_has_zero_factor() {
    let channel = float_channel(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 5.0, 6.0], InterpolationMode::Linear);

    let ix = channel.find_interpolation_indices(1.0, 0).unwrap();
    assert_eq!((ix.idx0, ix.idx1), (2, 3));
    assert_eq!(ix.factor, 0.0);
    assert!(approx(channel.interpolated_value_at::<f32>(1.0).unwrap(), 5.0));
}

#[test]
fn lookup_non_finite_time_clamps() {
    let channel = float_channel(&[0.0, 1.0, 2.0], &[0.0, 10.0, 20.0], InterpolationMode::Linear);

    for pivot in [0, 1, 2, 100] {
        let ix = channel.find_interpolation_indices(f32::NAN, pivot).unwrap();
        assert_eq!((ix.idx0, ix.idx1), (0, 0));
    }

    let mut pivot = 1;
    assert_eq!(channel.interpolated_value::<f32>(f32::NAN, &mut pivot).unwrap(), 0.0);
    assert_eq!(pivot, 0);
    assert_eq!(channel.interpolated_value_at::<f32>(f32::INFINITY).unwrap(), 20.0);
    assert_eq!(channel.interpolated_value_at::<f32>(f32::NEG_INFINITY).unwrap(), 0.0);

    let view = channel.typed::<f32>().unwrap();
    assert_eq!(view.interpolated_value(f32::NAN, &mut pivot), 0.0);
}

// ============================================================================
// Validation & Typed Access
// ============================================================================

#[test]
fn type_mismatch_is_reported() {
    let channel = float_channel(&[0.0], &[1.0], InterpolationMode::Linear);

    let err = channel.interpolated_value_at::<Vec3>(0.0).unwrap_err();
    assert_eq!(
        err,
        AnimationError::TypeMismatch {
            expected: ValueType::Vec3,
            actual: ValueType::Float
        }
    );
    assert!(channel.values::<Quat>().is_err());

    let mut channel = channel;
    assert!(channel.add_value(1.0, Vec3::ONE).is_err());
    assert_eq!(channel.len(), 1);
}

#[test]
fn empty_channel_is_rejected() {
    let channel = Channel::new("bone/hip/position", ValueType::Vec3);

    let err = channel.interpolated_value_at::<Vec3>(0.0).unwrap_err();
    assert_eq!(err, AnimationError::EmptyChannel("bone/hip/position".into()));
    assert!(channel.find_interpolation_indices(0.0, 0).is_err());
    assert!(channel.typed::<Vec3>().is_err());
}

#[test]
fn typed_view_matches_validated_path() {
    let channel = float_channel(&generated_times(10), &[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0], InterpolationMode::Linear);
    let view = channel.typed::<f32>().unwrap();

    let (mut p0, mut p1) = (0, 0);
    for i in 0..60 {
        let t = i as f32 * 0.09;
        let fast = view.interpolated_value(t, &mut p0);
        let checked = channel.interpolated_value::<f32>(t, &mut p1).unwrap();
        assert_eq!(fast, checked);
        assert_eq!(p0, p1);
    }
}

#[test]
fn typed_element_access() {
    let mut channel = Channel::new("weights", ValueType::Float);
    assert_eq!(channel.add_value(0.0, 1.0_f32).unwrap(), 0);
    assert_eq!(channel.add_value(0.5, 2.0_f32).unwrap(), 1);

    assert_eq!(channel.value::<f32>(1).unwrap(), Some(&2.0));
    assert_eq!(channel.value::<f32>(2).unwrap(), None);
    assert_eq!(channel.time(1), Some(0.5));

    *channel.value_mut::<f32>(0).unwrap().unwrap() = 4.0;
    let pairs: Vec<(f32, f32)> = channel.iter::<f32>().unwrap().map(|(t, v)| (t, *v)).collect();
    assert_eq!(pairs, vec![(0.0, 4.0), (0.5, 2.0)]);
}

// ============================================================================
// Interpolatable trait
// ============================================================================

#[test]
fn interpolatable_f32_linear() {
    assert!(approx(f32::interpolate_linear(2.0, 4.0, 0.25), 2.5));
}

#[test]
fn interpolatable_quat_linear_takes_shortest_path() {
    let a = Quat::from_rotation_z(0.1);
    let b = -Quat::from_rotation_z(0.3);
    let q = Quat::interpolate_linear(a, b, 0.5);
    assert!(q.angle_between(Quat::from_rotation_z(0.2)) < 1e-4);
}

// ============================================================================
// Animation container
// ============================================================================

#[test]
fn animation_duration_and_lookup() {
    let mut anim = Animation::new("run");
    assert!(approx(anim.speed_factor, 1.0));

    let hip = anim.add_channel_with("bone/hip/position", ValueType::Vec3);
    let weight = anim.add_channel(float_channel(&[0.0, 2.5], &[0.0, 1.0], InterpolationMode::Linear));

    {
        let channel = anim.channel_mut(hip).unwrap();
        channel.add_value(0.0, Vec3::ZERO).unwrap();
        channel.add_value(1.5, Vec3::X).unwrap();
    }

    anim.update_duration();
    assert!(approx(anim.duration(), 2.5));
    assert_eq!(anim.channel_count(), 2);

    assert!(anim.find_channel("bone/hip/position").is_some());
    assert!(anim.find_channel("bone/missing").is_none());

    anim.remove_channel(weight);
    anim.update_duration();
    assert!(approx(anim.duration(), 1.5));
}

#[test]
fn animation_loop_flag() {
    let mut anim = Animation::new("idle");
    assert!(!anim.is_looping());

    anim.set_looping(true);
    assert!(anim.flags.contains(AnimationFlags::LOOP));
    assert!(anim.to_string().contains("looping"));

    anim.set_looping(false);
    assert_eq!(anim.flags, AnimationFlags::empty());
}

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::scene::ScaledTransform;

/// Per-type interpolation operators used by channel sampling.
///
/// `interpolate_cubic` follows the Hermite form used for glTF cubic splines:
/// tangents are expressed per second and scaled by the segment length `dt`.
pub trait Interpolatable: Copy + Sized {
    /// Whether cubic-spline channels of this type blend as splines. Types that
    /// return `false` are sampled linearly in `CubicSpline` mode.
    const SUPPORTS_SPLINE: bool = true;

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    fn interpolate_cubic(
        v0: Self,
        out_tangent0: Self,
        in_tangent1: Self,
        v1: Self,
        t: f32,
        dt: f32,
    ) -> Self;

    /// Finite-difference slope `(next - prev) / span`.
    fn tangent(prev: Self, next: Self, span: f32) -> Self;
}

/// Hermite basis `[s0, s1, s2, s3]` for value0, tangent0, value1, tangent1.
#[inline]
fn hermite_basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;

    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;
    [s0, s1, s2, s3]
}

#[inline]
fn safe_span(span: f32) -> f32 {
    if span.abs() > 1e-6 { span } else { 1.0 }
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [s0, s1, s2, s3] = hermite_basis(t);
        let m0 = out_tangent0 * dt;
        let m1 = in_tangent1 * dt;

        s0 * v0 + s1 * m0 + s2 * v1 + s3 * m1
    }

    fn tangent(prev: Self, next: Self, span: f32) -> Self {
        (next - prev) / safe_span(span)
    }
}

macro_rules! impl_interpolatable_vector {
    ($($ty:ty),*) => {
        $(
            impl Interpolatable for $ty {
                fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
                    start.lerp(end, t)
                }

                fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
                    let [s0, s1, s2, s3] = hermite_basis(t);
                    let m0 = out_tangent0 * dt;
                    let m1 = in_tangent1 * dt;

                    v0 * s0 + m0 * s1 + v1 * s2 + m1 * s3
                }

                fn tangent(prev: Self, next: Self, span: f32) -> Self {
                    (next - prev) / safe_span(span)
                }
            }
        )*
    };
}

impl_interpolatable_vector!(Vec2, Vec3, Vec4);

impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        // glam's slerp already flips `end` to the shortest arc.
        start.slerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [s0, s1, s2, s3] = hermite_basis(t);

        let v0_v = Vec4::from(v0);
        let mut v1_v = Vec4::from(v1);
        if v0_v.dot(v1_v) < 0.0 {
            v1_v = -v1_v;
        }
        let m0_v = Vec4::from(out_tangent0) * dt;
        let m1_v = Vec4::from(in_tangent1) * dt;

        let result = v0_v * s0 + m0_v * s1 + v1_v * s2 + m1_v * s3;

        Quat::from_vec4(result).normalize()
    }

    fn tangent(prev: Self, next: Self, span: f32) -> Self {
        let p = Vec4::from(prev);
        let mut n = Vec4::from(next);
        if p.dot(n) < 0.0 {
            n = -n;
        }
        // Not a unit quaternion: a per-second derivative in xyzw space.
        Quat::from_vec4((n - p) / safe_span(span))
    }
}

impl Interpolatable for bool {
    const SUPPORTS_SPLINE: bool = false;

    fn interpolate_linear(start: Self, _end: Self, _t: f32) -> Self {
        start
    }

    fn interpolate_cubic(v0: Self, _: Self, _: Self, _: Self, _: f32, _: f32) -> Self {
        v0
    }

    fn tangent(prev: Self, _next: Self, _span: f32) -> Self {
        prev
    }
}

impl Interpolatable for i32 {
    const SUPPORTS_SPLINE: bool = false;

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        let v = f64::from(start) + (f64::from(end) - f64::from(start)) * f64::from(t);
        v.round() as i32
    }

    fn interpolate_cubic(v0: Self, _: Self, _: Self, _: Self, _: f32, _: f32) -> Self {
        v0
    }

    fn tangent(prev: Self, _next: Self, _span: f32) -> Self {
        prev
    }
}

impl Interpolatable for ScaledTransform {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(&end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        ScaledTransform {
            translation: Vec3::interpolate_cubic(
                v0.translation,
                out_tangent0.translation,
                in_tangent1.translation,
                v1.translation,
                t,
                dt,
            ),
            rotation: Quat::interpolate_cubic(
                v0.rotation,
                out_tangent0.rotation,
                in_tangent1.rotation,
                v1.rotation,
                t,
                dt,
            ),
            scale: Vec3::interpolate_cubic(v0.scale, out_tangent0.scale, in_tangent1.scale, v1.scale, t, dt),
        }
    }

    fn tangent(prev: Self, next: Self, span: f32) -> Self {
        ScaledTransform {
            translation: Vec3::tangent(prev.translation, next.translation, span),
            rotation: Quat::tangent(prev.rotation, next.rotation, span),
            scale: Vec3::tangent(prev.scale, next.scale, span),
        }
    }
}

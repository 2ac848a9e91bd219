//! Tree-walking evaluation of bound expressions.
//!
//! Evaluation runs in double precision; channel values are widened on the way
//! in and narrowed on the way out.

use glam::{DQuat, DVec2, DVec3, DVec4, EulerRot};

use crate::animation::{ChannelValue, ValueType};
use crate::expression::ast::{BinaryOp, UnaryOp};
use crate::expression::bind::{Builtin, Input, Node};

/// Runtime value of an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Val {
    Bool(bool),
    Number(f64),
    Vec2(DVec2),
    Vec3(DVec3),
    Vec4(DVec4),
    Quat(DQuat),
}

impl Val {
    pub(crate) fn from_channel(value: ChannelValue) -> Option<Self> {
        Some(match value {
            ChannelValue::Bool(b) => Self::Bool(b),
            ChannelValue::Int(i) => Self::Number(f64::from(i)),
            ChannelValue::Float(f) => Self::Number(f64::from(f)),
            ChannelValue::Vec2(v) => Self::Vec2(v.as_dvec2()),
            ChannelValue::Vec3(v) => Self::Vec3(v.as_dvec3()),
            ChannelValue::Vec4(v) => Self::Vec4(v.as_dvec4()),
            ChannelValue::Quat(q) => Self::Quat(q.as_dquat()),
            ChannelValue::Transform(_) => return None,
        })
    }

    /// Narrows back to the channel's storage type. Int channels round.
    pub(crate) fn into_channel(self, value_type: ValueType) -> Option<ChannelValue> {
        Some(match (self, value_type) {
            (Self::Bool(b), ValueType::Bool) => ChannelValue::Bool(b),
            (Self::Number(x), ValueType::Int) => ChannelValue::Int(x.round() as i32),
            (Self::Number(x), ValueType::Float) => ChannelValue::Float(x as f32),
            (Self::Vec2(v), ValueType::Vec2) => ChannelValue::Vec2(v.as_vec2()),
            (Self::Vec3(v), ValueType::Vec3) => ChannelValue::Vec3(v.as_vec3()),
            (Self::Vec4(v), ValueType::Vec4) => ChannelValue::Vec4(v.as_vec4()),
            (Self::Quat(q), ValueType::Quat) => ChannelValue::Quat(q.as_quat()),
            _ => return None,
        })
    }

    fn number(self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(x),
            _ => None,
        }
    }

    fn boolean(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn quat(self) -> Option<DQuat> {
        match self {
            Self::Quat(q) => Some(q),
            _ => None,
        }
    }

    fn component(self, index: usize) -> Option<f64> {
        match self {
            Self::Vec2(v) => v.to_array().get(index).copied(),
            Self::Vec3(v) => v.to_array().get(index).copied(),
            Self::Vec4(v) => v.to_array().get(index).copied(),
            Self::Quat(q) => q.to_array().get(index).copied(),
            _ => None,
        }
    }
}

/// Inputs visible to an expression.
pub(crate) struct Env {
    pub(crate) time: f64,
    pub(crate) time_index: f64,
    pub(crate) value: Val,
}

/// Evaluates a bound tree. `None` only for trees the binder would reject.
pub(crate) fn eval(node: &Node, env: &Env) -> Option<Val> {
    match node {
        Node::Number(x) => Some(Val::Number(*x)),
        Node::Bool(b) => Some(Val::Bool(*b)),
        Node::Input(Input::Time) => Some(Val::Number(env.time)),
        Node::Input(Input::TimeIndex) => Some(Val::Number(env.time_index)),
        Node::Input(Input::Value) => Some(env.value),
        Node::Component(base, index) => eval(base, env)?.component(*index).map(Val::Number),
        Node::Unary(op, inner) => {
            let v = eval(inner, env)?;
            match op {
                UnaryOp::Not => v.boolean().map(|b| Val::Bool(!b)),
                UnaryOp::Neg => match v {
                    Val::Quat(q) => Some(Val::Quat(-q)),
                    other => map(other, |x| -x),
                },
            }
        }
        Node::Binary(op, left, right) => eval_binary(*op, left, right, env),
        Node::Select(cond, then, otherwise) => {
            if eval(cond, env)?.boolean()? {
                eval(then, env)
            } else {
                eval(otherwise, env)
            }
        }
        Node::Call(builtin, args) => {
            if args.len() > 4 {
                return None;
            }
            let mut vals = [Val::Number(0.0); 4];
            for (slot, arg) in vals.iter_mut().zip(args.iter()) {
                *slot = eval(arg, env)?;
            }
            call(*builtin, &vals[..args.len()])
        }
    }
}

fn eval_binary(op: BinaryOp, left: &Node, right: &Node, env: &Env) -> Option<Val> {
    // Short-circuit logic operators
    match op {
        BinaryOp::And => {
            return Some(Val::Bool(eval(left, env)?.boolean()? && eval(right, env)?.boolean()?));
        }
        BinaryOp::Or => {
            return Some(Val::Bool(eval(left, env)?.boolean()? || eval(right, env)?.boolean()?));
        }
        _ => {}
    }

    let l = eval(left, env)?;
    let r = eval(right, env)?;

    match op {
        BinaryOp::Add => match (l, r) {
            (Val::Quat(a), Val::Quat(b)) => Some(Val::Quat(a + b)),
            _ => zip(l, r, |a, b| a + b),
        },
        BinaryOp::Sub => match (l, r) {
            (Val::Quat(a), Val::Quat(b)) => Some(Val::Quat(a - b)),
            _ => zip(l, r, |a, b| a - b),
        },
        BinaryOp::Mul => match (l, r) {
            (Val::Quat(a), Val::Quat(b)) => Some(Val::Quat(a * b)),
            (Val::Quat(q), Val::Vec3(v)) => Some(Val::Vec3(q * v)),
            (Val::Quat(q), Val::Number(s)) | (Val::Number(s), Val::Quat(q)) => Some(Val::Quat(q * s)),
            _ => zip(l, r, |a, b| a * b),
        },
        BinaryOp::Div => match (l, r) {
            (Val::Quat(q), Val::Number(s)) => Some(Val::Quat(q / s)),
            _ => zip(l, r, |a, b| a / b),
        },
        // Euclidean: never negative.
        BinaryOp::Mod => Some(Val::Number(l.number()?.rem_euclid(r.number()?))),
        BinaryOp::Lt => Some(Val::Bool(l.number()? < r.number()?)),
        BinaryOp::Le => Some(Val::Bool(l.number()? <= r.number()?)),
        BinaryOp::Gt => Some(Val::Bool(l.number()? > r.number()?)),
        BinaryOp::Ge => Some(Val::Bool(l.number()? >= r.number()?)),
        BinaryOp::Eq => Some(Val::Bool(l == r)),
        BinaryOp::Ne => Some(Val::Bool(l != r)),
        BinaryOp::And | BinaryOp::Or => None,
    }
}

/// Applies `f` to every component of a number or vector.
fn map(v: Val, f: impl Fn(f64) -> f64) -> Option<Val> {
    Some(match v {
        Val::Number(x) => Val::Number(f(x)),
        Val::Vec2(v) => Val::Vec2(DVec2::from_array(v.to_array().map(f))),
        Val::Vec3(v) => Val::Vec3(DVec3::from_array(v.to_array().map(f))),
        Val::Vec4(v) => Val::Vec4(DVec4::from_array(v.to_array().map(f))),
        Val::Bool(_) | Val::Quat(_) => return None,
    })
}

/// Component-wise binary op; a number on either side is broadcast.
fn zip(l: Val, r: Val, f: impl Fn(f64, f64) -> f64) -> Option<Val> {
    match (l, r) {
        (Val::Number(a), Val::Number(b)) => Some(Val::Number(f(a, b))),
        (Val::Number(s), v) => map(v, |x| f(s, x)),
        (v, Val::Number(s)) => map(v, |x| f(x, s)),
        (Val::Vec2(a), Val::Vec2(b)) => Some(Val::Vec2(DVec2::new(f(a.x, b.x), f(a.y, b.y)))),
        (Val::Vec3(a), Val::Vec3(b)) => Some(Val::Vec3(DVec3::new(f(a.x, b.x), f(a.y, b.y), f(a.z, b.z)))),
        (Val::Vec4(a), Val::Vec4(b)) => Some(Val::Vec4(DVec4::new(
            f(a.x, b.x),
            f(a.y, b.y),
            f(a.z, b.z),
            f(a.w, b.w),
        ))),
        _ => None,
    }
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn call(builtin: Builtin, args: &[Val]) -> Option<Val> {
    use Builtin as B;

    match (builtin, args) {
        (B::Sin, [v]) => map(*v, f64::sin),
        (B::Cos, [v]) => map(*v, f64::cos),
        (B::Tan, [v]) => map(*v, f64::tan),
        (B::Asin, [v]) => map(*v, f64::asin),
        (B::Acos, [v]) => map(*v, f64::acos),
        (B::Atan, [v]) => map(*v, f64::atan),
        (B::Sqrt, [v]) => map(*v, f64::sqrt),
        (B::Abs, [v]) => map(*v, f64::abs),
        (B::Floor, [v]) => map(*v, f64::floor),
        (B::Ceil, [v]) => map(*v, f64::ceil),
        (B::Fract, [v]) => map(*v, |x| x - x.floor()),
        (B::Round, [v]) => map(*v, f64::round),
        (B::Sign, [v]) => map(*v, sign),
        (B::Exp, [v]) => map(*v, f64::exp),
        (B::Ln, [v]) => map(*v, f64::ln),
        (B::Radians, [v]) => map(*v, f64::to_radians),
        (B::Degrees, [v]) => map(*v, f64::to_degrees),

        (B::Atan2, [y, x]) => zip(*y, *x, f64::atan2),
        (B::Pow, [a, b]) => zip(*a, *b, f64::powf),
        (B::Min, [a, b]) => zip(*a, *b, f64::min),
        (B::Max, [a, b]) => zip(*a, *b, f64::max),
        // `hi` wins when the bounds are inverted.
        (B::Clamp, [x, lo, hi]) => zip(zip(*x, *lo, f64::max)?, *hi, f64::min),
        (B::Lerp, [a, b, t]) => {
            let t = t.number()?;
            zip(*a, *b, |x, y| x + (y - x) * t)
        }

        (B::Vec2, [x, y]) => Some(Val::Vec2(DVec2::new(x.number()?, y.number()?))),
        (B::Vec3, [x, y, z]) => Some(Val::Vec3(DVec3::new(x.number()?, y.number()?, z.number()?))),
        (B::Vec4, [x, y, z, w]) => Some(Val::Vec4(DVec4::new(
            x.number()?,
            y.number()?,
            z.number()?,
            w.number()?,
        ))),
        (B::Quat, [x, y, z, w]) => Some(Val::Quat(DQuat::from_xyzw(
            x.number()?,
            y.number()?,
            z.number()?,
            w.number()?,
        ))),
        (B::Euler, [x, y, z]) => Some(Val::Quat(DQuat::from_euler(
            EulerRot::XYZ,
            x.number()?,
            y.number()?,
            z.number()?,
        ))),
        (B::AxisAngle, [Val::Vec3(axis), angle]) => Some(Val::Quat(DQuat::from_axis_angle(
            axis.normalize_or_zero(),
            angle.number()?,
        ))),

        (B::Slerp, [a, b, t]) => Some(Val::Quat(a.quat()?.slerp(b.quat()?, t.number()?))),
        (B::Normalize, [v]) => match *v {
            Val::Vec2(v) => Some(Val::Vec2(v.normalize_or_zero())),
            Val::Vec3(v) => Some(Val::Vec3(v.normalize_or_zero())),
            Val::Vec4(v) => Some(Val::Vec4(v.normalize_or_zero())),
            Val::Quat(q) => Some(Val::Quat(q.normalize())),
            _ => None,
        },
        (B::Length, [v]) => match *v {
            Val::Vec2(v) => Some(Val::Number(v.length())),
            Val::Vec3(v) => Some(Val::Number(v.length())),
            Val::Vec4(v) => Some(Val::Number(v.length())),
            Val::Quat(q) => Some(Val::Number(q.length())),
            _ => None,
        },
        (B::Dot, [a, b]) => match (*a, *b) {
            (Val::Vec2(a), Val::Vec2(b)) => Some(Val::Number(a.dot(b))),
            (Val::Vec3(a), Val::Vec3(b)) => Some(Val::Number(a.dot(b))),
            (Val::Vec4(a), Val::Vec4(b)) => Some(Val::Number(a.dot(b))),
            (Val::Quat(a), Val::Quat(b)) => Some(Val::Number(a.dot(b))),
            _ => None,
        },
        (B::Cross, [Val::Vec3(a), Val::Vec3(b)]) => Some(Val::Vec3(a.cross(*b))),
        (B::Inverse, [v]) => Some(Val::Quat(v.quat()?.inverse())),
        _ => None,
    }
}

//! Static typing of a parsed expression against the channel's value type.
//!
//! Binding resolves identifiers and functions and checks every operator's
//! operand types, so evaluation never meets a type it cannot handle.

use std::fmt;

use smallvec::SmallVec;

use crate::animation::ValueType;
use crate::expression::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::expression::error::ExpressionError;

/// Static type of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ty {
    Bool,
    Number,
    Vec2,
    Vec3,
    Vec4,
    Quat,
}

impl Ty {
    /// The expression type a channel value maps to, if any.
    pub(crate) fn for_channel(value_type: ValueType) -> Option<Self> {
        match value_type {
            ValueType::Bool => Some(Self::Bool),
            ValueType::Int | ValueType::Float => Some(Self::Number),
            ValueType::Vec2 => Some(Self::Vec2),
            ValueType::Vec3 => Some(Self::Vec3),
            ValueType::Vec4 => Some(Self::Vec4),
            ValueType::Quat => Some(Self::Quat),
            ValueType::Transform => None,
        }
    }

    fn is_vector(self) -> bool {
        matches!(self, Self::Vec2 | Self::Vec3 | Self::Vec4)
    }

    /// Number or vector: types that support component-wise arithmetic.
    fn is_numeric(self) -> bool {
        self == Self::Number || self.is_vector()
    }

    fn component_count(self) -> usize {
        match self {
            Self::Bool | Self::Number => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Quat => 4,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Quat => "quat",
        })
    }
}

/// Inputs an expression can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Input {
    Time,
    TimeIndex,
    Value,
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    // Component-wise unary math on numbers and vectors
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Fract,
    Round,
    Sign,
    Exp,
    Ln,
    Radians,
    Degrees,
    // Component-wise binary / ternary
    Atan2,
    Pow,
    Min,
    Max,
    Clamp,
    Lerp,
    // Constructors
    Vec2,
    Vec3,
    Vec4,
    Quat,
    Euler,
    AxisAngle,
    // Geometry
    Slerp,
    Normalize,
    Length,
    Dot,
    Cross,
    Inverse,
}

impl Builtin {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "sqrt" => Self::Sqrt,
            "abs" => Self::Abs,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "fract" => Self::Fract,
            "round" => Self::Round,
            "sign" => Self::Sign,
            "exp" => Self::Exp,
            "ln" => Self::Ln,
            "radians" => Self::Radians,
            "degrees" => Self::Degrees,
            "atan2" => Self::Atan2,
            "pow" => Self::Pow,
            "min" => Self::Min,
            "max" => Self::Max,
            "clamp" => Self::Clamp,
            "lerp" => Self::Lerp,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "vec4" => Self::Vec4,
            "quat" => Self::Quat,
            "euler" => Self::Euler,
            "axis_angle" => Self::AxisAngle,
            "slerp" => Self::Slerp,
            "normalize" => Self::Normalize,
            "length" => Self::Length,
            "dot" => Self::Dot,
            "cross" => Self::Cross,
            "inverse" => Self::Inverse,
            _ => return None,
        })
    }

    fn is_elementwise_unary(self) -> bool {
        matches!(
            self,
            Self::Sin
                | Self::Cos
                | Self::Tan
                | Self::Asin
                | Self::Acos
                | Self::Atan
                | Self::Sqrt
                | Self::Abs
                | Self::Floor
                | Self::Ceil
                | Self::Fract
                | Self::Round
                | Self::Sign
                | Self::Exp
                | Self::Ln
                | Self::Radians
                | Self::Degrees
        )
    }
}

/// Typed, resolved expression tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    Bool(bool),
    Input(Input),
    Component(Box<Node>, usize),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Select(Box<Node>, Box<Node>, Box<Node>),
    Call(Builtin, SmallVec<[Box<Node>; 4]>),
}

/// Binds `expr` and checks that it produces `expected`.
pub(crate) fn bind(expr: &Expr, value_ty: Ty, expected: Ty) -> Result<Node, ExpressionError> {
    let binder = Binder { value_ty };
    let (node, ty) = binder.bind(expr)?;
    if ty != expected {
        return Err(ExpressionError::new(
            expr.offset,
            format!("expression yields {ty}, channel expects {expected}"),
        ));
    }
    Ok(node)
}

struct Binder {
    value_ty: Ty,
}

impl Binder {
    fn bind(&self, expr: &Expr) -> Result<(Node, Ty), ExpressionError> {
        let at = expr.offset;
        match &expr.kind {
            ExprKind::Number(v) => Ok((Node::Number(*v), Ty::Number)),
            ExprKind::Bool(b) => Ok((Node::Bool(*b), Ty::Bool)),
            ExprKind::Ident(name) => self.bind_ident(name, at),
            ExprKind::Member { base, field } => {
                let (node, ty) = self.bind(base)?;
                let index = component_index(field, ty)
                    .ok_or_else(|| ExpressionError::new(at, format!("{ty} has no field '{field}'")))?;
                Ok((Node::Component(Box::new(node), index), Ty::Number))
            }
            ExprKind::Unary { op, expr: inner } => {
                let (node, ty) = self.bind(inner)?;
                let ok = match op {
                    UnaryOp::Neg => ty.is_numeric() || ty == Ty::Quat,
                    UnaryOp::Not => ty == Ty::Bool,
                };
                if !ok {
                    let sym = if *op == UnaryOp::Neg { '-' } else { '!' };
                    return Err(ExpressionError::new(at, format!("cannot apply '{sym}' to {ty}")));
                }
                Ok((Node::Unary(*op, Box::new(node)), ty))
            }
            ExprKind::Binary { op, left, right } => {
                let (l, lt) = self.bind(left)?;
                let (r, rt) = self.bind(right)?;
                let ty = binary_result(*op, lt, rt).ok_or_else(|| {
                    ExpressionError::new(at, format!("cannot apply '{}' to {lt} and {rt}", op.symbol()))
                })?;
                Ok((Node::Binary(*op, Box::new(l), Box::new(r)), ty))
            }
            ExprKind::Conditional { cond, then, otherwise } => {
                let (c, ct) = self.bind(cond)?;
                if ct != Ty::Bool {
                    return Err(ExpressionError::new(at, format!("condition must be bool, found {ct}")));
                }
                let (a, at_ty) = self.bind(then)?;
                let (b, bt) = self.bind(otherwise)?;
                if at_ty != bt {
                    return Err(ExpressionError::new(
                        at,
                        format!("conditional branches differ: {at_ty} and {bt}"),
                    ));
                }
                Ok((Node::Select(Box::new(c), Box::new(a), Box::new(b)), at_ty))
            }
            ExprKind::Call { func, args } => {
                let builtin = Builtin::lookup(func)
                    .ok_or_else(|| ExpressionError::new(at, format!("unknown function '{func}'")))?;
                let mut nodes = SmallVec::with_capacity(args.len());
                let mut types: SmallVec<[Ty; 4]> = SmallVec::with_capacity(args.len());
                for arg in args {
                    let (n, t) = self.bind(arg)?;
                    nodes.push(Box::new(n));
                    types.push(t);
                }
                let ty = call_result(builtin, &types).ok_or_else(|| {
                    let list = types.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                    ExpressionError::new(at, format!("no overload of '{func}' takes ({list})"))
                })?;
                Ok((Node::Call(builtin, nodes), ty))
            }
        }
    }

    fn bind_ident(&self, name: &str, at: usize) -> Result<(Node, Ty), ExpressionError> {
        match name {
            "time" => Ok((Node::Input(Input::Time), Ty::Number)),
            "timeIndex" => Ok((Node::Input(Input::TimeIndex), Ty::Number)),
            "value" => Ok((Node::Input(Input::Value), self.value_ty)),
            "pi" => Ok((Node::Number(std::f64::consts::PI), Ty::Number)),
            "tau" => Ok((Node::Number(std::f64::consts::TAU), Ty::Number)),
            _ => Err(ExpressionError::new(at, format!("unknown identifier '{name}'"))),
        }
    }
}

fn component_index(field: &str, ty: Ty) -> Option<usize> {
    if !(ty.is_vector() || ty == Ty::Quat) {
        return None;
    }
    let index = match field {
        "x" | "r" => 0,
        "y" | "g" => 1,
        "z" | "b" => 2,
        "w" | "a" => 3,
        _ => return None,
    };
    (index < ty.component_count()).then_some(index)
}

fn binary_result(op: BinaryOp, l: Ty, r: Ty) -> Option<Ty> {
    use BinaryOp::{Add, And, Div, Eq, Ge, Gt, Le, Lt, Mod, Mul, Ne, Or, Sub};

    match op {
        Add | Sub => (l == r && (l.is_numeric() || l == Ty::Quat)).then_some(l),
        Mul => match (l, r) {
            (Ty::Quat, Ty::Quat) => Some(Ty::Quat),
            (Ty::Quat, Ty::Vec3) => Some(Ty::Vec3),
            (Ty::Number, Ty::Quat) | (Ty::Quat, Ty::Number) => Some(Ty::Quat),
            _ => scalar_broadcast(l, r),
        },
        Div => match (l, r) {
            (Ty::Quat, Ty::Number) => Some(Ty::Quat),
            (_, Ty::Number) if l.is_numeric() => Some(l),
            _ if l == r && l.is_vector() => Some(l),
            _ => None,
        },
        Mod => (l == Ty::Number && r == Ty::Number).then_some(Ty::Number),
        Lt | Le | Gt | Ge => (l == Ty::Number && r == Ty::Number).then_some(Ty::Bool),
        Eq | Ne => (l == r).then_some(Ty::Bool),
        And | Or => (l == Ty::Bool && r == Ty::Bool).then_some(Ty::Bool),
    }
}

/// Same numeric type, or a number combined with a vector.
fn scalar_broadcast(l: Ty, r: Ty) -> Option<Ty> {
    match (l, r) {
        _ if l == r && l.is_numeric() => Some(l),
        (Ty::Number, v) | (v, Ty::Number) if v.is_vector() => Some(v),
        _ => None,
    }
}

fn call_result(builtin: Builtin, args: &[Ty]) -> Option<Ty> {
    use Builtin as B;

    if builtin.is_elementwise_unary() {
        return match args {
            [t] if t.is_numeric() => Some(*t),
            _ => None,
        };
    }

    match (builtin, args) {
        (B::Atan2 | B::Pow | B::Min | B::Max, [a, b]) => scalar_broadcast(*a, *b),
        (B::Clamp, [x, lo, hi]) if x.is_numeric() && lo == hi && (lo == x || *lo == Ty::Number) => Some(*x),
        (B::Lerp, [a, b, Ty::Number]) if a == b && a.is_numeric() => Some(*a),
        (B::Vec2, [Ty::Number, Ty::Number]) => Some(Ty::Vec2),
        (B::Vec3, [Ty::Number, Ty::Number, Ty::Number]) => Some(Ty::Vec3),
        (B::Vec4, [Ty::Number, Ty::Number, Ty::Number, Ty::Number]) => Some(Ty::Vec4),
        (B::Quat, [Ty::Number, Ty::Number, Ty::Number, Ty::Number])
        | (B::Euler, [Ty::Number, Ty::Number, Ty::Number])
        | (B::AxisAngle, [Ty::Vec3, Ty::Number])
        | (B::Slerp, [Ty::Quat, Ty::Quat, Ty::Number])
        | (B::Inverse, [Ty::Quat]) => Some(Ty::Quat),
        (B::Normalize, [t]) if t.is_vector() || *t == Ty::Quat => Some(*t),
        (B::Length, [t]) if t.is_vector() || *t == Ty::Quat => Some(Ty::Number),
        (B::Dot, [a, b]) if a == b && (a.is_vector() || *a == Ty::Quat) => Some(Ty::Number),
        (B::Cross, [Ty::Vec3, Ty::Vec3]) => Some(Ty::Vec3),
        _ => None,
    }
}

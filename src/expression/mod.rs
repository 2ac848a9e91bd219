//! Value expressions: small formulas that post-process sampled channel values.
//!
//! An expression is compiled once against the channel's value type and then
//! evaluated after every sample:
//!
//! ```text
//! value * (1 + 0.1 * sin(time * 2 * pi))
//! timeIndex % 2 == 0 ? value : -value
//! value * euler(0, 0, time)
//! ```
//!
//! Inputs are `time`, `timeIndex` and `value`. Vector and quaternion values
//! expose `.x .y .z .w`. The result type must equal the channel's type.

mod ast;
mod bind;
mod error;
mod eval;
mod lexer;
mod parser;

use std::fmt;

use crate::animation::{ChannelType, ValueType};

pub use error::ExpressionError;

use bind::{Node, Ty};
use eval::{Env, Val};

/// A compiled value expression bound to one channel value type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpression {
    source: String,
    value_type: ValueType,
    root: Node,
}

impl ValueExpression {
    /// Parses and type-checks `source` for channels of `value_type`.
    pub fn compile(source: &str, value_type: ValueType) -> Result<Self, ExpressionError> {
        let ty = Ty::for_channel(value_type).ok_or_else(|| {
            ExpressionError::new(0, format!("{value_type} channels do not support expressions"))
        })?;
        let expr = parser::parse_expr(source)?;
        let root = bind::bind(&expr, ty, ty)?;
        Ok(Self {
            source: source.to_owned(),
            value_type,
            root,
        })
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Evaluates the expression and replaces `value` with the result.
    ///
    /// Returns `false`, leaving `value` untouched, when `T` is not the type the
    /// expression was compiled for.
    pub fn apply<T: ChannelType>(&self, time: f64, time_index: usize, value: &mut T) -> bool {
        if T::VALUE_TYPE != self.value_type {
            log::warn!(
                "Expression '{}' compiled for {} applied to a {} value",
                self.source,
                self.value_type,
                T::VALUE_TYPE
            );
            return false;
        }

        let Some(input) = Val::from_channel(value.into_value()) else {
            return false;
        };
        let env = Env {
            time,
            time_index: time_index as f64,
            value: input,
        };

        match eval::eval(&self.root, &env)
            .and_then(|v| v.into_channel(self.value_type))
            .and_then(T::from_value)
        {
            Some(result) => {
                *value = result;
                true
            }
            None => {
                log::warn!("Expression '{}' failed to evaluate", self.source);
                false
            }
        }
    }
}

impl fmt::Display for ValueExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

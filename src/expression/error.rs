use thiserror::Error;

/// Compile error of a value expression, located by byte offset into the
/// source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("at byte {offset}: {message}")]
pub struct ExpressionError {
    pub offset: usize,
    pub message: String,
}

impl ExpressionError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

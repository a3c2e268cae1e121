use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A policy text that could not be turned into a [`crate::Policy`].
///
/// `line` and `column` are 1-based and point at the offending token (or at the
/// end of input when the text stops early). `text` is the complete policy text
/// that was being parsed, so operators can see what was rejected.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    pub message: String,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub(crate) fn new(
        message: impl Into<String>,
        text: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        ParseError {
            message: message.into(),
            text: text.into(),
            line,
            column,
        }
    }
}

#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicyError {
    #[error("failed to parse policy: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("entity type must not be empty")]
    EmptyEntityType,
}

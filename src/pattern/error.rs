use thiserror::Error;

use super::field::Dimension;

/// Construction errors for availability patterns. Raised eagerly; a pattern
/// is never partially built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("invalid pattern: expected 5 fields, got {0}")]
    FieldCount(usize),
    #[error("invalid {dimension} token {token:?}")]
    Syntax { dimension: Dimension, token: String },
    #[error("invalid range {token} for {dimension} (valid values: {min}-{max})")]
    Range {
        dimension: Dimension,
        token: String,
        min: u32,
        max: u32,
    },
    #[error("invalid step in {token} for {dimension} (valid values: >= 1)")]
    Step { dimension: Dimension, token: String },
}

//! Error taxonomy for the quoting engine

use thiserror::Error;

/// Errors surfaced to callers before any output is constructed.
///
/// Lookup fallbacks (unknown pixel pitch) are deliberately not errors; they
/// resolve to documented defaults and are logged at warn level.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput {
        field: &'static str,
        reason: String,
    },
}

impl QuoteError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        QuoteError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

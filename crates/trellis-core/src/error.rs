//! Error type for request adaptation.

/// Errors raised before any routing happens.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invariant violation: request has no Host header")]
    MissingHost,

    #[error("invariant violation: invalid request url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to read request body: {0}")]
    Body(String),
}

impl CoreError {
    /// Whether this error signals a malformed request rather than an I/O failure.
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::MissingHost | Self::InvalidUrl { .. })
    }
}

//! Client fetch errors.

use trellis_data::WireError;

/// Why a cache entry failed to load.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    /// Error raised by the server, shipped in development mode.
    #[error("{0}")]
    Remote(WireError),

    /// Opaque failure; details are withheld outside development.
    #[error("invariant")]
    Invariant,

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not a valid envelope.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl CacheError {
    pub fn transport(message: impl std::fmt::Display) -> Self {
        Self::Transport(message.to_string())
    }

    /// Decoding failures are deterministic; retrying cannot help.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }

    /// The transported server error, if any.
    pub fn remote(&self) -> Option<&WireError> {
        match self {
            Self::Remote(wire) => Some(wire),
            _ => None,
        }
    }
}

//! Streaming and template errors.

use trellis_data::WireError;

/// The HTML template is missing a marker or repeats one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template is missing the `{0}` marker")]
    MissingMarker(&'static str),

    #[error("template contains the `{0}` marker more than once")]
    DuplicateMarker(&'static str),
}

/// Failure while producing or writing the response body.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    /// The renderer failed to produce a chunk.
    #[error("render failed: {0}")]
    Render(WireError),

    /// The transport refused a write.
    #[error("failed to write response: {0}")]
    Sink(String),

    /// The sink was used after it completed or failed.
    #[error("response already finished")]
    Finished,
}

impl StreamError {
    pub fn render(error: WireError) -> Self {
        Self::Render(error)
    }

    /// Portable representation for development error bodies.
    pub fn to_wire(&self) -> WireError {
        match self {
            Self::Render(wire) => wire.clone(),
            other => WireError::new("StreamError", other.to_string()),
        }
    }
}

//! Error types for the request pipeline.

use thiserror::Error;
use trellis_core::CoreError;
use trellis_data::{CodecError, WireError};
use trellis_executor::{LoaderError, RenderError};
use trellis_router::RouteError;
use trellis_streaming::{StreamError, TemplateError};

/// Errors that can occur while building an app or serving a request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The incoming request could not be adapted.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A route file could not be parsed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A loader or module resolution failed.
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// A component failed to render.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The HTML template is malformed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The body stream failed before anything was written.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Loader data could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Embedded data does not fit the route matched on the client.
    #[error("embedded data has {found} results but `{pathname}` matches {expected} routes")]
    HydrationMismatch {
        pathname: String,
        expected: usize,
        found: usize,
    },

    /// The server sent an error instead of data.
    #[error("embedded data carries an error: {0}")]
    Embedded(WireError),

    /// A loader redirected to a target that is not a valid header value.
    #[error("invalid redirect target `{0}`")]
    InvalidRedirect(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ServerError {
    /// Portable representation for development error bodies.
    pub fn to_wire(&self) -> WireError {
        match self {
            Self::Loader(e) => e.to_wire(),
            Self::Render(e) => e.to_wire(),
            Self::Stream(e) => e.to_wire(),
            Self::Embedded(wire) => wire.clone(),
            Self::Core(e) => WireError::from_error("InvariantError", e),
            Self::Template(e) => WireError::from_error("TemplateError", e),
            other => WireError::from_error("Error", other),
        }
    }
}

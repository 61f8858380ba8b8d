//! Route table errors.

use thiserror::Error;

/// Errors raised while building a route table.
#[derive(Error, Debug)]
pub enum RouteError {
    /// The route file path has no usable file name.
    #[error("empty route file path: `{0}`")]
    Empty(String),

    /// A bracketed segment is malformed.
    #[error("invalid parameter segment `{segment}` in `{file}`")]
    InvalidParam { file: String, segment: String },

    /// A catch-all segment is followed by more segments.
    #[error("catch-all segment must be last in `{0}`")]
    CatchAllNotLast(String),

    /// Two files normalize to the same route id.
    #[error("duplicate route `{0}`")]
    Duplicate(String),

    /// Scanning the routes directory failed.
    #[error("failed to scan routes directory: {0}")]
    Io(#[from] walkdir::Error),
}

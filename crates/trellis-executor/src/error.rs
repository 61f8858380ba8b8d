//! Loader and module errors.

use std::path::PathBuf;

use serde_json::Value;
use trellis_data::WireError;

/// Boxed error raised by application code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while resolving modules or running loaders.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Raised by a loader with a message and optional structured details.
    #[error("{message}")]
    Custom {
        message: String,
        data: Option<Value>,
    },

    /// Any other error a loader bubbled up.
    #[error(transparent)]
    Other(BoxError),

    /// A loader failed; wraps the underlying error with the route it ran for.
    #[error("loader for `{route}` failed")]
    Failed {
        route: String,
        #[source]
        source: Box<LoaderError>,
    },

    /// Route has no registered page module.
    #[error("no page module registered for route `{0}`")]
    ModuleNotFound(String),

    /// The HTML template could not be read.
    #[error("failed to read template `{path}`")]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoaderError {
    /// Error with a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
            data: None,
        }
    }

    /// Error with a message and details shipped to the client in development.
    pub fn with_data(message: impl Into<String>, data: Value) -> Self {
        Self::Custom {
            message: message.into(),
            data: Some(data),
        }
    }

    /// Wrap any error.
    pub fn other(error: impl Into<BoxError>) -> Self {
        Self::Other(error.into())
    }

    /// Attach the route a loader ran for.
    pub fn in_route(self, route: impl Into<String>) -> Self {
        match self {
            already @ Self::Failed { .. } => already,
            source => Self::Failed {
                route: route.into(),
                source: Box::new(source),
            },
        }
    }

    /// Portable representation including the cause chain.
    pub fn to_wire(&self) -> WireError {
        match self {
            Self::Custom { message, data } => {
                let wire = WireError::new("LoaderError", message.clone());
                match data {
                    Some(data) => wire.with_data(data.clone()),
                    None => wire,
                }
            }
            Self::Failed { route, source } => {
                WireError::new("LoaderError", self.to_string())
                    .with_data(serde_json::json!({ "route": route }))
                    .with_cause(source.to_wire())
            }
            Self::Other(inner) => WireError::from_error("Error", inner.as_ref()),
            Self::ModuleNotFound(_) => WireError::new("ModuleNotFound", self.to_string()),
            Self::Template { .. } => WireError::from_error("TemplateError", self),
        }
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(error: serde_json::Error) -> Self {
        Self::other(error)
    }
}

/// A component failed to render.
#[derive(Debug, Clone, thiserror::Error)]
#[error("component `{component}` failed to render: {message}")]
pub struct RenderError {
    pub component: String,
    pub message: String,
}

impl RenderError {
    pub fn new(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn to_wire(&self) -> WireError {
        WireError::new("RenderError", self.message.clone())
            .with_data(serde_json::json!({ "component": self.component }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_custom_error_keeps_data() {
        let wire = LoaderError::with_data("not allowed", json!({ "code": 403 })).to_wire();
        assert_eq!(wire.name, "LoaderError");
        assert_eq!(wire.message, "not allowed");
        assert_eq!(wire.data, Some(json!({ "code": 403 })));
    }

    #[test]
    fn test_route_context_becomes_cause_chain() {
        let err = LoaderError::msg("db down").in_route("users/[id]");
        let wire = err.to_wire();

        let messages: Vec<&str> = wire.chain().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["loader for `users/[id]` failed", "db down"]);
        assert_eq!(wire.data, Some(json!({ "route": "users/[id]" })));
    }

    #[test]
    fn test_in_route_does_not_double_wrap() {
        let err = LoaderError::msg("x").in_route("a").in_route("b");
        assert!(matches!(err, LoaderError::Failed { route, .. } if route == "a"));
    }

    #[test]
    fn test_other_error_walks_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "refused");
        let wire = LoaderError::other(io).to_wire();
        assert_eq!(wire.message, "refused");
    }
}

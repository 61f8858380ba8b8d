//! Subscriber initialisation.

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;
use trellis_core::Mode;

/// Output format for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines, for production log aggregation.
    #[default]
    Json,
    /// Human-readable, for development.
    Human,
}

impl LogFormat {
    /// Default format for the process mode.
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Development => Self::Human,
            Mode::Production => Self::Json,
        }
    }
}

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,trellis=debug";

/// Install the global subscriber writing to stderr. `RUST_LOG` overrides
/// `default_filter`.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(format: LogFormat, default_filter: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Human => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for_mode() {
        assert_eq!(LogFormat::for_mode(Mode::Development), LogFormat::Human);
        assert_eq!(LogFormat::for_mode(Mode::Production), LogFormat::Json);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging(LogFormat::Human, DEFAULT_FILTER);
        assert!(init_logging(LogFormat::Json, DEFAULT_FILTER).is_err());
    }
}

//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trellis_cache::DATA_PARAM;
use trellis_core::Mode;
use trellis_streaming::EmptyBodyPolicy;

use crate::error::ServerError;

/// Default global the embedded data is assigned to.
pub const DATA_GLOBAL: &str = "__TRELLIS_DATA__";

/// Configuration for a trellis application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, used in logs.
    pub name: String,
    /// Development or production.
    pub mode: Mode,
    /// Path of the HTML template.
    pub template: Option<PathBuf>,
    /// Query parameter selecting the data endpoint.
    pub data_param: String,
    /// Window global carrying the embedded loader results.
    pub data_global: String,
    /// What to send when a page renders to nothing.
    pub empty_body: EmptyBodyPolicy,
    /// Body of 404 responses.
    pub not_found_body: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "trellis".to_string(),
            mode: Mode::default(),
            template: None,
            data_param: DATA_PARAM.to_string(),
            data_global: DATA_GLOBAL.to_string(),
            empty_body: EmptyBodyPolicy::default(),
            not_found_body: "Not Found".to_string(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with the given app name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Defaults with the mode taken from `TRELLIS_ENV`.
    pub fn from_env() -> Self {
        Self {
            mode: Mode::from_env(),
            ..Default::default()
        }
    }

    /// Parse from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ServerError> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read a TOML file. A relative template path resolves against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&text)?;

        if let (Some(template), Some(dir)) = (&config.template, path.parent()) {
            if template.is_relative() {
                config.template = Some(dir.join(template));
            }
        }
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ServerError> {
        toml::to_string_pretty(self).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    pub fn with_data_param(mut self, param: impl Into<String>) -> Self {
        self.data_param = param.into();
        self
    }

    pub fn with_data_global(mut self, global: impl Into<String>) -> Self {
        self.data_global = global.into();
        self
    }

    pub fn with_empty_body(mut self, policy: EmptyBodyPolicy) -> Self {
        self.empty_body = policy;
        self
    }

    pub fn with_not_found_body(mut self, body: impl Into<String>) -> Self {
        self.not_found_body = body.into();
        self
    }
}

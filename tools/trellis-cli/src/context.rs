//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::{CliConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = match config_path {
            Some(path) => CliConfig::load(path)?,
            None => match find_config(&cwd) {
                Some(path) => CliConfig::load(path)?,
                None => CliConfig::default(),
            },
        };

        if let Some(source) = &config.source {
            output.debug(&format!("Using config: {}", source.display()));
        }

        Ok(Self { config, output, cwd })
    }

    /// Routes directory, from `--dir` or the config.
    pub fn routes_dir(&self, dir: Option<&str>) -> PathBuf {
        match dir {
            Some(dir) => self.resolve_path(dir),
            None => self.resolve_path(&self.config.routes.dir.to_string_lossy()),
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find the nearest config file in `start` or its ancestors.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

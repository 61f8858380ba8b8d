//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use trellis_server::AppConfig;

/// File names searched for, in order, from the working directory upwards.
pub const CONFIG_NAMES: [&str; 2] = ["trellis.toml", ".trellis.toml"];

/// Contents of `trellis.toml`: the app config plus a `[routes]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub app: AppConfig,

    /// Route discovery settings.
    #[serde(default)]
    pub routes: RoutesConfig,

    /// File this config was read from.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl CliConfig {
    /// Load config from a file. Relative paths resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?;

        if let Some(dir) = path.parent() {
            if let Some(template) = config.app.template.as_mut() {
                if template.is_relative() {
                    *template = dir.join(&*template);
                }
            }
            if config.routes.dir.is_relative() {
                config.routes.dir = dir.join(&config.routes.dir);
            }
        }
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Extensions as string slices, for route discovery.
    pub fn extensions(&self) -> Vec<&str> {
        self.routes.extensions.iter().map(String::as_str).collect()
    }
}

/// Where route files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    /// Routes root (default: `routes`).
    #[serde(default = "default_routes_dir")]
    pub dir: PathBuf,

    /// Extensions of route files (default: `rs`).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_routes_dir() -> PathBuf {
    PathBuf::from("routes")
}

fn default_extensions() -> Vec<String> {
    vec!["rs".to_string()]
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            dir: default_routes_dir(),
            extensions: default_extensions(),
        }
    }
}

/// Generate a default trellis.toml config file.
pub fn generate_default_config(name: &str) -> String {
    format!(
        r#"# Trellis application configuration

name = "{name}"
# "development" or "production"; TRELLIS_ENV decides at runtime
mode = "development"
template = "index.html"

# Query parameter that turns a page URL into a data request
data_param = ".get"
data_global = "__TRELLIS_DATA__"

# "flush" sends the template even when a page renders nothing
empty_body = "flush"
not_found_body = "Not Found"

[routes]
dir = "routes"
extensions = ["rs"]
"#,
        name = name
    )
}

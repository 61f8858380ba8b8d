//! Process-wide mode switch.

use serde::{Deserialize, Serialize};

/// Selects between the live-reloading development pipeline and the
/// prebuilt production bundle.
///
/// Read once at startup and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    /// Environment variable consulted by [`Mode::from_env`].
    pub const ENV_VAR: &'static str = "TRELLIS_ENV";

    /// Read the mode from `TRELLIS_ENV`.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(Self::ENV_VAR).ok().as_deref())
    }

    /// `production`/`prod` (any case) select production; anything else is development.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production") | Some("prod") => Self::Production,
            _ => Self::Development,
        }
    }

    /// Check if detailed errors may be exposed.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Get the name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

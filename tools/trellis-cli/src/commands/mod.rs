//! CLI command implementations.

pub mod config;
pub mod resolve;
pub mod routes;
pub mod template;

use clap::{Args, Subcommand};

/// Arguments for the routes command.
#[derive(Args)]
pub struct RoutesArgs {
    /// Routes directory (default: from config).
    #[arg(short, long)]
    pub dir: Option<String>,
}

/// Arguments for the match command.
#[derive(Args)]
pub struct MatchArgs {
    /// Pathname to resolve, e.g. `/users/42`.
    pub path: String,

    /// Routes directory (default: from config).
    #[arg(short, long)]
    pub dir: Option<String>,
}

/// Arguments for the template command.
#[derive(Args)]
pub struct TemplateArgs {
    /// Template file (default: from config).
    pub file: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Application name (default: directory name).
        #[arg(short, long)]
        name: Option<String>,

        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Check that the routes directory and template are usable.
    Validate,
}

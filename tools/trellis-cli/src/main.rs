//! Trellis CLI - Developer tool for trellis applications.
//!
//! Commands:
//! - `trellis routes` - List the routes discovered in a directory
//! - `trellis match` - Show the layout chain a pathname resolves to
//! - `trellis template` - Validate an HTML template
//! - `trellis config` - Show, create or validate `trellis.toml`

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use trellis_observability::{init_logging, LogFormat};

use commands::{ConfigArgs, MatchArgs, RoutesArgs, TemplateArgs};

/// Trellis CLI - Inspect routes, templates and configuration
#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes found under the routes directory
    Routes(RoutesArgs),

    /// Resolve a pathname to its route chain
    Match(MatchArgs),

    /// Validate an HTML template's markers
    Template(TemplateArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    install_logging(cli.verbose, &output);
    let ctx = context::Context::load(cli.config.as_deref(), output)?;

    let result = match cli.command {
        Commands::Routes(args) => commands::routes::run(args, &ctx).await,
        Commands::Match(args) => commands::resolve::run(args, &ctx).await,
        Commands::Template(args) => commands::template::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

/// Install the log subscriber, warning instead of failing when one is
/// already set. Returns whether this call installed it.
fn install_logging(verbose: bool, output: &output::Output) -> bool {
    let filter = if verbose { "debug" } else { "warn" };
    match init_logging(LogFormat::Human, filter) {
        Ok(()) => true,
        Err(e) => {
            output.warn(&format!("logging disabled: {}", e));
            false
        }
    }
}

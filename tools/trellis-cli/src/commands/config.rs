//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use trellis_router::RouteTable;
use trellis_streaming::Template;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CONFIG_NAMES};
use crate::context::Context;
use crate::output::mode_badge;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { name, force } => init_config(name, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config.source {
        Some(source) => ctx.output.kv("file", &source.display().to_string()),
        None => ctx.output.info("No trellis.toml found, showing defaults"),
    }

    let app = &ctx.config.app;
    ctx.output.kv("name", &app.name);
    ctx.output.kv("mode", &mode_badge(app.mode));
    ctx.output.kv(
        "template",
        &app.template
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string()),
    );
    ctx.output.kv("data_param", &app.data_param);
    ctx.output.kv("data_global", &app.data_global);
    ctx.output.kv("empty_body", &format!("{:?}", app.empty_body).to_lowercase());
    ctx.output.kv("not_found_body", &app.not_found_body);

    ctx.output.info("[routes]");
    ctx.output.kv("dir", &ctx.config.routes.dir.display().to_string());
    ctx.output.kv("extensions", &ctx.config.routes.extensions.join(", "));

    Ok(())
}

fn init_config(name: Option<String>, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let name = name.unwrap_or_else(|| {
        ctx.cwd
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("trellis-app")
            .to_string()
    });

    fs::write(&config_path, generate_default_config(&name))?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let app = &ctx.config.app;

    if app.name.is_empty() {
        errors.push("name is required".to_string());
    }
    if app.data_param.is_empty() {
        errors.push("data_param must not be empty".to_string());
    }
    if !is_identifier(&app.data_global) {
        errors.push(format!("data_global '{}' is not a valid identifier", app.data_global));
    }

    match &app.template {
        None => warnings.push("no template configured".to_string()),
        Some(path) => match fs::read_to_string(path) {
            Ok(source) => {
                if let Err(e) = Template::parse(&source) {
                    errors.push(format!("template {}: {}", path.display(), e));
                }
            }
            Err(e) => errors.push(format!("template {}: {}", path.display(), e)),
        },
    }

    let dir = ctx.routes_dir(None);
    match RouteTable::from_dir(&dir, &ctx.config.extensions()) {
        Ok(table) if table.is_empty() => warnings.push(format!("no routes found in {}", dir.display())),
        Ok(table) => ctx.output.debug(&format!("{} routes in {}", table.len(), dir.display())),
        Err(e) => errors.push(format!("routes {}: {}", dir.display(), e)),
    }

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

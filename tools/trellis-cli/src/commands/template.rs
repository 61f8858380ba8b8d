//! Validate an HTML template.

use anyhow::{bail, Context as _, Result};
use serde::Serialize;
use trellis_streaming::{Template, BODY_MARKER, DATA_MARKER, META_MARKER};

use super::TemplateArgs;
use crate::context::Context;

#[derive(Serialize)]
struct TemplateReport {
    path: String,
    valid: bool,
    data_marker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run the template command.
pub async fn run(args: TemplateArgs, ctx: &Context) -> Result<()> {
    let path = match (args.file.as_deref(), ctx.config.app.template.as_ref()) {
        (Some(file), _) => ctx.resolve_path(file),
        (None, Some(configured)) => configured.clone(),
        (None, None) => bail!("No template given and none configured in trellis.toml"),
    };

    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read template: {}", path.display()))?;

    let parsed = Template::parse(&source);
    let report = TemplateReport {
        path: path.display().to_string(),
        valid: parsed.is_ok(),
        data_marker: parsed.as_ref().map(Template::has_data_marker).unwrap_or(false),
        error: parsed.as_ref().err().map(ToString::to_string),
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
    } else if report.valid {
        ctx.output.success(&format!("{} is a valid template", report.path));
        ctx.output.kv("meta marker", META_MARKER);
        ctx.output.kv("body marker", BODY_MARKER);
        if report.data_marker {
            ctx.output.kv("data marker", DATA_MARKER);
        } else {
            ctx.output.info("No data marker; loader data is inserted before the body");
        }
    }

    if let Some(error) = report.error {
        bail!("Invalid template {}: {}", report.path, error);
    }

    Ok(())
}

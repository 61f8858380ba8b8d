//! List discovered routes.

use anyhow::{Context as _, Result};
use serde::Serialize;
use trellis_router::RouteTable;

use super::RoutesArgs;
use crate::context::Context;
use crate::output::column_widths;

#[derive(Serialize)]
struct RouteRow {
    id: String,
    pattern: String,
    params: Vec<String>,
    layouts: Vec<String>,
}

/// Run the routes command.
pub async fn run(args: RoutesArgs, ctx: &Context) -> Result<()> {
    let dir = ctx.routes_dir(args.dir.as_deref());
    ctx.output.debug(&format!("Scanning {}", dir.display()));

    let table = RouteTable::from_dir(&dir, &ctx.config.extensions())
        .with_context(|| format!("Failed to read routes from {}", dir.display()))?;
    tracing::debug!(routes = table.len(), dir = %dir.display(), "route table loaded");

    let rows: Vec<RouteRow> = table
        .routes()
        .iter()
        .map(|route| RouteRow {
            id: route.id().to_string(),
            pattern: route.pattern().to_string(),
            params: route.params().to_vec(),
            layouts: table
                .ancestors(route.id())
                .iter()
                .map(|a| a.id().to_string())
                .collect(),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    if rows.is_empty() {
        ctx.output.warn(&format!("No routes found in {}", dir.display()));
        return Ok(());
    }

    ctx.output.header(&format!("Routes ({})", rows.len()));
    let headers = ["ROUTE", "PATTERN", "LAYOUTS"];
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| vec![row.id.clone(), row.pattern.clone(), row.layouts.join(" > ")])
        .collect();
    let widths = column_widths(&cells, &headers);

    ctx.output.table_row(&headers, &widths);
    for row in &cells {
        let cols: Vec<&str> = row.iter().map(String::as_str).collect();
        ctx.output.table_row(&cols, &widths);
    }

    Ok(())
}

//! Resolve a pathname against the routes directory.

use anyhow::{Context as _, Result};
use serde::Serialize;
use trellis_core::RouteParams;
use trellis_router::RouteTable;

use super::MatchArgs;
use crate::context::Context;

#[derive(Serialize)]
struct MatchReport {
    pathname: String,
    matched: bool,
    chain: Vec<SegmentRow>,
}

#[derive(Serialize)]
struct SegmentRow {
    route_id: String,
    pattern: String,
    params: RouteParams,
}

/// Run the match command.
pub async fn run(args: MatchArgs, ctx: &Context) -> Result<()> {
    let dir = ctx.routes_dir(args.dir.as_deref());
    let table = RouteTable::from_dir(&dir, &ctx.config.extensions())
        .with_context(|| format!("Failed to read routes from {}", dir.display()))?;

    let pathname = args.path.split(['?', '#']).next().unwrap_or("/").to_string();
    let chain: Vec<SegmentRow> = table
        .match_path(&pathname)
        .into_iter()
        .map(|segment| SegmentRow {
            route_id: segment.id().to_string(),
            pattern: segment.route.pattern().to_string(),
            params: segment.params,
        })
        .collect();

    let report = MatchReport {
        matched: !chain.is_empty(),
        pathname,
        chain,
    };

    if ctx.output.is_json() {
        ctx.output.json(&report);
        return Ok(());
    }

    if !report.matched {
        ctx.output.warn(&format!("No route matches {}", report.pathname));
        return Ok(());
    }

    ctx.output.header(&format!("{} ({} levels)", report.pathname, report.chain.len()));
    for (depth, segment) in report.chain.iter().enumerate() {
        let params = segment
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        let indent = "  ".repeat(depth);
        if params.is_empty() {
            ctx.output.list_item(&format!("{}{} {}", indent, segment.route_id, segment.pattern));
        } else {
            ctx.output
                .list_item(&format!("{}{} {} [{}]", indent, segment.route_id, segment.pattern, params));
        }
    }

    Ok(())
}

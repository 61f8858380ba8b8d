//! Router state handed explicitly to renderers and hydrators.

use serde::Serialize;
use trellis_core::RouteParams;
use trellis_data::{LoadResult, LoaderResultSet};
use trellis_router::MatchedSegment;

/// One level of the matched chain as the view sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentContext {
    pub route_id: String,
    pub params: RouteParams,
}

/// Current location, matched chain and loader data for one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterContext {
    pub pathname: String,
    /// Query string without the leading `?`.
    pub search: String,
    /// Params of every level merged; inner levels win on conflict.
    pub params: RouteParams,
    pub segments: Vec<SegmentContext>,
    pub data: LoaderResultSet,
}

impl RouterContext {
    pub fn new(
        pathname: impl Into<String>,
        search: impl Into<String>,
        chain: &[MatchedSegment],
        data: LoaderResultSet,
    ) -> Self {
        let segments: Vec<SegmentContext> = chain
            .iter()
            .map(|segment| SegmentContext {
                route_id: segment.id().to_string(),
                params: segment.params.clone(),
            })
            .collect();
        let params = segments
            .iter()
            .flat_map(|s| s.params.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            pathname: pathname.into(),
            search: search.into(),
            params,
            segments,
            data,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Route id of the innermost level.
    pub fn route_id(&self) -> Option<&str> {
        self.segments.last().map(|s| s.route_id.as_str())
    }

    /// Loader result of the innermost level.
    pub fn page_data(&self) -> Option<&LoadResult> {
        self.data.last()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use trellis_router::RouteTable;

    use super::*;

    #[test]
    fn test_context_from_chain() {
        let table = RouteTable::from_files(["index.rs", "teams/[team].rs", "teams/[team]/[id].rs"]).unwrap();
        let chain = table.match_path("/teams/core/9");
        let data = LoaderResultSet::new(vec![
            LoadResult::empty(),
            LoadResult::empty(),
            LoadResult::props(json!({ "id": "9" })),
        ]);

        let ctx = RouterContext::new("/teams/core/9", "tab=x", &chain, data);

        assert_eq!(ctx.param("team"), Some("core"));
        assert_eq!(ctx.param("id"), Some("9"));
        assert_eq!(ctx.route_id(), Some("teams/[team]/[id]"));
        assert_eq!(ctx.segments.len(), 3);
        assert_eq!(ctx.page_data(), Some(&LoadResult::props(json!({ "id": "9" }))));
    }
}

//! Path matching against the route table.

use std::cmp::Ordering;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use trellis_core::RouteParams;

use crate::table::{Route, RouteTable};

/// One level of a matched chain: the route and the params it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedSegment {
    pub route: Arc<Route>,
    pub params: RouteParams,
}

impl MatchedSegment {
    /// Route id of this level.
    pub fn id(&self) -> &str {
        self.route.id()
    }
}

/// Split a pathname into decoded, non-empty segments.
pub fn split_path(pathname: &str) -> Vec<String> {
    pathname
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}

impl RouteTable {
    /// Match a pathname, returning the chain from outermost layout to leaf.
    ///
    /// An empty chain means no route matched. The result depends only on
    /// the table and the pathname.
    pub fn match_path(&self, pathname: &str) -> Vec<MatchedSegment> {
        let path = split_path(pathname);

        let leaf = self
            .routes()
            .iter()
            .enumerate()
            .filter_map(|(i, route)| route.pattern().match_full(&path).map(|p| (i, route, p)))
            .max_by(|(_, a, _), (_, b, _)| compare_leaf(a, b));

        let Some((index, leaf, params)) = leaf else {
            tracing::debug!(pathname, "no route matched");
            return Vec::new();
        };

        let mut chain: Vec<MatchedSegment> = self
            .ancestor_indices(index)
            .iter()
            .filter_map(|&i| {
                let route = &self.routes()[i];
                match route.pattern().match_prefix(&path) {
                    Some(params) => Some(MatchedSegment {
                        route: Arc::clone(route),
                        params,
                    }),
                    None => {
                        tracing::warn!(layout = route.id(), leaf = leaf.id(), "layout does not bind path");
                        None
                    }
                }
            })
            .collect();

        chain.push(MatchedSegment {
            route: Arc::clone(leaf),
            params,
        });

        tracing::debug!(pathname, leaf = leaf.id(), depth = chain.len(), "route matched");
        chain
    }
}

/// Greater means more specific. Ties fall to the lexicographically smaller id.
fn compare_leaf(a: &Route, b: &Route) -> Ordering {
    a.pattern()
        .specificity()
        .cmp(&b.pattern().specificity())
        .then_with(|| a.pattern().is_index().cmp(&b.pattern().is_index()))
        .then_with(|| a.depth().cmp(&b.depth()))
        .then_with(|| b.id().cmp(a.id()))
}

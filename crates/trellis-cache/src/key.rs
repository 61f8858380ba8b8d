//! Cache key composition.

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// Query parameter that turns a page URL into a data request.
pub const DATA_PARAM: &str = ".get";

/// Identifies one cached loader result: `pathname?search`.
///
/// The data parameter is never part of the key; the fetcher adds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pathname: String,
    search: String,
}

impl CacheKey {
    /// Key for a location. `search` may start with `?`.
    pub fn new(pathname: impl Into<String>, search: &str) -> Self {
        Self::with_data_param(pathname, search, DATA_PARAM)
    }

    /// Key for a location, stripping a custom data parameter.
    pub fn with_data_param(pathname: impl Into<String>, search: &str, data_param: &str) -> Self {
        let search = search
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| {
                let name = pair.split_once('=').map(|(n, _)| n).unwrap_or(pair);
                percent_decode_str(name).decode_utf8_lossy() != data_param
            })
            .collect::<Vec<_>>()
            .join("&");

        Self {
            pathname: pathname.into(),
            search,
        }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Query string without the leading `?`.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// URL of the data endpoint for this key.
    pub fn endpoint_url(&self, data_param: &str) -> String {
        if self.search.is_empty() {
            format!("{}?{}=", self.pathname, data_param)
        } else {
            format!("{}?{}&{}=", self.pathname, self.search, data_param)
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}?{}", self.pathname, self.search)
    }
}

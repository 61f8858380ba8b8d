//! Loader results and result sets.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::meta::PageMeta;

/// Outcome of one loader.
///
/// `props: None` is the "nothing loaded" placeholder. It is omitted on the
/// wire, which keeps it distinct from an explicit `null` payload. Objects
/// with any other field, or a non-string `redirect`, are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum LoadResult {
    /// Short-circuit the whole response with a redirect.
    Redirect { redirect: String },
    /// Data for the page, plus optional head metadata.
    Props {
        #[serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "present"
        )]
        props: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<PageMeta>,
    },
}

// A present field always yields `Some`, even for `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl LoadResult {
    /// Placeholder for a route without a loader.
    pub fn empty() -> Self {
        Self::Props {
            props: None,
            meta: None,
        }
    }

    /// Successful result carrying `props`.
    pub fn props(props: Value) -> Self {
        Self::Props {
            props: Some(props),
            meta: None,
        }
    }

    /// Successful result from any serializable value.
    pub fn from_serialize<T: Serialize>(props: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::props(serde_json::to_value(props)?))
    }

    /// Redirect to `target`.
    pub fn redirect(target: impl Into<String>) -> Self {
        Self::Redirect {
            redirect: target.into(),
        }
    }

    /// Attach head metadata. Has no effect on redirects.
    pub fn with_meta(self, page_meta: PageMeta) -> Self {
        match self {
            Self::Props { props, .. } => Self::Props {
                props,
                meta: Some(page_meta),
            },
            redirect => redirect,
        }
    }

    /// Check if this result short-circuits with a redirect.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Redirect target, if any.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect { redirect } => Some(redirect),
            Self::Props { .. } => None,
        }
    }

    /// Raw props, if any were loaded.
    pub fn props_value(&self) -> Option<&Value> {
        match self {
            Self::Props { props, .. } => props.as_ref(),
            Self::Redirect { .. } => None,
        }
    }

    /// Props decoded into a concrete type.
    pub fn props_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.props_value()
            .map(|v| T::deserialize(v))
            .transpose()
    }

    /// Head metadata, if any.
    pub fn meta(&self) -> Option<&PageMeta> {
        match self {
            Self::Props { meta, .. } => meta.as_ref(),
            Self::Redirect { .. } => None,
        }
    }
}

/// Loader results index-aligned with a matched route chain, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoaderResultSet(Vec<LoadResult>);

impl LoaderResultSet {
    /// Wrap results that are already in chain order.
    pub fn new(results: Vec<LoadResult>) -> Self {
        Self(results)
    }

    /// Number of results (equals the chain length).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the chain was empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Result at `index` in chain order.
    pub fn get(&self, index: usize) -> Option<&LoadResult> {
        self.0.get(index)
    }

    /// Result of the innermost route, authoritative for page metadata and
    /// for the data endpoint.
    pub fn last(&self) -> Option<&LoadResult> {
        self.0.last()
    }

    /// First redirect scanning outer to inner. An ancestor's redirect wins
    /// over anything its descendants returned.
    pub fn redirect(&self) -> Option<&str> {
        self.0.iter().find_map(LoadResult::redirect_target)
    }

    /// Iterate in chain order.
    pub fn iter(&self) -> std::slice::Iter<'_, LoadResult> {
        self.0.iter()
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[LoadResult] {
        &self.0
    }

    /// Unwrap into the underlying vector.
    pub fn into_inner(self) -> Vec<LoadResult> {
        self.0
    }
}

impl FromIterator<LoadResult> for LoaderResultSet {
    fn from_iter<I: IntoIterator<Item = LoadResult>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for LoaderResultSet {
    type Item = LoadResult;
    type IntoIter = std::vec::IntoIter<LoadResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LoaderResultSet {
    type Item = &'a LoadResult;
    type IntoIter = std::slice::Iter<'a, LoadResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

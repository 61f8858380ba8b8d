//! Per-key cache state.
//!
//! ```text
//! Absent -> Loading -> Fresh -> Stale -> Revalidating -> Fresh
//!              |                              |
//!              +----------> Failed <----------+
//! ```

use std::sync::Arc;

use tokio::time::Instant;
use trellis_data::LoadResult;

use crate::error::CacheError;

/// A loaded value and when it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub value: Arc<LoadResult>,
    pub fetched_at: Instant,
}

/// Lifecycle of one cache key.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CacheState {
    #[default]
    Absent,
    /// First fetch in flight, nothing to show yet.
    Loading,
    Fresh(Entry),
    /// Old enough to revalidate; still served.
    Stale(Entry),
    /// Background fetch in flight; the previous value is served.
    Revalidating(Entry),
    Failed {
        error: CacheError,
        previous: Option<Entry>,
    },
}

impl CacheState {
    /// Last successfully loaded value, if any.
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Self::Fresh(entry) | Self::Stale(entry) | Self::Revalidating(entry) => Some(entry),
            Self::Failed { previous, .. } => previous.as_ref(),
            Self::Absent | Self::Loading => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Loading | Self::Revalidating(_))
    }

    /// What a consumer should render.
    pub fn resource(&self) -> Resource {
        match self {
            Self::Absent | Self::Loading => Resource::Pending,
            Self::Fresh(entry) | Self::Stale(entry) | Self::Revalidating(entry) => {
                Resource::Ready(Arc::clone(&entry.value))
            }
            Self::Failed { error, .. } => Resource::Error(error.clone()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Loading => "loading",
            Self::Fresh(_) => "fresh",
            Self::Stale(_) => "stale",
            Self::Revalidating(_) => "revalidating",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Consumer view of a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Pending,
    Ready(Arc<LoadResult>),
    Error(CacheError),
}

impl Resource {
    pub fn value(&self) -> Option<&LoadResult> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

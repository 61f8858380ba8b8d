//! Store configuration.

use std::time::Duration;

use crate::retry::{BackoffStrategy, RetryPolicy};

/// Freshness and revalidation settings for [`SwrStore`](crate::SwrStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwrOptions {
    /// Age below which a value is served without revalidating.
    pub fresh_age: Duration,
    /// Further age during which a value is served while revalidating.
    /// Older values are discarded and refetched.
    pub stale_age: Duration,
    pub revalidate_on_focus: bool,
    pub revalidate_on_network: bool,
    pub retry: RetryPolicy,
}

impl Default for SwrOptions {
    fn default() -> Self {
        Self {
            fresh_age: Duration::from_secs(2),
            stale_age: Duration::from_secs(30),
            revalidate_on_focus: true,
            revalidate_on_network: true,
            retry: RetryPolicy::default(),
        }
    }
}

impl SwrOptions {
    pub fn with_fresh_age(mut self, age: Duration) -> Self {
        self.fresh_age = age;
        self
    }

    pub fn with_stale_age(mut self, age: Duration) -> Self {
        self.stale_age = age;
        self
    }

    pub fn with_revalidate_on_focus(mut self, enabled: bool) -> Self {
        self.revalidate_on_focus = enabled;
        self
    }

    pub fn with_revalidate_on_network(mut self, enabled: bool) -> Self {
        self.revalidate_on_network = enabled;
        self
    }

    pub fn with_max_retry_count(mut self, count: u32) -> Self {
        self.retry.max_retries = count;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.retry.backoff = backoff;
        self
    }
}

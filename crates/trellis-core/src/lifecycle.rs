//! Request lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Lifecycle phases for a page response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Request received, loaders not yet settled.
    Start,
    /// Template prefix has been written to the client.
    PrefixSent,
    /// Body chunks are being streamed; holds the count written so far.
    Streaming(usize),
    /// Suffix written and stream closed.
    Completion,
    /// An error occurred.
    Error(String),
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    pub const LOADERS_SETTLED: &'static str = "loaders_settled";
    pub const PREFIX_SENT: &'static str = "prefix_sent";
    pub const COMPLETE: &'static str = "complete";

    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark. Later marks with the same name overwrite earlier ones.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Get the offset of a mark from request start.
    pub fn since_start(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time until every loader settled.
    pub fn time_to_data(&self) -> Option<Duration> {
        self.since_start(Self::LOADERS_SETTLED)
    }

    /// Time until the first byte of HTML left the server.
    pub fn time_to_first_byte(&self) -> Option<Duration> {
        self.since_start(Self::PREFIX_SENT)
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

//! Explicit flush control.

use serde::{Deserialize, Serialize};

/// When the response sink flushes the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// Flush after every chunk so the client sees output as it renders.
    #[default]
    EachChunk,
    /// Queue chunks and flush once when the body completes.
    OnComplete,
}

impl FlushPolicy {
    pub fn flush_each_chunk(&self) -> bool {
        matches!(self, Self::EachChunk)
    }
}

//! Observability for trellis applications.
//!
//! This crate provides:
//! - `init_logging` - `tracing` subscriber with env filter, JSON or human output
//! - `request_span` - Span carrying request id, method and path
//! - `record_timing` - Per-request timing summary

mod logging;
mod span;

pub use logging::*;
pub use span::*;

pub use trellis_core::{RequestId, TimingContext};

//! Streamed HTML composition.
//!
//! This crate turns a template and a lazily rendered body into a response:
//! - `Template` - Marker validation and substitution
//! - `render_meta` - Escaped head markup from page metadata
//! - `compose` - Prefix on first chunk, suffix at end
//! - `ResponseSink` - Backpressure-aware writes into any transport
//! - `FlushPolicy` - Explicit flush control

mod compose;
mod error;
mod flush;
mod meta;
mod sink;
mod template;

pub use compose::*;
pub use error::*;
pub use flush::*;
pub use meta::*;
pub use sink::*;
pub use template::*;

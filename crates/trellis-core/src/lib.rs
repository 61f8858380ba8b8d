//! Core abstractions for the trellis SSR framework.
//!
//! This crate provides the fundamental types shared by every layer:
//! - `Request` - Buffered request handed to loaders
//! - `Request::from_http` - Adaptation from an incoming `http::Request`
//! - `Mode` - Process-wide development/production switch
//! - `TimingContext` - Request lifecycle timing

mod adapt;
mod config;
mod context;
mod error;
mod lifecycle;

pub use config::*;
pub use context::*;
pub use error::*;
pub use lifecycle::*;

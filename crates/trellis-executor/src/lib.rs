//! Page modules and loader execution.
//!
//! This crate provides:
//! - `Loader` / `loader_fn` - Server-side data loaders
//! - `Component` / `PageModule` - What a route file contributes
//! - `ModuleLoader` - `StaticBundle` in production, `HotReload` in development
//! - `LoaderExecutor` - Concurrent, fail-fast loader execution over a chain

mod error;
mod executor;
mod module;
mod resolve;

pub use error::*;
pub use executor::*;
pub use module::*;
pub use resolve::*;

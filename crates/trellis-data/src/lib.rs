//! Loader result data model and wire codec.
//!
//! This crate provides:
//! - `LoadResult` - Props-or-redirect outcome of one loader
//! - `LoaderResultSet` - Results aligned with a matched route chain
//! - `PageMeta` - Head metadata a page loader may return
//! - `encode_value` / `encode_error` / `decode` - Tagged value-or-error envelope

mod meta;
mod result;
mod wire;

pub use meta::*;
pub use result::*;
pub use wire::*;

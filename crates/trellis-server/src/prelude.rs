//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use trellis_server::prelude::*;
//! ```

pub use trellis_core::{Mode, Request, RouteParams};
pub use trellis_data::{LoadResult, LoaderResultSet, PageMeta};
pub use trellis_executor::{component_fn, loader_fn, ComponentProps, LoaderError, PageModule, RenderError};
pub use trellis_router::RouteTable;

pub use crate::{App, AppBuilder, AppConfig, Body, Dispatch, Renderer, RouterContext, ServerError};

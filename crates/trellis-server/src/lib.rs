//! Request pipeline and streaming SSR for trellis.
//!
//! An [`App`] owns the route table, the module loader selected for the
//! process mode and a [`Renderer`]. For each request it:
//!
//! 1. Matches the pathname to a layout-to-page chain
//! 2. Runs every loader in the chain concurrently
//! 3. Answers with a redirect, the JSON data of the innermost loader, or the
//!    streamed HTML page with the results embedded for hydration
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use trellis_server::prelude::*;
//!
//! let app = App::builder()
//!     .template_file("dist/index.html")
//!     .route("index.rs", PageModule::new().with_component(component_fn(layout)))
//!     .route(
//!         "users/[id].rs",
//!         PageModule::new()
//!             .with_component(component_fn(user_page))
//!             .with_loader(loader_fn(|_req, params| async move {
//!                 Ok(LoadResult::props(json!({ "id": params["id"] })))
//!             })),
//!     )
//!     .build()
//!     .await?;
//!
//! let response = app.handle(Request::get("http://localhost/users/42")?).await;
//! ```

pub mod prelude;
mod app;
mod body;
mod config;
mod context;
mod error;
mod hydrate;
mod pipeline;
mod render;
mod transport;

pub use app::*;
pub use body::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use hydrate::*;
pub use pipeline::*;
pub use render::*;
pub use transport::*;

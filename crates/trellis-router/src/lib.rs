//! File-based routing for trellis.
//!
//! Route files under a routes directory define both URL patterns and layout
//! nesting:
//!
//! ```text
//! routes/
//! ├── index.rs          -> /            (root, wraps every other route)
//! ├── about.rs          -> /about
//! ├── users.rs          -> /users       (layout for users/)
//! ├── users/
//! │   ├── index.rs      -> /users
//! │   └── [id].rs       -> /users/:id
//! └── blog/
//!     └── [...slug].rs  -> /blog/*slug
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use trellis_router::prelude::*;
//!
//! let table = RouteTable::builder()
//!     .file("index.rs")
//!     .file("users/[id].rs")
//!     .build()?;
//!
//! let chain = table.match_path("/users/42");
//! assert_eq!(chain.len(), 2);
//! assert_eq!(chain[1].params["id"], "42");
//! ```

pub mod prelude;
mod error;
mod matcher;
mod pattern;
mod table;

pub use error::*;
pub use matcher::*;
pub use pattern::{route_id, RoutePattern, Segment};
pub use table::*;

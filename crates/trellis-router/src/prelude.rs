//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use trellis_router::prelude::*;
//! ```

pub use crate::{MatchedSegment, Route, RouteError, RoutePattern, RouteTable, RouteTableBuilder, Segment};

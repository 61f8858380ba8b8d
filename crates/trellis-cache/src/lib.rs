//! Client-side stale-while-revalidate cache for loader data.
//!
//! This crate provides:
//! - `CacheKey` - `pathname?search` keys without the data parameter
//! - `SwrStore` - Per-key state machine with single in-flight fetches
//! - `CacheState` / `Resource` - Published state and the consumer view
//! - `DataFetcher` - Fetches over a `Transport` from the data endpoint
//! - `RetryPolicy` - Bounded retry with backoff
//!
//! # Example
//!
//! ```ignore
//! let fetcher = DataFetcher::new(transport, Mode::from_env());
//! let store = SwrStore::new(Arc::new(fetcher), SwrOptions::default());
//!
//! let value = store.get(&CacheKey::new("/users/42", "")).await?;
//! ```

mod error;
mod fetch;
mod key;
mod options;
mod retry;
mod state;
mod store;

pub use error::*;
pub use fetch::*;
pub use key::*;
pub use options::*;
pub use retry::*;
pub use state::*;
pub use store::*;

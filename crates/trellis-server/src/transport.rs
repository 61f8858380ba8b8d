//! In-process transport for the client cache.

use std::sync::Arc;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use http::header::LOCATION;
use trellis_cache::{CacheError, Transport, TransportResponse};
use trellis_core::{Request, TimingContext};
use trellis_streaming::ResponseSink;

use crate::app::App;

/// Serves cache fetches by calling [`App::handle`] directly.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    app: Arc<App>,
    origin: String,
}

impl LocalTransport {
    pub fn new(app: Arc<App>) -> Self {
        Self::with_origin(app, "http://localhost")
    }

    /// Origin used to build absolute request URLs, e.g. `https://shop.test`.
    pub fn with_origin(app: Arc<App>, origin: impl Into<String>) -> Self {
        Self {
            app,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, CacheError> {
        let request = Request::get(&format!("{}{}", self.origin, url)).map_err(CacheError::transport)?;
        let (parts, body) = self.app.handle(request).await.into_parts();

        let (tx, rx) = mpsc::unbounded::<Vec<u8>>();
        body.write_to(ResponseSink::new(tx, TimingContext::new()))
            .await
            .map_err(CacheError::transport)?;
        let bytes: Vec<u8> = rx.concat().await;

        let mut response = TransportResponse::new(parts.status, String::from_utf8_lossy(&bytes));
        if let Some(location) = parts.headers.get(LOCATION).and_then(|v| v.to_str().ok()) {
            response = response.with_location(location);
        }
        Ok(response)
    }
}

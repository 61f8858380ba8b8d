//! Fetching loader data from the data endpoint.

use async_trait::async_trait;
use http::StatusCode;
use trellis_core::Mode;
use trellis_data::{decode, LoadResult};

use crate::error::CacheError;
use crate::key::{CacheKey, DATA_PARAM};

/// Raw response from the data endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    /// `Location` header of a redirect response.
    pub location: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            location: None,
            body: body.into(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Issues GET requests against the server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `url` is origin-relative, e.g. `/users/42?.get=`.
    async fn get(&self, url: &str) -> Result<TransportResponse, CacheError>;
}

/// Loads the value for a cache key.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, key: &CacheKey) -> Result<LoadResult, CacheError>;
}

/// [`Fetch`] over the data endpoint.
#[derive(Debug)]
pub struct DataFetcher<T> {
    transport: T,
    mode: Mode,
    data_param: String,
}

impl<T: Transport> DataFetcher<T> {
    pub fn new(transport: T, mode: Mode) -> Self {
        Self {
            transport,
            mode,
            data_param: DATA_PARAM.to_string(),
        }
    }

    pub fn with_data_param(mut self, param: impl Into<String>) -> Self {
        self.data_param = param.into();
        self
    }

    fn decode_failure(&self, body: &str) -> CacheError {
        if !self.mode.is_development() {
            return CacheError::Invariant;
        }
        match decode::<serde_json::Value>(body) {
            Ok(Err(wire)) => CacheError::Remote(wire),
            Ok(Ok(_)) => CacheError::Decode("error response carried a value".to_string()),
            Err(e) => CacheError::Decode(e.to_string()),
        }
    }
}

#[async_trait]
impl<T: Transport> Fetch for DataFetcher<T> {
    async fn fetch(&self, key: &CacheKey) -> Result<LoadResult, CacheError> {
        let url = key.endpoint_url(&self.data_param);
        let response = self.transport.get(&url).await?;

        // A loader redirect is answered with a 3xx, not a value envelope.
        if response.status.is_redirection() {
            if let Some(location) = response.location {
                tracing::debug!(%url, %location, "data request redirected");
                return Ok(LoadResult::redirect(location));
            }
        }

        if !response.status.is_success() {
            tracing::debug!(%url, status = response.status.as_u16(), "data request failed");
            return Err(self.decode_failure(&response.body));
        }

        match decode::<LoadResult>(&response.body) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(wire)) if self.mode.is_development() => Err(CacheError::Remote(wire)),
            Ok(Err(_)) => Err(CacheError::Invariant),
            Err(e) => Err(CacheError::Decode(e.to_string())),
        }
    }
}

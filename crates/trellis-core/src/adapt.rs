//! Adaptation of an incoming `http::Request` into a buffered [`Request`].

use futures::{Stream, StreamExt};
use http::{header::HOST, Method};
use url::Url;

use crate::context::{Request, RequestId};
use crate::error::CoreError;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

impl Request {
    /// Build a loader-facing request from a transport request.
    ///
    /// The `Host` header is mandatory. The scheme comes from the first
    /// `x-forwarded-proto` value when present, otherwise from whether the
    /// connection is encrypted. Bodies of non-GET/HEAD requests are buffered
    /// fully before returning.
    pub async fn from_http<S, B, E>(
        request: http::Request<S>,
        encrypted: bool,
    ) -> Result<Self, CoreError>
    where
        S: Stream<Item = Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        let (parts, mut body) = request.into_parts();

        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(CoreError::MissingHost)?;

        let scheme = parts
            .headers
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(if encrypted { "https" } else { "http" });

        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        let raw = format!("{}://{}{}", scheme, host, path);
        let url = Url::parse(&raw).map_err(|e| CoreError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let id = RequestId::from_headers(&parts.headers);
        let mut request = Request::new(parts.method.clone(), url)
            .with_id(id)
            .with_headers(parts.headers);

        if parts.method != Method::GET && parts.method != Method::HEAD {
            let mut buffer = Vec::new();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| CoreError::Body(e.to_string()))?;
                buffer.extend_from_slice(chunk.as_ref());
            }
            request = request.with_body(buffer);
        }

        Ok(request)
    }
}

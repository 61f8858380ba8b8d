//! The request pipeline: match, load, then redirect, serve data or stream HTML.

use std::sync::Arc;

use futures::{future, stream, Stream, StreamExt, TryStreamExt};
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderValue, Response, StatusCode};
use tracing::Instrument;
use trellis_core::{Request, RequestId, TimingContext};
use trellis_data::{encode_error, encode_value, script_safe, LoadResult};
use trellis_executor::{LoaderExecutor, PageModule};
use trellis_observability::{record_timing, request_span};
use trellis_streaming::{byte_stream, compose, data_script, render_meta};

use crate::app::App;
use crate::body::Body;
use crate::context::RouterContext;
use crate::error::ServerError;

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";
const PRODUCTION_ERROR: &str = "INTERNAL SERVER ERROR";

/// A page ready to render.
#[derive(Debug, Clone)]
pub struct Page {
    pub context: Arc<RouterContext>,
    pub modules: Vec<Arc<PageModule>>,
}

/// Outcome of routing and loading, before any bytes are produced.
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// No route matched the pathname.
    NotFound,
    /// The outermost redirecting loader's target.
    Redirect(String),
    /// Data request: the innermost loader's result.
    Data(LoadResult),
    Page(Page),
}

impl App {
    /// Match the request and run the chain's loaders.
    pub async fn dispatch(&self, request: &Request) -> Result<Dispatch, ServerError> {
        let chain = self.routes.match_path(request.pathname());
        if chain.is_empty() {
            tracing::debug!("no route matched");
            return Ok(Dispatch::NotFound);
        }
        tracing::debug!(
            route = chain.last().map(|s| s.id()).unwrap_or_default(),
            chain = chain.len(),
            "route matched"
        );

        let executed = LoaderExecutor::run(request, &chain, self.modules.as_ref()).await?;

        if let Some(target) = executed.results.redirect() {
            tracing::info!(location = target, "loader redirected");
            return Ok(Dispatch::Redirect(target.to_string()));
        }

        if request.has_query(&self.config.data_param) {
            let last = executed.results.last().cloned().unwrap_or_else(LoadResult::empty);
            return Ok(Dispatch::Data(last));
        }

        let context = RouterContext::new(request.pathname(), request.search(), &chain, executed.results);
        Ok(Dispatch::Page(Page {
            context: Arc::new(context),
            modules: executed.modules,
        }))
    }

    /// Serve one request. Never fails: errors become 500 responses.
    pub async fn handle(&self, request: Request) -> Response<Body> {
        let span = request_span(&request);
        async move {
            let mut timing = TimingContext::new();
            let mut response = match self.respond(&request, &mut timing).await {
                Ok(response) => response,
                Err(error) => self.error_response(&error),
            };
            set_request_id(&mut response, request.id());
            record_timing(&timing, response.status().as_u16());
            response
        }
        .instrument(span)
        .await
    }

    /// Adapt a transport request and serve it.
    ///
    /// A request without a `Host` header is answered with a 500 before any
    /// routing happens.
    pub async fn handle_http<S, B, E>(&self, request: http::Request<S>, encrypted: bool) -> Response<Body>
    where
        S: Stream<Item = Result<B, E>> + Unpin,
        B: AsRef<[u8]>,
        E: std::fmt::Display,
    {
        match Request::from_http(request, encrypted).await {
            Ok(request) => self.handle(request).await,
            Err(error) => {
                tracing::warn!(error = %error, "rejecting request");
                self.error_response(&ServerError::Core(error))
            }
        }
    }

    async fn respond(&self, request: &Request, timing: &mut TimingContext) -> Result<Response<Body>, ServerError> {
        let dispatch = self.dispatch(request).await?;
        timing.mark(TimingContext::LOADERS_SETTLED);

        match dispatch {
            Dispatch::NotFound => Ok(with_content_type(
                StatusCode::NOT_FOUND,
                TEXT,
                Body::text(self.config.not_found_body.clone()),
            )),
            Dispatch::Redirect(target) => redirect(&target),
            Dispatch::Data(result) => {
                tracing::debug!("serving loader data");
                Ok(with_content_type(StatusCode::OK, JSON, Body::text(encode_value(&result)?)))
            }
            Dispatch::Page(page) => {
                let body = self.render_page(page).await?;
                timing.mark(TimingContext::PREFIX_SENT);
                Ok(with_content_type(StatusCode::OK, HTML, body))
            }
        }
    }

    /// Fill the template and start streaming.
    ///
    /// The first chunk is pulled before returning so that failures up to
    /// that point still become an error response.
    async fn render_page(&self, page: Page) -> Result<Body, ServerError> {
        let template = self.template.current(self.modules.as_ref()).await?;
        let meta = render_meta(page.context.page_data().and_then(LoadResult::meta));
        let encoded = script_safe(&encode_value(&page.context.data)?);
        let split = template.fill(&meta, &data_script(&self.config.data_global, &encoded));

        let body = self.renderer.render(Arc::clone(&page.context), page.modules);
        let mut composed = compose(split, body, self.config.empty_body);

        let first = match composed.next().await {
            Some(chunk) => chunk?,
            None => return Ok(Body::Empty),
        };
        tracing::debug!("streaming page");

        let rest = composed.inspect_err(|error| {
            tracing::error!(error = %error, "body failed after headers were sent");
        });
        Ok(Body::Stream(byte_stream(
            stream::once(future::ready(Ok(first))).chain(rest),
        )))
    }

    fn error_response(&self, error: &ServerError) -> Response<Body> {
        tracing::error!(error = %error, "request failed");

        if self.config.mode.is_development() {
            match encode_error(&error.to_wire()) {
                Ok(json) => return with_content_type(StatusCode::INTERNAL_SERVER_ERROR, JSON, Body::text(json)),
                Err(e) => tracing::warn!(error = %e, "could not encode error body"),
            }
        }
        with_content_type(StatusCode::INTERNAL_SERVER_ERROR, TEXT, Body::from(PRODUCTION_ERROR))
    }
}

fn with_content_type(status: StatusCode, content_type: &'static str, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn redirect(target: &str) -> Result<Response<Body>, ServerError> {
    let location = HeaderValue::from_str(target).map_err(|_| ServerError::InvalidRedirect(target.to_string()))?;
    let mut response = Response::new(Body::Empty);
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(LOCATION, location);
    Ok(response)
}

fn set_request_id(response: &mut Response<Body>, id: &RequestId) {
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(RequestId::HEADER, value);
    }
}

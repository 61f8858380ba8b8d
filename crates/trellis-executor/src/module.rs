//! Page modules: the loader and component behind one route.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use trellis_core::{Request, RouteParams};
use trellis_data::LoadResult;

use crate::error::{LoaderError, RenderError};

/// Server-side data loader attached to a route.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Produce props, or a redirect, for the route.
    async fn load(&self, request: &Request, params: &RouteParams) -> Result<LoadResult, LoaderError>;
}

/// Loader backed by an async closure.
pub struct LoaderFn<F>(F);

/// Wrap a closure as a [`Loader`].
///
/// ```rust,ignore
/// let loader = loader_fn(|_req, params| async move {
///     Ok(LoadResult::props(json!({ "id": params["id"] })))
/// });
/// ```
pub fn loader_fn<F, Fut>(f: F) -> LoaderFn<F>
where
    F: Fn(Request, RouteParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<LoadResult, LoaderError>> + Send,
{
    LoaderFn(f)
}

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(Request, RouteParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<LoadResult, LoaderError>> + Send,
{
    async fn load(&self, request: &Request, params: &RouteParams) -> Result<LoadResult, LoaderError> {
        (self.0)(request.clone(), params.clone()).await
    }
}

/// What a component sees when rendering one level of the chain.
#[derive(Debug)]
pub struct ComponentProps<'a> {
    pub route_id: &'a str,
    pub params: &'a RouteParams,
    pub data: &'a LoadResult,
    /// Rendered output of the next level in, if any.
    pub children: Option<&'a str>,
}

/// Renders one level of a page to HTML.
pub trait Component: Send + Sync {
    fn render(&self, props: ComponentProps<'_>) -> Result<String, RenderError>;
}

/// Component backed by a closure.
pub struct ComponentFn<F>(F);

/// Wrap a closure as a [`Component`].
pub fn component_fn<F>(f: F) -> ComponentFn<F>
where
    F: Fn(ComponentProps<'_>) -> Result<String, RenderError> + Send + Sync,
{
    ComponentFn(f)
}

impl<F> Component for ComponentFn<F>
where
    F: Fn(ComponentProps<'_>) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, props: ComponentProps<'_>) -> Result<String, RenderError> {
        (self.0)(props)
    }
}

/// Everything registered for one route.
#[derive(Clone, Default)]
pub struct PageModule {
    component: Option<Arc<dyn Component>>,
    loader: Option<Arc<dyn Loader>>,
}

impl PageModule {
    /// Module with neither component nor loader.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: impl Component + 'static) -> Self {
        self.component = Some(Arc::new(component));
        self
    }

    pub fn with_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn component(&self) -> Option<&Arc<dyn Component>> {
        self.component.as_ref()
    }

    pub fn loader(&self) -> Option<&Arc<dyn Loader>> {
        self.loader.as_ref()
    }

    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }
}

impl std::fmt::Debug for PageModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageModule")
            .field("component", &self.component.is_some())
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

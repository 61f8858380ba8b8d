//! Client-side bootstrap from the data embedded in a server-rendered page.

use std::sync::Arc;

use trellis_cache::{CacheKey, SwrStore};
use trellis_data::{decode, LoaderResultSet};
use trellis_executor::{LoaderError, ModuleRegistry, PageModule};
use trellis_router::RouteTable;

use crate::context::RouterContext;
use crate::error::ServerError;
use crate::render::render_tree;

/// Where the client currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    /// Query string without the leading `?`.
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: &str) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.trim_start_matches('?').to_string(),
        }
    }

    /// Split an origin-relative href such as `/users/42?tab=1#top`.
    pub fn parse(href: &str) -> Self {
        let href = href.split_once('#').map_or(href, |(before, _)| before);
        match href.split_once('?') {
            Some((pathname, search)) => Self::new(pathname, search),
            None => Self::new(href, ""),
        }
    }
}

/// Re-attaches the view to server-rendered markup.
pub trait Hydrator: Send + Sync {
    type View;

    fn hydrate(&self, context: &RouterContext) -> Result<Self::View, ServerError>;
}

/// [`Hydrator`] that renders the registered components to HTML.
#[derive(Debug, Clone, Default)]
pub struct ComponentHydrator {
    registry: ModuleRegistry,
}

impl ComponentHydrator {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self { registry }
    }
}

impl Hydrator for ComponentHydrator {
    type View = String;

    fn hydrate(&self, context: &RouterContext) -> Result<String, ServerError> {
        let modules: Vec<Arc<PageModule>> = context
            .segments
            .iter()
            .map(|segment| {
                self.registry
                    .get(&segment.route_id)
                    .ok_or_else(|| LoaderError::ModuleNotFound(segment.route_id.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(render_tree(context, &modules)?)
    }
}

/// Result of hydrating one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated<V> {
    pub context: RouterContext,
    pub view: V,
}

/// Bootstrap the client from the embedded loader results.
///
/// The embedded set must line up with the chain the client matches for
/// `location`. The innermost result seeds `cache`, so the first data read
/// for this page does not hit the network.
pub fn hydrate<H: Hydrator>(
    embedded: &str,
    location: &Location,
    routes: &RouteTable,
    hydrator: &H,
    cache: &SwrStore,
) -> Result<Hydrated<H::View>, ServerError> {
    let data = decode::<LoaderResultSet>(embedded)?.map_err(ServerError::Embedded)?;
    let chain = routes.match_path(&location.pathname);

    if chain.len() != data.len() {
        return Err(ServerError::HydrationMismatch {
            pathname: location.pathname.clone(),
            expected: chain.len(),
            found: data.len(),
        });
    }

    if let Some(last) = data.last().filter(|r| !r.is_redirect()) {
        cache.prime(&CacheKey::new(location.pathname.clone(), &location.search), last.clone());
    }

    let context = RouterContext::new(location.pathname.clone(), location.search.clone(), &chain, data);
    let view = hydrator.hydrate(&context)?;
    tracing::debug!(route = context.route_id().unwrap_or_default(), "hydrated");

    Ok(Hydrated { context, view })
}

/// Pull the embedded data out of a rendered document.
pub fn extract_embedded<'a>(html: &'a str, global: &str) -> Option<&'a str> {
    let opening = format!("<script>window.{}=", global);
    let start = html.find(&opening)? + opening.len();
    let len = html[start..].find("</script>")?;
    Some(&html[start..start + len])
}

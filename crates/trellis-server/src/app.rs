//! Application setup.

use std::sync::{Arc, Mutex, PoisonError};

use trellis_core::Mode;
use trellis_executor::{module_loader_for, ModuleLoader, ModuleRegistry, PageModule, TemplateSource};
use trellis_router::{route_id, RouteTable};
use trellis_streaming::Template;

use crate::config::AppConfig;
use crate::error::ServerError;
use crate::render::{ComponentRenderer, Renderer};

/// A built trellis application.
///
/// Everything here is read-only after [`AppBuilder::build`] and shared by
/// all in-flight requests.
pub struct App {
    pub(crate) config: AppConfig,
    pub(crate) routes: Arc<RouteTable>,
    pub(crate) modules: Arc<dyn ModuleLoader>,
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) template: TemplateCache,
}

/// Parsed HTML template.
///
/// Production parses once at build. Development keeps the last parse and
/// re-parses only when the loader hands back different text.
pub(crate) enum TemplateCache {
    Fixed(Arc<Template>),
    Reloading(Mutex<(String, Arc<Template>)>),
}

impl TemplateCache {
    fn new(mode: Mode, source: String) -> Result<Self, ServerError> {
        let parsed = Arc::new(Template::parse(&source)?);
        Ok(match mode {
            Mode::Production => Self::Fixed(parsed),
            Mode::Development => Self::Reloading(Mutex::new((source, parsed))),
        })
    }

    pub(crate) async fn current(&self, loader: &dyn ModuleLoader) -> Result<Arc<Template>, ServerError> {
        let cached = match self {
            Self::Fixed(template) => return Ok(Arc::clone(template)),
            Self::Reloading(cached) => cached,
        };

        let source = loader.template().await?;
        let mut cached = cached.lock().unwrap_or_else(PoisonError::into_inner);
        if cached.0 != source {
            let parsed = Arc::new(Template::parse(&source)?);
            tracing::debug!("template changed, re-parsed");
            *cached = (source, parsed);
        }
        Ok(Arc::clone(&cached.1))
    }
}

impl App {
    /// Start configuring an application.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Get the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the route table.
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Get the module loader selected for the mode.
    pub fn modules(&self) -> &Arc<dyn ModuleLoader> {
        &self.modules
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`App`].
///
/// # Example
///
/// ```rust,ignore
/// let app = App::builder()
///     .config(AppConfig::new("shop"))
///     .template_html(INDEX_HTML)
///     .route("index.rs", PageModule::new().with_component(layout))
///     .route("users/[id].rs", PageModule::new().with_loader(user_loader))
///     .build()
///     .await?;
/// ```
pub struct AppBuilder {
    config: AppConfig,
    routes: Vec<(String, PageModule)>,
    template: Option<TemplateSource>,
    renderer: Arc<dyn Renderer>,
    module_loader: Option<Arc<dyn ModuleLoader>>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            routes: Vec::new(),
            template: None,
            renderer: Arc::new(ComponentRenderer),
            module_loader: None,
        }
    }

    /// Register a route file (relative to the routes root) and its module.
    pub fn route(mut self, file: impl Into<String>, module: PageModule) -> Self {
        self.routes.push((file.into(), module));
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Use an inline HTML template.
    pub fn template_html(mut self, html: impl Into<String>) -> Self {
        self.template = Some(TemplateSource::Inline(html.into()));
        self
    }

    /// Read the HTML template from a file.
    pub fn template_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.template = Some(TemplateSource::File(path.into()));
        self
    }

    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Supply a module loader instead of the mode-selected one.
    ///
    /// Modules registered with [`route`](Self::route) are then only used for
    /// the route table.
    pub fn module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.module_loader = Some(loader);
        self
    }

    /// Build the route table and module loader and validate the template.
    pub async fn build(self) -> Result<App, ServerError> {
        let mut table = RouteTable::builder();
        let mut registry = ModuleRegistry::new();
        for (file, module) in self.routes {
            registry.insert(route_id(&file)?, module);
            table = table.file(file);
        }
        let routes = Arc::new(table.build()?);

        let modules = match self.module_loader {
            Some(loader) => loader,
            None => {
                let source = self
                    .template
                    .or_else(|| self.config.template.clone().map(TemplateSource::File))
                    .ok_or_else(|| ServerError::Config("no HTML template configured".to_string()))?;
                module_loader_for(self.config.mode, registry, source).await?
            }
        };

        let template = TemplateCache::new(self.config.mode, modules.template().await?)?;

        tracing::info!(
            app = %self.config.name,
            mode = self.config.mode.name(),
            routes = routes.len(),
            "app built"
        );

        Ok(App {
            config: self.config,
            routes,
            modules,
            renderer: self.renderer,
            template,
        })
    }
}

#[cfg(test)]
mod tests {
    use trellis_streaming::TemplateError;

    use super::*;

    const HTML: &str = "<head><!--meta:outlet--></head><body><!--ssr:outlet--></body>";

    #[tokio::test]
    async fn test_build_registers_routes() {
        let app = App::builder()
            .template_html(HTML)
            .route("index.rs", PageModule::new())
            .route("users/[id].rs", PageModule::new())
            .build()
            .await
            .unwrap();

        assert_eq!(app.routes().len(), 2);
        assert!(app.modules().resolve("users/[id]").await.is_ok());
    }

    #[tokio::test]
    async fn test_build_requires_template() {
        let err = App::builder().build().await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn test_build_rejects_template_without_markers() {
        let err = App::builder()
            .mode(Mode::Production)
            .template_html("<body></body>")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Template(TemplateError::MissingMarker(_))));
    }

    #[tokio::test]
    async fn test_build_rejects_duplicate_routes() {
        let err = App::builder()
            .template_html(HTML)
            .route("about.rs", PageModule::new())
            .route("about.tsx", PageModule::new())
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Route(_)));
    }

    #[tokio::test]
    async fn test_template_from_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, HTML).unwrap();

        let app = App::builder()
            .config(AppConfig::new("shop").with_template(&path))
            .build()
            .await
            .unwrap();
        assert_eq!(app.config().name, "shop");
    }

    async fn app_from_file(mode: Mode, path: &std::path::Path) -> App {
        App::builder().mode(mode).template_file(path).build().await.unwrap()
    }

    #[tokio::test]
    async fn test_production_template_parsed_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, HTML).unwrap();

        let app = app_from_file(Mode::Production, &path).await;
        let first = app.template.current(app.modules().as_ref()).await.unwrap();
        std::fs::write(&path, "garbage").unwrap();
        let second = app.template.current(app.modules().as_ref()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_development_template_reparsed_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, HTML).unwrap();

        let app = app_from_file(Mode::Development, &path).await;
        let first = app.template.current(app.modules().as_ref()).await.unwrap();
        let unchanged = app.template.current(app.modules().as_ref()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &unchanged));

        std::fs::write(&path, format!("<!doctype html>{}", HTML)).unwrap();
        let changed = app.template.current(app.modules().as_ref()).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &changed));
        assert_ne!(*first, *changed);

        std::fs::write(&path, "<body></body>").unwrap();
        let err = app.template.current(app.modules().as_ref()).await.unwrap_err();
        assert!(matches!(err, ServerError::Template(TemplateError::MissingMarker(_))));
    }
}

//! Module resolution capability.
//!
//! Production resolves everything once at startup ([`StaticBundle`]).
//! Development re-reads the template on every request and lets the module
//! registry be swapped while the process runs ([`HotReload`]).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use trellis_core::Mode;

use crate::error::LoaderError;
use crate::module::PageModule;

/// Route id to page module.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<PageModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the module for `route_id`, replacing any previous one.
    pub fn register(mut self, route_id: impl Into<String>, module: PageModule) -> Self {
        self.insert(route_id, module);
        self
    }

    pub fn insert(&mut self, route_id: impl Into<String>, module: PageModule) {
        self.modules.insert(route_id.into(), Arc::new(module));
    }

    pub fn get(&self, route_id: &str) -> Option<Arc<PageModule>> {
        self.modules.get(route_id).cloned()
    }

    pub fn contains(&self, route_id: &str) -> bool {
        self.modules.contains_key(route_id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Where the HTML template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Inline(String),
    File(PathBuf),
}

impl TemplateSource {
    async fn read(&self) -> Result<String, LoaderError> {
        match self {
            Self::Inline(html) => Ok(html.clone()),
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LoaderError::Template {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// Resolves page modules and the HTML template.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Page module for a route id.
    async fn resolve(&self, route_id: &str) -> Result<Arc<PageModule>, LoaderError>;

    /// Current HTML template text.
    async fn template(&self) -> Result<String, LoaderError>;
}

/// Everything resolved once; the template is read at construction.
#[derive(Debug)]
pub struct StaticBundle {
    registry: ModuleRegistry,
    template: String,
}

impl StaticBundle {
    pub async fn load(registry: ModuleRegistry, template: TemplateSource) -> Result<Self, LoaderError> {
        let template = template.read().await?;
        Ok(Self { registry, template })
    }
}

#[async_trait]
impl ModuleLoader for StaticBundle {
    async fn resolve(&self, route_id: &str) -> Result<Arc<PageModule>, LoaderError> {
        self.registry
            .get(route_id)
            .ok_or_else(|| LoaderError::ModuleNotFound(route_id.to_string()))
    }

    async fn template(&self) -> Result<String, LoaderError> {
        Ok(self.template.clone())
    }
}

/// Development loader: swappable registry, template read per request.
#[derive(Debug)]
pub struct HotReload {
    registry: RwLock<Arc<ModuleRegistry>>,
    template: TemplateSource,
}

impl HotReload {
    pub fn new(registry: ModuleRegistry, template: TemplateSource) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
            template,
        }
    }

    /// Replace the module registry. In-flight requests keep the old one.
    pub async fn swap(&self, registry: ModuleRegistry) {
        *self.registry.write().await = Arc::new(registry);
        tracing::info!("module registry reloaded");
    }
}

#[async_trait]
impl ModuleLoader for HotReload {
    async fn resolve(&self, route_id: &str) -> Result<Arc<PageModule>, LoaderError> {
        let registry = Arc::clone(&*self.registry.read().await);
        registry
            .get(route_id)
            .ok_or_else(|| LoaderError::ModuleNotFound(route_id.to_string()))
    }

    async fn template(&self) -> Result<String, LoaderError> {
        self.template.read().await
    }
}

/// Pick the module loader for the process mode.
pub async fn module_loader_for(
    mode: Mode,
    registry: ModuleRegistry,
    template: TemplateSource,
) -> Result<Arc<dyn ModuleLoader>, LoaderError> {
    Ok(match mode {
        Mode::Production => Arc::new(StaticBundle::load(registry, template).await?),
        Mode::Development => Arc::new(HotReload::new(registry, template)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_bundle_caches_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "v1").unwrap();

        let bundle = StaticBundle::load(ModuleRegistry::new(), TemplateSource::File(path.clone()))
            .await
            .unwrap();
        std::fs::write(&path, "v2").unwrap();

        assert_eq!(bundle.template().await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_hot_reload_rereads_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "v1").unwrap();

        let loader = HotReload::new(ModuleRegistry::new(), TemplateSource::File(path.clone()));
        assert_eq!(loader.template().await.unwrap(), "v1");

        std::fs::write(&path, "v2").unwrap();
        assert_eq!(loader.template().await.unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_hot_reload_swaps_registry() {
        let loader = HotReload::new(ModuleRegistry::new(), TemplateSource::Inline(String::new()));
        assert!(matches!(
            loader.resolve("about").await,
            Err(LoaderError::ModuleNotFound(id)) if id == "about"
        ));

        loader
            .swap(ModuleRegistry::new().register("about", PageModule::new()))
            .await;
        assert!(loader.resolve("about").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_template_file() {
        let err = StaticBundle::load(
            ModuleRegistry::new(),
            TemplateSource::File(PathBuf::from("/definitely/not/here.html")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LoaderError::Template { .. }));
    }

    #[tokio::test]
    async fn test_mode_selects_loader() {
        let registry = ModuleRegistry::new().register("index", PageModule::new());
        let loader = module_loader_for(Mode::Production, registry, TemplateSource::Inline("t".into()))
            .await
            .unwrap();
        assert!(loader.resolve("index").await.is_ok());
        assert_eq!(loader.template().await.unwrap(), "t");
    }
}

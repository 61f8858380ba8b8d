//! Concurrent loader execution over a matched route chain.

use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use trellis_core::Request;
use trellis_data::{LoadResult, LoaderResultSet};
use trellis_router::MatchedSegment;

use crate::error::LoaderError;
use crate::module::PageModule;
use crate::resolve::ModuleLoader;

/// Modules and loader results for one matched chain, index-aligned.
#[derive(Debug, Clone)]
pub struct ExecutedChain {
    pub modules: Vec<Arc<PageModule>>,
    pub results: LoaderResultSet,
}

/// Runs every loader in a chain concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderExecutor;

impl LoaderExecutor {
    /// Resolve the chain's modules, then run all loaders at once.
    ///
    /// The first failure cancels the remaining loaders. A route without a
    /// loader contributes [`LoadResult::empty`].
    pub async fn run(
        request: &Request,
        chain: &[MatchedSegment],
        modules: &dyn ModuleLoader,
    ) -> Result<ExecutedChain, LoaderError> {
        let resolved = try_join_all(chain.iter().map(|segment| modules.resolve(segment.id()))).await?;

        let started = Instant::now();
        let loads = chain.iter().zip(&resolved).map(|(segment, module)| async move {
            let Some(loader) = module.loader() else {
                return Ok(LoadResult::empty());
            };
            let begun = Instant::now();
            let result = loader
                .load(request, &segment.params)
                .await
                .map_err(|e| e.in_route(segment.id()))?;
            tracing::debug!(
                route = segment.id(),
                duration_ms = begun.elapsed().as_millis() as u64,
                redirect = result.is_redirect(),
                "loader finished"
            );
            Ok::<_, LoaderError>(result)
        });

        let results = match try_join_all(loads).await {
            Ok(results) => results,
            Err(error) => {
                tracing::warn!(error = %error, "loader chain failed");
                return Err(error);
            }
        };

        tracing::debug!(
            loaders = results.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "loaders settled"
        );

        Ok(ExecutedChain {
            modules: resolved,
            results: LoaderResultSet::new(results),
        })
    }
}

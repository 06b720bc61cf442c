// File: crates/tradeviz-core/src/loader.rs
// Summary: Uniform loader abstraction and the accept-and-log runner shared by all four visualizations.

use crate::error::LoadError;
use crate::fetch::Fetch;
use crate::registry::ChartRegistry;
use crate::targets::RenderTargets;
use crate::theme::Theme;

/// Everything a loader may touch besides its own configuration.
pub struct LoadContext<'a, F> {
    pub fetcher: &'a F,
    pub targets: &'a RenderTargets,
    pub registry: &'a ChartRegistry,
    pub theme: Theme,
}

impl<'a, F> LoadContext<'a, F> {
    pub fn new(fetcher: &'a F, targets: &'a RenderTargets, registry: &'a ChartRegistry) -> Self {
        Self { fetcher, targets, registry, theme: Theme::page() }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// One fetch-shape-render routine.
#[allow(async_fn_in_trait)]
pub trait Loader {
    type Output;

    fn name(&self) -> &str;

    async fn load<F: Fetch>(&self, ctx: &LoadContext<'_, F>) -> Result<Self::Output, LoadError>;
}

/// Run `loader`, logging and swallowing any failure. No retry, no partial
/// output; other loaders are unaffected.
pub async fn run_isolated<L, F>(loader: &L, ctx: &LoadContext<'_, F>) -> Option<L::Output>
where
    L: Loader,
    F: Fetch,
{
    match loader.load(ctx).await {
        Ok(output) => {
            tracing::info!(loader = loader.name(), "render complete");
            Some(output)
        }
        Err(e) => {
            tracing::error!(loader = loader.name(), error = %e.report(), "Error loading data");
            None
        }
    }
}

// File: crates/tradeviz-core/src/page.rs
// Summary: Runs the four visualizations of the page concurrently, each isolated from the others' failures.

use crate::bubble::{BubbleOutput, BubblePacker};
use crate::choropleth::{ChoroplethLoader, ChoroplethOutput};
use crate::config::PageConfig;
use crate::fetch::Fetch;
use crate::flow::{FlowAnimator, FlowOutput};
use crate::loader::{run_isolated, LoadContext};
use crate::registry::ChartRegistry;
use crate::targets::RenderTargets;
use crate::timeseries::{TimeSeriesLoader, TimeSeriesOutput};

/// What each loader produced; `None` where it failed (already logged).
#[derive(Default)]
pub struct PageReport {
    pub exports: Option<TimeSeriesOutput>,
    pub imports: Option<TimeSeriesOutput>,
    pub bubble: Option<BubbleOutput>,
    pub choropleth: Option<ChoroplethOutput>,
    pub flow: Option<FlowOutput>,
}

impl PageReport {
    pub fn rendered(&self) -> usize {
        [
            self.exports.is_some(),
            self.imports.is_some(),
            self.bubble.is_some(),
            self.choropleth.is_some(),
            self.flow.is_some(),
        ]
        .into_iter()
        .filter(|ok| *ok)
        .count()
    }

    pub fn failed(&self) -> usize {
        5 - self.rendered()
    }
}

pub struct Page {
    config: PageConfig,
    targets: RenderTargets,
    registry: ChartRegistry,
}

impl Page {
    pub fn new(config: PageConfig) -> Self {
        let targets = RenderTargets::new(&config.out_dir).with(config.target_ids());
        Self { config, targets, registry: ChartRegistry::new() }
    }

    /// Replace the render targets (e.g. to leave one out).
    pub fn with_targets(mut self, targets: RenderTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    pub fn registry(&self) -> &ChartRegistry {
        &self.registry
    }

    /// Load and render everything once. Running again reloads: charts in
    /// occupied slots are destroyed and replaced.
    pub async fn run<F: Fetch>(&self, fetcher: &F) -> PageReport {
        let c = &self.config;
        let ctx = LoadContext::new(fetcher, &self.targets, &self.registry).with_theme(c.theme());

        let exports = TimeSeriesLoader::new(c.exports.clone(), c.highlight.clone());
        let imports = TimeSeriesLoader::new(c.imports.clone(), c.highlight.clone());
        let bubble = BubblePacker::new(c.bubble.clone(), c.catalog.clone());
        let choropleth = ChoroplethLoader::new(c.choropleth.clone());
        let flow = FlowAnimator::new(c.flow.clone());

        let (exports, imports, bubble, choropleth, flow) = tokio::join!(
            run_isolated(&exports, &ctx),
            run_isolated(&imports, &ctx),
            run_isolated(&bubble, &ctx),
            run_isolated(&choropleth, &ctx),
            run_isolated(&flow, &ctx),
        );
        let report = PageReport { exports, imports, bubble, choropleth, flow };
        tracing::info!(rendered = report.rendered(), failed = report.failed(), "page run finished");
        report
    }
}

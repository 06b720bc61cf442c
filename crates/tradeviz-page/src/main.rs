// File: crates/tradeviz-page/src/main.rs
// Summary: Renders the trade page (line charts, bubble chart, choropleth, flow map) to PNG targets.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tradeviz_core::fetch::SourceFetcher;
use tradeviz_core::{Page, PageConfig, PanelOptions};

#[derive(Parser, Debug)]
#[clap(name = "tradeviz-page", about = "renders Brazil's trade page to PNG files")]
struct Opt {
    /// JSON config; omitted fields keep the page defaults.
    #[clap(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[clap(short = 'd', long = "data-root")]
    data_root: Option<PathBuf>,

    #[clap(short = 'o', long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Flow-map animation frames to write after the first render.
    #[clap(short = 'f', long = "frames", default_value = "0")]
    frames: usize,

    #[clap(long = "frame-step-ms", default_value = "100")]
    frame_step_ms: u64,

    #[clap(short = 'l', long = "log", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opt = Opt::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&opt.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &opt.config {
        Some(path) => PageConfig::load(path)?,
        None => PageConfig::default(),
    };
    if let Some(root) = opt.data_root {
        config.data_root = root;
    }
    if let Some(out) = opt.out_dir {
        config.out_dir = out;
    }
    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating output directory {}", config.out_dir.display()))?;

    let fetcher = SourceFetcher::new(&config.data_root);
    let page = Page::new(config);
    let report = page.run(&fetcher).await;
    tracing::info!(
        rendered = report.rendered(),
        charts = page.registry().live_instances(),
        out_dir = %page.targets().out_dir().display(),
        "page rendered"
    );

    if let Some(flow) = report.flow {
        let opts = PanelOptions { theme: page.config().theme(), ..PanelOptions::default() };
        let step = Duration::from_millis(opt.frame_step_ms);
        for i in 0..opt.frames {
            tokio::time::sleep(step).await;
            let path = page.targets().resolve_frame(&flow.map.request.target, i)?;
            flow.map.render_frame_to_png(&opts, &flow.animation.snapshot(), &path)?;
        }
        if opt.frames > 0 {
            tracing::info!(frames = opt.frames, "wrote flow frames");
        }
        let stopped = flow.animation.shutdown().await;
        tracing::debug!(markers = stopped, "markers stopped");
    }

    Ok(())
}

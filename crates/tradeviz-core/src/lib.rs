// File: crates/tradeviz-core/src/lib.rs
// Summary: Core library entry point; exports the loaders, layouts and renderers behind the trade page.

pub mod axis;
pub mod bubble;
pub mod chart;
pub mod choropleth;
pub mod color;
pub mod config;
pub mod error;
pub mod fetch;
pub mod flow;
pub mod format;
pub mod geo;
pub mod geometry;
pub mod grid;
pub mod loader;
pub mod pack;
pub mod page;
pub mod raster;
pub mod registry;
pub mod scale;
pub mod series;
pub mod targets;
pub mod text;
pub mod theme;
pub mod timeseries;
pub mod types;

pub use axis::Axis;
pub use bubble::{BubbleChart, BubblePacker, BubbleRequest, CommodityCatalog};
pub use chart::{LineChart, LineChartOptions, RenderOptions};
pub use choropleth::{ChoroplethLoader, ChoroplethMap, ChoroplethRequest, Tooltip};
pub use color::Rgb;
pub use config::PageConfig;
pub use error::LoadError;
pub use fetch::{Fetch, FsFetcher, HttpFetcher, MemoryFetcher, SourceFetcher};
pub use flow::{FlowAnimation, FlowAnimator, FlowMap, FlowRequest, MarkerTrack};
pub use loader::{run_isolated, LoadContext, Loader};
pub use pack::{Pack, PackLayout, PackedCircle};
pub use page::{Page, PageReport};
pub use raster::PanelOptions;
pub use registry::{ChartId, ChartRegistry};
pub use series::{Dataset, TimeSeriesPoint};
pub use targets::RenderTargets;
pub use text::TextShaper;
pub use theme::Theme;
pub use timeseries::{HighlightPolicy, TimeSeriesLoader, TimeSeriesRequest};

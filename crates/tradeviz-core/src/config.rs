// File: crates/tradeviz-core/src/config.rs
// Summary: Page configuration; every field defaults to the published page's settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bubble::{BubbleRequest, CommodityCatalog};
use crate::choropleth::ChoroplethRequest;
use crate::flow::FlowRequest;
use crate::theme::{self, Theme};
use crate::timeseries::{HighlightPolicy, TimeSeriesRequest};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Directory local data files are read from.
    pub data_root: PathBuf,
    /// Directory target PNGs are written to.
    pub out_dir: PathBuf,
    pub theme: String,
    pub exports: TimeSeriesRequest,
    pub imports: TimeSeriesRequest,
    pub highlight: HighlightPolicy,
    pub bubble: BubbleRequest,
    pub catalog: CommodityCatalog,
    pub choropleth: ChoroplethRequest,
    pub flow: FlowRequest,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            out_dir: PathBuf::from("out"),
            theme: "page".into(),
            exports: TimeSeriesRequest::exports(),
            imports: TimeSeriesRequest::imports(),
            highlight: HighlightPolicy::default(),
            bubble: BubbleRequest::default(),
            catalog: CommodityCatalog::default(),
            choropleth: ChoroplethRequest::default(),
            flow: FlowRequest::default(),
        }
    }
}

impl PageConfig {
    /// Read a JSON file; fields it omits keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn theme(&self) -> Theme {
        theme::find(&self.theme)
    }

    /// Every element id the page draws into.
    pub fn target_ids(&self) -> Vec<String> {
        [
            &self.exports.target,
            &self.imports.target,
            &self.bubble.target,
            &self.choropleth.target,
            &self.flow.target,
        ]
        .into_iter()
        .map(|id| id.trim_start_matches('#').to_string())
        .collect()
    }
}

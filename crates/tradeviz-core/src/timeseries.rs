// File: crates/tradeviz-core/src/timeseries.rs
// Summary: Time-series loader: country → records JSON reshaped into highlighted line datasets.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chart::{LineChart, LineChartOptions, RenderOptions};
use crate::color::Rgb;
use crate::error::LoadError;
use crate::fetch::{fetch_json, Fetch};
use crate::format::parse_float_prefix;
use crate::loader::{LoadContext, Loader};
use crate::registry::ChartId;
use crate::series::{Dataset, TimeSeriesPoint};

/// Which file to chart, where to draw it, and the registry slot that owns it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRequest {
    pub data_file: String,
    pub title: String,
    pub subtitle: String,
    pub target: String,
    pub slot: String,
}

impl TimeSeriesRequest {
    pub fn exports() -> Self {
        Self {
            data_file: "top_exp.json".into(),
            title: "Exports".into(),
            subtitle: "FOB Value in Billion Dollars".into(),
            target: "myChartExports".into(),
            slot: "chartExports".into(),
        }
    }

    pub fn imports() -> Self {
        Self {
            data_file: "top_imp.json".into(),
            title: "Imports".into(),
            subtitle: "FOB Value in Billion Dollars".into(),
            target: "myChartImports".into(),
            slot: "chartImports".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub label: String,
    pub color: Rgb,
}

/// Two-tier coloring: listed labels get their own color, everything else
/// shares `default_color`. Only listed labels appear in the legend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPolicy {
    pub highlights: Vec<Highlight>,
    pub default_color: Rgb,
}

impl Default for HighlightPolicy {
    fn default() -> Self {
        Self {
            highlights: vec![
                Highlight { label: "China".into(), color: Rgb::new(0xdb, 0x04, 0x04) },
                Highlight { label: "United States".into(), color: Rgb::new(0x03, 0x10, 0x40) },
            ],
            default_color: Rgb::new(0xd3, 0xd3, 0xd3),
        }
    }
}

impl HighlightPolicy {
    pub fn color_for(&self, label: &str) -> Rgb {
        self.highlights
            .iter()
            .find(|h| h.label == label)
            .map(|h| h.color)
            .unwrap_or(self.default_color)
    }

    pub fn labels(&self) -> Vec<String> {
        self.highlights.iter().map(|h| h.label.clone()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Date")]
    date: Value,
    #[serde(rename = "Value")]
    value: Value,
}

/// One dataset per top-level key, in document order. Records whose date or
/// value cannot be read are skipped with a warning.
pub fn build_datasets(location: &str, raw: Map<String, Value>, policy: &HighlightPolicy) -> Result<Vec<Dataset>, LoadError> {
    raw.into_iter()
        .map(|(country, records)| {
            let records: Vec<RawRecord> = serde_json::from_value(records)
                .map_err(|e| LoadError::data(location, format!("records for `{country}`: {e}")))?;
            let points = records
                .iter()
                .filter_map(|r| {
                    let point = parse_date(&r.date)
                        .zip(parse_value(&r.value))
                        .map(|(date, value)| TimeSeriesPoint::from_raw(date, value));
                    if point.is_none() {
                        tracing::warn!(%country, date = %r.date, value = %r.value, "skipping unreadable record");
                    }
                    point
                })
                .collect();
            let color = policy.color_for(&country);
            Ok(Dataset::new(country, color, points))
        })
        .collect()
}

/// Dates as the data files write them: RFC 3339, `YYYY-MM-DD[ HH:MM:SS]`,
/// `YYYY-MM`, `YYYY`, or epoch milliseconds. Date-only forms are UTC midnight.
pub fn parse_date(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(n) => n.as_f64().and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(d) = DateTime::parse_from_rfc3339(s) {
                return Some(d.with_timezone(&Utc));
            }
            for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
                if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
                    return Some(d.and_utc());
                }
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return d.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
            }
            if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
                return d.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
            }
            s.parse::<i32>()
                .ok()
                .filter(|_| s.len() == 4)
                .and_then(|y| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).single())
        }
        _ => None,
    }
}

fn parse_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }
}

pub fn chart_options(request: &TimeSeriesRequest, policy: &HighlightPolicy) -> LineChartOptions {
    LineChartOptions {
        title: request.title.clone(),
        subtitle: request.subtitle.clone(),
        legend_filter: policy.labels(),
        tooltips: false,
        ..LineChartOptions::default()
    }
}

/// Fetches one time-series file and attaches the rendered chart to its slot.
#[derive(Clone, Debug)]
pub struct TimeSeriesLoader {
    pub request: TimeSeriesRequest,
    pub policy: HighlightPolicy,
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesOutput {
    pub chart_id: ChartId,
    pub path: PathBuf,
    pub dataset_count: usize,
}

impl TimeSeriesLoader {
    pub fn new(request: TimeSeriesRequest, policy: HighlightPolicy) -> Self {
        let defaults = RenderOptions::default();
        Self { request, policy, width: defaults.width, height: defaults.height }
    }

    /// Fetch and shape the datasets without rendering.
    pub async fn datasets<F: Fetch>(&self, fetcher: &F) -> Result<Vec<Dataset>, LoadError> {
        let raw: Map<String, Value> = fetch_json(fetcher, &self.request.data_file).await?;
        build_datasets(&self.request.data_file, raw, &self.policy)
    }
}

impl Loader for TimeSeriesLoader {
    type Output = TimeSeriesOutput;

    fn name(&self) -> &str {
        &self.request.slot
    }

    async fn load<F: Fetch>(&self, ctx: &LoadContext<'_, F>) -> Result<TimeSeriesOutput, LoadError> {
        let datasets = self.datasets(ctx.fetcher).await?;
        let path = ctx.targets.resolve(&self.request.target)?;
        let dataset_count = datasets.len();

        // The slot's previous chart goes away before its replacement is built.
        ctx.registry.destroy(&self.request.slot);

        let mut chart = LineChart::new(chart_options(&self.request, &self.policy));
        for d in datasets {
            chart.add_dataset(d);
        }
        chart.autoscale_axes();

        let opts = RenderOptions { width: self.width, height: self.height, theme: ctx.theme, ..RenderOptions::default() };
        chart.render_to_png(&opts, &path)?;
        tracing::info!(element = %self.request.target, path = %path.display(), datasets = dataset_count, "wrote line chart");

        let chart_id = ctx.registry.attach(&self.request.slot, &self.request.target, chart);
        Ok(TimeSeriesOutput { chart_id, path, dataset_count })
    }
}

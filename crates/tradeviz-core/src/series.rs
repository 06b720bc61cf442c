// File: crates/tradeviz-core/src/series.rs
// Summary: Time-series model: dated points in billions, grouped into labelled datasets.

use chrono::{DateTime, Utc};

use crate::color::Rgb;

/// Divisor applied to raw FOB values before plotting.
pub const BILLION: f64 = 1e9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSeriesPoint {
    pub date: DateTime<Utc>,
    pub value_billions: f64,
}

impl TimeSeriesPoint {
    /// Point from a raw value (in units, not billions).
    pub fn from_raw(date: DateTime<Utc>, raw_value: f64) -> Self {
        Self { date, value_billions: raw_value / BILLION }
    }

    pub fn x(&self) -> f64 {
        self.date.timestamp_millis() as f64
    }
}

/// Stroke settings for one line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub border_width: f32,
    /// Bezier smoothing, 0 draws straight segments.
    pub tension: f32,
    pub point_radius: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self { border_width: 1.0, tension: 0.4, point_radius: 0.0 }
    }
}

/// One country's line on a time-series chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub color: Rgb,
    pub points: Vec<TimeSeriesPoint>,
    pub style: LineStyle,
}

impl Dataset {
    pub fn new(label: impl Into<String>, color: Rgb, points: Vec<TimeSeriesPoint>) -> Self {
        Self { label: label.into(), color, points, style: LineStyle::default() }
    }

    /// (epoch ms, billions) pairs in source order.
    pub fn xy(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.x(), p.value_billions)).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value_billions).collect()
    }
}

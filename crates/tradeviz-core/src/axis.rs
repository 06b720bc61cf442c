// File: crates/tradeviz-core/src/axis.rs
// Summary: Axis model with ranges, tick limits, border color and label formats.

use chrono::{TimeZone, Utc, Datelike};

use crate::color::Rgb;
use crate::format::tick_integer;
use crate::grid::{nice_ticks, year_ticks};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaleKind {
    Linear,
    /// Epoch milliseconds.
    Time,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickFormat {
    /// `toFixed(0)`.
    Integer,
    /// Four-digit year.
    Year,
}

#[derive(Clone, Debug)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub kind: ScaleKind,
    pub max_ticks: usize,
    pub tick_format: TickFormat,
    pub draw_ticks: bool,
    /// `None` paints the border in the theme's hidden-axis color.
    pub border_color: Option<Rgb>,
}

impl Axis {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            kind: ScaleKind::Linear,
            max_ticks: 5,
            tick_format: TickFormat::Integer,
            draw_ticks: true,
            border_color: Some(Rgb::BLACK),
        }
    }

    /// Time axis with one tick per year, autoskipped to at most 10 labels.
    pub fn time_years() -> Self {
        Self {
            kind: ScaleKind::Time,
            max_ticks: 10,
            tick_format: TickFormat::Year,
            draw_ticks: false,
            ..Self::new(0.0, 1.0)
        }
    }

    /// Value axis (drawn on the right) with at most 5 integer labels and
    /// an invisible border.
    pub fn right_values() -> Self {
        Self {
            max_ticks: 5,
            border_color: None,
            ..Self::new(0.0, 1.0)
        }
    }

    /// Tick positions in data units.
    pub fn ticks(&self) -> Vec<f64> {
        match self.kind {
            ScaleKind::Time => year_ticks(self.min, self.max, self.max_ticks),
            ScaleKind::Linear => nice_ticks(self.min, self.max, self.max_ticks)
                .into_iter()
                .filter(|t| *t >= self.min - 1e-9 && *t <= self.max + 1e-9)
                .collect(),
        }
    }

    pub fn format_tick(&self, v: f64) -> String {
        match self.tick_format {
            TickFormat::Integer => tick_integer(v),
            TickFormat::Year => Utc
                .timestamp_millis_opt(v as i64)
                .single()
                .map(|d| format!("{:04}", d.year()))
                .unwrap_or_default(),
        }
    }
}

// File: crates/tradeviz-core/src/chart.rs
// Summary: Time-series line chart and its headless PNG rendering pipeline using Skia CPU raster surfaces.

use anyhow::Result;
use skia_safe as skia;

use crate::axis::Axis;
use crate::color::Rgb;
use crate::grid::nice_ticks;
use crate::raster::{self, fill_paint, stroke_paint};
use crate::scale::{TimeScale, ValueScale};
use crate::series::Dataset;
use crate::text::{ApproxMeasure, MeasureText, TextShaper};
use crate::theme::Theme;
use crate::types::{Insets, HEIGHT, WIDTH};

pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub insets: Insets,
    pub theme: Theme,
    /// Skip text so output is identical across font setups.
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            insets: Insets::default(),
            theme: Theme::page(),
            draw_labels: true,
        }
    }
}

/// Chart-level options: headings, legend filter and font sizes.
#[derive(Clone, Debug, PartialEq)]
pub struct LineChartOptions {
    pub title: String,
    pub subtitle: String,
    /// Only datasets with these labels appear in the legend.
    pub legend_filter: Vec<String>,
    /// Always false for the page charts; kept so the policy is explicit.
    pub tooltips: bool,
    pub title_size: f32,
    pub subtitle_size: f32,
    pub legend_size: f32,
    pub legend_box: f32,
    pub tick_size: f32,
}

impl Default for LineChartOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            legend_filter: Vec::new(),
            tooltips: false,
            title_size: 18.0,
            subtitle_size: 14.0,
            legend_size: 12.0,
            legend_box: 8.0,
            tick_size: 10.0,
        }
    }
}

pub struct LineChart {
    pub datasets: Vec<Dataset>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub options: LineChartOptions,
}

impl LineChart {
    pub fn new(options: LineChartOptions) -> Self {
        Self {
            datasets: Vec::new(),
            x_axis: Axis::time_years(),
            y_axis: Axis::right_values(),
            options,
        }
    }

    pub fn add_dataset(&mut self, dataset: Dataset) {
        self.datasets.push(dataset);
    }

    /// Labels and colors shown in the legend, in dataset order.
    pub fn legend_entries(&self) -> Vec<(&str, Rgb)> {
        self.datasets
            .iter()
            .filter(|d| self.options.legend_filter.iter().any(|l| *l == d.label))
            .map(|d| (d.label.as_str(), d.color))
            .collect()
    }

    /// Fit x to the data extent and y to nice tick bounds around the data.
    pub fn autoscale_axes(&mut self) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for d in &self.datasets {
            for (x, y) in d.xy() {
                if !(x.is_finite() && y.is_finite()) { continue; }
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
        if !x_min.is_finite() || !y_min.is_finite() {
            return;
        }
        if (x_max - x_min).abs() < 1e-9 { x_max = x_min + 1.0; }
        self.x_axis.min = x_min;
        self.x_axis.max = x_max;
        let ticks = nice_ticks(y_min, y_max, self.y_axis.max_ticks);
        if let (Some(lo), Some(hi)) = (ticks.first(), ticks.last()) {
            self.y_axis.min = *lo;
            self.y_axis.max = *hi;
        }
    }

    /// Render the chart to a PNG at `output_png_path` using a CPU raster surface.
    pub fn render_to_png(
        &self,
        opts: &RenderOptions,
        output_png_path: impl AsRef<std::path::Path>,
    ) -> Result<()> {
        let bytes = self.render_to_png_bytes(opts)?;
        raster::write_png(output_png_path, &bytes)
    }

    pub fn render_to_png_bytes(&self, opts: &RenderOptions) -> Result<Vec<u8>> {
        let mut surface = raster::new_surface(opts.width, opts.height)?;
        self.draw(surface.canvas(), opts);
        raster::encode_png(&mut surface)
    }

    pub fn render_to_rgba8(&self, opts: &RenderOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
        let mut surface = raster::new_surface(opts.width, opts.height)?;
        self.draw(surface.canvas(), opts);
        raster::read_rgba8(&mut surface)
    }

    fn draw(&self, canvas: &skia::Canvas, opts: &RenderOptions) {
        let theme = &opts.theme;
        raster::clear(canvas, theme.background);

        let shaper = opts.draw_labels.then(|| TextShaper::with_family(theme.font_family));
        let o = &self.options;

        // Headings and legend stack from the top, start-aligned.
        let left = opts.insets.left as f32;
        let mut y = opts.insets.top as f32;
        y += o.title_size * 1.2;
        if let Some(s) = &shaper {
            s.draw_left(canvas, &o.title, left, y - o.title_size * 0.2, o.title_size, theme.text.to_skia(), false);
        }
        y += o.subtitle_size * 1.2;
        if let Some(s) = &shaper {
            s.draw_left(canvas, &o.subtitle, left, y - o.subtitle_size * 0.2, o.subtitle_size, theme.text.to_skia(), false);
        }
        y += o.legend_size * 1.6;
        draw_legend(canvas, shaper.as_ref(), &self.legend_entries(), left, y, o, theme);
        y += o.legend_size * 0.8;

        // Plot rect
        let plot_left = left;
        let plot_right = (opts.width - opts.insets.right as i32) as f32;
        let plot_top = y;
        let plot_bottom = (opts.height - opts.insets.bottom as i32) as f32;
        if plot_right <= plot_left || plot_bottom <= plot_top {
            return;
        }

        let xs = TimeScale::new(plot_left, plot_right, self.x_axis.min, self.x_axis.max);
        let ys = ValueScale::new_linear(plot_top, plot_bottom, self.y_axis.min, self.y_axis.max);

        draw_x_axis(canvas, shaper.as_ref(), &self.x_axis, &xs, plot_bottom, o.tick_size, theme);
        draw_y_axis(canvas, shaper.as_ref(), &self.y_axis, &ys, plot_right, o.tick_size, theme);

        canvas.save();
        canvas.clip_rect(skia::Rect::from_ltrb(plot_left, plot_top - 2.0, plot_right, plot_bottom + 2.0), skia::ClipOp::Intersect, true);
        // Last dataset first, so the first one ends up on top.
        for d in self.datasets.iter().rev() {
            draw_dataset(canvas, d, &xs, &ys);
        }
        canvas.restore();
    }
}

// ---- helpers ----------------------------------------------------------------

fn draw_legend(
    canvas: &skia::Canvas,
    shaper: Option<&TextShaper>,
    entries: &[(&str, Rgb)],
    left: f32,
    baseline: f32,
    o: &LineChartOptions,
    theme: &Theme,
) {
    let mut x = left;
    for (label, color) in entries {
        let top = baseline - o.legend_box;
        canvas.draw_rect(skia::Rect::from_xywh(x, top, o.legend_box, o.legend_box), &fill_paint(color.to_skia()));
        x += o.legend_box + 6.0;
        let w = match shaper {
            Some(s) => {
                s.draw_left(canvas, label, x, baseline, o.legend_size, theme.text.to_skia(), false);
                s.measure(label, o.legend_size, false)
            }
            None => ApproxMeasure.measure(label, o.legend_size, false),
        };
        x += w + 10.0;
    }
}

fn draw_x_axis(
    canvas: &skia::Canvas,
    shaper: Option<&TextShaper>,
    axis: &Axis,
    xs: &TimeScale,
    bottom: f32,
    size: f32,
    theme: &Theme,
) {
    let border = stroke_paint(axis.border_color.unwrap_or(theme.axis_hidden).to_skia(), 1.0);
    canvas.draw_line((xs.left_px, bottom), (xs.right_px, bottom), &border);
    let Some(s) = shaper else { return };
    for t in axis.ticks() {
        let px = xs.to_px(t);
        s.draw_centered(canvas, &axis.format_tick(t), px, bottom + size + 6.0, size, theme.tick.to_skia(), false);
    }
}

fn draw_y_axis(
    canvas: &skia::Canvas,
    shaper: Option<&TextShaper>,
    axis: &Axis,
    ys: &ValueScale,
    right: f32,
    size: f32,
    theme: &Theme,
) {
    let border = stroke_paint(axis.border_color.unwrap_or(theme.axis_hidden).to_skia(), 1.0);
    canvas.draw_line((right, ys.top_px), (right, ys.bottom_px), &border);
    let tick = stroke_paint(theme.axis_line.to_skia(), 1.0);
    for t in axis.ticks() {
        let py = ys.to_px(t);
        if axis.draw_ticks {
            canvas.draw_line((right, py), (right + 5.0, py), &tick);
        }
        if let Some(s) = shaper {
            s.draw_left(canvas, &axis.format_tick(t), right + 8.0, py + size * 0.35, size, theme.tick.to_skia(), false);
        }
    }
}

fn draw_dataset(canvas: &skia::Canvas, d: &Dataset, xs: &TimeScale, ys: &ValueScale) {
    let pts: Vec<(f32, f32)> = d
        .xy()
        .into_iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (xs.to_px(x), ys.to_px(y)))
        .collect();
    if pts.len() < 2 {
        return;
    }

    let controls = spline_control_points(&pts, d.style.tension, (ys.top_px, ys.bottom_px));
    let mut path = skia::Path::new();
    path.move_to(pts[0]);
    for i in 1..pts.len() {
        if d.style.tension == 0.0 {
            path.line_to(pts[i]);
        } else {
            path.cubic_to(controls[i - 1].1, controls[i].0, pts[i]);
        }
    }

    let stroke = stroke_paint(d.color.to_skia(), d.style.border_width);
    canvas.draw_path(&path, &stroke);
}

/// Bezier control points per point: (incoming, outgoing). Each pair lies on
/// the line through the neighbours, scaled by `tension` and the relative
/// neighbour distances; y is capped to `[top, bottom]`.
pub fn spline_control_points(pts: &[(f32, f32)], tension: f32, (top, bottom): (f32, f32)) -> Vec<((f32, f32), (f32, f32))> {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let cur = pts[i];
            let prev = if i == 0 { cur } else { pts[i - 1] };
            let next = if i + 1 == n { cur } else { pts[i + 1] };
            let d01 = (cur.0 - prev.0).hypot(cur.1 - prev.1);
            let d12 = (next.0 - cur.0).hypot(next.1 - cur.1);
            let total = d01 + d12;
            let (s01, s12) = if total > 0.0 { (d01 / total, d12 / total) } else { (0.0, 0.0) };
            let fa = tension * s01;
            let fb = tension * s12;
            let (dx, dy) = (next.0 - prev.0, next.1 - prev.1);
            let cap = |y: f32| y.clamp(top.min(bottom), bottom.max(top));
            ((cur.0 - fa * dx, cap(cur.1 - fa * dy)), (cur.0 + fb * dx, cap(cur.1 + fb * dy)))
        })
        .collect()
}

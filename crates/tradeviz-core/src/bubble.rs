// File: crates/tradeviz-core/src/bubble.rs
// Summary: Packed-bubble chart of exported commodities, colored by commodity category.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use skia_safe as skia;

use crate::color::Rgb;
use crate::error::LoadError;
use crate::fetch::{fetch_json, Fetch};
use crate::format::currency_millions;
use crate::loader::{LoadContext, Loader};
use crate::pack::{Pack, PackLayout};
use crate::raster::{self, fill_paint, PanelOptions};
use crate::types::{PANEL_MARGIN, PANEL_SIZE};
use crate::text::{ApproxMeasure, MeasureText, TextShaper};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommodityCategory {
    pub name: String,
    pub color: Rgb,
}

/// Commodity name → category → color. Category order is legend order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommodityCatalog {
    pub categories: Vec<CommodityCategory>,
    pub members: BTreeMap<String, String>,
    /// Fill for names outside `members` (or in an unknown category).
    pub unmapped: Rgb,
}

impl Default for CommodityCatalog {
    fn default() -> Self {
        let category = |name: &str, color: Rgb| CommodityCategory { name: name.into(), color };
        let groups: [(&str, &[&str]); 4] = [
            (
                "Agricultural Products",
                &["Soybeans", "Coffee", "Beef", "Soymeal", "Raw cane sugar", "Corn", "Poultry", "Cotton"],
            ),
            ("Energy Products", &["Crude oil", "Refined oil"]),
            ("Minerals and Metals", &["Iron ore", "Copper ore", "Gold", "Steel"]),
            ("Manufactured Goods", &["Cars", "Wood pulp"]),
        ];
        let members = groups
            .iter()
            .flat_map(|(group, names)| names.iter().map(move |n| (n.to_string(), group.to_string())))
            .collect();
        Self {
            categories: vec![
                category("Agricultural Products", Rgb::new(0x64, 0xc8, 0x78)),
                category("Energy Products", Rgb::new(0xfb, 0x56, 0x07)),
                category("Minerals and Metals", Rgb::new(0xff, 0xc4, 0x03)),
                category("Manufactured Goods", Rgb::new(0x05, 0xae, 0xff)),
            ],
            members,
            unmapped: Rgb::BLACK,
        }
    }
}

impl CommodityCatalog {
    pub fn category_of(&self, name: &str) -> Option<&str> {
        self.members.get(name).map(String::as_str)
    }

    pub fn category_color(&self, category: &str) -> Option<Rgb> {
        self.categories.iter().find(|c| c.name == category).map(|c| c.color)
    }

    pub fn color_for(&self, name: &str) -> Rgb {
        self.category_of(name)
            .and_then(|c| self.category_color(c))
            .unwrap_or(self.unmapped)
    }
}

/// One packed leaf before layout.
#[derive(Clone, Debug, PartialEq)]
pub struct CommodityNode {
    pub name: String,
    /// Value after dividing by the request's divisor (millions by default).
    pub value: f64,
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommodity {
    name: String,
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleRequest {
    pub data_file: String,
    pub target: String,
    pub title: String,
    /// Square panel side; the pack box is `size - 2·margin`.
    pub size: f64,
    pub margin: f64,
    pub padding: f64,
    pub value_divisor: f64,
    /// Vertical space above the bubbles for title and legend.
    pub header: f64,
    pub label_size: f32,
    pub title_size: f32,
    pub legend_size: f32,
}

impl Default for BubbleRequest {
    fn default() -> Self {
        Self {
            data_file: "prod_exp.json".into(),
            target: "bubbleChartContainer".into(),
            title: "Brazil's Exports in 2024".into(),
            size: PANEL_SIZE as f64,
            margin: PANEL_MARGIN as f64,
            padding: 2.0,
            value_divisor: 1e6,
            header: 50.0,
            label_size: 10.0,
            title_size: 18.0,
            legend_size: 12.0,
        }
    }
}

/// Horizontal legend placement relative to the legend origin.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
    pub offset: f32,
    pub width: f32,
}

pub const LEGEND_ORIGIN: (f32, f32) = (20.0, 30.0);
const LEGEND_DOT: (f32, f32, f32) = (10.0, 10.0, 5.0);
const LEGEND_TEXT: (f32, f32) = (20.0, 14.0);
const LEGEND_GAP: f32 = 10.0;

/// Entries laid out left to right: each is a dot then its label, and the next
/// one starts after the previous entry's extent plus a fixed gap.
pub fn layout_legend(categories: &[CommodityCategory], measure: &dyn MeasureText, size: f32) -> Vec<LegendEntry> {
    let mut offset = 0.0;
    categories
        .iter()
        .map(|c| {
            let dot_right = LEGEND_DOT.0 + LEGEND_DOT.2;
            let text_right = LEGEND_TEXT.0 + measure.measure(&c.name, size, false);
            let width = dot_right.max(text_right) - (LEGEND_DOT.0 - LEGEND_DOT.2);
            let entry = LegendEntry { label: c.name.clone(), color: c.color, offset, width };
            offset += width + LEGEND_GAP;
            entry
        })
        .collect()
}

/// A laid-out bubble in panel coordinates (header offset applied).
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleLeaf {
    pub name: String,
    pub value: f64,
    pub color: Rgb,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl BubbleLeaf {
    /// Name, then the value as `U$<grouped>M`.
    pub fn label_lines(&self) -> [String; 2] {
        [self.name.clone(), currency_millions(self.value)]
    }
}

pub struct BubbleChart {
    pub request: BubbleRequest,
    pub catalog: CommodityCatalog,
    pub nodes: Vec<CommodityNode>,
    pub layout: PackLayout,
}

impl BubbleChart {
    pub fn new(request: BubbleRequest, catalog: CommodityCatalog, nodes: Vec<CommodityNode>) -> Result<Self, LoadError> {
        let side = request.size - request.margin * 2.0;
        let values: Vec<f64> = nodes.iter().map(|n| n.value).collect();
        let layout = Pack::new(side, side)
            .padding(request.padding)
            .layout(&values)
            .map_err(|e| LoadError::data(&request.data_file, e.to_string()))?;
        Ok(Self { request, catalog, nodes, layout })
    }

    pub fn leaves(&self) -> Vec<BubbleLeaf> {
        self.layout
            .leaves
            .iter()
            .map(|p| {
                let node = &self.nodes[p.index];
                BubbleLeaf {
                    name: node.name.clone(),
                    value: p.value,
                    color: self.catalog.color_for(&node.name),
                    x: p.x,
                    y: p.y + self.request.header,
                    r: p.r,
                }
            })
            .collect()
    }

    pub fn canvas_size(&self) -> (i32, i32) {
        let side = self.request.size.round() as i32;
        (side, side + self.request.header.round() as i32)
    }

    pub fn render_to_png_bytes(&self, opts: &PanelOptions) -> Result<Vec<u8>> {
        let (w, h) = self.canvas_size();
        let mut surface = raster::new_surface(w, h)?;
        self.draw(surface.canvas(), opts);
        raster::encode_png(&mut surface)
    }

    pub fn render_to_png(&self, opts: &PanelOptions, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.render_to_png_bytes(opts)?;
        raster::write_png(path, &bytes)
    }

    pub fn render_to_rgba8(&self, opts: &PanelOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
        let (w, h) = self.canvas_size();
        let mut surface = raster::new_surface(w, h)?;
        self.draw(surface.canvas(), opts);
        raster::read_rgba8(&mut surface)
    }

    fn draw(&self, canvas: &skia::Canvas, opts: &PanelOptions) {
        let theme = &opts.theme;
        let r = &self.request;
        raster::clear(canvas, theme.background);
        canvas.save();
        canvas.translate((r.margin as f32, r.margin as f32));

        let shaper = opts.draw_labels.then(|| TextShaper::with_family("sans-serif"));
        let ink = theme.text.to_skia();
        if let Some(s) = &shaper {
            s.draw_left(canvas, &r.title, 20.0, 20.0, r.title_size, ink, true);
        }

        let measure: &dyn MeasureText = match &shaper {
            Some(s) => s as &dyn MeasureText,
            None => &ApproxMeasure,
        };
        let (lx, ly) = LEGEND_ORIGIN;
        for e in layout_legend(&self.catalog.categories, measure, r.legend_size) {
            let x = lx + e.offset;
            canvas.draw_circle((x + LEGEND_DOT.0, ly + LEGEND_DOT.1), LEGEND_DOT.2, &fill_paint(e.color.to_skia()));
            if let Some(s) = &shaper {
                s.draw_left(canvas, &e.label, x + LEGEND_TEXT.0, ly + LEGEND_TEXT.1, r.legend_size, ink, false);
            }
        }

        for leaf in self.leaves() {
            let (x, y) = (leaf.x as f32, leaf.y as f32);
            canvas.draw_circle((x, y), leaf.r as f32, &fill_paint(leaf.color.to_skia()));
            if let Some(s) = &shaper {
                let [name, value] = leaf.label_lines();
                s.draw_centered(canvas, &name, x, y, r.label_size, ink, true);
                s.draw_centered(canvas, &value, x, y + r.label_size * 1.2, r.label_size, ink, false);
            }
        }
        canvas.restore();
    }
}

/// Loads the commodity list and renders the bubble chart into its target.
#[derive(Clone, Debug, Default)]
pub struct BubblePacker {
    pub request: BubbleRequest,
    pub catalog: CommodityCatalog,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BubbleOutput {
    pub path: PathBuf,
    pub leaves: usize,
}

impl BubblePacker {
    pub fn new(request: BubbleRequest, catalog: CommodityCatalog) -> Self {
        Self { request, catalog }
    }

    /// Fetch the commodity list and pack it, without rendering.
    pub async fn chart<F: Fetch>(&self, fetcher: &F) -> Result<BubbleChart, LoadError> {
        let raw: Vec<RawCommodity> = fetch_json(fetcher, &self.request.data_file).await?;
        let nodes = raw
            .into_iter()
            .map(|c| CommodityNode {
                group: self.catalog.category_of(&c.name).map(str::to_string),
                value: c.value.unwrap_or(0.0) / self.request.value_divisor,
                name: c.name,
            })
            .collect();
        BubbleChart::new(self.request.clone(), self.catalog.clone(), nodes)
    }
}

impl Loader for BubblePacker {
    type Output = BubbleOutput;

    fn name(&self) -> &str {
        &self.request.target
    }

    async fn load<F: Fetch>(&self, ctx: &LoadContext<'_, F>) -> Result<BubbleOutput, LoadError> {
        let chart = self.chart(ctx.fetcher).await?;
        let path = ctx.targets.resolve(&self.request.target)?;
        let opts = PanelOptions { theme: ctx.theme, ..PanelOptions::default() };
        chart.render_to_png(&opts, &path)?;
        let leaves = chart.layout.leaves.len();
        tracing::info!(element = %self.request.target, path = %path.display(), leaves, "wrote bubble chart");
        Ok(BubbleOutput { path, leaves })
    }
}

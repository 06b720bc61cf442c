// File: crates/tradeviz-core/src/choropleth.rs
// Summary: Choropleth of per-state export values with hit testing and hover tooltip state.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use skia_safe as skia;

use crate::color::Rgb;
use crate::error::LoadError;
use crate::fetch::{fetch_csv, fetch_json, Fetch};
use crate::format::{locale_string, parse_float_prefix};
use crate::geo::path::{geometry_path, projected_rings, rings_contain};
use crate::geo::projection::GeoProjection;
use crate::geo::topojson::Topology;
use crate::geo::{Feature, Geometry, Position};
use crate::geometry::Point;
use crate::loader::{LoadContext, Loader};
use crate::raster::{self, fill_paint, stroke_paint, PanelOptions};
use crate::scale::ColorScale;
use crate::types::{PANEL_MARGIN, PANEL_SIZE};
use crate::text::{MeasureText, TextShaper};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoroplethRequest {
    pub topology_file: String,
    /// Object inside the topology holding one geometry per region.
    pub object: String,
    /// Feature property shown as the region name.
    pub name_property: String,
    pub table_file: String,
    pub region_column: String,
    pub value_column: String,
    pub target: String,
    pub title: String,
    pub subtitle: String,
    pub size: f64,
    pub margin: f64,
    pub center: Position,
    pub scale: f64,
    pub domain: (f64, f64),
    pub low: Rgb,
    pub high: Rgb,
    pub missing: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f32,
    pub title_size: f32,
    pub subtitle_size: f32,
}

impl Default for ChoroplethRequest {
    fn default() -> Self {
        Self {
            topology_file: "brazil-states.json".into(),
            object: "estados".into(),
            name_property: "nome".into(),
            table_file: "data.csv".into(),
            region_column: "UF".into(),
            value_column: "Exportação".into(),
            target: "#map".into(),
            title: "Brazil's Exports to China by States".into(),
            subtitle: "Exports during January and October 2024".into(),
            size: PANEL_SIZE as f64,
            margin: PANEL_MARGIN as f64,
            center: [-50.0, -13.0],
            scale: 600.0,
            domain: (0.0, 15_000_000_000.0),
            low: Rgb::new(145, 247, 193),
            high: Rgb::new(26, 123, 74),
            missing: Rgb::new(0xcc, 0xcc, 0xcc),
            stroke: Rgb::BLACK,
            stroke_width: 0.5,
            title_size: 18.0,
            subtitle_size: 14.0,
        }
    }
}

impl ChoroplethRequest {
    pub fn projection(&self) -> GeoProjection {
        GeoProjection::mercator()
            .with_center(self.center)
            .with_scale(self.scale)
            .with_translate(self.size / 2.0, self.size / 2.0)
    }

    pub fn color_scale(&self) -> ColorScale {
        ColorScale::new(self.domain, (self.low, self.high))
    }
}

/// Region codes are compared trimmed and uppercased.
pub fn normalize_region(id: &str) -> String {
    id.trim().to_uppercase()
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegionExportRecord {
    pub region_id: String,
    /// `NaN` when the cell does not start with a number.
    pub export_value: f64,
}

impl RegionExportRecord {
    pub fn new(region_id: &str, raw_value: &str) -> Self {
        Self {
            region_id: normalize_region(region_id),
            export_value: parse_float_prefix(raw_value).unwrap_or(f64::NAN),
        }
    }
}

/// Region code → export value. Later records overwrite earlier ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportTable {
    values: BTreeMap<String, f64>,
}

impl ExportTable {
    pub fn from_records(records: impl IntoIterator<Item = RegionExportRecord>) -> Self {
        Self { values: records.into_iter().map(|r| (r.region_id, r.export_value)).collect() }
    }

    /// Build from CSV rows keyed by header name.
    pub fn from_rows(location: &str, rows: &[BTreeMap<String, String>], region_column: &str, value_column: &str) -> Result<Self, LoadError> {
        let records = rows
            .iter()
            .map(|row| {
                let region = row
                    .get(region_column)
                    .ok_or_else(|| LoadError::data(location, format!("row without `{region_column}` column")))?;
                let value = row.get(value_column).map(String::as_str).unwrap_or("");
                Ok(RegionExportRecord::new(region, value))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(Self::from_records(records))
    }

    /// Raw stored value, `NaN` included.
    pub fn get(&self, region_id: &str) -> Option<f64> {
        self.values.get(&normalize_region(region_id)).copied()
    }

    /// Value usable for coloring: present, finite and non-zero.
    pub fn value_of(&self, region_id: &str) -> Option<f64> {
        self.get(region_id).filter(|v| v.is_finite() && *v != 0.0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub id: Option<String>,
    pub name: String,
    pub geometry: Option<Geometry>,
    /// Projected rings in map coordinates (before the margin offset).
    pub rings: Vec<Vec<Point>>,
}

pub struct ChoroplethMap {
    pub request: ChoroplethRequest,
    pub regions: Vec<Region>,
    pub table: ExportTable,
    projection: GeoProjection,
}

impl ChoroplethMap {
    pub fn new(request: ChoroplethRequest, features: Vec<Feature>, table: ExportTable) -> Self {
        let projection = request.projection();
        let regions = features
            .into_iter()
            .map(|f| Region {
                name: f.property_str(&request.name_property).unwrap_or_default().to_string(),
                rings: f.geometry.as_ref().map(|g| projected_rings(g, &projection)).unwrap_or_default(),
                id: f.id,
                geometry: f.geometry,
            })
            .collect();
        Self { request, regions, table, projection }
    }

    pub fn projection(&self) -> &GeoProjection {
        &self.projection
    }

    /// Usable export value for region `index`.
    pub fn value_for(&self, index: usize) -> Option<f64> {
        let region = self.regions.get(index)?;
        region.id.as_deref().and_then(|id| self.table.value_of(id))
    }

    /// Scale color for regions with a usable value, the missing color otherwise.
    pub fn fill_for(&self, index: usize) -> Rgb {
        match self.value_for(index) {
            Some(v) => self.request.color_scale().apply(v),
            None => self.request.missing,
        }
    }

    /// Topmost region under image pixel `(x, y)`.
    pub fn region_at(&self, x: f64, y: f64) -> Option<usize> {
        let m = self.request.margin;
        let p = Point::new(x - m, y - m);
        // Later regions paint over earlier ones.
        self.regions.iter().rposition(|r| rings_contain(&r.rings, p))
    }

    pub fn canvas_size(&self) -> (i32, i32) {
        let side = self.request.size.round() as i32;
        (side, side)
    }

    pub fn render_to_png_bytes(&self, opts: &PanelOptions, tooltip: Option<&Tooltip>) -> Result<Vec<u8>> {
        let (w, h) = self.canvas_size();
        let mut surface = raster::new_surface(w, h)?;
        self.draw(surface.canvas(), opts, tooltip);
        raster::encode_png(&mut surface)
    }

    pub fn render_to_png(&self, opts: &PanelOptions, tooltip: Option<&Tooltip>, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.render_to_png_bytes(opts, tooltip)?;
        raster::write_png(path, &bytes)
    }

    pub fn render_to_rgba8(&self, opts: &PanelOptions) -> Result<(Vec<u8>, u32, u32, usize)> {
        let (w, h) = self.canvas_size();
        let mut surface = raster::new_surface(w, h)?;
        self.draw(surface.canvas(), opts, None);
        raster::read_rgba8(&mut surface)
    }

    fn draw(&self, canvas: &skia::Canvas, opts: &PanelOptions, tooltip: Option<&Tooltip>) {
        let r = &self.request;
        raster::clear(canvas, opts.theme.background);
        let shaper = opts.draw_labels.then(|| TextShaper::with_family("sans-serif"));

        canvas.save();
        canvas.translate((r.margin as f32, r.margin as f32));
        if let Some(s) = &shaper {
            let ink = opts.theme.text.to_skia();
            s.draw_left(canvas, &r.title, 20.0, 20.0, r.title_size, ink, true);
            s.draw_left(canvas, &r.subtitle, 20.0, 40.0, r.subtitle_size, ink, false);
        }

        let stroke = stroke_paint(r.stroke.to_skia(), r.stroke_width);
        for (i, region) in self.regions.iter().enumerate() {
            let Some(geometry) = &region.geometry else { continue };
            let path = geometry_path(geometry, &self.projection);
            canvas.draw_path(&path, &fill_paint(self.fill_for(i).to_skia()));
            canvas.draw_path(&path, &stroke);
        }
        canvas.restore();

        if let (Some(t), Some(s)) = (tooltip.filter(|t| t.is_visible()), &shaper) {
            draw_tooltip(canvas, s, t);
        }
    }
}

const TOOLTIP_FONT: f32 = 12.0;
const TOOLTIP_PADDING: f32 = 10.0;

fn draw_tooltip(canvas: &skia::Canvas, shaper: &TextShaper, tooltip: &Tooltip) {
    let [title, line] = tooltip.lines();
    let width = shaper.measure(&title, TOOLTIP_FONT, true).max(shaper.measure(&line, TOOLTIP_FONT, false));
    let line_height = TOOLTIP_FONT * 1.2;
    let (x, y) = (tooltip.left as f32, tooltip.top as f32);
    let rect = skia::Rect::from_xywh(x, y, width + TOOLTIP_PADDING * 2.0, line_height * 2.0 + TOOLTIP_PADDING * 2.0);
    canvas.draw_round_rect(rect, 5.0, 5.0, &fill_paint(skia::Color::WHITE));
    canvas.draw_round_rect(rect, 5.0, 5.0, &stroke_paint(Rgb::new(0xdd, 0xdd, 0xdd).to_skia(), 1.0));
    let ink = skia::Color::BLACK;
    let baseline = y + TOOLTIP_PADDING + TOOLTIP_FONT;
    shaper.draw_left(canvas, &title, x + TOOLTIP_PADDING, baseline, TOOLTIP_FONT, ink, true);
    shaper.draw_left(canvas, &line, x + TOOLTIP_PADDING, baseline + line_height, TOOLTIP_FONT, ink, false);
}

/// Hover tooltip: one per map, the last hovered region wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    pub opacity: f32,
    pub region: Option<usize>,
    pub name: String,
    pub value: Option<f64>,
    pub left: f64,
    pub top: f64,
}

const NO_DATA: &str = "Sem dados";
const CURSOR_OFFSET: f64 = 10.0;

impl Tooltip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse_over(&mut self, map: &ChoroplethMap, region: usize) {
        let Some(r) = map.regions.get(region) else { return };
        self.region = Some(region);
        self.name = r.name.clone();
        self.value = map.value_for(region);
        self.opacity = 1.0;
    }

    pub fn mouse_move(&mut self, page_x: f64, page_y: f64) {
        self.left = page_x + CURSOR_OFFSET;
        self.top = page_y + CURSOR_OFFSET;
    }

    /// Hides the tooltip; its content stays until the next hover.
    pub fn mouse_out(&mut self) {
        self.opacity = 0.0;
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    pub fn value_text(&self) -> String {
        match self.value {
            Some(v) => locale_string(v),
            None => NO_DATA.to_string(),
        }
    }

    /// Plain-text lines: region name, then the export line.
    pub fn lines(&self) -> [String; 2] {
        [self.name.clone(), format!("Exportação: US${}", self.value_text())]
    }

    pub fn html(&self) -> String {
        format!("<strong>{}</strong><br>Exportação: US${}", self.name, self.value_text())
    }
}

/// Fetches the topology and the export table together and renders the map.
#[derive(Clone, Debug, Default)]
pub struct ChoroplethLoader {
    pub request: ChoroplethRequest,
}

pub struct ChoroplethOutput {
    pub path: PathBuf,
    pub map: ChoroplethMap,
}

impl ChoroplethLoader {
    pub fn new(request: ChoroplethRequest) -> Self {
        Self { request }
    }

    /// Fetch both sources concurrently; either failing fails the map.
    pub async fn map<F: Fetch>(&self, fetcher: &F) -> Result<ChoroplethMap, LoadError> {
        let r = &self.request;
        let (topology, rows) = tokio::try_join!(
            fetch_json::<Topology, F>(fetcher, &r.topology_file),
            fetch_csv::<BTreeMap<String, String>, F>(fetcher, &r.table_file),
        )?;
        let features = topology
            .features(&r.object)
            .map_err(|e| LoadError::data(&r.topology_file, e.to_string()))?;
        let table = ExportTable::from_rows(&r.table_file, &rows, &r.region_column, &r.value_column)?;
        tracing::debug!(regions = features.len(), rows = table.len(), "choropleth sources decoded");
        Ok(ChoroplethMap::new(r.clone(), features, table))
    }
}

impl Loader for ChoroplethLoader {
    type Output = ChoroplethOutput;

    fn name(&self) -> &str {
        &self.request.target
    }

    async fn load<F: Fetch>(&self, ctx: &LoadContext<'_, F>) -> Result<ChoroplethOutput, LoadError> {
        let map = self.map(ctx.fetcher).await?;
        let path = ctx.targets.resolve(&self.request.target)?;
        let opts = PanelOptions { theme: ctx.theme, ..PanelOptions::default() };
        map.render_to_png(&opts, None, &path)?;
        tracing::info!(element = %self.request.target, path = %path.display(), regions = map.regions.len(), "wrote choropleth");
        Ok(ChoroplethOutput { path, map })
    }
}

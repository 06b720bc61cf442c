// File: crates/tradeviz-core/src/flow.rs
// Summary: Origin/destination flow map with one cancellable marker task per route.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use skia_safe as skia;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::color::Rgb;
use crate::error::LoadError;
use crate::fetch::{fetch_json, Fetch};
use crate::geo::geojson::RouteCollection;
use crate::geo::path::geometry_path;
use crate::geo::projection::{GeoProjection, Projection};
use crate::geo::topojson::Topology;
use crate::geo::{Feature, Position};
use crate::geometry::Point;
use crate::loader::{LoadContext, Loader};
use crate::raster::{self, fill_paint, stroke_paint, PanelOptions};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowRequest {
    pub routes_file: String,
    pub world_url: String,
    pub world_object: String,
    pub target: String,
    pub viewport: (u32, u32),
    /// Destination label drawn in `highlight_color`.
    pub highlight_destination: String,
    pub highlight_color: Rgb,
    pub other_color: Rgb,
    pub land_fill: Rgb,
    pub land_stroke: Rgb,
    pub width_factor: f64,
    pub line_opacity: f32,
    pub marker_radius: f32,
    pub min_duration_ms: u64,
    pub ms_per_pixel: f64,
    pub frame_interval_ms: u64,
}

impl Default for FlowRequest {
    fn default() -> Self {
        Self {
            routes_file: "routes_with_volumes.geojson".into(),
            world_url: "https://cdn.jsdelivr.net/npm/world-atlas@2/countries-110m.json".into(),
            world_object: "countries".into(),
            target: "routeMap".into(),
            viewport: (1280, 720),
            highlight_destination: "CHINA".into(),
            highlight_color: Rgb::new(0xdb, 0x04, 0x04),
            other_color: Rgb::new(0x03, 0x10, 0x40),
            land_fill: Rgb::new(0xea, 0xea, 0xea),
            land_stroke: Rgb::new(0xcc, 0xcc, 0xcc),
            width_factor: 0.0007,
            line_opacity: 0.8,
            marker_radius: 1.0,
            min_duration_ms: 2000,
            ms_per_pixel: 10.0,
            frame_interval_ms: 16,
        }
    }
}

impl FlowRequest {
    pub fn color_for(&self, destination: &str) -> Rgb {
        if destination == self.highlight_destination {
            self.highlight_color
        } else {
            self.other_color
        }
    }

    /// `sqrt(volume) · width_factor`; an unusable volume falls back to 1px.
    pub fn width_for(&self, volume: f64) -> f32 {
        let w = volume.sqrt() * self.width_factor;
        if w.is_finite() { w as f32 } else { 1.0 }
    }

    pub fn duration_for(&self, length_px: f64) -> Duration {
        animation_duration(length_px, self.min_duration_ms, self.ms_per_pixel)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// `max(min_ms, ms_per_pixel · length)`, never zero.
pub fn animation_duration(length_px: f64, min_ms: u64, ms_per_pixel: f64) -> Duration {
    let scaled = length_px * ms_per_pixel;
    let ms = if scaled.is_finite() { (min_ms as f64).max(scaled) } else { min_ms as f64 };
    Duration::from_secs_f64(ms.max(1.0) / 1000.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowEdge {
    pub origin: Position,
    pub destination: Position,
    pub destination_label: String,
    pub volume: f64,
}

/// Edges from a route collection; a route with fewer than two points fails
/// the whole collection.
pub fn edges_from_routes(location: &str, routes: RouteCollection) -> Result<Vec<FlowEdge>, LoadError> {
    routes
        .features
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            let (origin, destination) = f
                .endpoints()
                .ok_or_else(|| LoadError::data(location, format!("route {i} has fewer than two points")))?;
            Ok(FlowEdge {
                origin,
                destination,
                volume: f.volume(),
                destination_label: f.properties.destino.unwrap_or_default(),
            })
        })
        .collect()
}

/// An edge after projection, with its drawing attributes resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedEdge {
    pub edge: usize,
    pub start: Point,
    pub end: Point,
    pub color: Rgb,
    pub width: f32,
}

impl ProjectedEdge {
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Straight-line marker path, linear in time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerTrack {
    pub start: Point,
    pub end: Point,
    pub duration: Duration,
}

impl MarkerTrack {
    /// Position `elapsed` into a cycle, clamped to the destination.
    pub fn position_at(&self, elapsed: Duration) -> Point {
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.start.lerp(self.end, t)
    }

    /// Completed cycles and position, `elapsed` since the first cycle began.
    pub fn position_in_cycle(&self, elapsed: Duration) -> (u64, Point) {
        let d = self.duration.as_nanos().max(1);
        let e = elapsed.as_nanos();
        let cycle = (e / d) as u64;
        let within = Duration::from_nanos((e % d) as u64);
        (cycle, self.position_at(within))
    }
}

pub struct FlowMap {
    pub request: FlowRequest,
    pub countries: Vec<Feature>,
    pub edges: Vec<ProjectedEdge>,
    projection: GeoProjection,
}

impl FlowMap {
    /// Fit Natural Earth to the viewport over `countries` and project every
    /// edge. Edges whose endpoints do not project are dropped.
    pub fn new(request: FlowRequest, countries: Vec<Feature>, edges: &[FlowEdge]) -> Self {
        let (w, h) = request.viewport;
        let projection = GeoProjection::natural_earth1().fit_size(w as f64, h as f64, &countries);
        let edges = edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match (projection.project(e.origin), projection.project(e.destination)) {
                (Some(start), Some(end)) => Some(ProjectedEdge {
                    edge: i,
                    start,
                    end,
                    color: request.color_for(&e.destination_label),
                    width: request.width_for(e.volume),
                }),
                _ => {
                    tracing::warn!(edge = i, destination = %e.destination_label, "route endpoint does not project; skipping");
                    None
                }
            })
            .collect();
        Self { request, countries, edges, projection }
    }

    pub fn projection(&self) -> &GeoProjection {
        &self.projection
    }

    pub fn tracks(&self) -> Vec<MarkerTrack> {
        self.edges
            .iter()
            .map(|e| MarkerTrack { start: e.start, end: e.end, duration: self.request.duration_for(e.length()) })
            .collect()
    }

    /// Marker positions at the start of every cycle.
    pub fn origins(&self) -> Vec<Point> {
        self.edges.iter().map(|e| e.start).collect()
    }

    pub fn canvas_size(&self) -> (i32, i32) {
        let (w, h) = self.request.viewport;
        (w as i32, h as i32)
    }

    /// One frame with a marker at each of `positions` (paired with edges by index).
    pub fn render_frame(&self, opts: &PanelOptions, positions: &[Point]) -> Result<Vec<u8>> {
        let (w, h) = self.canvas_size();
        let mut surface = raster::new_surface(w, h)?;
        self.draw(surface.canvas(), opts, positions);
        raster::encode_png(&mut surface)
    }

    pub fn render_frame_to_png(&self, opts: &PanelOptions, positions: &[Point], path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.render_frame(opts, positions)?;
        raster::write_png(path, &bytes)
    }

    pub fn render_frame_rgba8(&self, opts: &PanelOptions, positions: &[Point]) -> Result<(Vec<u8>, u32, u32, usize)> {
        let (w, h) = self.canvas_size();
        let mut surface = raster::new_surface(w, h)?;
        self.draw(surface.canvas(), opts, positions);
        raster::read_rgba8(&mut surface)
    }

    fn draw(&self, canvas: &skia::Canvas, opts: &PanelOptions, positions: &[Point]) {
        let r = &self.request;
        raster::clear(canvas, opts.theme.background);

        let land = fill_paint(r.land_fill.to_skia());
        let border = stroke_paint(r.land_stroke.to_skia(), 1.0);
        for g in self.countries.iter().filter_map(|f| f.geometry.as_ref()) {
            let path = geometry_path(g, &self.projection);
            canvas.draw_path(&path, &land);
            canvas.draw_path(&path, &border);
        }

        for e in &self.edges {
            let paint = stroke_paint(e.color.to_skia_alpha(r.line_opacity), e.width);
            canvas.draw_line(e.start.to_skia(), e.end.to_skia(), &paint);
        }

        for (e, p) in self.edges.iter().zip(positions) {
            canvas.draw_circle(p.to_skia(), r.marker_radius, &fill_paint(e.color.to_skia()));
        }
    }
}

/// Running marker tasks. Dropping it cancels them.
pub struct FlowAnimation {
    token: CancellationToken,
    tasks: JoinSet<()>,
    positions: Vec<watch::Receiver<Point>>,
    cycles: Vec<Arc<AtomicU64>>,
    tracks: Vec<MarkerTrack>,
}

impl FlowAnimation {
    /// Spawn one task per track on the current runtime. Each task repeats
    /// {reset to origin, advance every `frame_interval`, reach destination}
    /// until cancelled.
    pub fn start(tracks: Vec<MarkerTrack>, frame_interval: Duration) -> Self {
        let token = CancellationToken::new();
        let mut tasks = JoinSet::new();
        let mut positions = Vec::with_capacity(tracks.len());
        let mut cycles = Vec::with_capacity(tracks.len());
        for &track in &tracks {
            let (tx, rx) = watch::channel(track.start);
            let completed = Arc::new(AtomicU64::new(0));
            tasks.spawn(run_marker(track, frame_interval, tx, completed.clone(), token.clone()));
            positions.push(rx);
            cycles.push(completed);
        }
        tracing::debug!(markers = tracks.len(), ?frame_interval, "flow animation started");
        Self { token, tasks, positions, cycles, tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[MarkerTrack] {
        &self.tracks
    }

    /// Latest published position of every marker.
    pub fn snapshot(&self) -> Vec<Point> {
        self.positions.iter().map(|rx| *rx.borrow()).collect()
    }

    /// Completed cycles of marker `index`.
    pub fn cycles(&self, index: usize) -> Option<u64> {
        self.cycles.get(index).map(|c| c.load(Ordering::Relaxed))
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for every marker task; returns how many were joined.
    pub async fn shutdown(mut self) -> usize {
        self.token.cancel();
        let mut joined = 0;
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "marker task ended abnormally");
            }
            joined += 1;
        }
        tracing::debug!(joined, "flow animation stopped");
        joined
    }
}

impl Drop for FlowAnimation {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn run_marker(
    track: MarkerTrack,
    frame_interval: Duration,
    tx: watch::Sender<Point>,
    completed: Arc<AtomicU64>,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Cycle starts advance by exactly one duration, so they never drift.
    let mut cycle_start = Instant::now();
    loop {
        tx.send_replace(track.start);
        loop {
            tokio::select! {
                _ = token.cancelled() => return,
                now = ticker.tick() => {
                    let elapsed = now.saturating_duration_since(cycle_start);
                    if elapsed >= track.duration {
                        tx.send_replace(track.end);
                        cycle_start += track.duration;
                        completed.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    tx.send_replace(track.position_at(elapsed));
                }
            }
        }
    }
}

/// Loads routes and world shapes, writes the first frame, and starts the markers.
#[derive(Clone, Debug, Default)]
pub struct FlowAnimator {
    pub request: FlowRequest,
}

pub struct FlowOutput {
    pub path: PathBuf,
    pub map: FlowMap,
    pub animation: FlowAnimation,
}

impl FlowAnimator {
    pub fn new(request: FlowRequest) -> Self {
        Self { request }
    }

    pub async fn map<F: Fetch>(&self, fetcher: &F) -> Result<FlowMap, LoadError> {
        let r = &self.request;
        let (routes, world) = tokio::try_join!(
            fetch_json::<RouteCollection, F>(fetcher, &r.routes_file),
            fetch_json::<Topology, F>(fetcher, &r.world_url),
        )?;
        let edges = edges_from_routes(&r.routes_file, routes)?;
        let countries = world
            .features(&r.world_object)
            .map_err(|e| LoadError::data(&r.world_url, e.to_string()))?;
        Ok(FlowMap::new(r.clone(), countries, &edges))
    }
}

impl Loader for FlowAnimator {
    type Output = FlowOutput;

    fn name(&self) -> &str {
        &self.request.target
    }

    async fn load<F: Fetch>(&self, ctx: &LoadContext<'_, F>) -> Result<FlowOutput, LoadError> {
        let map = self.map(ctx.fetcher).await?;
        let path = ctx.targets.resolve(&self.request.target)?;
        let opts = PanelOptions { theme: ctx.theme, ..PanelOptions::default() };
        map.render_frame_to_png(&opts, &map.origins(), &path)?;
        tracing::info!(element = %self.request.target, path = %path.display(), edges = map.edges.len(), "wrote flow map");
        let animation = FlowAnimation::start(map.tracks(), self.request.frame_interval());
        Ok(FlowOutput { path, map, animation })
    }
}

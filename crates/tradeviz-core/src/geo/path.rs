// File: crates/tradeviz-core/src/geo/path.rs
// Summary: Projected geometry → Skia paths and pixel-space hit testing.

use skia_safe as skia;

use super::projection::Projection;
use super::{Geometry, Position};
use crate::geometry::{ring_contains, Point};

/// Longitude jump treated as a wrap across the antimeridian.
const WRAP_DEGREES: f64 = 180.0;

/// Split a run of positions into projected pieces, breaking at antimeridian
/// wraps and at positions that do not project.
pub fn project_run(positions: &[Position], projection: &impl Projection) -> Vec<Vec<Point>> {
    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    let mut last_lon: Option<f64> = None;
    for &p in positions {
        let wrapped = last_lon.is_some_and(|lon| (p[0] - lon).abs() > WRAP_DEGREES);
        match projection.project(p) {
            Some(q) if !wrapped => current.push(q),
            Some(q) => {
                runs.push(std::mem::take(&mut current));
                current.push(q);
            }
            None => runs.push(std::mem::take(&mut current)),
        }
        last_lon = Some(p[0]);
    }
    runs.push(current);
    runs.retain(|r| !r.is_empty());
    runs
}

/// Pixel rings of every polygon in `geometry` (exterior and holes alike).
pub fn projected_rings(geometry: &Geometry, projection: &impl Projection) -> Vec<Vec<Point>> {
    geometry
        .polygons()
        .into_iter()
        .flatten()
        .flat_map(|ring| project_run(ring, projection))
        .filter(|r| r.len() >= 3)
        .collect()
}

/// Path for `geometry`: polygon rings closed, lines open, points ignored.
pub fn geometry_path(geometry: &Geometry, projection: &impl Projection) -> skia::Path {
    let mut path = skia::Path::new();
    append(&mut path, geometry, projection);
    path
}

fn append(path: &mut skia::Path, geometry: &Geometry, projection: &impl Projection) {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => {}
        Geometry::LineString(line) => add_runs(path, project_run(line, projection), false),
        Geometry::MultiLineString(lines) => {
            for line in lines {
                add_runs(path, project_run(line, projection), false);
            }
        }
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => {
            for rings in geometry.polygons() {
                for ring in rings {
                    let runs = project_run(ring, projection);
                    // A ring cut by the antimeridian is drawn as open pieces.
                    let close = runs.len() == 1;
                    add_runs(path, runs, close);
                }
            }
        }
        Geometry::GeometryCollection(gs) => {
            for g in gs {
                append(path, g, projection);
            }
        }
    }
}

fn add_runs(path: &mut skia::Path, runs: Vec<Vec<Point>>, close: bool) {
    for run in runs {
        let Some((first, rest)) = run.split_first() else { continue };
        path.move_to(first.to_skia());
        for p in rest {
            path.line_to(p.to_skia());
        }
        if close {
            path.close();
        }
    }
}

/// Even-odd containment over all rings, so holes exclude their interior.
pub fn rings_contain(rings: &[Vec<Point>], p: Point) -> bool {
    rings.iter().filter(|r| ring_contains(r, p)).count() % 2 == 1
}

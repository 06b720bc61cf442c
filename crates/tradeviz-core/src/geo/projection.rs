// File: crates/tradeviz-core/src/geo/projection.rs
// Summary: Cartographic projections (Mercator, Natural Earth I) with center/scale/translate and fit-to-size.

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use super::{Feature, Position};
use crate::geometry::{Bounds, Point};

/// Longitude/latitude degrees → pixel coordinates.
pub trait Projection {
    /// `None` when the position has no finite image.
    fn project(&self, position: Position) -> Option<Point>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionKind {
    Mercator,
    NaturalEarth1,
}

impl ProjectionKind {
    /// Unit projection of radians.
    fn raw(self, lambda: f64, phi: f64) -> (f64, f64) {
        match self {
            ProjectionKind::Mercator => (lambda, (FRAC_PI_4 + phi / 2.0).tan().ln()),
            ProjectionKind::NaturalEarth1 => {
                let phi2 = phi * phi;
                let phi4 = phi2 * phi2;
                (
                    lambda * (0.8707 - 0.131979 * phi2 + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
                    phi * (1.007226 + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
                )
            }
        }
    }

    fn default_scale(self) -> f64 {
        match self {
            ProjectionKind::Mercator => 961.0 / TAU,
            ProjectionKind::NaturalEarth1 => 175.295,
        }
    }
}

/// Unrotated projection: `x = tx + k·(raw.x − c.x)`, `y = ty − k·(raw.y − c.y)`
/// where `c` is the raw image of `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoProjection {
    pub kind: ProjectionKind,
    pub center: Position,
    pub scale: f64,
    pub translate: (f64, f64),
}

const PROBE_SCALE: f64 = 150.0;

impl GeoProjection {
    pub fn new(kind: ProjectionKind) -> Self {
        Self { kind, center: [0.0, 0.0], scale: kind.default_scale(), translate: (480.0, 250.0) }
    }

    pub fn mercator() -> Self {
        Self::new(ProjectionKind::Mercator)
    }

    pub fn natural_earth1() -> Self {
        Self::new(ProjectionKind::NaturalEarth1)
    }

    pub fn with_center(mut self, center: Position) -> Self {
        self.center = center;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, x: f64, y: f64) -> Self {
        self.translate = (x, y);
        self
    }

    fn raw_degrees(&self, [lon, lat]: Position) -> (f64, f64) {
        let mut lambda = lon.to_radians();
        if lambda.abs() > PI {
            lambda -= (lambda / TAU).round() * TAU;
        }
        self.kind.raw(lambda, lat.to_radians())
    }

    /// Pick scale and translate so the projected bounds of `features` fill
    /// `width × height`, centered on the unused axis. Leaves the projection
    /// unchanged when nothing projects.
    pub fn fit_size(self, width: f64, height: f64, features: &[Feature]) -> Self {
        let probe = Self { scale: PROBE_SCALE, translate: (0.0, 0.0), ..self };
        let b = projected_bounds(&probe, features);
        if b.is_empty() {
            return self;
        }
        let k = (width / b.width()).min(height / b.height());
        if !k.is_finite() {
            return self;
        }
        let x = (width - k * (b.max.x + b.min.x)) / 2.0;
        let y = (height - k * (b.max.y + b.min.y)) / 2.0;
        Self { scale: PROBE_SCALE * k, translate: (x, y), ..self }
    }
}

impl Projection for GeoProjection {
    fn project(&self, position: Position) -> Option<Point> {
        let (px, py) = self.raw_degrees(position);
        let (cx, cy) = self.raw_degrees(self.center);
        let p = Point::new(
            self.translate.0 + self.scale * (px - cx),
            self.translate.1 - self.scale * (py - cy),
        );
        p.is_finite().then_some(p)
    }
}

/// Pixel bounds of every projectable vertex.
pub fn projected_bounds(projection: &impl Projection, features: &[Feature]) -> Bounds {
    let mut bounds = Bounds::empty();
    for g in features.iter().filter_map(|f| f.geometry.as_ref()) {
        g.for_each_position(&mut |p| {
            if let Some(q) = projection.project(p) {
                bounds.extend(q);
            }
        });
    }
    bounds
}

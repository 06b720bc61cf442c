// File: crates/tradeviz-core/src/geo/geojson.rs
// Summary: Route FeatureCollection: two-point LineStrings tagged with destination and volume.

use serde::Deserialize;
use serde_json::Value;

use super::Position;

#[derive(Debug, Deserialize)]
pub struct RouteCollection {
    #[serde(default)]
    pub features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
pub struct RouteFeature {
    pub geometry: RouteGeometry,
    #[serde(default)]
    pub properties: RouteProperties,
}

#[derive(Debug, Deserialize)]
pub struct RouteGeometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteProperties {
    #[serde(default)]
    pub destino: Option<String>,
    #[serde(default)]
    pub volume: Value,
}

impl RouteFeature {
    /// First and second coordinates; `None` if the line is shorter than two
    /// points or a point lacks lon/lat.
    pub fn endpoints(&self) -> Option<(Position, Position)> {
        let pos = |c: &Vec<f64>| match c[..] {
            [lon, lat, ..] => Some([lon, lat]),
            _ => None,
        };
        match &self.geometry.coordinates[..] {
            [a, b, ..] => Some((pos(a)?, pos(b)?)),
            _ => None,
        }
    }

    /// Numeric volume; numeric strings are accepted, anything else is NaN.
    pub fn volume(&self) -> f64 {
        match &self.properties.volume {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }
}

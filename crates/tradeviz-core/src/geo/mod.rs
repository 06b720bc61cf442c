// File: crates/tradeviz-core/src/geo/mod.rs
// Summary: Geographic features in longitude/latitude degrees, plus decoding, projection and path building.

pub mod geojson;
pub mod path;
pub mod projection;
pub mod topojson;

use serde_json::{Map, Value};

/// `[longitude, latitude]` in degrees.
pub type Position = [f64; 2];

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    /// Visit every position, in document order.
    pub fn for_each_position(&self, f: &mut impl FnMut(Position)) {
        match self {
            Geometry::Point(p) => f(*p),
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.iter().copied().for_each(f),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().copied().for_each(f)
            }
            Geometry::MultiPolygon(polys) => polys.iter().flatten().flatten().copied().for_each(f),
            Geometry::GeometryCollection(gs) => gs.iter().for_each(|g| g.for_each_position(f)),
        }
    }

    /// Polygon rings, each polygon as (exterior, holes...).
    pub fn polygons(&self) -> Vec<&[Vec<Position>]> {
        match self {
            Geometry::Polygon(rings) => vec![rings.as_slice()],
            Geometry::MultiPolygon(polys) => polys.iter().map(Vec::as_slice).collect(),
            Geometry::GeometryCollection(gs) => gs.iter().flat_map(Geometry::polygons).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` for null geometries.
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

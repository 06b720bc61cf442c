// File: crates/tradeviz-core/src/geo/topojson.rs
// Summary: TopoJSON topology decoding: quantized delta arcs stitched back into GeoJSON-style features.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{Feature, Geometry, Position};

#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("topology has no object named `{0}`")]
    MissingObject(String),
    #[error("arc index {0} out of range")]
    ArcOutOfRange(i64),
    #[error("malformed `{kind}` geometry: {reason}")]
    Malformed { kind: String, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Position {
        [x * self.scale[0] + self.translate[0], y * self.scale[1] + self.translate[1]]
    }
}

#[derive(Debug, Deserialize)]
struct GeometryObject {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    arcs: Value,
    #[serde(default)]
    coordinates: Value,
    #[serde(default)]
    geometries: Vec<GeometryObject>,
}

/// A parsed topology with its arcs already delta-decoded and transformed.
#[derive(Debug)]
pub struct Topology {
    arcs: Vec<Vec<Position>>,
    transform: Option<Transform>,
    objects: BTreeMap<String, GeometryObject>,
}

#[derive(Deserialize)]
struct RawTopology {
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: BTreeMap<String, GeometryObject>,
}

impl<'de> Deserialize<'de> for Topology {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawTopology::deserialize(deserializer)?;
        Ok(Topology::decode(raw))
    }
}

impl Topology {
    fn decode(raw: RawTopology) -> Self {
        let transform = raw.transform;
        let arcs = raw
            .arcs
            .into_iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.into_iter()
                    .map(|p| {
                        let (px, py) = (p.first().copied().unwrap_or(0.0), p.get(1).copied().unwrap_or(0.0));
                        match transform {
                            Some(t) => {
                                x += px;
                                y += py;
                                t.apply(x, y)
                            }
                            None => [px, py],
                        }
                    })
                    .collect()
            })
            .collect();
        Self { arcs, transform, objects: raw.objects }
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Absolute arc coordinates after decoding.
    pub fn arc(&self, index: usize) -> Option<&[Position]> {
        self.arcs.get(index).map(Vec::as_slice)
    }

    /// Features of object `name`. A GeometryCollection yields one feature per
    /// member; any other object yields a single feature.
    pub fn features(&self, name: &str) -> Result<Vec<Feature>, TopologyError> {
        let object = self.objects.get(name).ok_or_else(|| TopologyError::MissingObject(name.to_string()))?;
        if object.kind.as_deref() == Some("GeometryCollection") {
            object.geometries.iter().map(|g| self.feature(g)).collect()
        } else {
            Ok(vec![self.feature(object)?])
        }
    }

    fn feature(&self, o: &GeometryObject) -> Result<Feature, TopologyError> {
        let id = o.id.as_ref().and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        Ok(Feature { id, properties: o.properties.clone().unwrap_or_default(), geometry: self.geometry(o)? })
    }

    fn geometry(&self, o: &GeometryObject) -> Result<Option<Geometry>, TopologyError> {
        let Some(kind) = o.kind.as_deref() else { return Ok(None) };
        let g = match kind {
            "Point" => Geometry::Point(self.position(&decode::<Vec<f64>>(kind, &o.coordinates)?)),
            "MultiPoint" => Geometry::MultiPoint(
                decode::<Vec<Vec<f64>>>(kind, &o.coordinates)?.iter().map(|p| self.position(p)).collect(),
            ),
            "LineString" => Geometry::LineString(self.line(&decode::<Vec<i64>>(kind, &o.arcs)?)?),
            "MultiLineString" => Geometry::MultiLineString(
                decode::<Vec<Vec<i64>>>(kind, &o.arcs)?.iter().map(|l| self.line(l)).collect::<Result<_, _>>()?,
            ),
            "Polygon" => Geometry::Polygon(self.polygon(&decode::<Vec<Vec<i64>>>(kind, &o.arcs)?)?),
            "MultiPolygon" => Geometry::MultiPolygon(
                decode::<Vec<Vec<Vec<i64>>>>(kind, &o.arcs)?
                    .iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<_, _>>()?,
            ),
            "GeometryCollection" => Geometry::GeometryCollection(
                o.geometries
                    .iter()
                    .filter_map(|g| self.geometry(g).transpose())
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Ok(None),
        };
        Ok(Some(g))
    }

    /// Point coordinates are quantized but not delta-encoded.
    fn position(&self, p: &[f64]) -> Position {
        let (x, y) = (p.first().copied().unwrap_or(0.0), p.get(1).copied().unwrap_or(0.0));
        match self.transform {
            Some(t) => t.apply(x, y),
            None => [x, y],
        }
    }

    /// Append arc `i` (reversed when negative, `~i`), dropping the point it
    /// shares with the previous arc.
    fn push_arc(&self, i: i64, points: &mut Vec<Position>) -> Result<(), TopologyError> {
        points.pop();
        let index = if i < 0 { !i } else { i };
        let arc = usize::try_from(index)
            .ok()
            .and_then(|idx| self.arcs.get(idx))
            .ok_or(TopologyError::ArcOutOfRange(i))?;
        let start = points.len();
        points.extend_from_slice(arc);
        if i < 0 {
            points[start..].reverse();
        }
        Ok(())
    }

    fn line(&self, arcs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points = Vec::new();
        for &i in arcs {
            self.push_arc(i, &mut points)?;
        }
        if let [only] = points[..] {
            points.push(only);
        }
        Ok(points)
    }

    fn ring(&self, arcs: &[i64]) -> Result<Vec<Position>, TopologyError> {
        let mut points = self.line(arcs)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(points)
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Vec<Vec<Position>>, TopologyError> {
        rings.iter().map(|r| self.ring(r)).collect()
    }
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, v: &Value) -> Result<T, TopologyError> {
    T::deserialize(v).map_err(|e| TopologyError::Malformed { kind: kind.to_string(), reason: e.to_string() })
}

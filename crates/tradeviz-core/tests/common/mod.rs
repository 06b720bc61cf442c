// File: crates/tradeviz-core/tests/common/mod.rs
// Purpose: Small deterministic data files shared by the integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use tradeviz_core::MemoryFetcher;

pub const SERIES_JSON: &str = r#"{
  "China": [
    {"Date": "2020-01-01", "Value": 1500000000},
    {"Date": "2021-01-01", "Value": 3000000000},
    {"Date": "2022-01-01", "Value": 2500000000}
  ],
  "Argentina": [
    {"Date": "2020-01-01", "Value": 400000000},
    {"Date": "2021-01-01", "Value": 500000000}
  ],
  "United States": [
    {"Date": "2020-01-01", "Value": 900000000},
    {"Date": "2021-01-01", "Value": 1100000000}
  ],
  "Chile": [
    {"Date": "2020-01-01", "Value": 100000000}
  ]
}"#;

pub const COMMODITIES_JSON: &str = r#"[
  {"name": "Soybeans", "value": 42900000000},
  {"name": "Crude oil", "value": 44800000000},
  {"name": "Iron ore", "value": 29800000000},
  {"name": "Cars", "value": 3100000000},
  {"name": "Coffee", "value": 9800000000},
  {"name": "Mystery", "value": 1200000000}
]"#;

/// Two unit squares sharing an edge (quantized, delta-encoded) plus a null geometry.
/// Absolute coordinates: SP covers lon -60..-50, RJ covers lon -50..-40, both lat -20..-10.
pub const STATES_TOPOLOGY: &str = r#"{
  "type": "Topology",
  "transform": {"scale": [1, 1], "translate": [-60, -20]},
  "arcs": [
    [[10, 0], [0, 10]],
    [[10, 10], [-10, 0], [0, -10], [10, 0]],
    [[10, 0], [10, 0], [0, 10], [-10, 0]]
  ],
  "objects": {
    "estados": {
      "type": "GeometryCollection",
      "geometries": [
        {"type": "Polygon", "id": "SP", "properties": {"nome": "São Paulo"}, "arcs": [[0, 1]]},
        {"type": "Polygon", "id": " rj ", "properties": {"nome": "Rio de Janeiro"}, "arcs": [[2, -1]]},
        {"type": null, "id": "MG", "properties": {"nome": "Minas Gerais"}}
      ]
    }
  }
}"#;

pub const EXPORTS_CSV: &str = "UF,Exportação\n sp ,12000000000\nRJ,5000000000abc\nMG,0\n";

pub const ROUTES_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "geometry": {"type": "LineString", "coordinates": [[-46.6, -23.5], [121.5, 31.2]]},
     "properties": {"destino": "CHINA", "volume": 400000000}},
    {"type": "Feature",
     "geometry": {"type": "LineString", "coordinates": [[-48.5, -1.4], [-74.0, 40.7]]},
     "properties": {"destino": "ESTADOS UNIDOS", "volume": 100000000}}
  ]
}"#;

/// One box of land, untransformed arcs.
pub const WORLD_TOPOLOGY: &str = r#"{
  "type": "Topology",
  "arcs": [[[-80, -40], [130, -40], [130, 50], [-80, 50], [-80, -40]]],
  "objects": {
    "countries": {
      "type": "GeometryCollection",
      "geometries": [{"type": "Polygon", "id": 1, "properties": {"name": "Land"}, "arcs": [[0]]}]
    }
  }
}"#;

pub const WORLD_LOCATION: &str = "world.json";

pub fn page_fetcher() -> MemoryFetcher {
    MemoryFetcher::new()
        .with("top_exp.json", SERIES_JSON)
        .with("top_imp.json", SERIES_JSON)
        .with("prod_exp.json", COMMODITIES_JSON)
        .with("brazil-states.json", STATES_TOPOLOGY)
        .with("data.csv", EXPORTS_CSV)
        .with("routes_with_volumes.geojson", ROUTES_GEOJSON)
        .with(WORLD_LOCATION, WORLD_TOPOLOGY)
}

/// Fresh, empty output directory under `target/test_out`.
pub fn out_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/test_out").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create test output dir");
    dir
}

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&[137, 80, 78, 71])
}

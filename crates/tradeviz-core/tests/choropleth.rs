// File: crates/tradeviz-core/tests/choropleth.rs
// Purpose: Region join, fill colors, hit testing, tooltip text and the map loader end to end.

mod common;

use std::collections::BTreeMap;

use tradeviz_core::choropleth::{normalize_region, ExportTable, RegionExportRecord};
use tradeviz_core::geo::projection::Projection;
use tradeviz_core::geo::topojson::{Topology, TopologyError};
use tradeviz_core::{
    run_isolated, ChartRegistry, ChoroplethLoader, ChoroplethMap, ChoroplethRequest, LoadContext, LoadError, Loader,
    MemoryFetcher, RenderTargets, Rgb, Tooltip,
};

async fn sample_map() -> ChoroplethMap {
    ChoroplethLoader::new(ChoroplethRequest::default())
        .map(&common::page_fetcher())
        .await
        .expect("choropleth map")
}

#[test]
fn region_codes_are_trimmed_and_uppercased() {
    assert_eq!(normalize_region(" sp "), "SP");
    assert_eq!(normalize_region("Rj"), "RJ");
    let table = ExportTable::from_records([RegionExportRecord::new(" sp ", "12")]);
    assert_eq!(table.get("SP"), Some(12.0));
    assert_eq!(table.get("sp"), Some(12.0));
}

#[test]
fn values_parse_like_parse_float() {
    assert_eq!(RegionExportRecord::new("RJ", "5000000000abc").export_value, 5e9);
    assert_eq!(RegionExportRecord::new("RJ", "  7.5e2 ").export_value, 750.0);
    assert!(RegionExportRecord::new("RJ", "n/a").export_value.is_nan());
    assert!(RegionExportRecord::new("RJ", "").export_value.is_nan());
}

#[test]
fn later_records_win_and_unusable_values_are_missing() {
    let table = ExportTable::from_records([
        RegionExportRecord::new("SP", "1"),
        RegionExportRecord::new("sp", "2"),
        RegionExportRecord::new("MG", "0"),
        RegionExportRecord::new("BA", "x"),
    ]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.value_of("SP"), Some(2.0));
    assert_eq!(table.get("MG"), Some(0.0));
    assert_eq!(table.value_of("MG"), None);
    assert_eq!(table.value_of("BA"), None);
    assert_eq!(table.value_of("AM"), None);
}

#[test]
fn rows_without_the_region_column_fail() {
    let rows: Vec<BTreeMap<String, String>> = vec![[("Estado".to_string(), "SP".to_string())].into_iter().collect()];
    let err = ExportTable::from_rows("data.csv", &rows, "UF", "Exportação").unwrap_err();
    assert!(matches!(err, LoadError::Data { .. }), "{err:?}");
}

#[test]
fn topology_arcs_are_stitched_into_closed_rings() {
    let topology: Topology = serde_json::from_str(common::STATES_TOPOLOGY).unwrap();
    let features = topology.features("estados").unwrap();
    assert_eq!(features.len(), 3);
    assert_eq!(features[0].id.as_deref(), Some("SP"));
    assert_eq!(features[0].property_str("nome"), Some("São Paulo"));
    assert!(features[2].geometry.is_none());

    let sp = features[0].geometry.as_ref().unwrap().polygons();
    assert_eq!(
        sp[0][0],
        vec![[-50.0, -20.0], [-50.0, -10.0], [-60.0, -10.0], [-60.0, -20.0], [-50.0, -20.0]]
    );
    let rj = features[1].geometry.as_ref().unwrap().polygons();
    assert_eq!(
        rj[0][0],
        vec![[-50.0, -20.0], [-40.0, -20.0], [-40.0, -10.0], [-50.0, -10.0], [-50.0, -20.0]]
    );

    assert!(matches!(topology.features("municipios"), Err(TopologyError::MissingObject(_))));
}

#[tokio::test]
async fn fills_follow_the_linear_scale_or_fall_back_to_gray() {
    let map = sample_map().await;
    assert_eq!(map.regions.len(), 3);
    // SP: 12e9 of 15e9.
    assert_eq!(map.fill_for(0), Rgb::new(50, 148, 98));
    assert_eq!(map.value_for(1), Some(5e9));
    // MG has a zero value.
    assert_eq!(map.fill_for(2), Rgb::new(0xcc, 0xcc, 0xcc));
    assert_eq!(map.value_for(2), None);
}

#[tokio::test]
async fn projection_is_centered_on_the_panel() {
    let map = sample_map().await;
    let c = map.projection().project([-50.0, -13.0]).unwrap();
    assert!((c.x - 300.0).abs() < 1e-9 && (c.y - 300.0).abs() < 1e-9);
    // Further north is higher up.
    let north = map.projection().project([-50.0, -5.0]).unwrap();
    assert!(north.y < c.y);
}

#[tokio::test]
async fn hit_testing_and_tooltip() {
    let map = sample_map().await;
    let m = map.request.margin;
    let rj = map.projection().project([-45.0, -15.0]).unwrap();
    let sp = map.projection().project([-55.0, -15.0]).unwrap();
    assert_eq!(map.region_at(rj.x + m, rj.y + m), Some(1));
    assert_eq!(map.region_at(sp.x + m, sp.y + m), Some(0));
    assert_eq!(map.region_at(1.0, 1.0), None);

    let mut tip = Tooltip::new();
    assert!(!tip.is_visible());
    tip.mouse_over(&map, 0);
    tip.mouse_move(120.0, 80.0);
    assert!(tip.is_visible());
    assert_eq!((tip.left, tip.top), (130.0, 90.0));
    assert_eq!(tip.html(), "<strong>São Paulo</strong><br>Exportação: US$12,000,000,000");

    tip.mouse_over(&map, 2);
    assert_eq!(tip.value_text(), "Sem dados");
    assert_eq!(tip.lines()[1], "Exportação: US$Sem dados");

    tip.mouse_out();
    assert!(!tip.is_visible());
    assert_eq!(tip.name, "Minas Gerais");
}

#[tokio::test]
async fn tooltip_overlay_renders() {
    let map = sample_map().await;
    let mut tip = Tooltip::new();
    tip.mouse_over(&map, 1);
    tip.mouse_move(200.0, 200.0);
    let opts = tradeviz_core::PanelOptions::default();
    let plain = map.render_to_png_bytes(&opts, None).unwrap();
    let with_tip = map.render_to_png_bytes(&opts, Some(&tip)).unwrap();
    assert!(common::is_png(&plain) && common::is_png(&with_tip));
    assert_ne!(plain, with_tip);
}

#[tokio::test]
async fn loader_writes_the_map_target() {
    let dir = common::out_dir("choropleth_loader");
    let targets = RenderTargets::new(&dir).with(["map"]);
    let registry = ChartRegistry::new();
    let fetcher = common::page_fetcher();
    let ctx = LoadContext::new(&fetcher, &targets, &registry);

    let out = run_isolated(&ChoroplethLoader::default(), &ctx).await.expect("choropleth output");
    assert_eq!(out.path, dir.join("map.png"));
    assert!(common::is_png(&std::fs::read(&out.path).unwrap()));
    assert_eq!(out.map.table.len(), 3);
}

#[tokio::test]
async fn either_source_missing_fails_the_whole_map() {
    let dir = common::out_dir("choropleth_missing_csv");
    let targets = RenderTargets::new(&dir).with(["map"]);
    let registry = ChartRegistry::new();
    let fetcher = MemoryFetcher::new().with("brazil-states.json", common::STATES_TOPOLOGY);
    let ctx = LoadContext::new(&fetcher, &targets, &registry);

    let err = ChoroplethLoader::default().load(&ctx).await.err().expect("must fail");
    assert_eq!(err.status(), Some(404));
    assert!(!dir.join("map.png").exists());
}

// File: crates/tradeviz-core/tests/page.rs
// Purpose: Whole-page runs: every target rendered, failures isolated, reruns replace charts.

mod common;

use tradeviz_core::{Page, PageConfig, RenderTargets};

fn config(out: &std::path::Path) -> PageConfig {
    let mut config = PageConfig { out_dir: out.to_path_buf(), ..PageConfig::default() };
    config.flow.world_url = common::WORLD_LOCATION.into();
    config
}

#[test]
fn config_defaults_and_partial_files() {
    let defaults = PageConfig::default();
    assert_eq!(
        defaults.target_ids(),
        ["myChartExports", "myChartImports", "bubbleChartContainer", "map", "routeMap"]
    );

    let dir = common::out_dir("page_config");
    let path = dir.join("page.json");
    std::fs::write(&path, r#"{"out_dir": "elsewhere", "flow": {"frame_interval_ms": 40}}"#).unwrap();
    let loaded = PageConfig::load(&path).unwrap();
    assert_eq!(loaded.out_dir, std::path::PathBuf::from("elsewhere"));
    assert_eq!(loaded.flow.frame_interval_ms, 40);
    assert_eq!(loaded.flow.target, "routeMap");
    assert_eq!(loaded.bubble, defaults.bubble);

    assert!(PageConfig::load(dir.join("absent.json")).is_err());
}

#[tokio::test]
async fn every_target_is_rendered() {
    let out = common::out_dir("page_all");
    let page = Page::new(config(&out));
    let report = page.run(&common::page_fetcher()).await;

    assert_eq!(report.rendered(), 5);
    assert_eq!(report.failed(), 0);
    for id in page.config().target_ids() {
        let bytes = std::fs::read(out.join(format!("{id}.png"))).unwrap();
        assert!(common::is_png(&bytes), "{id}");
    }
    assert_eq!(page.registry().live_instances(), 2);

    if let Some(flow) = report.flow {
        assert_eq!(flow.animation.shutdown().await, 2);
    }
}

#[tokio::test]
async fn one_failure_leaves_the_rest_untouched() {
    let out = common::out_dir("page_isolated");
    let page = Page::new(config(&out));
    let ids: Vec<String> = page.config().target_ids().into_iter().filter(|id| id != "map").collect();
    let page = page.with_targets(RenderTargets::new(&out).with(ids));

    let report = page.run(&common::page_fetcher()).await;
    assert!(report.choropleth.is_none());
    assert_eq!(report.rendered(), 4);
    assert!(!out.join("map.png").exists());
    assert!(out.join("bubbleChartContainer.png").exists());
}

#[tokio::test]
async fn rerunning_replaces_line_charts() {
    let out = common::out_dir("page_rerun");
    let page = Page::new(config(&out));
    let fetcher = common::page_fetcher();
    page.run(&fetcher).await;
    page.run(&fetcher).await;
    assert_eq!(page.registry().live_instances(), 2);
    assert_eq!(page.registry().destroyed_count(), 2);
}

// File: crates/tradeviz-core/tests/timeseries.rs
// Purpose: Time-series reshaping, highlight colors, reload semantics and failure isolation.

mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tradeviz_core::timeseries::{build_datasets, parse_date};
use tradeviz_core::{
    run_isolated, ChartRegistry, HighlightPolicy, LoadContext, LoadError, Loader, MemoryFetcher, RenderTargets, Rgb,
    TimeSeriesLoader, TimeSeriesRequest,
};

fn request(data_file: &str) -> TimeSeriesRequest {
    TimeSeriesRequest { data_file: data_file.into(), ..TimeSeriesRequest::exports() }
}

#[tokio::test]
async fn one_dataset_per_key_in_document_order() {
    let fetcher = MemoryFetcher::new().with("top_exp.json", common::SERIES_JSON);
    let loader = TimeSeriesLoader::new(request("top_exp.json"), HighlightPolicy::default());
    let datasets = loader.datasets(&fetcher).await.expect("datasets");

    let labels: Vec<&str> = datasets.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, ["China", "Argentina", "United States", "Chile"]);

    let china: Vec<f64> = datasets[0].values();
    assert_eq!(china, vec![1.5, 3.0, 2.5]);
    assert_eq!(datasets[1].values(), vec![0.4, 0.5]);
}

#[test]
fn highlight_colors_are_exact_and_everyone_else_is_gray() {
    let raw = serde_json::from_value(json!({
        "Chile": [], "China": [], "Peru": [], "United States": [], "India": [], "Japan": []
    }))
    .unwrap();
    let datasets = build_datasets("inline", raw, &HighlightPolicy::default()).unwrap();
    for d in &datasets {
        let want = match d.label.as_str() {
            "China" => Rgb::new(0xdb, 0x04, 0x04),
            "United States" => Rgb::new(0x03, 0x10, 0x40),
            _ => Rgb::new(0xd3, 0xd3, 0xd3),
        };
        assert_eq!(d.color, want, "{}", d.label);
    }
}

#[test]
fn minimal_series_keeps_date_order_and_scales_to_billions() {
    let raw = serde_json::from_value(json!({
        "Brazil": [
            {"Date": "2023-01-01", "Value": 1_000_000_000},
            {"Date": "2024-01-01", "Value": 2_000_000_000}
        ]
    }))
    .unwrap();
    let datasets = build_datasets("inline", raw, &HighlightPolicy::default()).unwrap();
    assert_eq!(datasets.len(), 1);
    let d = &datasets[0];
    assert_eq!(d.values(), vec![1.0, 2.0]);
    assert!(d.points[0].date < d.points[1].date);
    assert_eq!(d.points[0].date, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn unreadable_records_are_skipped() {
    let raw = serde_json::from_value(json!({
        "Brazil": [
            {"Date": "not a date", "Value": 1},
            {"Date": "2024-01-01", "Value": "3e9"},
            {"Date": "2025-01-01", "Value": null}
        ]
    }))
    .unwrap();
    let datasets = build_datasets("inline", raw, &HighlightPolicy::default()).unwrap();
    assert_eq!(datasets[0].values(), vec![3.0]);
}

#[test]
fn non_array_series_is_a_data_error() {
    let raw = serde_json::from_value(json!({"Brazil": {"Date": "2024-01-01"}})).unwrap();
    let err = build_datasets("top_exp.json", raw, &HighlightPolicy::default()).unwrap_err();
    assert!(matches!(err, LoadError::Data { .. }), "{err:?}");
}

#[test]
fn date_forms() {
    let jan = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(parse_date(&json!("2021-01-01")), Some(jan));
    assert_eq!(parse_date(&json!("2021-01")), Some(jan));
    assert_eq!(parse_date(&json!("2021")), Some(jan));
    assert_eq!(parse_date(&json!("2021-01-01T00:00:00Z")), Some(jan));
    assert_eq!(parse_date(&json!("2021-01-01 00:00:00")), Some(jan));
    assert_eq!(parse_date(&json!(jan.timestamp_millis())), Some(jan));
    assert_eq!(parse_date(&json!("yesterday")), None);
    assert_eq!(parse_date(&json!(true)), None);
}

#[tokio::test]
async fn reload_destroys_the_previous_chart_first() {
    let out = common::out_dir("timeseries_reload");
    let fetcher = MemoryFetcher::new().with("top_exp.json", common::SERIES_JSON);
    let targets = RenderTargets::new(&out).with(["myChartExports"]);
    let registry = ChartRegistry::new();
    let ctx = LoadContext::new(&fetcher, &targets, &registry);
    let loader = TimeSeriesLoader::new(TimeSeriesRequest::exports(), HighlightPolicy::default());

    let first = loader.load(&ctx).await.expect("first load");
    let second = loader.load(&ctx).await.expect("second load");
    let third = loader.load(&ctx).await.expect("third load");

    assert_eq!(registry.live_instances(), 1);
    assert_eq!(registry.destroyed_count(), 2);
    assert_ne!(first.chart_id, second.chart_id);
    assert_eq!(registry.id_of("chartExports"), Some(third.chart_id));
    assert_eq!(third.dataset_count, 4);
    assert!(common::is_png(&std::fs::read(&third.path).unwrap()));
}

#[tokio::test]
async fn missing_file_is_a_404_and_renders_nothing() {
    let out = common::out_dir("timeseries_404");
    let fetcher = MemoryFetcher::new();
    let targets = RenderTargets::new(&out).with(["myChartExports"]);
    let registry = ChartRegistry::new();
    let ctx = LoadContext::new(&fetcher, &targets, &registry);
    let loader = TimeSeriesLoader::new(TimeSeriesRequest::exports(), HighlightPolicy::default());

    let err = loader.load(&ctx).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("HTTP error! Status: 404"));
    assert!(run_isolated(&loader, &ctx).await.is_none());
    assert_eq!(registry.live_instances(), 0);
    assert!(!out.join("myChartExports.png").exists());
}

#[tokio::test]
async fn malformed_json_is_a_parse_error() {
    let out = common::out_dir("timeseries_json");
    let fetcher = MemoryFetcher::new().with("top_exp.json", "{ not json");
    let targets = RenderTargets::new(&out).with(["myChartExports"]);
    let registry = ChartRegistry::new();
    let ctx = LoadContext::new(&fetcher, &targets, &registry);
    let loader = TimeSeriesLoader::new(TimeSeriesRequest::exports(), HighlightPolicy::default());

    let err = loader.load(&ctx).await.unwrap_err();
    assert!(matches!(err, LoadError::Json { .. }), "{err:?}");
}

#[tokio::test]
async fn unknown_target_is_reported() {
    let out = common::out_dir("timeseries_target");
    let fetcher = MemoryFetcher::new().with("top_exp.json", common::SERIES_JSON);
    let targets = RenderTargets::new(&out);
    let registry = ChartRegistry::new();
    let ctx = LoadContext::new(&fetcher, &targets, &registry);
    let loader = TimeSeriesLoader::new(TimeSeriesRequest::exports(), HighlightPolicy::default());

    let err = loader.load(&ctx).await.unwrap_err();
    assert!(matches!(err, LoadError::MissingTarget(ref id) if id == "myChartExports"), "{err:?}");
}

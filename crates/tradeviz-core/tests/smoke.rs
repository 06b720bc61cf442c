// File: crates/tradeviz-core/tests/smoke.rs
// Purpose: Basic end-to-end render smoke test writing a PNG.

use chrono::{TimeZone, Utc};
use tradeviz_core::{Dataset, LineChart, LineChartOptions, RenderOptions, Rgb, TimeSeriesPoint};

fn yearly(values: &[f64]) -> Vec<TimeSeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| TimeSeriesPoint::from_raw(Utc.with_ymd_and_hms(2015 + i as i32, 1, 1, 0, 0, 0).unwrap(), v))
        .collect()
}

#[test]
fn render_smoke_png() {
    let mut chart = LineChart::new(LineChartOptions { title: "Exports".into(), ..LineChartOptions::default() });
    chart.add_dataset(Dataset::new("China", Rgb::new(0xdb, 0x04, 0x04), yearly(&[3.5e10, 4.7e10, 6.3e10, 6.4e10])));
    chart.add_dataset(Dataset::new("Chile", Rgb::new(0xd3, 0xd3, 0xd3), yearly(&[4.0e9, 5.1e9, 6.2e9])));
    chart.autoscale_axes();
    assert!(chart.y_axis.max >= 64.0);

    let opts = RenderOptions::default();
    let out = std::path::PathBuf::from("target/test_out/smoke.png");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();

    chart.render_to_png(&opts, &out).expect("render should succeed");
    let meta = std::fs::metadata(&out).expect("output exists");
    assert!(meta.len() > 0, "png should be non-empty");

    // Also verify in-memory API works
    let bytes = chart.render_to_png_bytes(&opts).expect("render bytes");
    assert!(bytes.starts_with(&[137, 80, 78, 71]), "should be PNG header");
}

#[test]
fn empty_chart_still_renders() {
    let mut chart = LineChart::new(LineChartOptions::default());
    chart.autoscale_axes();
    let bytes = chart.render_to_png_bytes(&RenderOptions::default()).expect("render bytes");
    assert!(bytes.starts_with(&[137, 80, 78, 71]));
}

// File: crates/tradeviz-core/tests/bubble.rs
// Purpose: Commodity scaling, category colors, legend layout and the bubble loader end to end.

mod common;

use tradeviz_core::bubble::{layout_legend, BubbleLeaf, LEGEND_ORIGIN};
use tradeviz_core::text::ApproxMeasure;
use tradeviz_core::{
    run_isolated, BubblePacker, BubbleRequest, ChartRegistry, CommodityCatalog, LoadContext, LoadError, Loader,
    MemoryFetcher, RenderTargets, Rgb,
};

fn packer() -> BubblePacker {
    BubblePacker::new(BubbleRequest::default(), CommodityCatalog::default())
}

#[tokio::test]
async fn values_are_scaled_to_millions_and_colored_by_category() {
    let fetcher = MemoryFetcher::new().with("prod_exp.json", common::COMMODITIES_JSON);
    let chart = packer().chart(&fetcher).await.expect("bubble chart");
    let leaves = chart.leaves();
    assert_eq!(leaves.len(), 6);

    let find = |name: &str| leaves.iter().find(|l| l.name == name).cloned().expect(name);
    let soy = find("Soybeans");
    assert_eq!(soy.value, 42_900.0);
    assert_eq!(soy.color, Rgb::new(0x64, 0xc8, 0x78));
    assert_eq!(find("Crude oil").color, Rgb::new(0xfb, 0x56, 0x07));
    assert_eq!(find("Iron ore").color, Rgb::new(0xff, 0xc4, 0x03));
    assert_eq!(find("Cars").color, Rgb::new(0x05, 0xae, 0xff));
    assert_eq!(find("Mystery").color, Rgb::BLACK);
    assert_eq!(chart.nodes[5].group, None);
    assert_eq!(chart.nodes[0].group.as_deref(), Some("Agricultural Products"));
}

#[tokio::test]
async fn leaves_sit_below_the_header_inside_the_panel() {
    let fetcher = MemoryFetcher::new().with("prod_exp.json", common::COMMODITIES_JSON);
    let chart = packer().chart(&fetcher).await.unwrap();
    assert_eq!(chart.canvas_size(), (600, 650));

    let side = 580.0;
    for leaf in chart.leaves() {
        assert!(leaf.x - leaf.r >= -1e-6 && leaf.x + leaf.r <= side + 1e-6, "{}", leaf.name);
        assert!(leaf.y - leaf.r >= 50.0 - 1e-6 && leaf.y + leaf.r <= side + 50.0 + 1e-6, "{}", leaf.name);
    }
    let oil = chart.leaves().into_iter().find(|l| l.name == "Crude oil").unwrap();
    let cars = chart.leaves().into_iter().find(|l| l.name == "Cars").unwrap();
    assert!(oil.r > cars.r);
}

#[test]
fn catalog_lookups() {
    let catalog = CommodityCatalog::default();
    assert_eq!(catalog.categories.len(), 4);
    assert_eq!(catalog.members.len(), 16);
    assert_eq!(catalog.category_of("Gold"), Some("Minerals and Metals"));
    assert_eq!(catalog.category_of("gold"), None);
    assert_eq!(catalog.color_for("Wood pulp"), Rgb::new(0x05, 0xae, 0xff));
    assert_eq!(catalog.color_for("Unobtainium"), Rgb::BLACK);
}

#[test]
fn labels_show_grouped_millions() {
    let leaf = BubbleLeaf { name: "Soybeans".into(), value: 42_900.4, color: Rgb::BLACK, x: 0.0, y: 0.0, r: 1.0 };
    assert_eq!(leaf.label_lines(), ["Soybeans".to_string(), "U$42,900M".to_string()]);
    let small = BubbleLeaf { value: 7.6, ..leaf };
    assert_eq!(small.label_lines()[1], "U$8M");
}

#[test]
fn legend_entries_advance_by_measured_width() {
    let catalog = CommodityCatalog::default();
    let entries = layout_legend(&catalog.categories, &ApproxMeasure, 12.0);
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].offset, 0.0);
    assert_eq!(LEGEND_ORIGIN, (20.0, 30.0));

    // "Agricultural Products": 21 glyphs at 0.55em of 12px.
    let text = 21.0 * 12.0 * 0.55;
    assert!((entries[0].width - (15.0 + text)).abs() < 1e-3);
    for pair in entries.windows(2) {
        assert!((pair[1].offset - (pair[0].offset + pair[0].width + 10.0)).abs() < 1e-3);
    }
    assert_eq!(entries[3].label, "Manufactured Goods");
}

#[tokio::test]
async fn missing_values_count_as_zero() {
    let fetcher = MemoryFetcher::new().with("prod_exp.json", r#"[{"name": "Coffee"}, {"name": "Beef", "value": 2000000}]"#);
    let chart = packer().chart(&fetcher).await.unwrap();
    let leaves = chart.leaves();
    assert_eq!(leaves[0].value, 0.0);
    assert_eq!(leaves[0].r, 0.0);
    assert_eq!(leaves[1].value, 2.0);
}

#[tokio::test]
async fn loader_writes_the_target_png() {
    let dir = common::out_dir("bubble_loader");
    let targets = RenderTargets::new(&dir).with(["bubbleChartContainer"]);
    let registry = ChartRegistry::new();
    let fetcher = common::page_fetcher();
    let ctx = LoadContext::new(&fetcher, &targets, &registry);

    let out = run_isolated(&packer(), &ctx).await.expect("bubble output");
    assert_eq!(out.leaves, 6);
    assert_eq!(out.path, dir.join("bubbleChartContainer.png"));
    let bytes = std::fs::read(&out.path).unwrap();
    assert!(common::is_png(&bytes));
    // Bubble charts never go through the line-chart registry.
    assert_eq!(registry.live_instances(), 0);
}

#[tokio::test]
async fn non_array_payload_fails_without_output() {
    let dir = common::out_dir("bubble_bad_payload");
    let targets = RenderTargets::new(&dir).with(["bubbleChartContainer"]);
    let registry = ChartRegistry::new();
    let fetcher = MemoryFetcher::new().with("prod_exp.json", r#"{"Soybeans": 1}"#);
    let ctx = LoadContext::new(&fetcher, &targets, &registry);

    let err = packer().load(&ctx).await.err().expect("must fail");
    assert!(matches!(err, LoadError::Json { .. }), "{err:?}");
    assert!(!dir.join("bubbleChartContainer.png").exists());
}

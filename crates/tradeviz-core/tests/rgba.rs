// File: crates/tradeviz-core/tests/rgba.rs
// Purpose: Validate RGBA rendering buffer shape and a few pixels.

use tradeviz_core::flow::FlowMap;
use tradeviz_core::geometry::Point;
use tradeviz_core::{BubbleChart, BubbleRequest, CommodityCatalog, FlowRequest, LineChart, LineChartOptions, PanelOptions, RenderOptions, Theme};
use tradeviz_core::bubble::CommodityNode;

#[test]
fn line_chart_rgba8_buffer() {
    let chart = LineChart::new(LineChartOptions::default());
    let opts = RenderOptions { draw_labels: false, ..RenderOptions::default() };
    let (px, w, h, stride) = chart.render_to_rgba8(&opts).expect("rgba render");
    assert_eq!((w, h), (800, 400));
    assert_eq!(w as usize * h as usize * 4, px.len());
    assert_eq!(stride, (w as usize) * 4);

    // Check background alpha in top-left pixel (RGBA)
    let a = px[3];
    assert_eq!(a, 255);
}

#[test]
fn value_axis_border_blends_into_the_dark_background() {
    let chart = LineChart::new(LineChartOptions::default());
    let theme = Theme::dark();
    let opts = RenderOptions { theme, draw_labels: false, ..RenderOptions::default() };
    let (px, _, _, stride) = chart.render_to_rgba8(&opts).expect("rgba render");
    let bg = [theme.background.r, theme.background.g, theme.background.b, 0xff];

    // Border runs along x = 756 between the plot top (~79) and bottom (372);
    // rows 100..200 sit between the value ticks.
    for y in 100..200 {
        for x in [755usize, 756] {
            let i = y * stride + x * 4;
            assert_eq!(&px[i..i + 4], &bg, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn bubble_fill_is_the_category_color() {
    let nodes = vec![CommodityNode { name: "Iron ore".into(), value: 100.0, group: None }];
    let chart = BubbleChart::new(BubbleRequest::default(), CommodityCatalog::default(), nodes).unwrap();
    let opts = PanelOptions { draw_labels: false, ..PanelOptions::default() };
    let (px, w, h, stride) = chart.render_to_rgba8(&opts).expect("rgba render");
    assert_eq!((w, h), (600, 650));

    // The single leaf fills the pack box; its center is in panel pixels plus the margin.
    let leaf = &chart.leaves()[0];
    let (x, y) = ((leaf.x + 10.0) as usize, (leaf.y + 10.0) as usize);
    let i = y * stride + x * 4;
    assert_eq!(&px[i..i + 4], &[0xff, 0xc4, 0x03, 0xff]);
}

#[test]
fn flow_marker_is_drawn_where_asked() {
    let map = FlowMap::new(FlowRequest::default(), Vec::new(), &[]);
    let opts = PanelOptions { draw_labels: false, ..PanelOptions::default() };
    let (blank, w, h, _) = map.render_frame_rgba8(&opts, &[]).expect("rgba render");
    assert_eq!((w, h), (1280, 720));
    let (again, _, _, _) = map.render_frame_rgba8(&opts, &[Point::new(5.0, 5.0)]).expect("rgba render");
    // No edges, so positions without a matching edge are ignored.
    assert_eq!(blank, again);
}

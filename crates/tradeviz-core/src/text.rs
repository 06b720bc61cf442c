// File: crates/tradeviz-core/src/text.rs
// Summary: Text measurement and drawing using Skia textlayout with page font defaults.

use skia_safe as skia;
use skia::textlayout::{FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextStyle};

/// Width of a single line of text in pixels.
pub trait MeasureText {
    fn measure(&self, text: &str, size: f32, bold: bool) -> f32;
}

/// Deterministic advance-width estimate (average glyph ≈ 0.55em, bold 0.6em).
/// Used for headless layout where no fonts are installed, and in tests.
#[derive(Clone, Copy, Debug)]
pub struct ApproxMeasure;

impl MeasureText for ApproxMeasure {
    fn measure(&self, text: &str, size: f32, bold: bool) -> f32 {
        let em = if bold { 0.6 } else { 0.55 };
        text.chars().count() as f32 * size * em
    }
}

pub struct TextShaper {
    fonts: FontCollection,
    families: Vec<String>,
}

impl TextShaper {
    pub fn new() -> Self {
        Self::with_family("Instrument Sans")
    }

    /// Shaper preferring `family`, falling back to common sans-serif faces.
    pub fn with_family(family: &str) -> Self {
        let mut fc = FontCollection::new();
        // Use system manager fallback
        fc.set_default_font_manager(skia::FontMgr::default(), None);
        let mut families = vec![family.to_string()];
        families.extend(["Segoe UI", "Arial", "Helvetica", "Roboto", "DejaVu Sans", "sans-serif"].map(String::from));
        Self { fonts: fc, families }
    }

    fn make_style(&self, size: f32, color: skia::Color, bold: bool) -> TextStyle {
        let mut ts = TextStyle::new();
        ts.set_font_size(size.max(1.0));
        ts.set_color(color);
        ts.set_font_families(&self.families);
        if bold {
            ts.set_font_style(skia::FontStyle::bold());
        }
        ts
    }

    pub fn layout(&self, text: &str, size: f32, color: skia::Color, bold: bool) -> Paragraph {
        let mut pstyle = ParagraphStyle::new();
        pstyle.set_text_align(skia::textlayout::TextAlign::Left);
        let mut builder = ParagraphBuilder::new(&pstyle, &self.fonts);
        let style = self.make_style(size, color, bold);
        builder.push_style(&style);
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    /// Draw with the baseline at `y`, starting at `x`.
    pub fn draw_left(&self, canvas: &skia::Canvas, text: &str, x: f32, y: f32, size: f32, color: skia::Color, bold: bool) {
        let mut p = self.layout(text, size, color, bold);
        // Paragraph draws from top-left; adjust baseline by glyph height approximation
        p.paint(canvas, (x, y - size * 0.8));
    }

    /// Draw horizontally centered on `cx` with the baseline at `y`.
    pub fn draw_centered(&self, canvas: &skia::Canvas, text: &str, cx: f32, y: f32, size: f32, color: skia::Color, bold: bool) {
        let mut p = self.layout(text, size, color, bold);
        let w = p.longest_line();
        p.paint(canvas, (cx - w * 0.5, y - size * 0.8));
    }
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasureText for TextShaper {
    fn measure(&self, text: &str, size: f32, bold: bool) -> f32 {
        let p = self.layout(text, size, skia::Color::from_argb(0, 0, 0, 0), bold);
        // width of the longest line
        p.longest_line()
    }
}

// File: crates/tradeviz-core/src/raster.rs
// Summary: Skia CPU raster surfaces, paints, and PNG/RGBA output shared by all renderers.

use std::path::Path;

use anyhow::Result;
use skia_safe as skia;

use crate::color::Rgb;
use crate::theme::Theme;

pub fn new_surface(width: i32, height: i32) -> Result<skia::Surface> {
    skia::surfaces::raster_n32_premul((width.max(1), height.max(1)))
        .ok_or_else(|| anyhow::anyhow!("failed to create {width}x{height} raster surface"))
}

/// Snapshot the surface and encode it as PNG.
pub fn encode_png(surface: &mut skia::Surface) -> Result<Vec<u8>> {
    let image = surface.image_snapshot();
    #[allow(deprecated)]
    let data = image
        .encode_to_data(skia::EncodedImageFormat::PNG)
        .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
    Ok(data.as_bytes().to_vec())
}

/// Read back unpremultiplied RGBA8 pixels: (pixels, width, height, stride).
pub fn read_rgba8(surface: &mut skia::Surface) -> Result<(Vec<u8>, u32, u32, usize)> {
    let (w, h) = (surface.width(), surface.height());
    let info = skia::ImageInfo::new((w, h), skia::ColorType::RGBA8888, skia::AlphaType::Unpremul, None);
    let stride = w as usize * 4;
    let mut pixels = vec![0u8; stride * h as usize];
    if !surface.read_pixels(&info, pixels.as_mut_slice(), stride, (0, 0)) {
        anyhow::bail!("reading back {w}x{h} pixels failed");
    }
    Ok((pixels, w as u32, h as u32, stride))
}

pub fn write_png(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn fill_paint(color: skia::Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(color);
    paint
}

pub fn stroke_paint(color: skia::Color, width: f32) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(width);
    paint.set_color(color);
    paint
}

/// Paint a surface background.
pub fn clear(canvas: &skia::Canvas, background: Rgb) {
    canvas.clear(background.to_skia());
}

/// Drawing switches shared by the fixed-size panels (bubble, maps).
#[derive(Clone, Copy, Debug)]
pub struct PanelOptions {
    pub theme: Theme,
    /// Text off gives font-independent output for pixel comparisons.
    pub draw_labels: bool,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self { theme: Theme::page(), draw_labels: true }
    }
}

// File: crates/tradeviz-core/src/scale.rs
// Summary: Linear, color, time (X) and value (Y) scale transforms.

use crate::color::Rgb;

/// Epoch milliseconds on the time axis.
pub type Logical = f64;
/// Value Y coordinate (billions on the line charts).
pub type Value = f64;

/// Affine map from `domain` to `range`. Inputs outside the domain
/// extrapolate (no clamping).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Normalized position of `v` inside the domain (0 at start, 1 at end).
    /// A collapsed domain maps everything to 0.5.
    #[inline]
    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0.0 { 0.5 } else { (v - self.domain.0) / span }
    }

    #[inline]
    pub fn apply(&self, v: f64) -> f64 {
        self.range.0 + self.normalize(v) * (self.range.1 - self.range.0)
    }
}

/// Linear value-to-color gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    pub domain: (f64, f64),
    pub range: (Rgb, Rgb),
}

impl ColorScale {
    pub fn new(domain: (f64, f64), range: (Rgb, Rgb)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> Rgb {
        let t = LinearScale::new(self.domain, (0.0, 1.0)).apply(v);
        self.range.0.lerp(self.range.1, t)
    }
}

/// Horizontal time scale mapping an epoch-millisecond window onto `[left, right]`.
#[derive(Clone, Copy, Debug)]
pub struct TimeScale {
    pub left_px: f32,
    pub right_px: f32,
    pub start: Logical,
    pub end: Logical,
}

impl TimeScale {
    pub fn new(left_px: f32, right_px: f32, start: Logical, end: Logical) -> Self {
        let end = if (end - start).abs() < 1e-9 { start + 1.0 } else { end };
        Self { left_px, right_px, start, end }
    }
    #[inline]
    pub fn to_px(&self, x: Logical) -> f32 {
        self.left_px + ((x - self.start) / (self.end - self.start)) as f32 * (self.right_px - self.left_px)
    }
}

/// Vertical value scale mapping data range to [top, bottom] pixels.
#[derive(Clone, Copy, Debug)]
pub struct ValueScale {
    pub top_px: f32,
    pub bottom_px: f32,
    pub vmin: Value,
    pub vmax: Value,
}

impl ValueScale {
    pub fn new_linear(top_px: f32, bottom_px: f32, vmin: Value, vmax: Value) -> Self {
        let mut s = Self { top_px, bottom_px, vmin, vmax };
        if (s.vmax - s.vmin).abs() < 1e-12 { s.vmax = s.vmin + 1.0; }
        s
    }
    #[inline]
    pub fn to_px(&self, y: Value) -> f32 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.bottom_px - ((y - self.vmin) / span) as f32 * (self.bottom_px - self.top_px)
    }
}

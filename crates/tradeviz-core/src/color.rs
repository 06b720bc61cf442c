// File: crates/tradeviz-core/src/color.rs
// Summary: CSS-style RGB colors: parsing, interpolation, and conversion to Skia.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skia_safe as skia;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized color `{0}`")]
pub struct ParseColorError(pub String);

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise interpolation in sRGB (gamma 1). `t` outside `[0, 1]`
    /// extrapolates; channels saturate at 0 and 255.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            if v.is_nan() { return a; }
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_skia(self) -> skia::Color {
        self.to_skia_alpha(1.0)
    }

    /// Skia color with `opacity` in `[0, 1]`.
    pub fn to_skia_alpha(self, opacity: f32) -> skia::Color {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        skia::Color::from_argb(a, self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Accepts `#rgb`, `#rrggbb` and `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let err = || ParseColorError(s.to_string());
        if let Some(hex) = raw.strip_prefix('#') {
            let digits = match hex.len() {
                3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
                6 => hex.to_string(),
                _ => return Err(err()),
            };
            let v = u32::from_str_radix(&digits, 16).map_err(|_| err())?;
            return Ok(Rgb::new((v >> 16) as u8, (v >> 8) as u8, v as u8));
        }
        let inner = raw
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let channels = inner
            .split(',')
            .map(|c| c.trim().parse::<f64>().map(|v| v.round().clamp(0.0, 255.0) as u8))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| err())?;
        match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

// File: crates/tradeviz-core/src/theme.rs
// Summary: Page palettes shared by every renderer (background, text, axes, neutral fills).

use crate::color::Rgb;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub text: Rgb,
    pub axis_line: Rgb,
    pub tick: Rgb,
    /// Hidden axis border (the value axis border is painted in this color).
    pub axis_hidden: Rgb,
    pub font_family: &'static str,
}

impl Theme {
    /// White page, black typography in Instrument Sans.
    pub fn page() -> Self {
        Self {
            name: "page",
            background: Rgb::WHITE,
            text: Rgb::BLACK,
            axis_line: Rgb::BLACK,
            tick: Rgb::BLACK,
            axis_hidden: Rgb::WHITE,
            font_family: "Instrument Sans",
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Rgb::new(18, 18, 20),
            text: Rgb::new(235, 235, 245),
            axis_line: Rgb::new(180, 180, 190),
            tick: Rgb::new(150, 150, 160),
            axis_hidden: Rgb::new(18, 18, 20),
            font_family: "Instrument Sans",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::page()
    }
}

/// Return a list of built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::page(), Theme::dark()]
}

/// Find a theme by its `name`, falling back to the page theme.
pub fn find(name: &str) -> Theme {
    for t in presets() { if t.name.eq_ignore_ascii_case(name) { return t; } }
    Theme::page()
}

// File: crates/tradeviz-core/src/types.rs
// Summary: Shared types and constants (surface sizes, paddings, page geometry).

/// Default line-chart surface width in pixels.
pub const WIDTH: i32 = 800;
/// Default line-chart surface height in pixels.
pub const HEIGHT: i32 = 400;

/// Side length of the square bubble and choropleth canvases.
pub const PANEL_SIZE: i32 = 600;
/// Margin the square panels reserve around their viewBox.
pub const PANEL_MARGIN: i32 = 10;

/// Screen margins, in pixels.
/// Contract: all fields are non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    /// Create new insets (non-negative by type).
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
}

impl Default for Insets {
    /// Left padding 20 matches the line chart layout padding; the right inset
    /// leaves room for the right-hand value axis.
    fn default() -> Self {
        Self::new(20, 44, 12, 28)
    }
}

//! Color and size constants for the fraud checker.
//!
//! Graph colors mirror the web dashboard the classifier ships with so the
//! two views read the same. All colors should be sourced from here.

use egui::{Color32, FontId};

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Main graph area background - darkest layer
    pub const GRAPH: Color32 = Color32::from_rgb(14, 17, 23);

    /// Panel backgrounds - slightly lighter than graph
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Frame drawn around the 800x600 canvas
    pub const CANVAS_BORDER: Color32 = Color32::from_rgb(45, 48, 58);
}

/// Transaction graph styling
pub mod graph {
    use super::*;

    pub const NODE_FILL: Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);
    pub const NODE_STROKE: Color32 = Color32::from_rgb(0x1b, 0x5e, 0x20);
    pub const NODE_STROKE_WIDTH: f32 = 1.5;

    /// Held node outline
    pub const NODE_DRAGGED: Color32 = Color32::WHITE;

    pub const EDGE: Color32 = Color32::from_rgb(0x55, 0x55, 0x55);
    pub const EDGE_OPACITY: f32 = 0.6;
    pub const EDGE_WIDTH: f32 = 2.0;

    pub const NODE_LABEL: Color32 = Color32::from_rgb(0xcf, 0xd8, 0xdc);
    pub const NODE_LABEL_SIZE: f32 = 12.0;
    pub const EDGE_LABEL: Color32 = Color32::from_rgb(0x55, 0x55, 0x55);
    pub const EDGE_LABEL_SIZE: f32 = 10.0;

    /// Gap between a node's edge and its label
    pub const LABEL_GAP: f32 = 4.0;

    pub fn edge_color() -> Color32 {
        EDGE.gamma_multiply(EDGE_OPACITY)
    }
}

/// Text colors
pub mod text {
    use super::*;

    pub const PRIMARY: Color32 = Color32::from_rgb(230, 230, 235);
    pub const MUTED: Color32 = Color32::from_rgb(140, 140, 150);
    pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);
}

/// Font for text drawn on the canvas, scaled with the viewport zoom
pub fn canvas_font(size: f32, zoom: f32) -> FontId {
    FontId::proportional((size * zoom).max(1.0))
}

//! Transaction graph model, force layout, and the scene drawn from it.

pub mod adapter;
pub mod drag;
pub mod error;
mod quadtree;
pub mod scene;
pub mod session;
pub mod simulation;
pub mod types;

use egui::{Pos2, Vec2};

pub use session::Viewer;
pub use simulation::SimulationConfig;

/// Logical size of the drawing surface
pub const CANVAS_SIZE: Vec2 = Vec2::new(800.0, 600.0);

/// Default layout center (middle of the canvas)
pub const CANVAS_CENTER: Pos2 = Pos2::new(400.0, 300.0);

/// Area new nodes are scattered over before the first tick
pub const SPAWN_SIZE: Vec2 = Vec2::new(600.0, 400.0);

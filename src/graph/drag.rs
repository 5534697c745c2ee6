//! Pointer gestures on graph nodes.
//!
//! A drag pins the held node under the pointer and keeps the layout warm
//! until the node is released. Only one node is held at a time.

use super::simulation::ForceSimulation;
use egui::Pos2;
use tracing::trace;

#[derive(Debug, Default)]
pub struct DragController {
    active: Option<usize>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the node currently held, if any
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Pick up `node` at `pointer`. A drag already in progress is released first.
    /// Returns false (and changes nothing) for an unknown node index.
    pub fn start(&mut self, sim: &mut ForceSimulation, node: usize, pointer: Pos2) -> bool {
        if node >= sim.graph().len() {
            return false;
        }
        if self.active.is_some() {
            self.end(sim);
        }

        sim.begin_interaction();
        sim.pin(node, pointer);
        self.active = Some(node);
        trace!(node, ?pointer, "drag started");
        true
    }

    /// Move the held node to `pointer`. No-op without an active drag.
    pub fn update(&mut self, sim: &mut ForceSimulation, pointer: Pos2) -> bool {
        let Some(node) = self.active else {
            return false;
        };
        sim.begin_interaction();
        sim.pin(node, pointer)
    }

    /// Release the held node. No-op without an active drag.
    pub fn end(&mut self, sim: &mut ForceSimulation) -> bool {
        let Some(node) = self.active.take() else {
            return false;
        };
        sim.unpin(node);
        sim.end_interaction();
        trace!(node, "drag ended");
        true
    }
}

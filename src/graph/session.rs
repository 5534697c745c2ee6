//! Ownership of the currently displayed graph.
//!
//! A [`GraphSession`] bundles one simulation with its drag state. The
//! [`Viewer`] replaces sessions wholesale and hands out generation-stamped
//! tick tickets, so a tick scheduled for a superseded graph can never write
//! positions into the scene.

use super::adapter::build_graph;
use super::drag::DragController;
use super::error::MalformedGraphError;
use super::scene::Scene;
use super::simulation::{ForceSimulation, SimulationConfig, SimulationPhase};
use super::types::GraphPayload;
use super::{CANVAS_CENTER, SPAWN_SIZE};
use egui::{Pos2, Rect, Vec2};
use rand::Rng;
use tracing::{debug, info};

/// Permission to run one tick for a specific generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Positions advanced; more ticks wanted
    Ticked,
    /// Nothing left to do until the layout is perturbed
    Settled,
    /// Ticket belongs to a replaced or cleared graph; nothing was written
    Stale,
}

/// One displayed graph: its simulation plus pointer state
pub struct GraphSession {
    generation: u64,
    simulation: ForceSimulation,
    drag: DragController,
}

impl GraphSession {
    pub fn simulation(&self) -> &ForceSimulation {
        &self.simulation
    }
}

pub struct Viewer {
    session: Option<GraphSession>,
    scene: Scene,
    generation: u64,
    config: SimulationConfig,
    spawn_bounds: Rect,
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(SimulationConfig::default(), 10.0)
    }
}

impl Viewer {
    pub fn new(config: SimulationConfig, node_radius: f32) -> Self {
        Self {
            session: None,
            scene: Scene::new(node_radius),
            generation: 0,
            config,
            spawn_bounds: Rect::from_center_size(CANVAS_CENTER, SPAWN_SIZE),
        }
    }

    /// Replace whatever is displayed with `payload`.
    ///
    /// The previous session and its scene elements are torn down first, so a
    /// malformed payload leaves an empty canvas rather than stale content.
    pub fn show<R: Rng + ?Sized>(
        &mut self,
        payload: &GraphPayload,
        rng: &mut R,
    ) -> Result<(), MalformedGraphError> {
        self.clear();

        let graph = build_graph(payload, self.spawn_bounds, rng)?;
        info!(
            generation = self.generation,
            nodes = graph.len(),
            edges = graph.edges().len(),
            "displaying graph"
        );

        self.scene.rebuild(&graph);
        self.session = Some(GraphSession {
            generation: self.generation,
            simulation: ForceSimulation::new(graph, self.config.clone()),
            drag: DragController::new(),
        });
        Ok(())
    }

    /// Drop the current session and empty the canvas
    pub fn clear(&mut self) {
        self.generation += 1;
        if let Some(old) = self.session.take() {
            debug!(generation = old.generation, "session discarded");
        }
        self.scene.clear();
    }

    /// Ticket for the next tick, or None when there is nothing to simulate
    pub fn schedule_tick(&self) -> Option<TickTicket> {
        self.session
            .as_ref()
            .filter(|s| !s.simulation.is_settled())
            .map(|s| TickTicket {
                generation: s.generation,
            })
    }

    pub fn run_tick(&mut self, ticket: TickTicket) -> TickOutcome {
        if ticket.generation != self.generation {
            return TickOutcome::Stale;
        }
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Stale;
        };

        let ticked = session.simulation.tick(&mut self.scene);
        if ticked && !session.simulation.is_settled() {
            TickOutcome::Ticked
        } else {
            TickOutcome::Settled
        }
    }

    /// Advance by at most one tick. Returns true while more frames are needed.
    pub fn frame(&mut self) -> bool {
        match self.schedule_tick() {
            Some(ticket) => self.run_tick(ticket) == TickOutcome::Ticked,
            None => false,
        }
    }

    pub fn needs_tick(&self) -> bool {
        self.schedule_tick().is_some()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn session(&self) -> Option<&GraphSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Option<SimulationPhase> {
        self.session.as_ref().map(|s| s.simulation.phase())
    }

    pub fn has_graph(&self) -> bool {
        self.session.is_some()
    }

    /// Apply new physics parameters to the live layout and future graphs
    pub fn set_config(&mut self, config: SimulationConfig) {
        if config == self.config {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.simulation.set_config(config.clone());
        }
        self.config = config;
    }

    pub fn reheat(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.simulation.reheat(1.0);
        }
    }

    pub fn set_node_radius(&mut self, radius: f32) {
        self.scene.set_node_radius(radius);
    }

    /// Node under `pos` (graph space)
    pub fn node_at(&self, pos: Pos2, slop: f32) -> Option<usize> {
        self.scene.node_at(pos, slop)
    }

    /// Node under a press at `pos`, with the offset from the press to the
    /// node center. Adding the offset to later pointer positions keeps the
    /// node from jumping to the pointer when it is picked up off-center.
    pub fn grab(&self, pos: Pos2, slop: f32) -> Option<(usize, Vec2)> {
        let node = self.node_at(pos, slop)?;
        let center = self.scene.markers().get(node)?.center;
        Some((node, center - pos))
    }

    pub fn dragged_node(&self) -> Option<usize> {
        self.session.as_ref().and_then(|s| s.drag.active())
    }

    pub fn drag_start(&mut self, node: usize, pointer: Pos2) -> bool {
        match self.session.as_mut() {
            Some(s) => s.drag.start(&mut s.simulation, node, pointer),
            None => false,
        }
    }

    pub fn drag_to(&mut self, pointer: Pos2) -> bool {
        match self.session.as_mut() {
            Some(s) => s.drag.update(&mut s.simulation, pointer),
            None => false,
        }
    }

    pub fn drag_end(&mut self) -> bool {
        match self.session.as_mut() {
            Some(s) => s.drag.end(&mut s.simulation),
            None => false,
        }
    }
}

//! Force-directed graph layout simulation.
//!
//! Each tick applies, in order:
//! - Repulsion between all nodes (many-body charge) - O(n log n) via Barnes-Hut
//! - Spring force along edges toward a rest distance
//! - Centering: translates the node set so its mean sits on the center point
//! - Velocity decay and integration; pinned nodes are forced onto their pin
//!
//! Force magnitudes are scaled by `alpha`, which cools toward `alpha_target`
//! every tick. Once it drops below `alpha_min` the simulation settles and
//! stops asking for ticks until something reheats it.

use super::quadtree::Quadtree;
use super::types::Graph;
use egui::{Pos2, Vec2};
use tracing::debug;

/// Lifecycle of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    /// Built, no tick has run yet
    Initializing,
    Running,
    /// Alpha fell below the threshold; no further ticks until perturbed
    Settled,
}

/// Receives the graph after every tick
pub trait TickListener {
    fn on_tick(&mut self, graph: &Graph);
}

/// Force simulation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Many-body strength per node (negative = repulsion)
    pub charge_strength: f32,
    /// Distances below this are softened in the charge force
    pub distance_min: f32,
    /// Barnes-Hut opening criterion (0 = exact)
    pub theta: f32,
    /// Rest length of every edge
    pub link_distance: f32,
    /// Point the node set is centered on
    pub center: Pos2,
    /// Fraction of velocity lost each tick (0.0 - 1.0)
    pub velocity_decay: f32,
    /// Scale applied to velocity when advancing positions
    pub time_step: f32,
    /// Alpha below which the simulation settles
    pub alpha_min: f32,
    /// Fraction of the gap to `alpha_target` closed each tick
    pub alpha_decay: f32,
    /// Alpha target while a node is being dragged
    pub drag_alpha_target: f32,
}

impl SimulationConfig {
    /// Decay that takes alpha from 1 to `alpha_min` in 300 ticks
    pub fn decay_for(alpha_min: f32) -> f32 {
        1.0 - alpha_min.powf(1.0 / 300.0)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            charge_strength: -200.0,
            distance_min: 1.0,
            theta: 0.9,
            link_distance: 100.0,
            center: Pos2::new(400.0, 300.0),
            velocity_decay: 0.4,
            time_step: 1.0,
            alpha_min,
            alpha_decay: Self::decay_for(alpha_min),
            drag_alpha_target: 0.3,
        }
    }
}

/// Live physics state for one displayed graph
pub struct ForceSimulation {
    graph: Graph,
    config: SimulationConfig,
    alpha: f32,
    alpha_target: f32,
    phase: SimulationPhase,
    ticks: u64,
    /// Per-edge spring strength: 1 / min(degree(source), degree(target))
    link_strength: Vec<f32>,
    /// Per-edge share of the correction applied to the target
    link_bias: Vec<f32>,
    positions: Vec<Pos2>,
}

impl ForceSimulation {
    pub fn new(graph: Graph, config: SimulationConfig) -> Self {
        let mut degree = vec![0u32; graph.len()];
        for edge in graph.edges() {
            degree[edge.source] += 1;
            degree[edge.target] += 1;
        }

        let (link_strength, link_bias): (Vec<f32>, Vec<f32>) = graph
            .edges()
            .iter()
            .map(|edge| {
                let s = degree[edge.source] as f32;
                let t = degree[edge.target] as f32;
                (1.0 / s.min(t), s / (s + t))
            })
            .unzip();

        let (alpha, phase) = if graph.is_empty() {
            (0.0, SimulationPhase::Settled)
        } else {
            (1.0, SimulationPhase::Initializing)
        };

        Self {
            graph,
            config,
            alpha,
            alpha_target: 0.0,
            phase,
            ticks: 0,
            link_strength,
            link_bias,
            positions: Vec::new(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    /// Whether another tick should be scheduled
    pub fn is_settled(&self) -> bool {
        self.phase == SimulationPhase::Settled
    }

    /// Replace the parameters and restart the layout
    pub fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
        self.reheat(1.0);
    }

    /// Raise alpha to at least `alpha` and resume ticking
    pub fn reheat(&mut self, alpha: f32) {
        if self.graph.is_empty() {
            return;
        }
        self.alpha = self.alpha.max(alpha);
        if self.phase == SimulationPhase::Settled {
            debug!(alpha = self.alpha, "simulation reheated");
            self.phase = SimulationPhase::Running;
        }
    }

    /// Keep the layout warm while a node is held
    pub fn begin_interaction(&mut self) {
        self.alpha_target = self.config.drag_alpha_target;
        self.reheat(self.config.drag_alpha_target);
    }

    /// Let alpha cool naturally again; alpha itself is left untouched
    pub fn end_interaction(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Fix a node at `pos`. Returns false for an unknown index.
    pub fn pin(&mut self, index: usize, pos: Pos2) -> bool {
        match self.graph.nodes_mut().get_mut(index) {
            Some(node) => {
                node.pin = Some(pos);
                true
            }
            None => false,
        }
    }

    /// Return a node to physics control. Returns false for an unknown index.
    pub fn unpin(&mut self, index: usize) -> bool {
        match self.graph.nodes_mut().get_mut(index) {
            Some(node) => {
                node.pin = None;
                true
            }
            None => false,
        }
    }

    /// Run one tick and hand the result to `listener`.
    ///
    /// Returns false without touching anything when the simulation is settled.
    pub fn tick(&mut self, listener: &mut dyn TickListener) -> bool {
        if self.phase == SimulationPhase::Settled {
            return false;
        }
        self.phase = SimulationPhase::Running;

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        self.apply_charge();
        self.apply_links();
        self.apply_center();
        self.integrate();
        self.ticks += 1;

        listener.on_tick(&self.graph);

        if self.alpha < self.config.alpha_min {
            debug!(ticks = self.ticks, "simulation settled");
            self.phase = SimulationPhase::Settled;
        }
        true
    }

    fn apply_charge(&mut self) {
        let strength = self.config.charge_strength * self.alpha;
        if strength == 0.0 || self.graph.len() < 2 {
            return;
        }

        self.positions.clear();
        self.positions
            .extend(self.graph.nodes().iter().map(|n| n.pos));
        let tree = Quadtree::build(&self.positions, self.config.theta);
        let distance_min_sq = self.config.distance_min * self.config.distance_min;

        for (index, node) in self.graph.nodes_mut().iter_mut().enumerate() {
            node.vel += tree.velocity_delta(index, self.positions[index], strength, distance_min_sq);
        }
    }

    fn apply_links(&mut self) {
        let alpha = self.alpha;
        let rest = self.config.link_distance;
        let (nodes, edges) = (self.graph.nodes().len(), self.graph.edges().len());
        if nodes == 0 || edges == 0 {
            return;
        }

        for i in 0..edges {
            let (source, target) = {
                let edge = &self.graph.edges()[i];
                (edge.source, edge.target)
            };
            if source == target {
                continue;
            }

            let nodes = self.graph.nodes_mut();
            // Predicted positions
            let mut delta = (nodes[target].pos + nodes[target].vel) - (nodes[source].pos + nodes[source].vel);
            if delta == Vec2::ZERO {
                delta = Vec2::new(1e-6, 0.0);
            }
            let distance = delta.length();
            let correction = delta * ((distance - rest) / distance * alpha * self.link_strength[i]);
            let bias = self.link_bias[i];

            nodes[target].vel -= correction * bias;
            nodes[source].vel += correction * (1.0 - bias);
        }
    }

    fn apply_center(&mut self) {
        let nodes = self.graph.nodes_mut();
        if nodes.is_empty() {
            return;
        }

        let sum = nodes.iter().fold(Vec2::ZERO, |acc, n| acc + n.pos.to_vec2());
        let shift = sum / nodes.len() as f32 - self.config.center.to_vec2();
        for node in nodes.iter_mut() {
            node.pos -= shift;
        }
    }

    fn integrate(&mut self) {
        let keep = 1.0 - self.config.velocity_decay;
        let time_step = self.config.time_step;
        for node in self.graph.nodes_mut() {
            match node.pin {
                Some(pin) => {
                    node.pos = pin;
                    node.vel = Vec2::ZERO;
                }
                None => {
                    node.vel *= keep;
                    node.pos += node.vel * time_step;
                }
            }
        }
    }
}

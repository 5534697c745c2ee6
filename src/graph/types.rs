//! Graph data types matching the classification API response, and the
//! runtime node/edge representation owned by the simulation.

use egui::{Pos2, Vec2};
use serde::Deserialize;

/// A node as returned by the classifier
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiNode {
    pub id: String,
    pub label: String,
}

/// A transaction edge as returned by the classifier
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiEdge {
    pub source: String,
    pub target: String,
    pub value: f64,
    /// Shown verbatim, never parsed
    pub timestamp: String,
}

/// The `graph` object of a classification response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<ApiNode>,
    #[serde(default)]
    pub edges: Vec<ApiEdge>,
}

/// Complete response of a successful classify request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassificationResult {
    pub fraud_probability: f64,
    pub graph: GraphPayload,
}

impl ClassificationResult {
    /// Percentage label for the probability, e.g. "83.00%"
    pub fn probability_label(&self) -> String {
        format_probability(self.fraud_probability)
    }
}

/// Format a probability in [0, 1] as a percentage with two decimals.
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// A node in the live simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub pos: Pos2,
    pub vel: Vec2,
    /// Fixed position while the node is being dragged
    pub pin: Option<Pos2>,
}

impl Node {
    pub fn new(id: String, label: String, pos: Pos2) -> Self {
        Self {
            id,
            label,
            pos,
            vel: Vec2::ZERO,
            pin: None,
        }
    }
}

/// An edge with its endpoints resolved to node indices
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    pub timestamp: String,
}

impl Edge {
    /// Text drawn at the edge midpoint
    pub fn label(&self) -> String {
        format!("Value: {}, Timestamp: {}", js_number(self.value), self.timestamp)
    }
}

/// Format a number the way a browser prints it: plain decimal between 1e-6
/// and 1e21, exponent notation with an explicit sign outside that range.
fn js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exp = format!("{value:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// Id-unique node set plus ordered edges. Every edge endpoint is a valid
/// index into `nodes`; only the adapter constructs graphs.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub(super) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(super) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current positions of an edge's source and target
    pub fn endpoints(&self, edge: &Edge) -> (Pos2, Pos2) {
        (self.nodes[edge.source].pos, self.nodes[edge.target].pos)
    }
}

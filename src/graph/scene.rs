//! Visual elements mirroring the simulated graph.
//!
//! The scene stores everything in graph space; the canvas applies the
//! viewport transform when painting. It never runs physics itself, it only
//! copies positions out of the graph on every tick.

use super::simulation::TickListener;
use super::types::Graph;
use egui::Pos2;

/// Circle drawn for a node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMarker {
    pub index: usize,
    pub center: Pos2,
}

/// Text anchored at a point in graph space
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub anchor: Pos2,
}

/// Straight segment between two node centers
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub source: usize,
    pub target: usize,
    pub from: Pos2,
    pub to: Pos2,
}

#[derive(Debug, Clone)]
pub struct Scene {
    markers: Vec<NodeMarker>,
    node_labels: Vec<TextLabel>,
    lines: Vec<EdgeLine>,
    edge_labels: Vec<TextLabel>,
    node_radius: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl Scene {
    pub fn new(node_radius: f32) -> Self {
        Self {
            markers: Vec::new(),
            node_labels: Vec::new(),
            lines: Vec::new(),
            edge_labels: Vec::new(),
            node_radius,
        }
    }

    /// Drop all elements and create fresh ones for `graph`
    pub fn rebuild(&mut self, graph: &Graph) {
        self.clear();

        for (index, node) in graph.nodes().iter().enumerate() {
            self.markers.push(NodeMarker {
                index,
                center: node.pos,
            });
            self.node_labels.push(TextLabel {
                text: node.label.clone(),
                anchor: node.pos,
            });
        }

        for edge in graph.edges() {
            let (from, to) = graph.endpoints(edge);
            self.lines.push(EdgeLine {
                source: edge.source,
                target: edge.target,
                from,
                to,
            });
            self.edge_labels.push(TextLabel {
                text: edge.label(),
                anchor: from.lerp(to, 0.5),
            });
        }
    }

    pub fn clear(&mut self) {
        self.markers.clear();
        self.node_labels.clear();
        self.lines.clear();
        self.edge_labels.clear();
    }

    /// Copy current positions out of `graph`. The graph must be the one the
    /// scene was last rebuilt from.
    pub fn sync(&mut self, graph: &Graph) {
        let nodes = graph.nodes();
        for (marker, label) in self.markers.iter_mut().zip(self.node_labels.iter_mut()) {
            let pos = nodes[marker.index].pos;
            marker.center = pos;
            label.anchor = pos;
        }
        for (line, label) in self.lines.iter_mut().zip(self.edge_labels.iter_mut()) {
            line.from = nodes[line.source].pos;
            line.to = nodes[line.target].pos;
            label.anchor = line.from.lerp(line.to, 0.5);
        }
    }

    /// Index of the nearest node whose marker contains `pos`, widened by `slop`
    pub fn node_at(&self, pos: Pos2, slop: f32) -> Option<usize> {
        let reach = self.node_radius + slop.max(0.0);
        self.markers
            .iter()
            .map(|m| (m.index, m.center.distance_sq(pos)))
            .filter(|(_, d)| *d <= reach * reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn markers(&self) -> &[NodeMarker] {
        &self.markers
    }

    pub fn node_labels(&self) -> &[TextLabel] {
        &self.node_labels
    }

    pub fn lines(&self) -> &[EdgeLine] {
        &self.lines
    }

    pub fn edge_labels(&self) -> &[TextLabel] {
        &self.edge_labels
    }

    pub fn node_radius(&self) -> f32 {
        self.node_radius
    }

    pub fn set_node_radius(&mut self, radius: f32) {
        self.node_radius = radius;
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl TickListener for Scene {
    fn on_tick(&mut self, graph: &Graph) {
        self.sync(graph);
    }
}

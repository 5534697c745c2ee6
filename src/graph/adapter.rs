//! Converts a classification payload into simulation-ready nodes and edges.

use super::error::MalformedGraphError;
use super::types::{Edge, Graph, GraphPayload, Node};
use egui::{Pos2, Rect};
use rand::Rng;
use std::collections::HashMap;

/// Build a graph from the API payload.
///
/// Nodes start at random positions inside `bounds` with zero velocity.
/// Fails without producing any graph if an edge references an unknown id
/// or a node id is repeated.
pub fn build_graph<R: Rng + ?Sized>(
    payload: &GraphPayload,
    bounds: Rect,
    rng: &mut R,
) -> Result<Graph, MalformedGraphError> {
    let mut node_index = HashMap::with_capacity(payload.nodes.len());
    let mut nodes = Vec::with_capacity(payload.nodes.len());

    for (i, node) in payload.nodes.iter().enumerate() {
        if node_index.insert(node.id.clone(), i).is_some() {
            return Err(MalformedGraphError::DuplicateNode {
                id: node.id.clone(),
            });
        }

        let pos = Pos2::new(
            sample(rng, bounds.min.x, bounds.max.x),
            sample(rng, bounds.min.y, bounds.max.y),
        );
        nodes.push(Node::new(node.id.clone(), node.label.clone(), pos));
    }

    let edges = payload
        .edges
        .iter()
        .enumerate()
        .map(|(i, edge)| -> Result<Edge, MalformedGraphError> {
            let resolve = |id: &String| {
                node_index
                    .get(id)
                    .copied()
                    .ok_or_else(|| MalformedGraphError::UnknownNode {
                        edge: i,
                        id: id.clone(),
                    })
            };
            Ok(Edge {
                source: resolve(&edge.source)?,
                target: resolve(&edge.target)?,
                value: edge.value,
                timestamp: edge.timestamp.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Graph::from_parts(nodes, edges))
}

/// Uniform sample in [min, max), collapsing to `min` for empty ranges
fn sample<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{ApiEdge, ApiNode};
    use egui::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn payload(nodes: &[&str], edges: &[(&str, &str)]) -> GraphPayload {
        GraphPayload {
            nodes: nodes
                .iter()
                .map(|id| ApiNode {
                    id: id.to_string(),
                    label: format!("label-{id}"),
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(s, t)| ApiEdge {
                    source: s.to_string(),
                    target: t.to_string(),
                    value: 1.5,
                    timestamp: "t".into(),
                })
                .collect(),
        }
    }

    fn bounds() -> Rect {
        Rect::from_center_size(Pos2::new(400.0, 300.0), Vec2::new(600.0, 400.0))
    }

    #[test]
    fn resolves_edges_and_places_nodes_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = build_graph(&payload(&["A", "B", "C"], &[("A", "B"), ("C", "A")]), bounds(), &mut rng)
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edges()[1].source, 2);
        assert_eq!(graph.edges()[1].target, 0);
        assert_eq!(graph.nodes()[1].id, "B");
        assert_eq!(graph.nodes()[1].label, "label-B");
        for node in graph.nodes() {
            assert!(bounds().contains(node.pos), "{:?} outside bounds", node.pos);
            assert_eq!(node.vel, Vec2::ZERO);
            assert!(node.pin.is_none());
        }
    }

    #[test]
    fn dangling_edge_is_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_graph(&payload(&["A", "B"], &[("A", "B"), ("B", "Z")]), bounds(), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            MalformedGraphError::UnknownNode {
                edge: 1,
                id: "Z".into()
            }
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_graph(&payload(&["A", "A"], &[]), bounds(), &mut rng).unwrap_err();
        assert_eq!(err, MalformedGraphError::DuplicateNode { id: "A".into() });
    }

    #[test]
    fn degenerate_bounds_place_nodes_on_one_point() {
        let mut rng = StdRng::seed_from_u64(7);
        let point = Rect::from_min_max(Pos2::new(10.0, 20.0), Pos2::new(10.0, 20.0));
        let graph = build_graph(&payload(&["A", "B"], &[("A", "B")]), point, &mut rng).unwrap();
        assert!(graph.nodes().iter().all(|n| n.pos == Pos2::new(10.0, 20.0)));
    }

    #[test]
    fn empty_payload_builds_empty_graph() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = build_graph(&GraphPayload::default(), bounds(), &mut rng).unwrap();
        assert!(graph.is_empty());
        assert!(graph.edges().is_empty());
    }
}

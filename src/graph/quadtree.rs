//! Barnes-Hut quadtree for the many-body charge force.
//!
//! Distant groups of nodes are treated as a single charge at their center
//! of mass. Every body keeps its node index so a node never repels itself,
//! and bodies that share a position stay together in one leaf instead of
//! splitting forever.

use egui::{Pos2, Vec2};
use std::f32::consts::TAU;

/// Depth past which bodies are kept in a shared leaf
const MAX_DEPTH: u32 = 48;

/// Offset used to separate two bodies at exactly the same position
const JIGGLE: f32 = 1e-6;

/// A node of the simulation inserted into the tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub index: usize,
    pub pos: Pos2,
}

/// A node in the quadtree - either a leaf with one or more bodies, or an internal node with children
#[derive(Debug, Default)]
pub enum QuadNode {
    #[default]
    Empty,
    Leaf { bodies: Vec<Body> },
    Internal {
        /// Center of mass of all bodies in this cell
        center_of_mass: Pos2,
        /// Number of bodies in this cell (every body has unit charge)
        count: u32,
        /// Children: NW, NE, SW, SE
        children: Box<[QuadNode; 4]>,
    },
}

/// Axis-aligned bounding box for quadtree cells
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: Pos2,
    pub max: Pos2,
}

impl Bounds {
    pub fn new(min: Pos2, max: Pos2) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn size(&self) -> f32 {
        (self.max.x - self.min.x).max(self.max.y - self.min.y)
    }

    /// Get the quadrant for a position (0=NW, 1=NE, 2=SW, 3=SE)
    pub fn quadrant(&self, pos: Pos2) -> usize {
        let center = self.center();
        let east = pos.x >= center.x;
        let south = pos.y >= center.y;
        match (south, east) {
            (false, false) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (true, true) => 3,
        }
    }

    /// Get bounds for a specific quadrant
    pub fn child_bounds(&self, quadrant: usize) -> Bounds {
        let center = self.center();
        match quadrant {
            0 => Bounds::new(self.min, center),
            1 => Bounds::new(Pos2::new(center.x, self.min.y), Pos2::new(self.max.x, center.y)),
            2 => Bounds::new(Pos2::new(self.min.x, center.y), Pos2::new(center.x, self.max.y)),
            _ => Bounds::new(center, self.max),
        }
    }
}

/// Barnes-Hut quadtree for efficient force calculation
pub struct Quadtree {
    pub root: QuadNode,
    pub bounds: Bounds,
    /// Opening criterion: a cell is approximated when `size / distance < theta`.
    /// Zero disables approximation (exact pairwise forces).
    pub theta: f32,
}

impl Quadtree {
    /// Build a quadtree over `positions`; body `i` is `positions[i]`.
    pub fn build(positions: &[Pos2], theta: f32) -> Self {
        if positions.is_empty() {
            return Self {
                root: QuadNode::Empty,
                bounds: Bounds::new(Pos2::ZERO, Pos2::ZERO),
                theta,
            };
        }

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for pos in positions {
            min_x = min_x.min(pos.x);
            min_y = min_y.min(pos.y);
            max_x = max_x.max(pos.x);
            max_y = max_y.max(pos.y);
        }

        // Add padding and make square
        let padding = 100.0;
        min_x -= padding;
        min_y -= padding;
        max_x += padding;
        max_y += padding;

        let size = (max_x - min_x).max(max_y - min_y);
        max_x = min_x + size;
        max_y = min_y + size;

        let bounds = Bounds::new(Pos2::new(min_x, min_y), Pos2::new(max_x, max_y));

        let mut tree = Self {
            root: QuadNode::Empty,
            bounds,
            theta,
        };

        for (index, &pos) in positions.iter().enumerate() {
            tree.insert(Body { index, pos });
        }

        tree
    }

    /// Insert a body into the quadtree
    pub fn insert(&mut self, body: Body) {
        self.root = Self::insert_into(std::mem::take(&mut self.root), body, self.bounds, 0);
    }

    fn insert_into(node: QuadNode, body: Body, bounds: Bounds, depth: u32) -> QuadNode {
        match node {
            QuadNode::Empty => QuadNode::Leaf { bodies: vec![body] },

            QuadNode::Leaf { mut bodies } => {
                let coincident = bodies.first().is_some_and(|b| b.pos == body.pos);
                if coincident || depth >= MAX_DEPTH {
                    bodies.push(body);
                    return QuadNode::Leaf { bodies };
                }

                // Split: re-insert the existing bodies and the new one one level down
                let mut internal = QuadNode::Internal {
                    center_of_mass: Pos2::ZERO,
                    count: 0,
                    children: Box::default(),
                };
                for existing in bodies {
                    internal = Self::insert_into(internal, existing, bounds, depth);
                }
                Self::insert_into(internal, body, bounds, depth)
            }

            QuadNode::Internal {
                center_of_mass,
                count,
                mut children,
            } => {
                let q = bounds.quadrant(body.pos);
                children[q] = Self::insert_into(
                    std::mem::take(&mut children[q]),
                    body,
                    bounds.child_bounds(q),
                    depth + 1,
                );

                let new_count = count + 1;
                let weight = 1.0 / new_count as f32;
                let new_com = Pos2::new(
                    center_of_mass.x + (body.pos.x - center_of_mass.x) * weight,
                    center_of_mass.y + (body.pos.y - center_of_mass.y) * weight,
                );

                QuadNode::Internal {
                    center_of_mass: new_com,
                    count: new_count,
                    children,
                }
            }
        }
    }

    /// Velocity change on body `index` at `pos` from every other body.
    ///
    /// `strength` is the per-body charge already scaled by alpha; negative
    /// values repel. Squared distances below `distance_min_sq` are softened
    /// to `sqrt(distance_min_sq * l)` so close pairs stay bounded.
    pub fn velocity_delta(&self, index: usize, pos: Pos2, strength: f32, distance_min_sq: f32) -> Vec2 {
        self.accumulate(&self.root, index, pos, strength, distance_min_sq, self.bounds)
    }

    fn accumulate(
        &self,
        node: &QuadNode,
        index: usize,
        pos: Pos2,
        strength: f32,
        distance_min_sq: f32,
        bounds: Bounds,
    ) -> Vec2 {
        match node {
            QuadNode::Empty => Vec2::ZERO,

            QuadNode::Leaf { bodies } => bodies
                .iter()
                .filter(|b| b.index != index)
                .map(|b| {
                    let mut delta = b.pos - pos;
                    if delta == Vec2::ZERO {
                        delta = separation(index, b.index) * JIGGLE;
                    }
                    charge(delta, strength, distance_min_sq)
                })
                .fold(Vec2::ZERO, |acc, v| acc + v),

            QuadNode::Internal {
                center_of_mass,
                count,
                children,
            } => {
                let delta = *center_of_mass - pos;
                let cell_size = bounds.size();
                if cell_size * cell_size < self.theta * self.theta * delta.length_sq() {
                    // Treat entire cell as single charge at center of mass
                    charge(delta, strength * *count as f32, distance_min_sq)
                } else {
                    let mut total = Vec2::ZERO;
                    for (i, child) in children.iter().enumerate() {
                        total += self.accumulate(
                            child,
                            index,
                            pos,
                            strength,
                            distance_min_sq,
                            bounds.child_bounds(i),
                        );
                    }
                    total
                }
            }
        }
    }
}

fn charge(delta: Vec2, strength: f32, distance_min_sq: f32) -> Vec2 {
    let mut l = delta.length_sq();
    if l < distance_min_sq {
        l = (distance_min_sq * l).sqrt();
    }
    delta * (strength / l)
}

/// Unit direction from body `a` towards coincident body `b`; opposite for the
/// reversed pair so the two are pushed apart.
fn separation(a: usize, b: usize) -> Vec2 {
    let (lo, hi, sign) = if a < b { (a, b, 1.0) } else { (b, a, -1.0) };
    let angle = ((lo as f32) * 0.618_034 + (hi as f32) * 0.37) * TAU;
    Vec2::new(angle.cos(), angle.sin()) * sign
}

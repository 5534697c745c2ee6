use std::fmt;

/// The classifier returned a graph that violates the node/edge contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedGraphError {
    /// Edge at position `edge` references a node id absent from the node set
    UnknownNode { edge: usize, id: String },
    /// The same node id appears more than once
    DuplicateNode { id: String },
}

impl fmt::Display for MalformedGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedGraphError::UnknownNode { edge, id } => {
                write!(f, "edge {} references unknown node '{}'", edge, id)
            }
            MalformedGraphError::DuplicateNode { id } => {
                write!(f, "node id '{}' appears more than once", id)
            }
        }
    }
}

impl std::error::Error for MalformedGraphError {}

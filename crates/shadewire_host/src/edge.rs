// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge (visual connection) definitions.

use crate::node::NodeId;
use crate::port::PortRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new random edge ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A drawn connection between two ports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Source port (output side)
    pub from: PortRef,
    /// Target port (input side)
    pub to: PortRef,
    /// Whether the wire is drawn
    pub visible: bool,
}

impl Edge {
    /// Create a new visible edge
    pub fn new(from: PortRef, to: PortRef) -> Self {
        Self {
            id: EdgeId::new(),
            from,
            to,
            visible: true,
        }
    }

    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from.node == node_id || self.to.node == node_id
    }

    /// Check if this edge touches a specific port
    pub fn involves_port(&self, port: PortRef) -> bool {
        self.from == port || self.to == port
    }
}

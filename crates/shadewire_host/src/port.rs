// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions - the visual side of a node's inputs and outputs.

use crate::node::NodeId;
use crate::slot::SlotId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// The data slot backing this port
    pub slot: SlotId,
    /// Whether the port is drawn at all
    pub visible: bool,
    /// Inline literal shown beside an unconnected input
    pub literal: Option<[f32; 4]>,
    /// Whether the inline literal decoration is drawn
    pub literal_visible: bool,
}

impl Port {
    /// Create a new port backed by the given slot
    pub fn new(
        name: impl Into<String>,
        direction: PortDirection,
        slot: SlotId,
    ) -> Self {
        Self {
            id: PortId::new(),
            name: name.into(),
            direction,
            slot,
            visible: true,
            literal: None,
            literal_visible: false,
        }
    }

    /// Set the inline literal
    pub fn with_literal(mut self, literal: [f32; 4]) -> Self {
        self.literal = Some(literal);
        self.literal_visible = true;
        self
    }

    /// Show the port; the inline literal reappears when one exists
    pub fn show(&mut self) {
        self.visible = true;
        self.literal_visible = self.literal.is_some();
    }

    /// Hide the port together with its inline literal decoration
    pub fn hide(&mut self) {
        self.visible = false;
        self.literal_visible = false;
    }
}

/// Reference to a port by owning node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// Owning node
    pub node: NodeId,
    /// Port within the node
    pub port: PortId,
}

impl PortRef {
    /// Create a new port reference
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_suppresses_literal() {
        let mut port = Port::new("Value", PortDirection::Input, SlotId::new())
            .with_literal([1.0, 0.0, 0.0, 1.0]);
        assert!(port.literal_visible);
        port.hide();
        assert!(!port.visible);
        assert!(!port.literal_visible);
        port.show();
        assert!(port.literal_visible);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the host graph.

use crate::port::{Port, PortDirection, PortId};
use crate::slot::{Slot, SlotDescriptor, SlotId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default node footprint
pub const NODE_BASE_WIDTH: f32 = 120.0;
/// Default node height
pub const NODE_BASE_HEIGHT: f32 = 76.0;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Role of a node, assigned once at construction.
///
/// Kind is never re-derived from the display title; titles are free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Publishes a value under a user-chosen name
    Set,
    /// Consumes a published value by name
    Get,
    /// Hidden marker persisting a node-group colour
    ColorMarker,
    /// Any ordinary host node
    Plain,
}

/// Text-entry state attached to a Set or Get node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeField {
    /// Current field contents
    pub text: String,
    /// Name suggestions offered by the dropdown
    pub suggestions: Vec<String>,
}

impl NodeField {
    /// Create a field seeded with the given text
    pub fn seeded(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggestions: Vec::new(),
        }
    }
}

/// A node instance in the host document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Role, fixed at construction
    pub kind: NodeKind,
    /// Display title
    pub title: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Visual footprint
    pub size: [f32; 2],
    /// Group this node belongs to, if any
    pub group: Option<String>,
    /// Custom header colour
    pub color: Option<[u8; 3]>,
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Attached text-entry field
    pub field: Option<NodeField>,
    /// Data slots backing the ports
    slots: Vec<Slot>,
    /// Spare synonym/tag strings; round-trips through the host save format.
    /// Accessed through [`crate::Document`]'s capability methods.
    pub(crate) synonyms: Vec<String>,
}

impl Node {
    /// Create a new node with no ports
    pub fn new(kind: NodeKind, title: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            title: title.into(),
            position: [0.0, 0.0],
            size: [NODE_BASE_WIDTH, NODE_BASE_HEIGHT],
            group: None,
            color: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            field: None,
            slots: Vec::new(),
            synonyms: Vec::new(),
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Add an input port backed by a fresh slot, returning the port ID
    pub fn add_input(&mut self, name: impl Into<String>, descriptor: SlotDescriptor) -> PortId {
        let slot = Slot::new(PortDirection::Input, descriptor);
        let port = Port::new(name, PortDirection::Input, slot.id);
        let id = port.id;
        self.slots.push(slot);
        self.inputs.push(port);
        id
    }

    /// Add an output port backed by a fresh slot, returning the port ID
    pub fn add_output(&mut self, name: impl Into<String>, descriptor: SlotDescriptor) -> PortId {
        let slot = Slot::new(PortDirection::Output, descriptor);
        let port = Port::new(name, PortDirection::Output, slot.id);
        let id = port.id;
        self.slots.push(slot);
        self.outputs.push(port);
        id
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.inputs
            .iter()
            .find(|p| p.id == port_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == port_id))
    }

    /// Get a mutable port by ID
    pub fn port_mut(&mut self, port_id: PortId) -> Option<&mut Port> {
        self.inputs
            .iter_mut()
            .find(|p| p.id == port_id)
            .or_else(|| self.outputs.iter_mut().find(|p| p.id == port_id))
    }

    /// Get a slot by ID
    pub fn slot(&self, slot_id: SlotId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    /// Get a mutable slot by ID
    pub fn slot_mut(&mut self, slot_id: SlotId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == slot_id)
    }

    /// The slot backing a port
    pub fn slot_for_port(&self, port_id: PortId) -> Option<&Slot> {
        self.port(port_id).and_then(|p| self.slot(p.slot))
    }

    /// Index of the first visible port in the given direction
    pub fn visible_port_index(&self, direction: PortDirection) -> Option<usize> {
        let ports = match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        };
        ports.iter().position(|p| p.visible)
    }

    /// All ports, inputs first
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}

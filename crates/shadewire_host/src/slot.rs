// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed value slots - the data-model side of a port.
//!
//! The host's internal graph model connects slots, not the visual ports
//! that decorate them. A slot's shape is either fixed by its definition or
//! resolved dynamically from whatever is connected upstream.

use crate::node::NodeId;
use crate::port::PortDirection;
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a value slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(pub Uuid);

impl SlotId {
    /// Create a new random slot ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a slot's value shape is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDescriptor {
    /// The shape is fixed by the node definition
    Fixed(Shape),
    /// The shape follows whatever is connected upstream
    Dynamic,
}

/// A typed value slot owned by a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Unique slot ID
    pub id: SlotId,
    /// Data direction
    pub direction: PortDirection,
    /// Shape determination rule
    pub descriptor: SlotDescriptor,
    /// Concrete shape computed by the host's type pass, for dynamic slots
    pub resolved: Option<Shape>,
}

impl Slot {
    /// Create a new slot
    pub fn new(direction: PortDirection, descriptor: SlotDescriptor) -> Self {
        Self {
            id: SlotId::new(),
            direction,
            descriptor,
            resolved: None,
        }
    }

    /// The shape this slot currently carries, if known
    pub fn effective_shape(&self) -> Option<Shape> {
        match self.descriptor {
            SlotDescriptor::Fixed(shape) => Some(shape),
            SlotDescriptor::Dynamic => self.resolved,
        }
    }
}

/// Reference to a slot by owning node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    /// Owning node
    pub node: NodeId,
    /// Slot within the node
    pub slot: SlotId,
}

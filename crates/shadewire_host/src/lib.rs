// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host graph boundary for the ShadeWire editor extension.
//!
//! This crate models the surface the extension core consumes from the
//! host shader-graph editor:
//! - Visual primitives: nodes, ports with visibility and inline-value
//!   decorations, edges.
//! - The separately-owned data model: typed value slots, slot links,
//!   connect/disconnect validation.
//! - The per-node synonym-tag string list, the extension's only
//!   persistence channel, exposed as an optional capability.
//! - A per-node validation-error sink.
//!
//! The in-memory [`Document`] is a reference implementation of that
//! surface; an integration against a real editor provides an adapter
//! with the same API.

pub mod document;
pub mod edge;
pub mod node;
pub mod port;
pub mod shape;
pub mod slot;

pub use document::{ConnectError, Document, DocumentId, Link};
pub use edge::{Edge, EdgeId};
pub use node::{Node, NodeField, NodeId, NodeKind};
pub use port::{Port, PortDirection, PortId, PortRef};
pub use shape::{Shape, SHAPE_PORT_ORDER};
pub use slot::{Slot, SlotDescriptor, SlotId, SlotRef};

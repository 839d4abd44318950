// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host document: node store, visual edge layer, and the separately
//! owned slot-level data model.
//!
//! The visual layer (edges) and the data model (slot links) are distinct
//! collections; keeping them in step is the extension core's job. The
//! document only validates data-model consistency on connect.

use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId};
use crate::port::{Port, PortDirection, PortRef};
use crate::slot::{SlotDescriptor, SlotId, SlotRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    /// Create a new random document ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

/// A slot-level connection in the data model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source slot (output side)
    pub from: SlotRef,
    /// Target slot (input side)
    pub to: SlotRef,
}

/// Error when creating a data-model connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Endpoint node is not part of this document
    #[error("node {0:?} is not part of this document")]
    NodeNotFound(NodeId),

    /// Slot not found on the endpoint node
    #[error("slot {0:?} not found")]
    SlotNotFound(SlotId),

    /// Port not found on the endpoint node
    #[error("port not found on endpoint node")]
    PortNotFound,

    /// Endpoints do not form an output-to-input pair
    #[error("endpoints do not form an output-to-input pair")]
    DirectionMismatch,

    /// Connection would create a cycle
    #[error("connection would create a cycle")]
    WouldCycle,
}

fn synonym_channel_default() -> bool {
    true
}

/// A shader graph document owned by the host editor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: DocumentId,
    /// Document name
    pub name: String,
    /// Nodes in the document
    nodes: IndexMap<NodeId, Node>,
    /// Visual edges
    edges: IndexMap<EdgeId, Edge>,
    /// Data-model slot links
    links: Vec<Link>,
    /// Per-node validation errors shown in the host's error UI
    errors: IndexMap<NodeId, Vec<String>>,
    /// Whether this host build exposes the synonym-tag channel.
    /// Not part of the save format; a drifted host simply lacks it.
    #[serde(skip, default = "synonym_channel_default")]
    synonym_channel: bool,
}

impl Document {
    /// Create a new empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            links: Vec::new(),
            errors: IndexMap::new(),
            synonym_channel: true,
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Add a node to the document
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node together with its edges, links and errors
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.edges.retain(|_, e| !e.involves_node(node_id));
        self.links
            .retain(|l| l.from.node != node_id && l.to.node != node_id);
        self.errors.shift_remove(&node_id);
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// All nodes in document order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs in document order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ------------------------------------------------------------------
    // Port / slot resolution
    // ------------------------------------------------------------------

    /// Resolve a port reference
    pub fn port(&self, port: PortRef) -> Option<&Port> {
        self.node(port.node)?.port(port.port)
    }

    /// Resolve a mutable port reference
    pub fn port_mut(&mut self, port: PortRef) -> Option<&mut Port> {
        self.node_mut(port.node)?.port_mut(port.port)
    }

    /// The slot reference backing a port
    pub fn slot_ref(&self, port: PortRef) -> Option<SlotRef> {
        let slot = self.port(port)?.slot;
        Some(SlotRef {
            node: port.node,
            slot,
        })
    }

    /// The port decorating a slot, if any
    pub fn port_for_slot(&self, slot: SlotRef) -> Option<PortRef> {
        self.node(slot.node)?
            .ports()
            .find(|p| p.slot == slot.slot)
            .map(|p| PortRef::new(slot.node, p.id))
    }

    /// Overwrite the resolved shape of a dynamic slot, as the host's
    /// type-inference pass would
    pub fn set_slot_resolved(&mut self, slot: SlotRef, shape: Option<crate::shape::Shape>) {
        if let Some(s) = self
            .nodes
            .get_mut(&slot.node)
            .and_then(|n| n.slot_mut(slot.slot))
        {
            s.resolved = shape;
        }
    }

    // ------------------------------------------------------------------
    // Data model (slot links)
    // ------------------------------------------------------------------

    /// Create a slot-level connection.
    ///
    /// `skip_validation` bypasses the cycle walk, for callers issuing
    /// several connects against the same endpoints in short order.
    /// An input slot holds a single source; an existing one is replaced.
    pub fn connect_slots(
        &mut self,
        from: SlotRef,
        to: SlotRef,
        skip_validation: bool,
    ) -> Result<(), ConnectError> {
        let from_node = self
            .nodes
            .get(&from.node)
            .ok_or(ConnectError::NodeNotFound(from.node))?;
        let to_node = self
            .nodes
            .get(&to.node)
            .ok_or(ConnectError::NodeNotFound(to.node))?;
        let from_slot = from_node
            .slot(from.slot)
            .ok_or(ConnectError::SlotNotFound(from.slot))?;
        let to_slot = to_node
            .slot(to.slot)
            .ok_or(ConnectError::SlotNotFound(to.slot))?;

        if from_slot.direction != PortDirection::Output
            || to_slot.direction != PortDirection::Input
        {
            return Err(ConnectError::DirectionMismatch);
        }

        let source_shape = from_slot.effective_shape();

        if !skip_validation && self.reaches(to.node, from.node) {
            return Err(ConnectError::WouldCycle);
        }

        if self.links.iter().any(|l| l.from == from && l.to == to) {
            return Ok(());
        }

        self.links.retain(|l| l.to != to);
        self.links.push(Link { from, to });

        // the type pass resolves a dynamic input from its source
        if let Some(slot) = self
            .nodes
            .get_mut(&to.node)
            .and_then(|n| n.slot_mut(to.slot))
        {
            if slot.descriptor == SlotDescriptor::Dynamic {
                slot.resolved = source_shape;
            }
        }
        Ok(())
    }

    /// Remove one slot-level connection, revalidating the orphaned input
    pub fn disconnect_slots(&mut self, from: SlotRef, to: SlotRef) -> bool {
        let before = self.links.len();
        self.links.retain(|l| !(l.from == from && l.to == to));
        let removed = self.links.len() != before;
        if removed {
            self.revalidate_input(to);
        }
        removed
    }

    /// Remove every slot-level connection touching a slot
    pub fn disconnect_all_at_slot(&mut self, slot: SlotRef) {
        let removed: Vec<Link> = self
            .links
            .iter()
            .copied()
            .filter(|l| l.from == slot || l.to == slot)
            .collect();
        self.links.retain(|l| l.from != slot && l.to != slot);
        for link in removed {
            self.revalidate_input(link.to);
        }
    }

    /// All data-model links
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The single source feeding an input slot, if connected
    pub fn link_source(&self, to: SlotRef) -> Option<SlotRef> {
        self.links.iter().find(|l| l.to == to).map(|l| l.from)
    }

    /// Dynamic input slots re-resolve when their source set changes
    fn revalidate_input(&mut self, to: SlotRef) {
        let source_shape = self
            .link_source(to)
            .and_then(|s| self.nodes.get(&s.node).and_then(|n| n.slot(s.slot)))
            .and_then(|s| s.effective_shape());
        if let Some(slot) = self
            .nodes
            .get_mut(&to.node)
            .and_then(|n| n.slot_mut(to.slot))
        {
            if slot.descriptor == SlotDescriptor::Dynamic {
                slot.resolved = source_shape;
            }
        }
    }

    /// Whether `target` is reachable from `start` following data links
    fn reaches(&self, start: NodeId, target: NodeId) -> bool {
        if start == target {
            return true;
        }
        let mut stack = vec![start];
        let mut seen = HashSet::new();
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            for link in self.links.iter().filter(|l| l.from.node == node) {
                if link.to.node == target {
                    return true;
                }
                stack.push(link.to.node);
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Visual layer (edges)
    // ------------------------------------------------------------------

    /// Add a visual edge. Deduplication is the caller's concern.
    pub fn add_edge(&mut self, from: PortRef, to: PortRef) -> EdgeId {
        let edge = Edge::new(from, to);
        let id = edge.id;
        self.edges.insert(id, edge);
        id
    }

    /// Remove a visual edge
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> Option<Edge> {
        self.edges.swap_remove(&edge_id)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get a mutable edge by ID
    pub fn edge_mut(&mut self, edge_id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&edge_id)
    }

    /// All edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// The edge directly connecting two ports, if present
    pub fn edge_between(&self, from: PortRef, to: PortRef) -> Option<EdgeId> {
        self.edges
            .values()
            .find(|e| e.from == from && e.to == to)
            .map(|e| e.id)
    }

    /// Edges whose source is the given port
    pub fn edges_from(&self, port: PortRef) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.from == port)
    }

    /// Edges whose target is the given port
    pub fn edges_to(&self, port: PortRef) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.to == port)
    }

    /// Edges touching the given port on either side
    pub fn edges_at(&self, port: PortRef) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_port(port))
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ------------------------------------------------------------------
    // Validation error sink
    // ------------------------------------------------------------------

    /// Attach a validation error to a node
    pub fn add_validation_error(&mut self, node: NodeId, message: impl Into<String>) {
        self.errors.entry(node).or_default().push(message.into());
    }

    /// Clear a node's validation errors
    pub fn clear_validation_errors(&mut self, node: NodeId) {
        self.errors.shift_remove(&node);
    }

    /// A node's validation errors
    pub fn validation_errors(&self, node: NodeId) -> &[String] {
        self.errors.get(&node).map_or(&[], Vec::as_slice)
    }

    // ------------------------------------------------------------------
    // Synonym-tag capability
    // ------------------------------------------------------------------

    /// Whether this host build exposes the synonym-tag channel
    pub fn has_synonym_channel(&self) -> bool {
        self.synonym_channel
    }

    /// Toggle the synonym-tag channel, modeling host version drift
    pub fn set_synonym_channel(&mut self, available: bool) {
        self.synonym_channel = available;
    }

    /// Read a node's synonym tags. `None` when the channel is missing
    /// or the node is gone.
    pub fn synonym_tags(&self, node: NodeId) -> Option<&[String]> {
        if !self.synonym_channel {
            return None;
        }
        self.node(node).map(|n| n.synonyms.as_slice())
    }

    /// Write access to a node's synonym tags, under the same conditions
    pub fn synonym_tags_mut(&mut self, node: NodeId) -> Option<&mut Vec<String>> {
        if !self.synonym_channel {
            return None;
        }
        self.node_mut(node).map(|n| &mut n.synonyms)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::shape::Shape;

    fn two_plain_nodes(doc: &mut Document) -> (NodeId, SlotRef, NodeId, SlotRef) {
        let mut a = Node::new(NodeKind::Plain, "A");
        let a_out = a.add_output("Out", SlotDescriptor::Fixed(Shape::Vec3));
        let mut b = Node::new(NodeKind::Plain, "B");
        let b_in = b.add_input("In", SlotDescriptor::Dynamic);
        let a_id = doc.add_node(a);
        let b_id = doc.add_node(b);
        let from = doc.slot_ref(PortRef::new(a_id, a_out)).unwrap();
        let to = doc.slot_ref(PortRef::new(b_id, b_in)).unwrap();
        (a_id, from, b_id, to)
    }

    #[test]
    fn test_connect_resolves_dynamic_input() {
        let mut doc = Document::new("test");
        let (_, from, b_id, to) = two_plain_nodes(&mut doc);
        doc.connect_slots(from, to, false).unwrap();
        let resolved = doc.node(b_id).unwrap().slot(to.slot).unwrap().resolved;
        assert_eq!(resolved, Some(Shape::Vec3));
    }

    #[test]
    fn test_disconnect_clears_dynamic_resolution() {
        let mut doc = Document::new("test");
        let (_, from, b_id, to) = two_plain_nodes(&mut doc);
        doc.connect_slots(from, to, false).unwrap();
        assert!(doc.disconnect_slots(from, to));
        let resolved = doc.node(b_id).unwrap().slot(to.slot).unwrap().resolved;
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_connect_rejects_direction_mismatch() {
        let mut doc = Document::new("test");
        let (_, from, _, to) = two_plain_nodes(&mut doc);
        assert!(matches!(
            doc.connect_slots(to, from, false),
            Err(ConnectError::DirectionMismatch)
        ));
    }

    #[test]
    fn test_connect_rejects_cycle() {
        let mut doc = Document::new("test");
        let mut a = Node::new(NodeKind::Plain, "A");
        let a_in = a.add_input("In", SlotDescriptor::Dynamic);
        let a_out = a.add_output("Out", SlotDescriptor::Fixed(Shape::Scalar));
        let mut b = Node::new(NodeKind::Plain, "B");
        let b_in = b.add_input("In", SlotDescriptor::Dynamic);
        let b_out = b.add_output("Out", SlotDescriptor::Fixed(Shape::Scalar));
        let a_id = doc.add_node(a);
        let b_id = doc.add_node(b);
        let a_in = doc.slot_ref(PortRef::new(a_id, a_in)).unwrap();
        let a_out = doc.slot_ref(PortRef::new(a_id, a_out)).unwrap();
        let b_in = doc.slot_ref(PortRef::new(b_id, b_in)).unwrap();
        let b_out = doc.slot_ref(PortRef::new(b_id, b_out)).unwrap();
        doc.connect_slots(a_out, b_in, false).unwrap();
        assert!(matches!(
            doc.connect_slots(b_out, a_in, false),
            Err(ConnectError::WouldCycle)
        ));
    }

    #[test]
    fn test_input_slot_keeps_single_source() {
        let mut doc = Document::new("test");
        let (_, from, _, to) = two_plain_nodes(&mut doc);
        let mut c = Node::new(NodeKind::Plain, "C");
        let c_out = c.add_output("Out", SlotDescriptor::Fixed(Shape::Scalar));
        let c_id = doc.add_node(c);
        let c_out = doc.slot_ref(PortRef::new(c_id, c_out)).unwrap();
        doc.connect_slots(from, to, false).unwrap();
        doc.connect_slots(c_out, to, false).unwrap();
        assert_eq!(doc.link_source(to), Some(c_out));
        assert_eq!(doc.links().len(), 1);
    }

    #[test]
    fn test_missing_synonym_channel_reads_none() {
        let mut doc = Document::new("test");
        let id = doc.add_node(Node::new(NodeKind::Set, "Set"));
        assert!(doc.synonym_tags(id).is_some());
        doc.set_synonym_channel(false);
        assert!(doc.synonym_tags(id).is_none());
        assert!(doc.synonym_tags_mut(id).is_none());
    }

    #[test]
    fn test_tags_round_trip_through_save_format() {
        let mut doc = Document::new("test");
        let id = doc.add_node(Node::new(NodeKind::Set, "Set"));
        doc.synonym_tags_mut(id).unwrap().push("Glow".to_string());
        let text = ron::to_string(&doc).unwrap();
        let restored: Document = ron::from_str(&text).unwrap();
        assert_eq!(restored.synonym_tags(id).unwrap(), ["Glow".to_string()]);
    }

    #[test]
    fn test_remove_node_drops_edges_and_links() {
        let mut doc = Document::new("test");
        let (a_id, from, b_id, to) = two_plain_nodes(&mut doc);
        doc.connect_slots(from, to, false).unwrap();
        let a_port = doc.node(a_id).unwrap().outputs[0].id;
        let b_port = doc.node(b_id).unwrap().inputs[0].id;
        doc.add_edge(PortRef::new(a_id, a_port), PortRef::new(b_id, b_port));
        doc.remove_node(a_id);
        assert_eq!(doc.edge_count(), 0);
        assert!(doc.links().is_empty());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port and node shape classification.
//!
//! A port's shape comes from its backing slot: fixed slots map directly,
//! dynamic slots expose whatever concrete shape the host's type pass last
//! resolved, and anything unknown falls back to Vec4. Results are cached
//! per port for the session; the cache must not survive undo/redo.

use shadewire_host::{Document, NodeId, PortDirection, PortId, PortRef, Shape, SHAPE_PORT_ORDER};
use shadewire_host::NodeKind;
use std::collections::HashMap;

/// Session cache of per-port shape classifications
#[derive(Debug, Default)]
pub struct ShapeCache {
    cached: HashMap<(NodeId, PortId), Shape>,
}

impl ShapeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a port, consulting the cache first
    pub fn classify_port(&mut self, doc: &Document, port: PortRef) -> Shape {
        if let Some(&shape) = self.cached.get(&(port.node, port.port)) {
            return shape;
        }
        let shape = classify_port_uncached(doc, port);
        self.cached.insert((port.node, port.port), shape);
        shape
    }

    /// Drop every cached classification (undo/redo boundary)
    pub fn invalidate(&mut self) {
        self.cached.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.cached.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cached.is_empty()
    }
}

fn classify_port_uncached(doc: &Document, port: PortRef) -> Shape {
    doc.node(port.node)
        .and_then(|n| n.slot_for_port(port.port))
        .and_then(|s| s.effective_shape())
        .unwrap_or_default()
}

/// Shape a Set or Get node currently exposes: the shape of its single
/// visible shape-variant port. No visible port means Vec4.
pub fn classify_node(doc: &Document, node: NodeId) -> Shape {
    let Some(n) = doc.node(node) else {
        return Shape::Vec4;
    };
    let direction = match n.kind {
        NodeKind::Set => PortDirection::Input,
        NodeKind::Get => PortDirection::Output,
        NodeKind::ColorMarker | NodeKind::Plain => return Shape::Vec4,
    };
    n.visible_port_index(direction)
        .and_then(|i| SHAPE_PORT_ORDER.get(i))
        .copied()
        .unwrap_or_default()
}

/// Last upstream-derived shape observed at a port.
///
/// This is the runtime-only port binding record: a cache, never trusted
/// across undo/redo.
#[derive(Debug, Default)]
pub struct PortBindings {
    bound: HashMap<(NodeId, PortId), Shape>,
}

impl PortBindings {
    /// Create an empty record set
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the shape derived for a port
    pub fn record(&mut self, node: NodeId, port: PortId, shape: Shape) {
        self.bound.insert((node, port), shape);
    }

    /// The last derived shape, if any
    pub fn get(&self, node: NodeId, port: PortId) -> Option<Shape> {
        self.bound.get(&(node, port)).copied()
    }

    /// Drop every record (undo/redo boundary)
    pub fn clear(&mut self) {
        self.bound.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadewire_host::{Node, SlotDescriptor};

    #[test]
    fn test_fixed_slot_classifies_directly() {
        let mut doc = Document::new("test");
        let mut node = Node::new(NodeKind::Plain, "A");
        let out = node.add_output("Out", SlotDescriptor::Fixed(Shape::Vec2));
        let id = doc.add_node(node);
        let mut cache = ShapeCache::new();
        assert_eq!(cache.classify_port(&doc, PortRef::new(id, out)), Shape::Vec2);
    }

    #[test]
    fn test_unresolved_dynamic_falls_back_to_vec4() {
        let mut doc = Document::new("test");
        let mut node = Node::new(NodeKind::Plain, "A");
        let out = node.add_output("Out", SlotDescriptor::Dynamic);
        let id = doc.add_node(node);
        let mut cache = ShapeCache::new();
        assert_eq!(cache.classify_port(&doc, PortRef::new(id, out)), Shape::Vec4);
    }

    #[test]
    fn test_cache_survives_until_invalidated() {
        let mut doc = Document::new("test");
        let mut node = Node::new(NodeKind::Plain, "A");
        let out = node.add_output("Out", SlotDescriptor::Dynamic);
        let id = doc.add_node(node);
        let port = PortRef::new(id, out);
        let slot = doc.slot_ref(port).unwrap();

        let mut cache = ShapeCache::new();
        assert_eq!(cache.classify_port(&doc, port), Shape::Vec4);

        // a later host type pass resolves the slot, but the cache answers
        doc.set_slot_resolved(slot, Some(Shape::Vec3));
        assert_eq!(cache.classify_port(&doc, port), Shape::Vec4);

        cache.invalidate();
        assert_eq!(cache.classify_port(&doc, port), Shape::Vec3);
    }

    #[test]
    fn test_stale_port_classifies_vec4() {
        let doc = Document::new("test");
        let mut cache = ShapeCache::new();
        let port = PortRef::new(NodeId::new(), PortId::new());
        assert_eq!(cache.classify_port(&doc, port), Shape::Vec4);
    }
}

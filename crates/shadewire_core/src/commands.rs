// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hotkey-facing editing utilities.
//!
//! These back the host's node-insertion and port-swap key bindings.
//! They touch ports and shapes only; the symbol table is never mutated
//! here - a freshly inserted Set node registers through the normal
//! reconciler pass once it gets a name.

use crate::link;
use crate::nodes;
use shadewire_host::{Document, NodeId, PortRef};
use tracing::debug;

/// Error from the port-swap utility
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    /// Node not found
    #[error("node not found")]
    NodeNotFound,

    /// Input index out of range
    #[error("input port index {0} out of range")]
    PortOutOfRange(usize),

    /// Swapping a port with itself
    #[error("cannot swap a port with itself")]
    SamePort,
}

/// Insert a Set node at the given graph position
pub fn insert_set_node(doc: &mut Document, position: [f32; 2]) -> NodeId {
    let id = doc.add_node(nodes::set_node().with_position(position[0], position[1]));
    debug!(?id, "set node inserted");
    id
}

/// Insert a Get node at the given graph position
pub fn insert_get_node(doc: &mut Document, position: [f32; 2]) -> NodeId {
    let id = doc.add_node(nodes::get_node().with_position(position[0], position[1]));
    debug!(?id, "get node inserted");
    id
}

/// Swap two input ports on a node: incoming connections and inline
/// literals change places, the ports themselves stay put.
pub fn swap_input_ports(
    doc: &mut Document,
    node: NodeId,
    a: usize,
    b: usize,
) -> Result<(), SwapError> {
    if a == b {
        return Err(SwapError::SamePort);
    }
    let n = doc.node(node).ok_or(SwapError::NodeNotFound)?;
    let port_a = n.input(a).ok_or(SwapError::PortOutOfRange(a))?.id;
    let port_b = n.input(b).ok_or(SwapError::PortOutOfRange(b))?.id;
    let ref_a = PortRef::new(node, port_a);
    let ref_b = PortRef::new(node, port_b);

    let sources_a: Vec<PortRef> = doc.edges_to(ref_a).map(|e| e.from).collect();
    let sources_b: Vec<PortRef> = doc.edges_to(ref_b).map(|e| e.from).collect();

    link::disconnect_all(doc, ref_a);
    link::disconnect_all(doc, ref_b);
    for source in sources_a {
        let _ = link::connect_or_flag(doc, source, ref_b, false);
    }
    for source in sources_b {
        let _ = link::connect_or_flag(doc, source, ref_a, false);
    }

    if let Some(n) = doc.node_mut(node) {
        let literal = n.inputs[a].literal;
        let shown = n.inputs[a].literal_visible;
        n.inputs[a].literal = n.inputs[b].literal;
        n.inputs[a].literal_visible = n.inputs[b].literal_visible;
        n.inputs[b].literal = literal;
        n.inputs[b].literal_visible = shown;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadewire_host::{Node, NodeKind, Shape, SlotDescriptor};

    #[test]
    fn test_insert_positions_node() {
        let mut doc = Document::new("test");
        let id = insert_set_node(&mut doc, [40.0, -12.0]);
        assert_eq!(doc.node(id).unwrap().position, [40.0, -12.0]);
        assert_eq!(doc.node(id).unwrap().kind, NodeKind::Set);
    }

    #[test]
    fn test_swap_moves_connections_and_literals() {
        let mut doc = Document::new("test");
        let mut lerp = Node::new(NodeKind::Plain, "Lerp");
        lerp.add_input("A", SlotDescriptor::Dynamic);
        lerp.add_input("B", SlotDescriptor::Dynamic);
        lerp.inputs[1].literal = Some([0.5, 0.5, 0.5, 1.0]);
        lerp.inputs[1].literal_visible = true;
        let lerp_id = doc.add_node(lerp);

        let mut source = Node::new(NodeKind::Plain, "Time");
        let out = source.add_output("Out", SlotDescriptor::Fixed(Shape::Scalar));
        let src_id = doc.add_node(source);
        let a_ref = PortRef::new(lerp_id, doc.node(lerp_id).unwrap().inputs[0].id);
        let b_ref = PortRef::new(lerp_id, doc.node(lerp_id).unwrap().inputs[1].id);
        link::connect(&mut doc, PortRef::new(src_id, out), a_ref, false).unwrap();

        swap_input_ports(&mut doc, lerp_id, 0, 1).unwrap();

        assert_eq!(doc.edges_to(a_ref).count(), 0);
        assert_eq!(doc.edges_to(b_ref).count(), 1);
        let lerp = doc.node(lerp_id).unwrap();
        assert_eq!(lerp.inputs[0].literal, Some([0.5, 0.5, 0.5, 1.0]));
        assert!(lerp.inputs[0].literal_visible);
        assert_eq!(lerp.inputs[1].literal, None);
    }

    #[test]
    fn test_swap_rejects_bad_indices() {
        let mut doc = Document::new("test");
        let mut node = Node::new(NodeKind::Plain, "Add");
        node.add_input("A", SlotDescriptor::Dynamic);
        let id = doc.add_node(node);
        assert!(matches!(
            swap_input_ports(&mut doc, id, 0, 0),
            Err(SwapError::SamePort)
        ));
        assert!(matches!(
            swap_input_ports(&mut doc, id, 0, 3),
            Err(SwapError::PortOutOfRange(3))
        ));
        assert!(matches!(
            swap_input_ports(&mut doc, NodeId::new(), 0, 1),
            Err(SwapError::NodeNotFound)
        ));
    }
}

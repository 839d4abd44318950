// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge synchronizer: keeps the visual edge layer and the host's
//! slot-level data model in step.
//!
//! Every mutation goes through here so the two layers cannot drift: a
//! connect creates the slot link first and mirrors it as an edge, a
//! disconnect removes both. Connecting already-connected ports is a
//! no-op returning the existing edge.

use shadewire_host::{
    ConnectError, Document, EdgeId, NodeId, PortDirection, PortRef, Shape, SHAPE_PORT_ORDER,
};
use tracing::warn;

/// Connect two ports on both layers.
///
/// Returns the existing edge when the ports are already directly
/// connected. `skip_validation` bypasses the host's cycle walk, for
/// bursts of connects against endpoints already validated once.
pub fn connect(
    doc: &mut Document,
    from: PortRef,
    to: PortRef,
    skip_validation: bool,
) -> Result<EdgeId, ConnectError> {
    if let Some(existing) = doc.edge_between(from, to) {
        return Ok(existing);
    }
    let from_slot = doc.slot_ref(from).ok_or(ConnectError::PortNotFound)?;
    let to_slot = doc.slot_ref(to).ok_or(ConnectError::PortNotFound)?;
    doc.connect_slots(from_slot, to_slot, skip_validation)?;
    Ok(doc.add_edge(from, to))
}

/// Connect, surfacing a rejection as a validation error on the input
/// node. Rejections are terminal: the caller must not retry.
pub fn connect_or_flag(
    doc: &mut Document,
    from: PortRef,
    to: PortRef,
    skip_validation: bool,
) -> Option<EdgeId> {
    match connect(doc, from, to, skip_validation) {
        Ok(edge) => Some(edge),
        Err(err) => {
            warn!(%err, "connection rejected");
            doc.add_validation_error(to.node, err.to_string());
            None
        }
    }
}

/// Connect two ports and keep the resulting wire invisible
pub fn connect_hidden(
    doc: &mut Document,
    from: PortRef,
    to: PortRef,
    skip_validation: bool,
) -> Result<EdgeId, ConnectError> {
    let edge = connect(doc, from, to, skip_validation)?;
    if let Some(e) = doc.edge_mut(edge) {
        e.visible = false;
    }
    Ok(edge)
}

/// Remove every connection at a port, on both layers
pub fn disconnect_all(doc: &mut Document, port: PortRef) {
    let edge_ids: Vec<EdgeId> = doc.edges_at(port).map(|e| e.id).collect();
    for id in edge_ids {
        doc.remove_edge(id);
    }
    if let Some(slot) = doc.slot_ref(port) {
        doc.disconnect_all_at_slot(slot);
    }
}

/// Re-point every edge sourced at `from` to originate at `to`.
///
/// Used when a node's active output changes shape; the two ports need
/// not share a shape. Downstream endpoints keep their wiring.
pub fn move_all_outputs(doc: &mut Document, from: PortRef, to: PortRef) {
    let targets: Vec<PortRef> = doc.edges_from(from).map(|e| e.to).collect();
    for target in targets {
        if let Some(edge) = doc.edge_between(from, target) {
            doc.remove_edge(edge);
        }
        if let (Some(fs), Some(ts)) = (doc.slot_ref(from), doc.slot_ref(target)) {
            doc.disconnect_slots(fs, ts);
        }
        let _ = connect_or_flag(doc, to, target, true);
    }
}

/// Make the shape-variant port for `shape` the node's single visible
/// port on the given side, hiding the rest (and their inline literals).
pub fn set_active_shape_port(
    doc: &mut Document,
    node: NodeId,
    direction: PortDirection,
    shape: Shape,
) {
    let Some(n) = doc.node_mut(node) else {
        return;
    };
    let ports = match direction {
        PortDirection::Input => &mut n.inputs,
        PortDirection::Output => &mut n.outputs,
    };
    for (index, port) in ports.iter_mut().enumerate().take(SHAPE_PORT_ORDER.len()) {
        if index == shape.port_index() {
            port.show();
        } else {
            port.hide();
        }
    }
}

/// Repair the single-visible-port invariant on a node's variant side.
///
/// Keeps the first visible variant, or falls back to Vec4 when none is
/// visible.
pub fn ensure_single_active(doc: &mut Document, node: NodeId, direction: PortDirection) {
    let Some(n) = doc.node(node) else {
        return;
    };
    let shape = n
        .visible_port_index(direction)
        .and_then(|i| SHAPE_PORT_ORDER.get(i))
        .copied()
        .unwrap_or_default();
    set_active_shape_port(doc, node, direction, shape);
}

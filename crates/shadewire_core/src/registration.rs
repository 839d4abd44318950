// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registration protocol: the rename/retype state machine.
//!
//! A Set node's binding moves between `Unbound` (empty key) and
//! `Bound(key)`. Renames mutate the symbol table first, then fan out to
//! dependents, so relinking always sees a consistent table. Shape
//! changes flow Set -> linked Gets, preserving downstream wiring when a
//! Get's active output port moves.

use crate::classify::classify_node;
use crate::link;
use crate::nodes::PLUMBING_PORTS;
use crate::session::Session;
use crate::symbols::{display_form, key_form};
use shadewire_host::node::NODE_BASE_WIDTH;
use shadewire_host::{
    Document, EdgeId, Node, NodeId, NodeKind, PortDirection, PortId, PortRef, Shape,
    SHAPE_PORT_ORDER,
};
use tracing::{debug, warn};

/// Approximate field glyph width, for resizing a node to fit its name
const FIELD_CHAR_WIDTH: f32 = 7.5;
/// Horizontal padding around the name field
const FIELD_PADDING: f32 = 46.0;

/// Read the persisted variable name from the synonym-tag channel.
///
/// `None` means the channel is unavailable or the node is gone.
pub fn persisted_name(doc: &Document, node: NodeId) -> Option<String> {
    let tags = doc.synonym_tags(node)?;
    Some(tags.first().cloned().unwrap_or_default())
}

/// Write the variable name into the synonym-tag channel.
///
/// A missing channel downgrades to a logged no-op so a host version
/// mismatch never takes the editor down.
pub fn persist_name(doc: &mut Document, node: NodeId, name: &str) {
    let Some(tags) = doc.synonym_tags_mut(node) else {
        warn!("synonym-tag channel unavailable; name not persisted");
        return;
    };
    if tags.is_empty() {
        tags.push(name.to_string());
    } else {
        tags[0] = name.to_string();
    }
}

fn resize_to_fit(node: &mut Node, text: &str) {
    node.size[0] = NODE_BASE_WIDTH.max(text.len() as f32 * FIELD_CHAR_WIDTH + FIELD_PADDING);
}

fn output_ref(doc: &Document, node: NodeId, index: usize) -> Option<PortRef> {
    doc.node(node)
        .and_then(|n| n.output(index))
        .map(|p| PortRef::new(node, p.id))
}

fn input_ref(doc: &Document, node: NodeId, index: usize) -> Option<PortRef> {
    doc.node(node)
        .and_then(|n| n.input(index))
        .map(|p| PortRef::new(node, p.id))
}

/// Get nodes currently wired to a Set node's plumbing outputs
pub fn linked_gets(doc: &Document, set: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for index in 0..PLUMBING_PORTS {
        let Some(port) = output_ref(doc, set, index) else {
            continue;
        };
        for edge in doc.edges_from(port) {
            let target = edge.to.node;
            if doc.node(target).map(|n| n.kind) == Some(NodeKind::Get) && !out.contains(&target) {
                out.push(target);
            }
        }
    }
    out
}

/// Handle a Set node's name edit.
///
/// The table is updated before any relinking. On a collision with a
/// different live owner the rename does not take effect: the node gets
/// a validation error and its persisted key is force-cleared.
pub fn rename(
    session: &mut Session,
    doc: &mut Document,
    node: NodeId,
    previous: &str,
    new_name: &str,
) {
    let prev_key = key_form(previous);
    let new_key = key_form(new_name);

    if !prev_key.is_empty() {
        session.symbols.remove(previous, node);
    }

    if !new_key.is_empty() {
        let inserted = session
            .symbols
            .insert(new_name, node, |id| doc.node(id).is_some());
        if let Err(err) = inserted {
            warn!(%err, "rename rejected");
            doc.add_validation_error(node, err.to_string());
            persist_name(doc, node, "");
            if let Some(field) = doc.node_mut(node).and_then(|n| n.field.as_mut()) {
                field.text.clear();
            }
            return;
        }
        debug!(name = %display_form(new_name), "variable bound");
    }

    let display = display_form(new_name);
    persist_name(doc, node, &display);
    doc.clear_validation_errors(node);
    if let Some(n) = doc.node_mut(node) {
        if let Some(field) = n.field.as_mut() {
            field.text = display.clone();
        }
        resize_to_fit(n, &display);
    }

    // dependents show the accepted name; assigning the field directly
    // does not re-enter the rename handler
    for get in linked_gets(doc, node) {
        persist_name(doc, get, &display);
        if let Some(n) = doc.node_mut(get) {
            if let Some(field) = n.field.as_mut() {
                field.text = display.clone();
            }
            resize_to_fit(n, &display);
        }
    }

    if new_key.is_empty() {
        return;
    }

    // relink every Get in the document keyed to the new name
    let shape = classify_node(doc, node);
    let keyed: Vec<NodeId> = doc
        .nodes()
        .filter(|n| n.kind == NodeKind::Get)
        .filter(|n| {
            doc.synonym_tags(n.id)
                .and_then(|tags| tags.first())
                .is_some_and(|tag| key_form(tag) == new_key)
        })
        .map(|n| n.id)
        .collect();
    for get in keyed {
        bind_get(doc, node, get, shape);
    }
}

/// Wire a Get node to a Set node: exactly the two index-aligned
/// plumbing pairs, then force the Get to mirror the Set's shape.
pub fn bind_get(doc: &mut Document, set: NodeId, get: NodeId, shape: Shape) {
    // drop any previous binding so edges never double up
    for index in 0..PLUMBING_PORTS {
        if let Some(port) = input_ref(doc, get, index) {
            link::disconnect_all(doc, port);
        }
    }
    for index in 0..PLUMBING_PORTS {
        let (Some(from), Some(to)) = (output_ref(doc, set, index), input_ref(doc, get, index))
        else {
            continue;
        };
        // the first pair is validated; the second rides the same endpoints
        if let Err(err) = link::connect_hidden(doc, from, to, index > 0) {
            warn!(%err, "variable binding rejected");
            doc.add_validation_error(get, err.to_string());
            return;
        }
    }
    get_shape_changed(doc, get, shape);
}

/// A Set node's shape changed: flip the visible input variant and
/// propagate to every linked Get when the shape actually moved.
pub fn set_shape_changed(doc: &mut Document, node: NodeId, shape: Shape) {
    let previous = classify_node(doc, node);
    link::set_active_shape_port(doc, node, PortDirection::Input, shape);

    // wires follow visibility: only the active variant shows its edge
    for index in 0..SHAPE_PORT_ORDER.len() {
        let Some(port) = input_ref(doc, node, index) else {
            continue;
        };
        let visible = index == shape.port_index();
        let ids: Vec<EdgeId> = doc.edges_to(port).map(|e| e.id).collect();
        for id in ids {
            if let Some(edge) = doc.edge_mut(id) {
                edge.visible = visible;
            }
        }
    }

    // the plumbing outputs carry the node's shape downstream
    for index in 0..PLUMBING_PORTS {
        if let Some(slot) = output_ref(doc, node, index).and_then(|p| doc.slot_ref(p)) {
            doc.set_slot_resolved(slot, Some(shape));
        }
    }

    if previous == shape {
        return;
    }
    debug!(?previous, ?shape, "set node shape changed; propagating");
    for get in linked_gets(doc, node) {
        get_shape_changed(doc, get, shape);
    }
}

/// A Get node's shape changed: flip the visible output variant, moving
/// any downstream connections from the old active port to the new one.
pub fn get_shape_changed(doc: &mut Document, node: NodeId, shape: Shape) {
    let old_index = doc
        .node(node)
        .and_then(|n| n.visible_port_index(PortDirection::Output));
    link::set_active_shape_port(doc, node, PortDirection::Output, shape);

    let Some(old_index) = old_index else {
        return;
    };
    if old_index == shape.port_index() {
        return;
    }
    let old_port = doc
        .node(node)
        .and_then(|n| n.output(old_index))
        .map(|p| PortRef::new(node, p.id));
    let new_port = doc
        .node(node)
        .and_then(|n| n.output(shape.port_index()))
        .map(|p| PortRef::new(node, p.id));
    if let (Some(old), Some(new)) = (old_port, new_port) {
        if doc.edges_from(old).next().is_some() {
            link::move_all_outputs(doc, old, new);
        }
    }
}

/// A Set node's active input connection changed (from the pending
/// queue): re-derive the shape from upstream, keep the hidden variants
/// fed from the same source, and flip shape when it moved.
pub fn upstream_changed(session: &mut Session, doc: &mut Document, node: NodeId, port: PortId) {
    let Some(n) = doc.node(node) else {
        return;
    };
    if n.kind != NodeKind::Set {
        return;
    }
    let Some(active_index) = n.visible_port_index(PortDirection::Input) else {
        return;
    };
    let Some(active) = n.input(active_index).map(|p| p.id) else {
        return;
    };
    if active != port {
        return;
    }

    let active_ref = PortRef::new(node, active);
    let upstream_slot = doc.slot_ref(active_ref).and_then(|s| doc.link_source(s));
    let upstream_port = upstream_slot.and_then(|s| doc.port_for_slot(s));

    let derived = match upstream_port {
        Some(up) => session.shapes.classify_port(doc, up),
        None => Shape::Vec4,
    };

    // keep the hidden variants fed from the same source so a later
    // shape change is a pure visibility flip
    let others: Vec<PortRef> = doc
        .node(node)
        .map(|n| {
            n.inputs
                .iter()
                .take(SHAPE_PORT_ORDER.len())
                .filter(|p| p.id != active)
                .map(|p| PortRef::new(node, p.id))
                .collect()
        })
        .unwrap_or_default();
    match upstream_port {
        Some(up) => {
            for input in others {
                if let Err(err) = link::connect_hidden(doc, up, input, true) {
                    warn!(%err, "hidden variant rewire failed");
                }
            }
        }
        None => {
            for input in others {
                link::disconnect_all(doc, input);
            }
        }
    }

    let previous = session
        .bindings
        .get(node, active)
        .unwrap_or_else(|| classify_node(doc, node));
    session.bindings.record(node, active, derived);
    if derived != previous {
        set_shape_changed(doc, node, derived);
    }
}

/// Handle a Get node's name selection (entry field or dropdown).
///
/// The name is persisted either way; binding happens only when the
/// table resolves it to a live Set node.
pub fn resolve_get(session: &mut Session, doc: &mut Document, node: NodeId, name: &str) {
    let display_name = display_form(name);
    persist_name(doc, node, &display_name);
    if let Some(n) = doc.node_mut(node) {
        if let Some(field) = n.field.as_mut() {
            field.text = display_name.clone();
        }
        resize_to_fit(n, &display_name);
    }

    if key_form(name).is_empty() {
        for index in 0..PLUMBING_PORTS {
            if let Some(port) = input_ref(doc, node, index) {
                link::disconnect_all(doc, port);
            }
        }
        return;
    }

    let set = session
        .symbols
        .lookup(name)
        .filter(|id| doc.node(*id).is_some());
    let Some(set) = set else {
        debug!(name = %display_name, "variable unresolved; keeping default shape");
        return;
    };
    let shape = classify_node(doc, set);
    bind_get(doc, set, node, shape);
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Construction of the extension's synthetic nodes.
//!
//! Set and Get nodes carry four shape-variant ports in the fixed
//! [`SHAPE_PORT_ORDER`] order (one visible at a time) plus two hidden
//! plumbing ports used to wire a Set to its Gets. Binding always links
//! exactly the two index-aligned plumbing pairs, whatever the current
//! shape; downstream port indices rely on that arity staying fixed.

use shadewire_host::{Node, NodeKind, Shape, SlotDescriptor, SHAPE_PORT_ORDER};

/// Number of plumbing port pairs linking a Set to each of its Gets
pub const PLUMBING_PORTS: usize = 2;

fn add_shape_variants(node: &mut Node, input_side: bool) {
    for shape in SHAPE_PORT_ORDER {
        if input_side {
            node.add_input(shape.port_name(), SlotDescriptor::Fixed(shape));
        } else {
            node.add_output(shape.port_name(), SlotDescriptor::Fixed(shape));
        }
    }
    let ports = if input_side {
        &mut node.inputs
    } else {
        &mut node.outputs
    };
    for (index, port) in ports.iter_mut().enumerate() {
        if index == Shape::Vec4.port_index() {
            port.show();
        } else {
            port.hide();
        }
    }
}

/// Build a Set node: four shape-variant inputs (Vec4 active) and two
/// hidden plumbing outputs.
pub fn set_node() -> Node {
    let mut node = Node::new(NodeKind::Set, "Set");
    add_shape_variants(&mut node, true);
    for index in 0..PLUMBING_PORTS {
        node.add_output(format!("Link {index}"), SlotDescriptor::Dynamic);
        if let Some(port) = node.outputs.last_mut() {
            port.hide();
        }
    }
    node
}

/// Build a Get node: two hidden plumbing inputs and four shape-variant
/// outputs (Vec4 active).
pub fn get_node() -> Node {
    let mut node = Node::new(NodeKind::Get, "Get");
    for index in 0..PLUMBING_PORTS {
        node.add_input(format!("Link {index}"), SlotDescriptor::Dynamic);
        if let Some(port) = node.inputs.last_mut() {
            port.hide();
        }
    }
    add_shape_variants(&mut node, false);
    node
}

/// Build a hidden Color marker node persisting a group colour
pub fn color_marker_node() -> Node {
    let mut node = Node::new(NodeKind::ColorMarker, "Color");
    node.size = [24.0, 24.0];
    node
}

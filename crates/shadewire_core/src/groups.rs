// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node-group colouring.
//!
//! A group's colour is persisted on a hidden Color marker node whose
//! synonym tags hold the group name and a hex colour string, so the
//! assignment survives a save/load through the host's own format. The
//! reconciler reapplies marker colours to member nodes each pass.

use crate::nodes;
use shadewire_host::{Document, NodeId, NodeKind};
use tracing::warn;

/// Assign a colour to a group, creating its marker node on first use.
///
/// Returns the marker, or `None` when the synonym-tag channel is
/// unavailable and the assignment cannot persist.
pub fn set_group_color(doc: &mut Document, group: &str, color: [u8; 3]) -> Option<NodeId> {
    if !doc.has_synonym_channel() {
        warn!("synonym-tag channel unavailable; group colour not persisted");
        return None;
    }
    let marker = find_marker(doc, group)
        .unwrap_or_else(|| doc.add_node(nodes::color_marker_node()));
    let tags = doc.synonym_tags_mut(marker)?;
    tags.clear();
    tags.push(group.to_string());
    tags.push(format_hex(color));
    Some(marker)
}

/// The colour assigned to a group, if any
pub fn group_color(doc: &Document, group: &str) -> Option<[u8; 3]> {
    let marker = find_marker(doc, group)?;
    doc.synonym_tags(marker)
        .and_then(|tags| tags.get(1))
        .and_then(|hex| parse_hex(hex))
}

/// Remove a group's colour assignment together with its marker
pub fn clear_group_color(doc: &mut Document, group: &str) {
    if let Some(marker) = find_marker(doc, group) {
        doc.remove_node(marker);
    }
}

/// Reapply every marker's colour to its group members
pub fn apply_group_colors(doc: &mut Document) {
    let assignments: Vec<(String, [u8; 3])> = doc
        .nodes()
        .filter(|n| n.kind == NodeKind::ColorMarker)
        .filter_map(|n| {
            let tags = doc.synonym_tags(n.id)?;
            let group = tags.first()?.clone();
            let color = tags.get(1).and_then(|hex| parse_hex(hex))?;
            Some((group, color))
        })
        .collect();
    for (group, color) in assignments {
        let members: Vec<NodeId> = doc
            .nodes()
            .filter(|n| n.kind != NodeKind::ColorMarker && n.group.as_deref() == Some(&group))
            .map(|n| n.id)
            .collect();
        for member in members {
            if let Some(node) = doc.node_mut(member) {
                node.color = Some(color);
            }
        }
    }
}

fn find_marker(doc: &Document, group: &str) -> Option<NodeId> {
    doc.nodes()
        .filter(|n| n.kind == NodeKind::ColorMarker)
        .find(|n| {
            doc.synonym_tags(n.id)
                .and_then(|tags| tags.first())
                .is_some_and(|tag| tag == group)
        })
        .map(|n| n.id)
}

fn format_hex(color: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

fn parse_hex(text: &str) -> Option<[u8; 3]> {
    let hex = text.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadewire_host::Node;

    #[test]
    fn test_hex_round_trip() {
        let color = [0x3C, 0xB3, 0x71];
        assert_eq!(parse_hex(&format_hex(color)), Some(color));
        assert_eq!(parse_hex("#nothex"), None);
        assert_eq!(parse_hex("3CB371"), None);
    }

    #[test]
    fn test_set_and_apply_group_color() {
        let mut doc = Document::new("test");
        let mut member = Node::new(NodeKind::Plain, "Multiply");
        member.group = Some("Lighting".to_string());
        let member = doc.add_node(member);
        let outsider = doc.add_node(Node::new(NodeKind::Plain, "Add"));

        let marker = set_group_color(&mut doc, "Lighting", [10, 20, 30]).unwrap();
        apply_group_colors(&mut doc);

        assert_eq!(doc.node(member).unwrap().color, Some([10, 20, 30]));
        assert_eq!(doc.node(outsider).unwrap().color, None);
        assert_eq!(group_color(&doc, "Lighting"), Some([10, 20, 30]));

        // reassigning reuses the same marker
        assert_eq!(set_group_color(&mut doc, "Lighting", [1, 2, 3]), Some(marker));
        assert_eq!(group_color(&doc, "Lighting"), Some([1, 2, 3]));
    }

    #[test]
    fn test_clear_group_color_removes_marker() {
        let mut doc = Document::new("test");
        set_group_color(&mut doc, "FX", [255, 0, 0]).unwrap();
        clear_group_color(&mut doc, "FX");
        assert_eq!(group_color(&doc, "FX"), None);
        assert_eq!(doc.node_count(), 0);
    }

    #[test]
    fn test_missing_channel_is_a_no_op() {
        let mut doc = Document::new("test");
        doc.set_synonym_channel(false);
        assert_eq!(set_group_color(&mut doc, "FX", [1, 2, 3]), None);
        assert_eq!(doc.node_count(), 0);
    }
}

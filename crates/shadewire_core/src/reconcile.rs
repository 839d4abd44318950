// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-driven reconciler.
//!
//! Runs once per scheduler tick while the editor is idle. Each pass
//! drains the pending port-event queue first, then walks every node:
//! first-time setup for nodes never seen this session, light
//! maintenance for the rest. A focus change resets the session and
//! schedules a reload pass that re-registers Set nodes from their
//! persisted names.

use crate::groups;
use crate::link;
use crate::nodes::PLUMBING_PORTS;
use crate::registration;
use crate::session::Session;
use shadewire_host::{
    Document, EdgeId, NodeField, NodeId, NodeKind, PortDirection, PortRef,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Reconciler tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Idle interval after startup before the first pass runs; the
    /// host's own state is not ready immediately
    pub warmup: Duration,
    /// Whether passes reapply group colours from marker nodes
    pub apply_group_colors: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            warmup: Duration::from_millis(1200),
            apply_group_colors: true,
        }
    }
}

impl ReconcilerConfig {
    /// Config without a warm-up delay
    pub fn immediate() -> Self {
        Self {
            warmup: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Per-frame reconciliation driver
#[derive(Debug)]
pub struct Reconciler {
    config: ReconcilerConfig,
    started: Instant,
}

impl Reconciler {
    /// Create a reconciler; the warm-up window starts now
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
        }
    }

    /// Run one reconciliation pass.
    ///
    /// Does nothing during warm-up or without a focused document. Port
    /// events are handled strictly before any per-node maintenance.
    pub fn tick(&mut self, session: &mut Session, doc: Option<&mut Document>) {
        if self.started.elapsed() < self.config.warmup {
            return;
        }
        let Some(doc) = doc else {
            return;
        };
        if session.focus(doc.id) {
            debug!(document = %doc.name, "focused document changed; session reset");
        }

        for event in session.pending.take() {
            if doc.node(event.node).is_none() {
                // stale entry, dropped silently
                continue;
            }
            registration::upstream_changed(session, doc, event.node, event.port);
        }

        if !doc.has_synonym_channel() {
            warn!("synonym-tag channel unavailable; variable names will not persist");
        }

        let ids: Vec<NodeId> = doc.node_ids().collect();
        for id in ids {
            let Some(node) = doc.node(id) else {
                continue;
            };
            let kind = node.kind;
            // a host restore can strip the attached field; treat that
            // as a fresh node
            let fresh = node.field.is_none();
            match kind {
                NodeKind::Set => {
                    if session.mark_seen(id) || fresh {
                        setup_set(session, doc, id);
                    } else {
                        maintain_set(session, doc, id);
                    }
                }
                NodeKind::Get => {
                    if session.mark_seen(id) || fresh {
                        setup_get(session, doc, id);
                    } else {
                        maintain_get(session, doc, id);
                    }
                }
                NodeKind::ColorMarker | NodeKind::Plain => {}
            }
        }

        if self.config.apply_group_colors {
            groups::apply_group_colors(doc);
        }
        session.finish_pass();
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcilerConfig::default())
    }
}

fn setup_set(session: &mut Session, doc: &mut Document, id: NodeId) {
    let name = registration::persisted_name(doc, id).unwrap_or_default();
    if let Some(node) = doc.node_mut(id) {
        if node.field.is_none() {
            node.field = Some(NodeField::seeded(name.clone()));
        }
    }
    // infer the shape from whatever is already wired upstream
    if let Some(active) = doc
        .node(id)
        .and_then(|n| n.visible_port_index(PortDirection::Input))
        .and_then(|i| doc.node(id).and_then(|n| n.input(i)).map(|p| p.id))
    {
        registration::upstream_changed(session, doc, id, active);
    }
    if !name.trim().is_empty() {
        registration::rename(session, doc, id, "", &name);
    }
}

fn maintain_set(session: &mut Session, doc: &mut Document, id: NodeId) {
    hide_plumbing_edges(doc, id);
    link::ensure_single_active(doc, id, PortDirection::Input);
    if session.reload_pending() {
        let name = registration::persisted_name(doc, id).unwrap_or_default();
        if !name.trim().is_empty() {
            registration::rename(session, doc, id, "", &name);
        }
    }
}

fn setup_get(session: &mut Session, doc: &mut Document, id: NodeId) {
    let name = registration::persisted_name(doc, id).unwrap_or_default();
    if let Some(node) = doc.node_mut(id) {
        if node.field.is_none() {
            node.field = Some(NodeField::seeded(name));
        }
        if let Some(field) = node.field.as_mut() {
            field.suggestions = session.symbols.suggestions().to_vec();
        }
    }
    // adopt the source's shape when the document loaded with the
    // binding already wired
    let source = doc
        .node(id)
        .and_then(|n| n.input(0))
        .map(|p| p.slot)
        .and_then(|slot| {
            doc.link_source(shadewire_host::SlotRef { node: id, slot })
        })
        .map(|s| s.node)
        .filter(|set| doc.node(*set).map(|n| n.kind) == Some(NodeKind::Set));
    if let Some(set) = source {
        let shape = crate::classify::classify_node(doc, set);
        registration::get_shape_changed(doc, id, shape);
    } else {
        link::ensure_single_active(doc, id, PortDirection::Output);
    }
}

fn maintain_get(session: &mut Session, doc: &mut Document, id: NodeId) {
    if let Some(field) = doc.node_mut(id).and_then(|n| n.field.as_mut()) {
        field.suggestions = session.symbols.suggestions().to_vec();
    }
    link::ensure_single_active(doc, id, PortDirection::Output);
}

/// Plumbing wires between Set and Get nodes never draw
fn hide_plumbing_edges(doc: &mut Document, set: NodeId) {
    for index in 0..PLUMBING_PORTS {
        let Some(port) = doc
            .node(set)
            .and_then(|n| n.output(index))
            .map(|p| PortRef::new(set, p.id))
        else {
            continue;
        };
        let ids: Vec<EdgeId> = doc.edges_from(port).map(|e| e.id).collect();
        for id in ids {
            if let Some(edge) = doc.edge_mut(id) {
                edge.visible = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_node;
    use crate::nodes;
    use crate::registration::persisted_name;
    use shadewire_host::Shape;

    fn immediate() -> Reconciler {
        Reconciler::new(ReconcilerConfig::immediate())
    }

    fn named_set(doc: &mut Document, name: &str) -> NodeId {
        let id = doc.add_node(nodes::set_node());
        doc.synonym_tags_mut(id).unwrap().push(name.to_string());
        id
    }

    fn named_get(doc: &mut Document, name: &str) -> NodeId {
        let id = doc.add_node(nodes::get_node());
        doc.synonym_tags_mut(id).unwrap().push(name.to_string());
        id
    }

    #[test]
    fn test_warmup_defers_work() {
        let mut reconciler = Reconciler::new(ReconcilerConfig {
            warmup: Duration::from_secs(3600),
            ..ReconcilerConfig::default()
        });
        let mut session = Session::new();
        let mut doc = Document::new("test");
        named_set(&mut doc, "X");
        reconciler.tick(&mut session, Some(&mut doc));
        assert!(session.symbols.is_empty());
        assert!(session.document().is_none());
    }

    #[test]
    fn test_first_pass_registers_persisted_names() {
        let mut reconciler = immediate();
        let mut session = Session::new();
        let mut doc = Document::new("test");
        let set = named_set(&mut doc, "Glow");
        let get = named_get(&mut doc, "glow");

        reconciler.tick(&mut session, Some(&mut doc));

        assert_eq!(session.symbols.lookup("GLOW"), Some(set));
        assert_eq!(doc.node(set).unwrap().field.as_ref().unwrap().text, "Glow");
        // the Get picked up the binding through Set registration
        assert_eq!(crate::registration::linked_gets(&doc, set), [get]);
        assert_eq!(
            doc.node(get).unwrap().field.as_ref().unwrap().suggestions,
            ["Glow".to_string()]
        );
    }

    #[test]
    fn test_document_switch_clears_table() {
        let mut reconciler = immediate();
        let mut session = Session::new();
        let mut first = Document::new("first");
        named_set(&mut first, "X");
        reconciler.tick(&mut session, Some(&mut first));
        assert_eq!(session.symbols.len(), 1);

        let mut second = Document::new("second");
        reconciler.tick(&mut session, Some(&mut second));
        assert!(session.symbols.is_empty());
        assert_eq!(session.document(), Some(second.id));
    }

    #[test]
    fn test_no_focused_document_is_a_no_op() {
        let mut reconciler = immediate();
        let mut session = Session::new();
        reconciler.tick(&mut session, None);
        assert!(session.document().is_none());
    }

    #[test]
    fn test_pending_events_drain_before_node_work() {
        let mut reconciler = immediate();
        let mut session = Session::new();
        let mut doc = Document::new("test");
        let set = named_set(&mut doc, "N");
        let get = named_get(&mut doc, "N");
        reconciler.tick(&mut session, Some(&mut doc));

        // wire a Vec2 source into the Set's active input, then notify
        let mut source = shadewire_host::Node::new(NodeKind::Plain, "UV");
        let out = source.add_output(
            "Out",
            shadewire_host::SlotDescriptor::Fixed(Shape::Vec2),
        );
        let src = doc.add_node(source);
        let active_index = doc
            .node(set)
            .unwrap()
            .visible_port_index(PortDirection::Input)
            .unwrap();
        let active = PortRef::new(set, doc.node(set).unwrap().inputs[active_index].id);
        crate::link::connect(&mut doc, PortRef::new(src, out), active, false).unwrap();
        session.notify_port_event(active);

        reconciler.tick(&mut session, Some(&mut doc));
        assert!(session.pending.is_empty());
        assert_eq!(classify_node(&doc, set), Shape::Vec2);
        assert_eq!(classify_node(&doc, get), Shape::Vec2);
    }

    #[test]
    fn test_stale_pending_event_skipped() {
        let mut reconciler = immediate();
        let mut session = Session::new();
        let mut doc = Document::new("test");
        let set = named_set(&mut doc, "X");
        reconciler.tick(&mut session, Some(&mut doc));

        let port = PortRef::new(set, doc.node(set).unwrap().inputs[0].id);
        session.notify_port_event(port);
        doc.remove_node(set);
        reconciler.tick(&mut session, Some(&mut doc));
        assert!(session.pending.is_empty());
    }

    #[test]
    fn test_undo_redo_reregisters_from_persisted_names() {
        let mut reconciler = immediate();
        let mut session = Session::new();
        let mut doc = Document::new("test");
        let set = named_set(&mut doc, "Fade");
        reconciler.tick(&mut session, Some(&mut doc));
        assert_eq!(session.symbols.len(), 1);

        session.on_undo_redo();
        assert!(session.symbols.is_empty());
        reconciler.tick(&mut session, Some(&mut doc));
        assert_eq!(session.symbols.lookup("fade"), Some(set));
        assert!(!session.reload_pending());
    }

    #[test]
    fn test_plumbing_edges_stay_hidden() {
        let mut reconciler = immediate();
        let mut session = Session::new();
        let mut doc = Document::new("test");
        let set = named_set(&mut doc, "V");
        named_get(&mut doc, "V");
        reconciler.tick(&mut session, Some(&mut doc));

        // someone forces the wire visible; maintenance re-hides it
        for edge in doc
            .edges()
            .map(|e| e.id)
            .collect::<Vec<_>>()
        {
            doc.edge_mut(edge).unwrap().visible = true;
        }
        reconciler.tick(&mut session, Some(&mut doc));
        assert!(doc.edges().all(|e| !e.visible));
        let _ = set;
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-document session state.
//!
//! Everything the engine remembers between ticks lives here, scoped to
//! the lifetime of "a document is focused": the symbol table, the shape
//! caches, the pending port-event queue and the first-seen set. A focus
//! change or an undo/redo notification resets the lot, which is also
//! what makes stale node references impossible to observe across
//! documents.

use crate::classify::{PortBindings, ShapeCache};
use crate::events::PendingPortEvents;
use crate::symbols::SymbolTable;
use shadewire_host::{DocumentId, NodeId, PortRef};
use std::collections::HashSet;
use tracing::debug;

/// State owned by the engine for the currently focused document
#[derive(Debug, Default)]
pub struct Session {
    /// Variable-name registry
    pub symbols: SymbolTable,
    /// Per-port classification cache
    pub shapes: ShapeCache,
    /// Upstream-derived shape records
    pub bindings: PortBindings,
    /// Ports with unprocessed connection changes
    pub pending: PendingPortEvents,
    document: Option<DocumentId>,
    seen: HashSet<NodeId>,
    reload: bool,
}

impl Session {
    /// Create a session with no focused document
    pub fn new() -> Self {
        Self::default()
    }

    /// The focused document, if any
    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    /// Whether the next pass must re-register nodes from persisted names
    pub fn reload_pending(&self) -> bool {
        self.reload
    }

    /// Point the session at a document.
    ///
    /// Returns whether focus moved; moving resets every piece of state
    /// and schedules a reload pass.
    pub fn focus(&mut self, id: DocumentId) -> bool {
        if self.document == Some(id) {
            return false;
        }
        self.reset();
        self.document = Some(id);
        self.reload = true;
        true
    }

    /// React to the host's undo/redo notification: caches are no longer
    /// trustworthy and bindings must be rebuilt from persisted names.
    ///
    /// The first-seen set survives; nodes the undo recreated come back
    /// under new IDs and go through first-time setup naturally.
    pub fn on_undo_redo(&mut self) {
        debug!("undo/redo; dropping caches and re-registering");
        self.symbols.clear();
        self.shapes.invalidate();
        self.bindings.clear();
        self.pending.clear();
        self.reload = true;
    }

    /// Record a port connection change for the next tick
    pub fn notify_port_event(&mut self, port: PortRef) {
        self.pending.record(port);
    }

    /// First encounter of a node this session?
    pub(crate) fn mark_seen(&mut self, node: NodeId) -> bool {
        self.seen.insert(node)
    }

    /// End-of-pass bookkeeping
    pub(crate) fn finish_pass(&mut self) {
        self.reload = false;
    }

    fn reset(&mut self) {
        self.symbols.clear();
        self.shapes.invalidate();
        self.bindings.clear();
        self.pending.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadewire_host::PortId;

    #[test]
    fn test_focus_change_resets_state() {
        let mut session = Session::new();
        let first = DocumentId::new();
        assert!(session.focus(first));
        session
            .symbols
            .insert("X", NodeId::new(), |_| true)
            .unwrap();
        session
            .pending
            .record(PortRef::new(NodeId::new(), PortId::new()));

        assert!(!session.focus(first));
        assert_eq!(session.symbols.len(), 1);

        assert!(session.focus(DocumentId::new()));
        assert!(session.symbols.is_empty());
        assert!(session.pending.is_empty());
        assert!(session.reload_pending());
    }

    #[test]
    fn test_undo_redo_keeps_focus_but_drops_caches() {
        let mut session = Session::new();
        let doc = DocumentId::new();
        session.focus(doc);
        session.finish_pass();
        session
            .symbols
            .insert("X", NodeId::new(), |_| true)
            .unwrap();
        session.on_undo_redo();
        assert_eq!(session.document(), Some(doc));
        assert!(session.symbols.is_empty());
        assert!(session.reload_pending());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Symbol table mapping variable names to their owning Set node.
//!
//! Names are case-insensitive: lookups go through the key form (trimmed,
//! uppercased) while the display list keeps the user's casing in
//! registration order for the suggestion dropdown. The table stores bare
//! node IDs and does not own node lifetime; callers supply a liveness
//! check so a binding left behind by a deleted node can be reclaimed.

use indexmap::IndexMap;
use shadewire_host::NodeId;

/// Error raised by symbol-table mutation
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    /// The name is already bound to a different live Set node
    #[error("variable name \"{name}\" is already in use")]
    DuplicateKey {
        /// Display form of the rejected name
        name: String,
    },
}

/// Lookup form of a variable name: trimmed and uppercased
pub fn key_form(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Display form of a variable name: trimmed, casing preserved
pub fn display_form(name: &str) -> String {
    name.trim().to_string()
}

/// Per-document variable-name registry
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Key form to owning Set node
    bindings: IndexMap<String, NodeId>,
    /// Display forms in registration order
    display: Vec<String>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The Set node owning a name, if bound
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.bindings.get(&key_form(name)).copied()
    }

    /// Bind a name to a node.
    ///
    /// Fails with [`SymbolError::DuplicateKey`] when the key form is
    /// already held by a different node that `is_alive` confirms still
    /// exists; a dead owner is silently overwritten. Re-inserting under
    /// the same node updates the display form only.
    pub fn insert(
        &mut self,
        name: &str,
        node: NodeId,
        is_alive: impl Fn(NodeId) -> bool,
    ) -> Result<(), SymbolError> {
        let key = key_form(name);
        if let Some(&owner) = self.bindings.get(&key) {
            if owner != node && is_alive(owner) {
                return Err(SymbolError::DuplicateKey {
                    name: display_form(name),
                });
            }
            self.display.retain(|d| key_form(d) != key);
        }
        self.bindings.insert(key, node);
        self.display.push(display_form(name));
        Ok(())
    }

    /// Remove a binding, but only when `owner` still holds it.
    ///
    /// Returns whether a binding was removed. The owner guard keeps a
    /// stale rename from deleting a different node's live binding.
    pub fn remove(&mut self, name: &str, owner: NodeId) -> bool {
        let key = key_form(name);
        if self.bindings.get(&key) != Some(&owner) {
            return false;
        }
        self.bindings.shift_remove(&key);
        self.display.retain(|d| key_form(d) != key);
        true
    }

    /// Drop every binding (document switch or undo/redo)
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.display.clear();
    }

    /// Display-form names in registration order, for the dropdown
    pub fn suggestions(&self) -> &[String] {
        &self.display
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! ShadeWire variable-binding engine.
//!
//! Augments a node-based shader editor with two synthetic node kinds:
//! Set publishes a value under a user-chosen name, Get consumes it by
//! name, and the value travels through hidden plumbing wires instead of
//! a drawn connection.
//!
//! ## Architecture
//!
//! - [`symbols`] - per-document table from variable name to owning Set node
//! - [`classify`] - port/node shape classification with session caches
//! - [`link`] - edge synchronizer keeping the visual layer and the
//!   host's slot data model in step
//! - [`registration`] - the rename/retype state machine
//! - [`reconcile`] - the per-frame pass driving everything
//! - [`events`] - deferred port-connection notifications
//! - [`session`] - state scoped to the focused document
//! - [`groups`], [`commands`] - group colours, hotkey utilities

pub mod classify;
pub mod commands;
pub mod events;
pub mod groups;
pub mod link;
pub mod nodes;
pub mod reconcile;
pub mod registration;
pub mod session;
pub mod symbols;

pub use classify::{classify_node, PortBindings, ShapeCache};
pub use events::PendingPortEvents;
pub use reconcile::{Reconciler, ReconcilerConfig};
pub use session::Session;
pub use symbols::{SymbolError, SymbolTable};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pending port-event queue.
//!
//! Connect/disconnect notifications arrive on the host's call stack while
//! it is iterating its own edge collection, so the graph must not be
//! mutated from inside the callback. The notification is only recorded
//! here; the reconciler drains the queue at the start of the next tick,
//! in FIFO order, before any other per-node work.

use shadewire_host::PortRef;
use std::collections::VecDeque;

/// FIFO of ports whose connections changed since the last tick
#[derive(Debug, Default)]
pub struct PendingPortEvents {
    queue: VecDeque<PortRef>,
}

impl PendingPortEvents {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection change at a port (producer side)
    pub fn record(&mut self, port: PortRef) {
        self.queue.push_back(port);
    }

    /// Take every recorded event, leaving the queue empty
    pub fn take(&mut self) -> VecDeque<PortRef> {
        std::mem::take(&mut self.queue)
    }

    /// Drop all recorded events (document switch / undo barrier)
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no events are recorded
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

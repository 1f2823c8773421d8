/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Runtime counters for the node.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Statistics for a node's connections and dispatch activity.
///
/// Both inbound (accepted) and outbound (dialed) links count as connections.
#[derive(Debug, Default)]
pub struct NodeStats {
    /// Total connections opened, inbound and outbound.
    pub connections_accepted: AtomicUsize,
    /// Currently active connections.
    pub connections_active: AtomicUsize,
    /// Total envelopes decoded off the wire.
    pub envelopes_received: AtomicUsize,
    /// Total envelopes routed to a handler, waiter, or topic.
    pub envelopes_dispatched: AtomicUsize,
    /// Total errors encountered (rejections, transport failures).
    pub errors: AtomicUsize,
}

impl NodeStats {
    /// Creates zeroed statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connections opened.
    #[must_use]
    pub fn connections_accepted(&self) -> usize {
        self.connections_accepted.load(Ordering::Relaxed)
    }

    /// Number of active connections.
    #[must_use]
    pub fn connections_active(&self) -> usize {
        self.connections_active.load(Ordering::Relaxed)
    }

    /// Number of envelopes decoded off the wire.
    #[must_use]
    pub fn envelopes_received(&self) -> usize {
        self.envelopes_received.load(Ordering::Relaxed)
    }

    /// Number of envelopes routed to an effect.
    #[must_use]
    pub fn envelopes_dispatched(&self) -> usize {
        self.envelopes_dispatched.load(Ordering::Relaxed)
    }

    /// Number of errors.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let stats = NodeStats::new();
        assert_eq!(stats.connections_accepted(), 0);
        assert_eq!(stats.connections_active(), 0);
        assert_eq!(stats.envelopes_received(), 0);
        assert_eq!(stats.envelopes_dispatched(), 0);
        assert_eq!(stats.errors(), 0);
    }

    #[test]
    fn counters_increment() {
        let stats = NodeStats::new();
        stats.connections_accepted.fetch_add(1, Ordering::Relaxed);
        stats.envelopes_received.fetch_add(5, Ordering::Relaxed);

        assert_eq!(stats.connections_accepted(), 1);
        assert_eq!(stats.envelopes_received(), 5);
    }
}

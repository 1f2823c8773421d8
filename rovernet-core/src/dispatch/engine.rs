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

//! The dispatch engine: turns one decoded inbound envelope into an effect.
//!
//! Each envelope moves through `received → classified → {invoked |
//! correlated | rejected}`:
//!
//! - `action` → the named action handler is spawned on its own task; absent
//!   handlers are logged and dropped (actions have no response channel).
//! - `service-request` → the named service handler is spawned on its own
//!   task; its result (or an error tag) is emitted as a `service-response`
//!   with the request's correlation ID through the per-connection reply sink.
//! - `service-response` → the pending request table resolves the waiter for
//!   the correlation ID exactly once; unknown or already-resolved IDs are
//!   discarded as stale.
//! - `topic` → the payload is published to local subscribers.
//!
//! No lock is held across handler execution: a slow handler delays only its
//! own response, never the dispatch of other inbound messages. Handler
//! panics are contained per-invocation via the spawned task's join handle.

use tokio::sync::mpsc;
use tracing::{debug, error, instrument, trace, warn};

use crate::common::NodeHandle;
use crate::message::{Envelope, EnvelopeKind, NodeError};

use super::pending::PendingRequests;
use super::registry::{ActionHandler, HandlerRegistry, ServiceHandler};
use super::stats::NodeStats;
use super::topics::TopicRegistry;

/// The state shared by all of a node's connections: handler registry,
/// pending request table, topic registry, and counters.
///
/// One engine exists per node, created at [`Node::create`](crate::common::Node::create)
/// and referenced (never copied) for the node's lifetime.
#[derive(Debug, Default)]
pub struct DispatchEngine {
    pub(crate) registry: HandlerRegistry,
    pub(crate) pending: PendingRequests,
    pub(crate) topics: TopicRegistry,
    pub(crate) stats: NodeStats,
}

impl DispatchEngine {
    /// Creates an engine with empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes one decoded inbound envelope.
    ///
    /// Awaits only the enqueueing of immediate error replies; handler
    /// execution always happens on freshly spawned tasks, so calling this in
    /// a connection's read loop preserves per-connection dispatch order
    /// without head-of-line blocking on handler latency.
    #[instrument(level = "trace", skip_all, fields(kind = %envelope.kind, name = %envelope.name, id = envelope.id))]
    pub(crate) async fn dispatch(
        &self,
        envelope: Envelope,
        node: NodeHandle,
        reply: &mpsc::Sender<Envelope>,
    ) {
        use std::sync::atomic::Ordering;

        match envelope.kind {
            EnvelopeKind::Action => match self.registry.lookup_action(&envelope.name) {
                Some(handler) => {
                    self.stats.envelopes_dispatched.fetch_add(1, Ordering::Relaxed);
                    spawn_action(envelope.name, handler, envelope.payload, node);
                }
                None => {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        error = %NodeError::UnknownAction(envelope.name),
                        "rejecting action"
                    );
                }
            },
            EnvelopeKind::ServiceRequest => {
                match self.registry.lookup_service(&envelope.name) {
                    Some(handler) => {
                        self.stats.envelopes_dispatched.fetch_add(1, Ordering::Relaxed);
                        spawn_service(
                            envelope.name,
                            envelope.id,
                            handler,
                            envelope.payload,
                            node,
                            reply.clone(),
                        );
                    }
                    None => {
                        self.stats.errors.fetch_add(1, Ordering::Relaxed);
                        let err = NodeError::UnknownService(envelope.name.clone());
                        warn!(error = %err, "rejecting service request");
                        let response =
                            Envelope::error_response(envelope.name, envelope.id, &err.to_string());
                        if reply.send(response).await.is_err() {
                            debug!("connection closed before rejection could be sent");
                        }
                    }
                }
            }
            EnvelopeKind::ServiceResponse => {
                let outcome = if envelope.is_error() {
                    Err(NodeError::Remote(
                        String::from_utf8_lossy(&envelope.payload).into_owned(),
                    ))
                } else {
                    Ok(envelope.payload)
                };
                match self.pending.resolve(envelope.id, outcome) {
                    Ok(()) => {
                        self.stats.envelopes_dispatched.fetch_add(1, Ordering::Relaxed);
                    }
                    // Expected under duplicate or late delivery; not an error.
                    Err(err) => trace!(%err, "discarding stale response"),
                }
            }
            EnvelopeKind::Topic => {
                if self.topics.publish(&envelope.name, envelope.payload) {
                    self.stats.envelopes_dispatched.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.stats.errors.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        error = %NodeError::UnknownTopic(envelope.name),
                        "dropping topic publish"
                    );
                }
            }
        }
    }
}

/// Spawns an action handler on its own task, containing panics.
///
/// The caller of the remote action receives no acknowledgment; a panicking
/// handler body is logged and dropped.
pub(crate) fn spawn_action(
    name: String,
    handler: ActionHandler,
    payload: Vec<u8>,
    node: NodeHandle,
) {
    let work = tokio::spawn(handler(payload, node));
    tokio::spawn(async move {
        if let Err(join_err) = work.await {
            if join_err.is_panic() {
                error!(action = %name, "action handler panicked");
            }
        }
    });
}

/// Spawns a service handler on its own task and emits the correlated
/// response when it completes.
fn spawn_service(
    name: String,
    id: u32,
    handler: ServiceHandler,
    payload: Vec<u8>,
    node: NodeHandle,
    reply: mpsc::Sender<Envelope>,
) {
    let work = tokio::spawn(handler(payload, node));
    tokio::spawn(async move {
        let response = match work.await {
            Ok(result) => Envelope::service_response(&name, id, result),
            Err(join_err) => {
                let err = NodeError::HandlerPanic(name.clone());
                if join_err.is_panic() {
                    error!(service = %name, "service handler panicked");
                } else {
                    error!(service = %name, "service handler was cancelled");
                }
                Envelope::error_response(&name, id, &err.to_string())
            }
        };
        if reply.send(response).await.is_err() {
            debug!(service = %name, "connection closed before response delivery");
        }
    });
}

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

//! The capability handle passed into handler code.

use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use static_assertions::assert_impl_all;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::dispatch::{spawn_action, DispatchEngine, NodeStats, PendingRequests};
use crate::message::NodeError;
use crate::traits::Remote;
use crate::wire::Peer;

use super::config::NodeConfig;

/// State shared by a node and every handle to it; created once per node and
/// only ever referenced.
pub(crate) struct NodeInner {
    pub(crate) id: u64,
    pub(crate) config: NodeConfig,
    pub(crate) engine: DispatchEngine,
    pub(crate) cancel: CancellationToken,
    pub(crate) initialized: AtomicBool,
    pub(crate) local_addr: OnceLock<SocketAddr>,
}

/// A cheap, cloneable capability handle onto a node.
///
/// Every handler invocation receives one by value, scoped to the subset of
/// node operations handler code needs — issuing further calls, topics, and
/// shutdown — never the raw registries.
#[derive(Clone)]
pub struct NodeHandle {
    pub(crate) inner: Arc<NodeInner>,
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.inner.id)
            .field("listening", &self.inner.local_addr.get().is_some())
            .finish()
    }
}

impl NodeHandle {
    /// This node's numeric identity.
    #[must_use]
    pub fn node_id(&self) -> u64 {
        self.inner.id
    }

    /// The listener address, once the node is initialized.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.local_addr.get().copied()
    }

    /// The node's configuration.
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.inner.config
    }

    /// Runtime counters for this node.
    #[must_use]
    pub fn stats(&self) -> &NodeStats {
        &self.inner.engine.stats
    }

    /// Number of service calls currently awaiting a response.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.inner.engine.pending.len()
    }

    pub(crate) fn engine(&self) -> &DispatchEngine {
        &self.inner.engine
    }

    pub(crate) fn pending(&self) -> &PendingRequests {
        &self.inner.engine.pending
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Dials a remote node and wires the link into this node's dispatch
    /// engine.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Io`] if the connection cannot be established.
    pub async fn connect(&self, addr: SocketAddr) -> Result<Peer, NodeError> {
        Peer::connect(self.clone(), addr).await
    }

    /// Publishes `payload` to local subscribers of a registered topic.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnknownTopic`] if `name` is not registered.
    pub fn publish(&self, name: &str, payload: Vec<u8>) -> Result<(), NodeError> {
        if self.inner.engine.topics.publish(name, payload) {
            Ok(())
        } else {
            Err(NodeError::UnknownTopic(name.to_string()))
        }
    }

    /// Subscribes to a registered topic.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::UnknownTopic`] if `name` is not registered.
    pub fn subscribe(&self, name: &str) -> Result<broadcast::Receiver<Vec<u8>>, NodeError> {
        self.inner
            .engine
            .topics
            .subscribe(name)
            .ok_or_else(|| NodeError::UnknownTopic(name.to_string()))
    }

    /// Releases every context waiting in [`Node::halt`](super::Node::halt)
    /// and stops the listener and all connection tasks.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}

#[async_trait]
impl Remote for NodeHandle {
    /// Dispatches to an action registered on this node.
    async fn send_action(&self, name: &str, payload: Vec<u8>) -> Result<(), NodeError> {
        let handler = self
            .inner
            .engine
            .registry
            .lookup_action(name)
            .ok_or_else(|| NodeError::UnknownAction(name.to_string()))?;
        spawn_action(name.to_string(), handler, payload, self.clone());
        Ok(())
    }

    /// Calls a service registered on this node and awaits its result.
    async fn call_service(&self, name: &str, payload: Vec<u8>) -> Result<Vec<u8>, NodeError> {
        let handler = self
            .inner
            .engine
            .registry
            .lookup_service(name)
            .ok_or_else(|| NodeError::UnknownService(name.to_string()))?;

        // Spawned so a panicking handler is contained, same as on the wire path.
        match tokio::spawn(handler(payload, self.clone())).await {
            Ok(result) => Ok(result),
            Err(join_err) if join_err.is_panic() => {
                Err(NodeError::HandlerPanic(name.to_string()))
            }
            Err(_) => Err(NodeError::Io("service task was cancelled".to_string())),
        }
    }
}

assert_impl_all!(NodeHandle: Send, Sync, Clone);

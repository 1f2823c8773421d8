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

//! The node: registries, identity, and lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::dispatch::DispatchEngine;
use crate::message::NodeError;
use crate::wire::{accept_loop, Peer};

use super::config::NodeConfig;
use super::node_handle::{NodeHandle, NodeInner};

/// A process-level participant in the mesh.
///
/// Lifecycle: `create` (no I/O) → `init` (bind and start dispatching, at
/// most once) → `halt` (wait for the shutdown signal). Registries live for
/// the node's lifetime; handlers are registered before or around `init` and
/// read concurrently thereafter.
///
/// A node that never calls [`init`](Self::init) is a pure client: it can
/// still [`connect`](Self::connect) out and issue calls, it just accepts no
/// inbound connections.
///
/// # Example
///
/// ```rust,ignore
/// let node = Node::create(47);
/// node.register_service("echo", |payload, _| async move { payload })?;
/// node.init().await?;
/// node.halt().await;
/// ```
pub struct Node {
    handle: NodeHandle,
}

impl Node {
    /// Creates a node with the configuration discovered on disk (or
    /// defaults). Allocates registries and identity; performs no I/O.
    #[must_use]
    pub fn create(id: u64) -> Self {
        Self::create_with_config(id, NodeConfig::load())
    }

    /// Creates a node with an explicit configuration. Performs no I/O.
    #[must_use]
    pub fn create_with_config(id: u64, config: NodeConfig) -> Self {
        let handle = NodeHandle {
            inner: Arc::new(NodeInner {
                id,
                config,
                engine: DispatchEngine::new(),
                cancel: CancellationToken::new(),
                initialized: AtomicBool::new(false),
                local_addr: OnceLock::new(),
            }),
        };
        info!(node_id = id, "node created");
        Self { handle }
    }

    /// This node's numeric identity.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.handle.node_id()
    }

    /// Returns a capability handle onto this node.
    #[must_use]
    pub fn handle(&self) -> NodeHandle {
        self.handle.clone()
    }

    /// Registers (or overwrites) an action handler.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidName`] if `name` fails validation.
    pub fn register_action<F, Fut>(&self, name: &str, handler: F) -> Result<(), NodeError>
    where
        F: Fn(Vec<u8>, NodeHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle.engine().registry.register_action(name, handler)
    }

    /// Registers (or overwrites) a service handler.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidName`] if `name` fails validation.
    pub fn register_service<F, Fut>(&self, name: &str, handler: F) -> Result<(), NodeError>
    where
        F: Fn(Vec<u8>, NodeHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<u8>> + Send + 'static,
    {
        self.handle.engine().registry.register_service(name, handler)
    }

    /// Registers a topic.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidName`] if `name` fails validation.
    pub fn register_topic(&self, name: &str) -> Result<(), NodeError> {
        self.handle.engine().topics.register(name)
    }

    /// Binds the listener and starts feeding decoded envelopes into the
    /// dispatch engine.
    ///
    /// # Errors
    ///
    /// * [`NodeError::AlreadyInitialized`] — `init` was already called on
    ///   this node.
    /// * [`NodeError::Io`] — the listener could not bind.
    pub async fn init(&self) -> Result<(), NodeError> {
        let inner = &self.handle.inner;
        if inner
            .initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(NodeError::AlreadyInitialized);
        }

        let addr = inner.config.bind_addr(inner.id);
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(err) => {
                // A failed bind leaves the node re-initializable.
                inner.initialized.store(false, Ordering::SeqCst);
                return Err(NodeError::Io(format!("failed to bind {addr}: {err}")));
            }
        };
        let local_addr = listener.local_addr()?;
        let _ = inner.local_addr.set(local_addr);

        info!(node_id = inner.id, %local_addr, "node listening");
        tokio::spawn(accept_loop(listener, self.handle()));
        Ok(())
    }

    /// The listener address, once [`init`](Self::init) has succeeded.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.handle.local_addr()
    }

    /// Dials a remote node. See [`NodeHandle::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Io`] if the connection cannot be established.
    pub async fn connect(&self, addr: SocketAddr) -> Result<Peer, NodeError> {
        self.handle.connect(addr).await
    }

    /// Keeps the calling context alive until the node is shut down.
    ///
    /// Background dispatch keeps running while this waits; no registries or
    /// in-flight handlers are torn down. The wait resolves when any handle
    /// calls [`NodeHandle::shutdown`], which lets tests (and orderly process
    /// managers) terminate it deterministically.
    pub async fn halt(&self) {
        info!(node_id = self.id(), "node halted, waiting for shutdown signal");
        self.handle.inner.cancel.cancelled().await;
        info!(node_id = self.id(), "shutdown signal received");
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn test_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.network.port = Some(0);
        config
    }

    #[tokio::test]
    async fn init_is_callable_at_most_once() {
        let node = Node::create_with_config(1, test_config());
        node.init().await.unwrap();
        assert!(node.local_addr().is_some());

        assert!(matches!(
            node.init().await,
            Err(NodeError::AlreadyInitialized)
        ));
        node.handle().shutdown();
    }

    #[tokio::test]
    async fn create_performs_no_io() {
        let node = Node::create_with_config(2, test_config());
        assert!(node.local_addr().is_none());
        assert_eq!(node.handle().stats().connections_accepted(), 0);
    }

    #[tokio::test]
    async fn halt_releases_on_shutdown() {
        let node = Node::create_with_config(3, test_config());
        node.init().await.unwrap();

        let handle = node.handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.shutdown();
        });

        tokio::time::timeout(Duration::from_secs(2), node.halt())
            .await
            .expect("halt did not release after shutdown");
    }

    #[tokio::test]
    async fn a_failed_bind_leaves_the_node_re_initializable() {
        let first = Node::create_with_config(4, test_config());
        first.init().await.unwrap();
        let taken = first.local_addr().unwrap();

        let mut config = NodeConfig::default();
        config.network.port = Some(taken.port());
        let second = Node::create_with_config(5, config);
        assert!(matches!(second.init().await, Err(NodeError::Io(_))));

        // The failed bind did not consume the single init: retrying reports
        // the bind failure again, not AlreadyInitialized.
        assert!(matches!(second.init().await, Err(NodeError::Io(_))));

        first.handle().shutdown();
        second.handle().shutdown();
    }
}

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

//! The per-node handler registry.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::common::NodeHandle;
use crate::message::{is_valid_name, NodeError};

/// Type alias for a stored action handler.
///
/// Consumes `(payload, node-handle)` and produces no result; side-effecting
/// only.
pub type ActionHandler =
    Arc<dyn Fn(Vec<u8>, NodeHandle) -> BoxFuture<'static, ()> + Send + Sync>;

/// Type alias for a stored service handler.
///
/// Consumes `(payload, node-handle)` and produces the response payload. The
/// future may suspend (I/O, timers) without blocking other in-flight calls.
pub type ServiceHandler =
    Arc<dyn Fn(Vec<u8>, NodeHandle) -> BoxFuture<'static, Vec<u8>> + Send + Sync>;

/// Registry mapping names to action and service handlers.
///
/// An action name and a service name may coexist independently; within one
/// category, re-registering a name overwrites the prior handler. Names are
/// validated here, once, at registration time — the registry only ever stores
/// previously-validated names.
///
/// # Thread Safety
///
/// Backed by [`DashMap`]: registration is safe to call concurrently with
/// lookups performed by the dispatch engine, and readers never observe a
/// half-written entry.
#[derive(Default)]
pub struct HandlerRegistry {
    actions: DashMap<String, ActionHandler>,
    services: DashMap<String, ServiceHandler>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("actions", &self.actions.len())
            .field("services", &self.services.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overwrites) an action handler under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidName`] if `name` fails validation.
    pub fn register_action<F, Fut>(&self, name: &str, handler: F) -> Result<(), NodeError>
    where
        F: Fn(Vec<u8>, NodeHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if !is_valid_name(name) {
            return Err(NodeError::InvalidName(name.to_string()));
        }
        let handler: ActionHandler =
            Arc::new(move |payload, node| handler(payload, node).boxed());
        self.actions.insert(name.to_string(), handler);
        Ok(())
    }

    /// Registers (or overwrites) a service handler under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidName`] if `name` fails validation.
    pub fn register_service<F, Fut>(&self, name: &str, handler: F) -> Result<(), NodeError>
    where
        F: Fn(Vec<u8>, NodeHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Vec<u8>> + Send + 'static,
    {
        if !is_valid_name(name) {
            return Err(NodeError::InvalidName(name.to_string()));
        }
        let handler: ServiceHandler =
            Arc::new(move |payload, node| handler(payload, node).boxed());
        self.services.insert(name.to_string(), handler);
        Ok(())
    }

    /// Looks up an action handler. Pure read, no side effects.
    #[must_use]
    pub fn lookup_action(&self, name: &str) -> Option<ActionHandler> {
        self.actions.get(name).map(|entry| entry.value().clone())
    }

    /// Looks up a service handler. Pure read, no side effects.
    #[must_use]
    pub fn lookup_service(&self, name: &str) -> Option<ServiceHandler> {
        self.services.get(name).map(|entry| entry.value().clone())
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::common::Node;

    #[test]
    fn rejects_invalid_names() {
        let registry = HandlerRegistry::new();
        let result = registry.register_action("test_action", |_, _| async {});
        assert!(matches!(result, Err(NodeError::InvalidName(_))));
        assert_eq!(registry.action_count(), 0);

        let result = registry.register_service("bad!name", |_, _| async { vec![] });
        assert!(matches!(result, Err(NodeError::InvalidName(_))));
    }

    #[test]
    fn action_and_service_names_coexist() {
        let registry = HandlerRegistry::new();
        registry.register_action("status", |_, _| async {}).unwrap();
        registry
            .register_service("status", |payload, _| async move { payload })
            .unwrap();

        assert!(registry.lookup_action("status").is_some());
        assert!(registry.lookup_service("status").is_some());
        assert!(registry.lookup_action("missing").is_none());
    }

    #[tokio::test]
    async fn re_registration_overwrites() {
        let node = Node::create(1);
        let registry = HandlerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        registry.register_service("echo", |_, _| async { b"old".to_vec() }).unwrap();
        let hits_clone = hits.clone();
        registry
            .register_service("echo", move |_, _| {
                let hits = hits_clone.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    b"new".to_vec()
                }
            })
            .unwrap();
        assert_eq!(registry.service_count(), 1);

        let handler = registry.lookup_service("echo").unwrap();
        let result = handler(vec![], node.handle()).await;
        assert_eq!(result, b"new".to_vec());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

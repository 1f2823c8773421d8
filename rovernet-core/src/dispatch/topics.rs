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

//! Name-keyed topic registry for local pub/sub.
//!
//! Topics are deliberately minimal: an inbound `topic` envelope is published
//! to subscribers on this node only. There is no fan-out across connections
//! and no retained data — a publish with no subscribers is dropped.

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::message::{is_valid_name, NodeError};

/// Buffered payloads per topic channel before slow subscribers start lagging.
const TOPIC_CHANNEL_CAPACITY: usize = 64;

/// Registry mapping topic names to local broadcast channels.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    channels: DashMap<String, broadcast::Sender<Vec<u8>>>,
}

impl TopicRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a topic under `name`.
    ///
    /// Registering an existing topic is a no-op that keeps current
    /// subscribers attached.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidName`] if `name` fails validation.
    pub fn register(&self, name: &str) -> Result<(), NodeError> {
        if !is_valid_name(name) {
            return Err(NodeError::InvalidName(name.to_string()));
        }
        self.channels
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CHANNEL_CAPACITY).0);
        Ok(())
    }

    /// Subscribes to a registered topic.
    #[must_use]
    pub fn subscribe(&self, name: &str) -> Option<broadcast::Receiver<Vec<u8>>> {
        self.channels.get(name).map(|entry| entry.value().subscribe())
    }

    /// Publishes `payload` to local subscribers of `name`.
    ///
    /// Returns whether the topic is registered; a registered topic with no
    /// subscribers accepts the publish and drops it.
    pub fn publish(&self, name: &str, payload: Vec<u8>) -> bool {
        match self.channels.get(name) {
            Some(entry) => {
                // send only fails when there are no receivers.
                let _ = entry.value().send(payload);
                true
            }
            None => false,
        }
    }

    /// Returns whether `name` is a registered topic.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }
}

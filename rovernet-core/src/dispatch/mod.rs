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

//! Dispatch: handler registries, the pending request table, topics, and the
//! engine that routes decoded envelopes to them.

pub use engine::DispatchEngine;
pub use pending::{PendingRequests, ServiceOutcome};
pub use registry::{ActionHandler, HandlerRegistry, ServiceHandler};
pub use stats::NodeStats;
pub use topics::TopicRegistry;

pub(crate) use engine::spawn_action;

/// The dispatch engine.
mod engine;

/// The pending request table.
mod pending;

/// The per-node handler registry.
mod registry;

/// Runtime counters.
mod stats;

/// Name-keyed topic registry.
mod topics;

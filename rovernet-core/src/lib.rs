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

#![forbid(unsafe_code)]

//! Rovernet Core Library
//!
//! This library provides the message protocol and dispatch engine of the
//! Rovernet peer-to-peer node runtime: the wire envelope and its codec, name
//! validation, request/response correlation, handler registries, and the
//! node composition that ties them to a TCP transport.

/// Node composition: configuration, node, and capability handle.
pub(crate) mod common;

/// Dispatch: registries, pending request table, topics, and the engine.
pub(crate) mod dispatch;

/// Message-level building blocks: envelope, naming, correlation, errors.
pub(crate) mod message;

/// Trait definitions used in the Rovernet framework.
pub(crate) mod traits;

/// Transport wiring: frame I/O, the TCP listener, and peer links.
pub(crate) mod wire;

/// Frame I/O helpers for clients that speak the wire format directly.
pub mod protocol {
    pub use crate::wire::protocol::{
        read_envelope, read_frame, write_envelope, write_frame, LENGTH_PREFIX_SIZE,
        MAX_FRAME_SIZE,
    };
}

/// Prelude module for convenient imports.
///
/// Re-exports the node runtime surface together with the [`async_trait`]
/// attribute used to implement [`Remote`](crate::traits::Remote).
pub mod prelude {
    pub use async_trait::async_trait;

    pub use crate::common::{
        LimitsConfig, NetworkConfig, Node, NodeConfig, NodeHandle, TimeoutsConfig,
    };
    pub use crate::dispatch::{
        ActionHandler, DispatchEngine, HandlerRegistry, NodeStats, PendingRequests,
        ServiceHandler, ServiceOutcome, TopicRegistry,
    };
    pub use crate::message::{
        is_valid_name, next_correlation_id, Envelope, EnvelopeKind, NodeError, NAME_ALPHABET,
        NO_CORRELATION, OP_ERR, OP_EXEC, OP_OK,
    };
    pub use crate::traits::Remote;
    pub use crate::wire::Peer;
}

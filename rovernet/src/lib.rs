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
#![forbid(missing_docs)] // Keep this to enforce coverage

//! # Rovernet
//!
//! This crate provides a peer-to-peer node runtime built on top of Tokio.
//! Each process hosts a node with a numeric identity that exposes named
//! handlers over TCP and dispatches inbound wire messages to them
//! concurrently.
//!
//! ## Key Concepts
//!
//! - **Node (`Node`)**: A process-level participant owning the handler
//!   registries, the pending request table, and a network identity.
//! - **Actions**: Named fire-and-forget remote invocations; no response is
//!   sent or awaited.
//! - **Services**: Named remote invocations that produce exactly one
//!   response, paired to the request by a correlation ID.
//! - **Handles (`NodeHandle`)**: The capability passed by value into every
//!   handler invocation, exposing the subset of node operations handler code
//!   needs (issuing further calls, topics, shutdown).
//! - **Peers (`Peer`)**: Bidirectional links to remote nodes; both ends can
//!   invoke the other's handlers over one socket.
//! - **Envelope**: The structured wire unit carrying type, name, correlation
//!   ID, operation, and opaque payload.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rovernet::prelude::*;
//!
//! let node = Node::create(47);
//! node.register_service("echo", |payload, _| async move { payload })?;
//! node.init().await?;
//! node.halt().await;
//! ```

/// A prelude module for conveniently importing the most commonly used items.
///
/// Re-exports the node runtime surface from `rovernet-core`: [`prelude::Node`],
/// [`prelude::NodeHandle`], [`prelude::NodeConfig`], [`prelude::Peer`], the
/// [`prelude::Remote`] trait, the wire [`prelude::Envelope`] types, and the
/// error taxonomy, along with the `async_trait` attribute.
pub mod prelude {
    pub use rovernet_core::prelude::*;
}

/// Frame I/O for clients that speak the wire format directly.
///
/// This module provides functions for reading and writing envelopes using
/// the length-prefixed binary wire protocol.
pub mod protocol {
    pub use rovernet_core::protocol::{
        read_envelope, read_frame, write_envelope, write_frame, LENGTH_PREFIX_SIZE,
        MAX_FRAME_SIZE,
    };
}

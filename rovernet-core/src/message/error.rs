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

//! Error types for the node runtime.

use std::fmt;

/// Error types for registration, codec, dispatch, and transport operations.
///
/// None of these are fatal to the process: registration errors are returned
/// to the caller, decode errors drop the offending message, dispatch errors
/// are reported to the remote caller or logged, and transport errors close
/// one connection. [`Node::halt`](crate::common::Node::halt) is the only
/// intended way a node process stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A name contained characters outside the registration whitelist.
    ///
    /// Raised at registration time; the caller must fix the identifier.
    InvalidName(String),

    /// An envelope could not be decoded, or a frame was structurally invalid.
    ///
    /// Connection-level but non-fatal: the single message is dropped and the
    /// connection stays open unless the framing itself has desynchronized.
    MalformedMessage(String),

    /// An inbound action named no registered handler.
    UnknownAction(String),

    /// An inbound service request named no registered handler.
    ///
    /// Surfaced to the remote caller as an error-tagged response.
    UnknownService(String),

    /// A topic operation named no registered topic.
    UnknownTopic(String),

    /// A service response carried a correlation ID with no pending request.
    ///
    /// Expected under duplicate delivery or late responses after a timeout;
    /// discarded silently by dispatch.
    StaleCorrelation(u32),

    /// A user-supplied handler panicked; the invocation was contained.
    HandlerPanic(String),

    /// The remote node reported a failure in an error-tagged response.
    Remote(String),

    /// `init` was called on a node that is already listening.
    AlreadyInitialized,

    /// Configuration could not be parsed.
    Config(String),

    /// The connection was closed by the peer.
    ConnectionClosed,

    /// A service call did not receive its response in time.
    Timeout,

    /// Socket or I/O error.
    Io(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "Invalid name: {name:?}"),
            Self::MalformedMessage(detail) => write!(f, "Malformed message: {detail}"),
            Self::UnknownAction(name) => write!(f, "Unknown action: {name}"),
            Self::UnknownService(name) => write!(f, "Unknown service: {name}"),
            Self::UnknownTopic(name) => write!(f, "Unknown topic: {name}"),
            Self::StaleCorrelation(id) => {
                write!(f, "No pending request for correlation id {id}")
            }
            Self::HandlerPanic(name) => write!(f, "Handler for {name:?} panicked"),
            Self::Remote(message) => write!(f, "Remote error: {message}"),
            Self::AlreadyInitialized => write!(f, "Node is already initialized"),
            Self::Config(detail) => write!(f, "Configuration error: {detail}"),
            Self::ConnectionClosed => write!(f, "Connection closed"),
            Self::Timeout => write!(f, "Service call timed out"),
            Self::Io(detail) => write!(f, "I/O error: {detail}"),
        }
    }
}

impl std::error::Error for NodeError {}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedMessage(err.to_string())
    }
}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

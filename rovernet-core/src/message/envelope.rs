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

//! The wire envelope and its codec.
//!
//! The envelope is the bit-exact compatibility surface of the protocol: every
//! message exchanged between nodes is one envelope, serialized as JSON with
//! PascalCase field names.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "Type": "service-request",
//!   "Name": "echo",
//!   "Id": 42,
//!   "Operation": "exec",
//!   "Payload": [104, 105]
//! }
//! ```
//!
//! - `Type` discriminates the message category.
//! - `Name` is the registered action/service/topic identifier.
//! - `Id` correlates a `service-response` with its `service-request`;
//!   fire-and-forget envelopes carry `0` ([`NO_CORRELATION`]).
//! - `Operation` is a secondary discriminator kept as an extension point; the
//!   engine emits [`OP_EXEC`], [`OP_OK`], and [`OP_ERR`] and accepts any
//!   string on input.
//! - `Payload` is an opaque byte sequence, carried verbatim.
//!
//! Framing (length-prefixing) is the transport's job, not the codec's — see
//! [`crate::wire::protocol`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::correlation::NO_CORRELATION;
use super::error::NodeError;

/// Operation written on service requests and actions the engine originates.
pub const OP_EXEC: &str = "exec";

/// Operation written on successful service responses.
pub const OP_OK: &str = "ok";

/// Operation written on error-tagged service responses; the payload carries
/// the error message.
pub const OP_ERR: &str = "err";

/// Message category discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeKind {
    /// Fire-and-forget remote invocation; no response is sent or awaited.
    #[serde(rename = "action")]
    Action,

    /// Remote invocation that expects exactly one correlated response.
    #[serde(rename = "service-request")]
    ServiceRequest,

    /// The correlated answer to a previously sent `service-request`.
    #[serde(rename = "service-response")]
    ServiceResponse,

    /// Publish to a name-keyed topic on the receiving node.
    #[serde(rename = "topic")]
    Topic,
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Action => "action",
            Self::ServiceRequest => "service-request",
            Self::ServiceResponse => "service-response",
            Self::Topic => "topic",
        };
        f.write_str(name)
    }
}

/// One wire message.
///
/// Construct envelopes through the per-kind constructors so the correlation
/// and operation fields stay consistent; the engine never interprets payload
/// contents, only routes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message category.
    #[serde(rename = "Type")]
    pub kind: EnvelopeKind,

    /// Registered action/service/topic identifier.
    #[serde(rename = "Name")]
    pub name: String,

    /// Correlation identifier; [`NO_CORRELATION`] for fire-and-forget kinds.
    #[serde(rename = "Id")]
    pub id: u32,

    /// Secondary discriminator (extension point).
    #[serde(rename = "Operation")]
    pub operation: String,

    /// Opaque payload bytes.
    #[serde(rename = "Payload")]
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Creates an `action` envelope.
    #[must_use]
    pub fn action(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            kind: EnvelopeKind::Action,
            name: name.into(),
            id: NO_CORRELATION,
            operation: OP_EXEC.to_string(),
            payload,
        }
    }

    /// Creates a `service-request` envelope with the given correlation ID.
    #[must_use]
    pub fn service_request(name: impl Into<String>, id: u32, payload: Vec<u8>) -> Self {
        Self {
            kind: EnvelopeKind::ServiceRequest,
            name: name.into(),
            id,
            operation: OP_EXEC.to_string(),
            payload,
        }
    }

    /// Creates a successful `service-response` correlated to `id`.
    #[must_use]
    pub fn service_response(name: impl Into<String>, id: u32, payload: Vec<u8>) -> Self {
        Self {
            kind: EnvelopeKind::ServiceResponse,
            name: name.into(),
            id,
            operation: OP_OK.to_string(),
            payload,
        }
    }

    /// Creates an error-tagged `service-response` correlated to `id`.
    ///
    /// The error message travels as the payload so correlation handling stays
    /// uniform on the caller side.
    #[must_use]
    pub fn error_response(name: impl Into<String>, id: u32, message: &str) -> Self {
        Self {
            kind: EnvelopeKind::ServiceResponse,
            name: name.into(),
            id,
            operation: OP_ERR.to_string(),
            payload: message.as_bytes().to_vec(),
        }
    }

    /// Creates a `topic` publish envelope.
    #[must_use]
    pub fn topic(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            kind: EnvelopeKind::Topic,
            name: name.into(),
            id: NO_CORRELATION,
            operation: OP_EXEC.to_string(),
            payload,
        }
    }

    /// Returns whether this envelope is error-tagged.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.operation == OP_ERR
    }

    /// Serializes the envelope to its wire bytes.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::MalformedMessage`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, NodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserializes an envelope from wire bytes.
    ///
    /// Fails with [`NodeError::MalformedMessage`] on truncated or structurally
    /// invalid input; never panics and never returns a partial envelope.
    pub fn decode(bytes: &[u8]) -> Result<Self, NodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

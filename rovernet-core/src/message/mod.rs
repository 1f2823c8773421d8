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

//! Message-level building blocks: the wire envelope, name validation,
//! correlation IDs, and the error taxonomy.

pub use correlation::{next_correlation_id, NO_CORRELATION};
pub use envelope::{Envelope, EnvelopeKind, OP_ERR, OP_EXEC, OP_OK};
pub use error::NodeError;
pub use naming::{is_valid_name, NAME_ALPHABET};

/// Correlation identifiers for request/response pairing.
mod correlation;

/// The wire envelope and its codec.
mod envelope;

/// Error types for the node runtime.
mod error;

/// Name validation for actions, services, and topics.
mod naming;

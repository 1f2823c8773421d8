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

//! The pending request table: correlation ID → single-use response slot.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;

use crate::message::{next_correlation_id, NodeError};

/// What a waiting service caller eventually receives: the response payload,
/// or the error the remote tagged onto its response.
pub type ServiceOutcome = Result<Vec<u8>, NodeError>;

/// Correlation table for in-flight service calls.
///
/// An entry is created when a call is issued and removed when its response
/// arrives ([`resolve`](Self::resolve)) or the caller gives up
/// ([`abandon`](Self::abandon)); a late response for a removed entry is
/// reported as [`NodeError::StaleCorrelation`] and discarded by dispatch.
/// Callers that time out must abandon their slot, otherwise the entry leaks
/// for the node's lifetime.
#[derive(Debug, Default)]
pub struct PendingRequests {
    slots: DashMap<u32, oneshot::Sender<ServiceOutcome>>,
}

impl PendingRequests {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh correlation ID and returns it with the receiving end
    /// of its response slot.
    ///
    /// The generator alone is "almost certainly unique"; strict in-flight
    /// uniqueness comes from redrawing here while the drawn ID collides with
    /// an occupied slot.
    #[must_use]
    pub fn insert_new(&self) -> (u32, oneshot::Receiver<ServiceOutcome>) {
        loop {
            let id = next_correlation_id();
            match self.slots.entry(id) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let (tx, rx) = oneshot::channel();
                    slot.insert(tx);
                    return (id, rx);
                }
            }
        }
    }

    /// Delivers `outcome` to the caller waiting on `id`, exactly once, and
    /// removes the entry.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::StaleCorrelation`] when no caller is waiting on
    /// `id` — either it was never issued, already resolved, or abandoned
    /// after a timeout. Expected under duplicate or late delivery.
    pub fn resolve(&self, id: u32, outcome: ServiceOutcome) -> Result<(), NodeError> {
        let Some((_, slot)) = self.slots.remove(&id) else {
            return Err(NodeError::StaleCorrelation(id));
        };
        slot.send(outcome).map_err(|_| NodeError::StaleCorrelation(id))
    }

    /// Removes the slot for `id` without delivering anything.
    ///
    /// Returns whether an entry was present. Called by timed-out waiters so
    /// abandoned entries do not leak.
    pub fn abandon(&self, id: u32) -> bool {
        self.slots.remove(&id).is_some()
    }

    /// Returns the number of in-flight calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no calls are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

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

use async_trait::async_trait;

use crate::message::NodeError;

/// The invocation contract shared by every call target.
///
/// Implemented by [`Peer`](crate::wire::Peer) (calls travel over the link)
/// and by [`NodeHandle`](crate::common::NodeHandle) (calls dispatch to this
/// node's own registries), so handler code is written against the capability
/// rather than the transport behind it.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Invokes the named action, fire-and-forget.
    ///
    /// Returns as soon as the invocation is on its way; no acknowledgment is
    /// sent or awaited, and a failure inside the remote handler is never
    /// observed by the caller.
    async fn send_action(&self, name: &str, payload: Vec<u8>) -> Result<(), NodeError>;

    /// Invokes the named service and awaits its single correlated response.
    ///
    /// # Errors
    ///
    /// * [`NodeError::Remote`] — the target tagged its response as an error
    ///   (for example, the service name was not registered there).
    /// * [`NodeError::Timeout`] — no response arrived within the configured
    ///   call timeout; the pending slot is abandoned and a late response is
    ///   discarded as stale.
    /// * [`NodeError::ConnectionClosed`] — the link died before a response.
    async fn call_service(&self, name: &str, payload: Vec<u8>) -> Result<Vec<u8>, NodeError>;
}

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

//! Outbound links to remote nodes.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::common::NodeHandle;
use crate::message::{Envelope, NodeError};
use crate::traits::Remote;

use super::listener::{pump_envelopes, register_connection, write_loop, REPLY_CHANNEL_CAPACITY};

/// A bidirectional link to a remote node.
///
/// The link's reader task feeds every inbound envelope into this node's
/// dispatch engine, so responses correlate through the node's pending request
/// table and the remote side can invoke our actions and services over the
/// same socket.
///
/// Dropping a `Peer` closes the write half once queued frames drain; the
/// reader task ends when the remote closes its side or the node shuts down.
#[derive(Debug, Clone)]
pub struct Peer {
    node: NodeHandle,
    remote_addr: SocketAddr,
    outbound: mpsc::Sender<Envelope>,
}

impl Peer {
    /// Dials `addr` and wires the new link into `node`'s dispatch engine.
    pub(crate) async fn connect(node: NodeHandle, addr: SocketAddr) -> Result<Self, NodeError> {
        let stream = TcpStream::connect(addr).await?;
        let remote_addr = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();
        let (outbound, outbound_rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);

        let conn_id = register_connection(&node);
        debug!(conn_id, %remote_addr, "connected to peer");

        tokio::spawn(write_loop(writer, outbound_rx, conn_id));
        {
            let node = node.clone();
            let reply = outbound.clone();
            tokio::spawn(async move {
                pump_envelopes(reader, conn_id, node.clone(), reply).await;
                node.stats()
                    .connections_active
                    .fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
                debug!(conn_id, "peer link finished");
            });
        }

        Ok(Self {
            node,
            remote_addr,
            outbound,
        })
    }

    /// The remote end of this link.
    #[must_use]
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Publishes `payload` to the remote node's topic `name`, fire-and-forget.
    ///
    /// Whether the topic exists (and who subscribes) is the remote's concern;
    /// an unknown topic is dropped there.
    pub async fn publish_topic(&self, name: &str, payload: Vec<u8>) -> Result<(), NodeError> {
        trace!(topic = name, %self.remote_addr, "publishing to topic");
        self.send_envelope(Envelope::topic(name, payload)).await
    }

    async fn send_envelope(&self, envelope: Envelope) -> Result<(), NodeError> {
        self.outbound
            .send(envelope)
            .await
            .map_err(|_| NodeError::ConnectionClosed)
    }
}

#[async_trait]
impl Remote for Peer {
    async fn send_action(&self, name: &str, payload: Vec<u8>) -> Result<(), NodeError> {
        trace!(action = name, %self.remote_addr, "sending action");
        self.send_envelope(Envelope::action(name, payload)).await
    }

    async fn call_service(&self, name: &str, payload: Vec<u8>) -> Result<Vec<u8>, NodeError> {
        let pending = self.node.pending();
        let (id, response) = pending.insert_new();
        trace!(service = name, id, %self.remote_addr, "sending service request");

        if let Err(err) = self
            .send_envelope(Envelope::service_request(name, id, payload))
            .await
        {
            pending.abandon(id);
            return Err(err);
        }

        let timeout = self.node.config().timeouts.call_timeout();
        match tokio::time::timeout(timeout, response).await {
            Ok(Ok(outcome)) => outcome,
            // The slot was dropped without a response (node shutdown).
            Ok(Err(_)) => Err(NodeError::ConnectionClosed),
            Err(_) => {
                pending.abandon(id);
                trace!(service = name, id, "service call timed out, slot abandoned");
                Err(NodeError::Timeout)
            }
        }
    }
}

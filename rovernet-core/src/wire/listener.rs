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

//! TCP listener and per-connection plumbing.
//!
//! Each connection gets a reader task (decode + dispatch, in arrival order)
//! and a writer task fed by an mpsc channel, so service responses completing
//! concurrently never interleave frames on the stream.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, trace, warn};

use crate::common::NodeHandle;
use crate::message::{Envelope, NodeError};

use super::protocol::{read_frame, write_envelope};

/// Response frames buffered per connection before dispatch backpressures.
pub(crate) const REPLY_CHANNEL_CAPACITY: usize = 64;

/// Accepts connections until the node's shutdown token fires.
pub(crate) async fn accept_loop(listener: TcpListener, node: NodeHandle) {
    let semaphore = Arc::new(Semaphore::new(node.config().network.max_connections));
    let cancel = node.cancel_token();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                info!(node_id = node.node_id(), "listener received shutdown signal");
                break;
            }

            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, remote)) => {
                        let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                            warn!(%remote, "maximum concurrent connections reached, rejecting connection");
                            node.stats().errors.fetch_add(1, Ordering::Relaxed);
                            continue;
                        };

                        let conn_id = register_connection(&node);
                        trace!(conn_id, %remote, "accepted connection");

                        let node = node.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, conn_id, node).await;
                            drop(permit);
                        });
                    }
                    Err(e) => {
                        error!("failed to accept connection: {e}");
                        node.stats().errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        }
    }
}

/// Counts a new link (inbound or outbound) and returns its id.
pub(crate) fn register_connection(node: &NodeHandle) -> usize {
    let stats = node.stats();
    stats.connections_active.fetch_add(1, Ordering::Relaxed);
    stats.connections_accepted.fetch_add(1, Ordering::Relaxed) + 1
}

/// Handles one inbound connection until EOF, a framing error, or shutdown.
async fn handle_connection(stream: TcpStream, conn_id: usize, node: NodeHandle) {
    let (reader, writer) = stream.into_split();
    let (reply_tx, reply_rx) = mpsc::channel(REPLY_CHANNEL_CAPACITY);

    debug!(conn_id, "connection handler started");
    tokio::spawn(write_loop(writer, reply_rx, conn_id));
    pump_envelopes(reader, conn_id, node.clone(), reply_tx).await;

    node.stats().connections_active.fetch_sub(1, Ordering::Relaxed);
    debug!(conn_id, "connection handler finished");
}

/// Reads, decodes, and dispatches envelopes until the link dies.
///
/// A malformed envelope inside an intact frame drops that single message and
/// keeps the connection; a framing-level error means the stream has
/// desynchronized and closes it.
pub(crate) async fn pump_envelopes<R>(
    mut reader: R,
    conn_id: usize,
    node: NodeHandle,
    reply: mpsc::Sender<Envelope>,
) where
    R: AsyncRead + Unpin,
{
    let max_frame_size = node.config().limits.max_frame_size;
    let cancel = node.cancel_token();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                trace!(conn_id, "reader received shutdown signal");
                break;
            }

            frame = read_frame(&mut reader, max_frame_size) => {
                match frame {
                    Ok(bytes) => {
                        node.stats().envelopes_received.fetch_add(1, Ordering::Relaxed);
                        match Envelope::decode(&bytes) {
                            Ok(envelope) => {
                                trace!(
                                    conn_id,
                                    kind = %envelope.kind,
                                    name = %envelope.name,
                                    id = envelope.id,
                                    "received envelope"
                                );
                                node.engine().dispatch(envelope, node.clone(), &reply).await;
                            }
                            Err(err) => {
                                warn!(conn_id, %err, "dropping malformed message");
                                node.stats().errors.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                    Err(NodeError::ConnectionClosed) => {
                        debug!(conn_id, "connection closed by peer");
                        break;
                    }
                    Err(err) => {
                        error!(conn_id, %err, "closing desynchronized connection");
                        node.stats().errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
            }
        }
    }
}

/// Serializes outbound envelopes onto the write half of a connection.
pub(crate) async fn write_loop<W>(
    mut writer: W,
    mut outbound: mpsc::Receiver<Envelope>,
    conn_id: usize,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(envelope) = outbound.recv().await {
        if let Err(err) = write_envelope(&mut writer, &envelope).await {
            error!(conn_id, %err, "failed to write frame");
            break;
        }
    }
    trace!(conn_id, "writer finished");
}

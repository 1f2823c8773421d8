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

//! Two nodes in one process: a rover node serving handlers and a client node
//! dialing it, the way a separate process would.
//!
//! Run with:
//!
//! ```bash
//! cargo run --example node_pair
//! ```

use std::time::Duration;

use anyhow::Result;
use rovernet::prelude::*;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // The serving node. With no port configured it would listen on its id;
    // port 0 keeps the demo runnable next to anything else.
    let mut config = NodeConfig::default();
    config.network.port = Some(0);
    let rover = Node::create_with_config(47, config);

    rover.register_action("status report", |payload, _| async move {
        info!(report = %String::from_utf8_lossy(&payload), "status received");
    })?;

    rover.register_service("echo", |payload, _| async move { payload })?;

    rover.register_service("echo delayed", |payload, _| async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        payload
    })?;

    rover.register_topic("telemetry")?;
    let mut telemetry = rover.handle().subscribe("telemetry")?;
    tokio::spawn(async move {
        while let Ok(sample) = telemetry.recv().await {
            info!(sample = %String::from_utf8_lossy(&sample), "telemetry");
        }
    });

    rover.init().await?;
    let addr = rover.local_addr().expect("listening");
    info!(%addr, "rover node up");

    // The dialing side: an uninitialized node is a pure client.
    let base = Node::create_with_config(48, NodeConfig::default());
    let peer = base.connect(addr).await?;

    peer.send_action("status report", b"battery at 80 percent".to_vec()).await?;
    peer.publish_topic("telemetry", b"voltage 12.1".to_vec()).await?;

    let echoed = peer.call_service("echo", b"hello rover".to_vec()).await?;
    info!(reply = %String::from_utf8_lossy(&echoed), "echo answered");

    // The delayed echo only slows itself down, not the node.
    let slow = {
        let peer = peer.clone();
        tokio::spawn(async move { peer.call_service("echo delayed", b"take your time".to_vec()).await })
    };
    let quick = peer.call_service("echo", b"meanwhile".to_vec()).await?;
    info!(reply = %String::from_utf8_lossy(&quick), "quick echo answered first");
    let slow = slow.await??;
    info!(reply = %String::from_utf8_lossy(&slow), "delayed echo arrived");

    // Halting keeps the process (and background dispatch) alive until some
    // handle asks for shutdown.
    let handle = rover.handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        info!("demo done, shutting down");
        handle.shutdown();
    });
    rover.halt().await;

    Ok(())
}

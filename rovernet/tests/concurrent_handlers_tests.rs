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
 * See the applicable License for the specific language governing permissions
 * and limitations under that License.
 */

use std::time::{Duration, Instant};

use rovernet::prelude::*;

use crate::setup::{initialize_tracing, test_node};

mod setup;

/// A service that sleeps must only delay its own response, never the
/// dispatch of other inbound messages on the same connection.
#[tokio::test]
async fn slow_service_does_not_delay_a_fast_one() -> anyhow::Result<()> {
    initialize_tracing();
    let server = test_node(47);
    server.register_service("delay", |payload, _| async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        payload
    })?;
    server.register_service("fast", |payload, _| async move { payload })?;
    server.init().await?;

    let client = test_node(48);
    let peer = client.connect(server.local_addr().unwrap()).await?;

    let started = Instant::now();
    let slow_call = {
        let peer = peer.clone();
        tokio::spawn(async move { peer.call_service("delay", b"later".to_vec()).await })
    };
    // Give the slow request a head start on the wire.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast = peer.call_service("fast", b"quick".to_vec()).await?;
    assert_eq!(fast, b"quick".to_vec());
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "fast response was head-of-line blocked: {:?}",
        started.elapsed()
    );

    let slow = slow_call.await??;
    assert_eq!(slow, b"later".to_vec());
    assert!(started.elapsed() >= Duration::from_secs(1));

    server.handle().shutdown();
    client.handle().shutdown();
    Ok(())
}

/// Ten 1-second handlers dispatched together finish in ~1 second, not 10:
/// each invocation gets its own execution context.
#[tokio::test]
async fn delaying_handlers_run_concurrently() -> anyhow::Result<()> {
    initialize_tracing();
    let server = test_node(47);
    server.register_service("delay", |payload, _| async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        payload
    })?;
    server.init().await?;

    let client = test_node(48);
    let peer = client.connect(server.local_addr().unwrap()).await?;

    let started = Instant::now();
    let mut calls = Vec::new();
    for i in 0..10u8 {
        let peer = peer.clone();
        calls.push(tokio::spawn(async move {
            peer.call_service("delay", vec![i]).await
        }));
    }
    for (i, call) in calls.into_iter().enumerate() {
        let reply = call.await??;
        assert_eq!(reply, vec![u8::try_from(i).unwrap()]);
    }

    let elapsed = started.elapsed();
    assert!(
        elapsed < Duration::from_secs(5),
        "handlers appear to have run sequentially: {elapsed:?}"
    );

    server.handle().shutdown();
    client.handle().shutdown();
    Ok(())
}

/// Correlation, not arrival order, pairs responses to requests: a fast
/// response overtakes a slow one and both callers get their own payload.
#[tokio::test]
async fn responses_pair_by_correlation_not_fifo() -> anyhow::Result<()> {
    initialize_tracing();
    let server = test_node(47);
    server.register_service("delay", |payload, _| async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        payload
    })?;
    server.register_service("fast", |payload, _| async move { payload })?;
    server.init().await?;

    let client = test_node(48);
    let peer = client.connect(server.local_addr().unwrap()).await?;

    let slow_call = {
        let peer = peer.clone();
        tokio::spawn(async move { peer.call_service("delay", b"slow data".to_vec()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        peer.call_service("fast", b"fast data".to_vec()).await?,
        b"fast data".to_vec()
    );
    assert_eq!(slow_call.await??, b"slow data".to_vec());

    server.handle().shutdown();
    client.handle().shutdown();
    Ok(())
}

/// Two independent connections dispatch independently.
#[tokio::test]
async fn connections_do_not_block_each_other() -> anyhow::Result<()> {
    initialize_tracing();
    let server = test_node(47);
    server.register_service("delay", |payload, _| async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        payload
    })?;
    server.register_service("fast", |payload, _| async move { payload })?;
    server.init().await?;
    let addr = server.local_addr().unwrap();

    let first = test_node(48);
    let second = test_node(49);
    let slow_peer = first.connect(addr).await?;
    let fast_peer = second.connect(addr).await?;

    let started = Instant::now();
    let slow_call = tokio::spawn(async move {
        slow_peer.call_service("delay", vec![]).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    fast_peer.call_service("fast", vec![]).await?;
    assert!(started.elapsed() < Duration::from_millis(500));

    slow_call.await??;
    server.handle().shutdown();
    first.handle().shutdown();
    second.handle().shutdown();
    Ok(())
}

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
use std::sync::Once;

use rovernet::prelude::*;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Uses `std::sync::Once` so the initialization logic runs only once even
/// when called from multiple tests. Log levels default to `info` for the
/// runtime and can be raised per-target via `RUST_LOG`.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rovernet_core=info"));

        let subscriber = FmtSubscriber::builder()
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// Creates a node that binds an OS-assigned port, so tests never collide.
#[allow(dead_code)]
pub fn test_node(id: u64) -> Node {
    let mut config = NodeConfig::default();
    config.network.port = Some(0);
    Node::create_with_config(id, config)
}

/// Creates a test node with a caller-side service call timeout.
#[allow(dead_code)]
pub fn test_node_with_call_timeout(id: u64, timeout_ms: u64) -> Node {
    let mut config = NodeConfig::default();
    config.network.port = Some(0);
    config.timeouts.call = timeout_ms;
    Node::create_with_config(id, config)
}

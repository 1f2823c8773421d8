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

//! Node configuration with XDG-compliant file discovery.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::message::NodeError;

/// Configuration for a node.
///
/// Every field has a default, so an empty TOML document (or no file at all)
/// yields a working configuration. Files are discovered at
/// `$XDG_CONFIG_HOME/rovernet/node.toml`.
///
/// # Example Configuration File
///
/// ```toml
/// [network]
/// bind_ip = "0.0.0.0"
/// # port = 4710          # default: node id truncated to 16 bits
/// max_connections = 64
///
/// [limits]
/// max_frame_size = 1048576  # 1 MiB
///
/// [timeouts]
/// call_timeout_ms = 30000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Bind address and connection limits.
    pub network: NetworkConfig,
    /// Frame size limits.
    pub limits: LimitsConfig,
    /// Timeout configuration.
    pub timeouts: TimeoutsConfig,
}

/// Bind address and connection limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interface the listener binds to.
    pub bind_ip: String,

    /// Listener port. `None` derives the port from the node id (truncated to
    /// 16 bits); `0` asks the OS for a free port, which tests rely on.
    pub port: Option<u16>,

    /// Maximum concurrent connections, inbound links counted per listener.
    pub max_connections: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_ip: "127.0.0.1".to_string(),
            port: None,
            max_connections: 64,
        }
    }
}

/// Frame size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum frame size in bytes.
    pub max_frame_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_size: 1024 * 1024,
        }
    }
}

/// Timeout configuration. All values are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Service call timeout in milliseconds.
    #[serde(rename = "call_timeout_ms")]
    pub call: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self { call: 30_000 }
    }
}

impl TimeoutsConfig {
    /// Returns the service call timeout as a [`Duration`].
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call)
    }
}

impl NodeConfig {
    /// Parses a configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Config`] if the document does not parse.
    pub fn from_toml_str(document: &str) -> Result<Self, NodeError> {
        toml::from_str(document).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Loads the configuration from the XDG config directory, falling back
    /// to defaults when no file exists or the file does not parse.
    #[must_use]
    pub fn load() -> Self {
        let Ok(dirs) = xdg::BaseDirectories::with_prefix("rovernet") else {
            return Self::default();
        };
        let Some(path) = dirs.find_config_file("node.toml") else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(document) => match Self::from_toml_str(&document) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded node configuration");
                    config
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "ignoring invalid configuration");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %path.display(), %err, "failed to read configuration");
                Self::default()
            }
        }
    }

    /// Resolves the listener address for a node with the given id.
    #[must_use]
    pub fn bind_addr(&self, node_id: u64) -> String {
        let port = self
            .network
            .port
            .unwrap_or_else(|| (node_id & u64::from(u16::MAX)) as u16);
        format!("{}:{}", self.network.bind_ip, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = NodeConfig::default();
        assert_eq!(config.network.bind_ip, "127.0.0.1");
        assert_eq!(config.network.port, None);
        assert_eq!(config.network.max_connections, 64);
        assert_eq!(config.limits.max_frame_size, 1024 * 1024);
        assert_eq!(config.timeouts.call_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn empty_document_parses_to_defaults() {
        let config = NodeConfig::from_toml_str("").unwrap();
        assert_eq!(config.network.max_connections, 64);
    }

    #[test]
    fn partial_documents_override_selectively() {
        let config = NodeConfig::from_toml_str(
            r#"
            [network]
            bind_ip = "0.0.0.0"
            port = 4710

            [timeouts]
            call_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.network.bind_ip, "0.0.0.0");
        assert_eq!(config.network.port, Some(4710));
        assert_eq!(config.network.max_connections, 64);
        assert_eq!(config.timeouts.call_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_documents_are_config_errors() {
        assert!(matches!(
            NodeConfig::from_toml_str("network = 12"),
            Err(NodeError::Config(_))
        ));
    }

    #[test]
    fn bind_addr_derives_the_port_from_the_node_id() {
        let config = NodeConfig::default();
        assert_eq!(config.bind_addr(47), "127.0.0.1:47");
        // Ids beyond the port range truncate to 16 bits.
        assert_eq!(config.bind_addr(u64::from(u16::MAX) + 48), "127.0.0.1:47");

        let mut fixed = NodeConfig::default();
        fixed.network.port = Some(9100);
        assert_eq!(fixed.bind_addr(47), "127.0.0.1:9100");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = NodeConfig::default();
        config.network.port = Some(4710);
        config.timeouts.call = 5_000;

        let document = toml::to_string(&config).unwrap();
        let reparsed = NodeConfig::from_toml_str(&document).unwrap();
        assert_eq!(reparsed.network.port, Some(4710));
        assert_eq!(reparsed.timeouts.call, 5_000);
    }

    #[test]
    fn file_backed_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "[limits]\nmax_frame_size = 2048\n").unwrap();

        let document = std::fs::read_to_string(&path).unwrap();
        let config = NodeConfig::from_toml_str(&document).unwrap();
        assert_eq!(config.limits.max_frame_size, 2048);
    }
}

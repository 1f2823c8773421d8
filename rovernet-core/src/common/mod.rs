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

//! Node composition: configuration, the node itself, and its capability
//! handle.

pub use config::{LimitsConfig, NetworkConfig, NodeConfig, TimeoutsConfig};
pub use node::Node;
pub use node_handle::NodeHandle;

/// Node configuration with XDG-compliant file discovery.
mod config;

/// The node: registries, identity, and lifecycle.
mod node;

/// The capability handle passed into handler code.
mod node_handle;

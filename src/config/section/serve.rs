//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # Preferred port, falls back to a free one
//! watch = true                # Rebuild on file changes
//! live_reload = true          # Push reloads to open browsers
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};

/// Development server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// Preferred HTTP port. An ephemeral port is used if it is taken.
    pub port: u16,

    /// Enable file watcher for rebuilds.
    pub watch: bool,

    /// Inject the reload script and accept push connections.
    pub live_reload: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            watch: true,
            live_reload: true,
        }
    }
}

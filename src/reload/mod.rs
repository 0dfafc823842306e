//! Push channel used to tell browsers to reload.
//!
//! The channel rides on the dev server's HTTP port: a request to
//! [`LIVERELOAD_PATH`] with `Upgrade: websocket` is handed to
//! [`ReloadChannel::accept`] and joins the broadcast set. The only message
//! ever sent is [`RELOAD_TOKEN`].
//!
//! When the `live-reload` feature is off, or `serve.live_reload = false`,
//! [`DisabledChannel`] is used and pages are served without the client script.

#[cfg(feature = "live-reload")]
mod websocket;

#[cfg(feature = "live-reload")]
pub use websocket::WebSocketChannel;

use std::sync::Arc;

use anyhow::Result;
use tiny_http::Request;

use crate::{debug, log};

/// Endpoint the injected client script connects to.
pub const LIVERELOAD_PATH: &str = "/__pagekiln/livereload";

/// Text frame sent to every client after a successful rebuild.
pub const RELOAD_TOKEN: &str = "reload";

/// Fan-out channel to connected browsers.
pub trait ReloadChannel: Send + Sync {
    /// Whether clients can connect. Pages only get the client script when live.
    fn is_live(&self) -> bool;

    /// Complete the upgrade handshake and register the client.
    fn accept(&self, request: Request) -> Result<()>;

    /// Send `message` to every client, dropping those that fail.
    ///
    /// Returns the number of clients reached.
    fn broadcast(&self, message: &str) -> usize;

    fn client_count(&self) -> usize;

    /// Close every client connection.
    fn close_all(&self);
}

/// Channel used when live reload is unavailable.
#[derive(Debug, Default)]
pub struct DisabledChannel;

impl ReloadChannel for DisabledChannel {
    fn is_live(&self) -> bool {
        false
    }

    fn accept(&self, request: Request) -> Result<()> {
        request.respond(tiny_http::Response::empty(404))?;
        Ok(())
    }

    fn broadcast(&self, _: &str) -> usize {
        0
    }

    fn client_count(&self) -> usize {
        0
    }

    fn close_all(&self) {}
}

/// Pick the push channel for this run.
///
/// Asking for live reload in a build without the `live-reload` feature
/// degrades to [`DisabledChannel`] with a warning.
pub fn probe(enabled: bool) -> Arc<dyn ReloadChannel> {
    if !enabled {
        debug!("reload"; "live reload disabled by config");
        return Arc::new(DisabledChannel);
    }

    #[cfg(feature = "live-reload")]
    {
        Arc::new(WebSocketChannel::new())
    }

    #[cfg(not(feature = "live-reload"))]
    {
        log!("warning"; "live reload unavailable (built without `live-reload`), serving without it");
        Arc::new(DisabledChannel)
    }
}

/// Whether `request` asks to join the push channel.
pub fn is_upgrade_request(request: &Request) -> bool {
    let path = request.url().split('?').next().unwrap_or_default();
    path == LIVERELOAD_PATH
        && request.headers().iter().any(|h| {
            h.field.equiv("Upgrade") && h.value.as_str().eq_ignore_ascii_case("websocket")
        })
}

/// Log how many clients a reload reached.
pub fn announce(channel: &dyn ReloadChannel, generation: u64) {
    if !channel.is_live() {
        return;
    }
    let reached = channel.broadcast(RELOAD_TOKEN);
    if reached == 0 {
        debug!("reload"; "build #{} ready, no clients connected", generation);
    } else {
        log!("reload"; "build #{} pushed to {} client(s)", generation, reached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_channel() {
        let channel = probe(false);
        assert!(!channel.is_live());
        assert_eq!(channel.broadcast(RELOAD_TOKEN), 0);
        assert_eq!(channel.client_count(), 0);
    }

    #[cfg(feature = "live-reload")]
    #[test]
    fn test_probe_enabled_is_live() {
        let channel = probe(true);
        assert!(channel.is_live());
        assert_eq!(channel.client_count(), 0);
    }
}

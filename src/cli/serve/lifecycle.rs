//! Server lifecycle management.

use crate::{actor::Coordinator, config::SiteConfig, log, module::ModuleRegistry, reload::ReloadChannel};
use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};
use tiny_http::Server;

/// Bind the preferred address, falling back to an ephemeral port.
pub fn bind_with_fallback(interface: IpAddr, port: u16) -> Result<(Server, SocketAddr)> {
    let server = match Server::http(SocketAddr::new(interface, port)) {
        Ok(server) => server,
        Err(e) => {
            let server = Server::http(SocketAddr::new(interface, 0))
                .map_err(|err| anyhow::anyhow!("failed to bind {}: {}", interface, err))?;
            log!("serve"; "port {} unavailable ({}), using a free port", port, e);
            server
        }
    };
    let addr = server
        .server_addr()
        .to_ip()
        .context("server is not listening on an IP address")?;
    Ok((server, addr))
}

/// Spawn the actor system for file watching and live reload.
pub fn spawn_actors(
    config: Arc<SiteConfig>,
    registry: Arc<Mutex<ModuleRegistry>>,
    channel: Arc<dyn ReloadChannel>,
    shutdown_rx: Receiver<()>,
) -> Option<JoinHandle<()>> {
    if !config.serve.watch {
        return None;
    }

    Some(thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log!("error"; "failed to start watcher runtime: {}", e);
                return;
            }
        };

        rt.block_on(async {
            let coordinator =
                Coordinator::new(config, registry, channel).with_shutdown_signal(shutdown_rx);
            if let Err(e) = coordinator.run().await {
                log!("actor"; "error: {}", e);
            }
        });
    }))
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

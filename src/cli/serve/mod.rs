//! Development server with live reload support.
//!
//! The server walks `Starting → Listening → (Rebuilding ⇄ Listening) → Stopped`:
//! bind (falling back to a free port), probe the push channel, run the
//! initial build, then serve the output directory while the actor system
//! rebuilds on change.

mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    cli::build::build_site,
    config::{SiteConfig, cfg},
    core::{ServerPhase, enter_phase, is_shutdown, phase, register_server},
    debug, log,
    module::ModuleRegistry,
    reload::{self, ReloadChannel},
};
use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, unbounded};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests
pub struct DevServer {
    server: Arc<Server>,
    addr: SocketAddr,
    channel: Arc<dyn ReloadChannel>,
    registry: Arc<Mutex<ModuleRegistry>>,
    shutdown_rx: Receiver<()>,
}

impl DevServer {
    /// Bind the HTTP listener and pick the push channel.
    pub fn bind(config: &SiteConfig) -> Result<Self> {
        let (server, addr) = lifecycle::bind_with_fallback(config.serve.interface, config.serve.port)?;
        let server = Arc::new(server);

        let channel = reload::probe(config.serve.live_reload);
        if channel.is_live() {
            debug!("reload"; "ws://{}{}", addr, reload::LIVERELOAD_PATH);
        }

        let (shutdown_tx, shutdown_rx) = unbounded::<()>();
        register_server(Arc::clone(&server), shutdown_tx);

        Ok(Self {
            server,
            addr,
            channel,
            registry: Arc::new(Mutex::new(ModuleRegistry::new())),
            shutdown_rx,
        })
    }

    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build once before serving. Failure is logged, not fatal.
    pub fn initial_build(&self, config: &SiteConfig) -> bool {
        match build_site(config, &self.registry) {
            Ok(stats) => {
                log!("build"; "{} page(s), {} asset(s)", stats.pages, stats.assets);
                true
            }
            Err(e) => {
                log!("error"; "initial build failed: {:#}", e);
                false
            }
        }
    }

    /// Serve requests until shutdown (blocking).
    pub fn run(self, config: Arc<SiteConfig>) -> Result<()> {
        enter_phase(ServerPhase::Listening);
        log!("serve"; "http://{}", self.addr);

        let actors = lifecycle::spawn_actors(
            config,
            Arc::clone(&self.registry),
            Arc::clone(&self.channel),
            self.shutdown_rx,
        );

        // Requests are handled on a small pool so a slow client never blocks the loop.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .context("failed to create request thread pool")?;

        for request in self.server.incoming_requests() {
            let channel = Arc::clone(&self.channel);
            pool.spawn(move || {
                let output = cfg().build.output.clone();
                if let Err(e) = handle_request(request, &output, channel.as_ref()) {
                    debug!("serve"; "request error: {e}");
                }
            });
        }

        enter_phase(ServerPhase::Stopped);
        lifecycle::wait_for_shutdown(actors);
        self.channel.close_all();
        Ok(())
    }
}

/// Entry point for the `serve` subcommand.
pub fn run(config: Arc<SiteConfig>) -> Result<()> {
    let server = DevServer::bind(&config)?;
    server.initial_build(&config);
    server.run(config)
}

/// Handle a single HTTP request
fn handle_request(request: Request, output: &Path, channel: &dyn ReloadChannel) -> Result<()> {
    if is_shutdown() || phase() == ServerPhase::Stopped {
        return response::respond_unavailable(request);
    }

    if reload::is_upgrade_request(&request) {
        return channel.accept(request);
    }

    if !response::is_read_method(&request) {
        return response::respond_method_not_allowed(request);
    }

    match path::resolve_path(request.url(), output) {
        Some(file) => response::respond_file(request, &file, channel.is_live()),
        None => response::respond_not_found(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::{fs, thread};
    use tempfile::TempDir;

    fn get(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(request.as_bytes()).unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_serves_built_site() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(
            dir.path().join("pages/index.json"),
            r#"{"exports": {"page": {"body": {"tag": "html", "children": [{"tag": "p", "children": ["hi"]}]}}}}"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/site.css"), "p{}").unwrap();

        let mut config = test_site_config(dir.path());
        config.serve.port = 0;
        let dev = DevServer::bind(&config).unwrap();
        assert!(dev.initial_build(&config));

        let server = Arc::clone(&dev.server);
        let channel = Arc::clone(&dev.channel);
        let output = config.build.output.clone();
        let worker = thread::spawn(move || {
            for request in server.incoming_requests() {
                handle_request(request, &output, channel.as_ref()).unwrap();
            }
        });

        let addr = dev.addr();
        let home = get(addr, "GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        assert!(home.starts_with("HTTP/1.1 200"));
        assert!(home.contains("<p>hi</p>"));
        if cfg!(feature = "live-reload") {
            assert!(home.contains("</script></html>"));
            assert!(home.contains(reload::LIVERELOAD_PATH));
        }

        let css = get(addr, "GET /site.css HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        assert!(css.starts_with("HTTP/1.1 200"));
        assert!(css.contains("text/css"));
        assert!(css.ends_with("p{}"));

        let missing = get(addr, "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        assert!(missing.starts_with("HTTP/1.1 404"));

        let post = get(addr, "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        assert!(post.starts_with("HTTP/1.1 405"));

        dev.server.unblock();
        worker.join().unwrap();
    }

    #[test]
    fn test_failed_initial_build_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = test_site_config(dir.path());
        config.serve.port = 0;

        let dev = DevServer::bind(&config).unwrap();
        assert!(!dev.initial_build(&config));
        assert_ne!(dev.addr().port(), 0);
    }
}

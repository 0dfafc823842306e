//! Actor Coordinator - wires up the live reload actor system.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{RebuildMsg, WsMsg};
use super::rebuild::{RebuildActor, SiteRebuild};
use super::ws::WsActor;
use crate::config::SiteConfig;
use crate::module::ModuleRegistry;
use crate::reload::ReloadChannel;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<SiteConfig>,
    registry: Arc<Mutex<ModuleRegistry>>,
    channel: Arc<dyn ReloadChannel>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(
        config: Arc<SiteConfig>,
        registry: Arc<Mutex<ModuleRegistry>>,
        channel: Arc<dyn ReloadChannel>,
    ) -> Self {
        Self {
            config,
            registry,
            channel,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until shutdown is signalled.
    pub async fn run(self) -> Result<()> {
        let (rebuild_tx, rebuild_rx) = mpsc::channel::<RebuildMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let roots = collect_watch_paths(&self.config);
        let fs_actor = FsActor::new(
            &roots,
            vec![self.config.build.output.clone()],
            self.config.root.clone(),
            rebuild_tx.clone(),
        );
        let rebuild_actor = RebuildActor::new(
            rebuild_rx,
            ws_tx.clone(),
            Arc::new(SiteRebuild::new(self.registry)),
        );
        let ws_actor = WsActor::new(ws_rx, self.channel);

        crate::debug!("actor"; "start");
        let fs_handle = tokio::spawn(fs_actor.run());
        let rebuild_handle = tokio::spawn(rebuild_actor.run());
        let ws_handle = tokio::spawn(ws_actor.run());

        match self.shutdown_rx {
            Some(rx) => loop {
                if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                    crate::debug!("actor"; "shutdown signal received");
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            },
            None => {
                let _ = tokio::join!(rebuild_handle, ws_handle);
                return Ok(());
            }
        }

        fs_handle.abort();
        let _ = rebuild_tx.send(RebuildMsg::Shutdown).await;
        let _ = ws_tx.send(WsMsg::Shutdown).await;
        let grace = Duration::from_millis(500);
        let _ = tokio::time::timeout(grace, rebuild_handle).await;
        let _ = tokio::time::timeout(grace, ws_handle).await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

/// Pages, static dir, config file and `build.deps`, keeping existing paths only.
pub fn collect_watch_paths(config: &SiteConfig) -> Vec<PathBuf> {
    let build = &config.build;
    let candidates = [
        build.pages.clone(),
        build.static_dir.clone(),
        config.config_path.clone(),
    ]
    .into_iter()
    .chain(build.deps.iter().cloned());

    let mut seen = FxHashSet::default();
    candidates
        .filter(|path| path.exists())
        .filter(|path| !path.starts_with(&build.output))
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG_FILE, test_site_config};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_watch_paths_keep_existing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::create_dir_all(root.join("components")).unwrap();
        fs::write(
            root.join(CONFIG_FILE),
            "[build]\ndeps = [\"components\", \"missing\", \"pages\"]",
        )
        .unwrap();

        let config = test_site_config(root);
        let paths = collect_watch_paths(&config);

        assert_eq!(
            paths,
            vec![
                config.build.pages.clone(),
                config.config_path.clone(),
                config.root.join("components"),
            ]
        );
    }
}

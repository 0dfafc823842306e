//! Rebuild Actor
//!
//! Runs one site build at a time. Batches that arrive mid-build collapse
//! into a single follow-up build; nothing is cancelled.
//!
//! ```text
//!            change                 finished (nothing pending)
//!   Idle ───────────► Rebuilding ─────────────────────────────► Idle
//!                      │     ▲
//!               change │     │ finished
//!                      ▼     │
//!                  RebuildPending ◄── change
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::messages::{RebuildMsg, WsMsg};
use crate::config::{cfg, reload_config};
use crate::core::{ServerPhase, enter_phase};
use crate::logger::{status_error, status_success, status_warning};
use crate::module::ModuleRegistry;
use crate::site::{BuildStats, CommandHooks, render_site};
use crate::{debug, log};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildState {
    Idle,
    Rebuilding,
    RebuildPending,
}

impl RebuildState {
    /// A change batch arrived. Returns `true` if a build should start now.
    pub fn on_change(&mut self) -> bool {
        match self {
            Self::Idle => {
                *self = Self::Rebuilding;
                true
            }
            Self::Rebuilding | Self::RebuildPending => {
                *self = Self::RebuildPending;
                false
            }
        }
    }

    /// The running build finished. Returns `true` if a follow-up should start.
    pub fn on_finished(&mut self) -> bool {
        match self {
            Self::RebuildPending => {
                *self = Self::Rebuilding;
                true
            }
            Self::Rebuilding | Self::Idle => {
                *self = Self::Idle;
                false
            }
        }
    }
}

/// One full site build, run on a blocking thread.
pub trait Rebuild: Send + Sync + 'static {
    fn rebuild(&self, changed: &[PathBuf]) -> Result<BuildStats>;
}

/// Reload `pagekiln.toml` if it changed, then render the site.
pub struct SiteRebuild {
    registry: Arc<Mutex<ModuleRegistry>>,
}

impl SiteRebuild {
    pub fn new(registry: Arc<Mutex<ModuleRegistry>>) -> Self {
        Self { registry }
    }
}

impl Rebuild for SiteRebuild {
    fn rebuild(&self, _changed: &[PathBuf]) -> Result<BuildStats> {
        match reload_config() {
            Ok(true) => log!("config"; "reloaded"),
            Ok(false) => {}
            Err(e) => status_warning(&format!("config reload failed, keeping previous config: {e:#}")),
        }

        let config = cfg();
        let hooks = CommandHooks::new(&config.hooks.after_render);
        Ok(render_site(&config, &self.registry, &hooks)?)
    }
}

struct Finished {
    generation: u64,
    result: Result<BuildStats>,
}

/// Rebuild Actor - serializes builds
pub struct RebuildActor {
    rx: mpsc::Receiver<RebuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    builder: Arc<dyn Rebuild>,
    state: RebuildState,
    /// Last generation started; 0 is the initial build.
    generation: u64,
    pending: Vec<PathBuf>,
    done_tx: mpsc::Sender<Finished>,
    done_rx: mpsc::Receiver<Finished>,
}

impl RebuildActor {
    pub fn new(
        rx: mpsc::Receiver<RebuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        builder: Arc<dyn Rebuild>,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::channel(1);
        Self {
            rx,
            ws_tx,
            builder,
            state: RebuildState::Idle,
            generation: 0,
            pending: Vec::new(),
            done_tx,
            done_rx,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(RebuildMsg::Changes(paths)) => {
                        for path in paths {
                            if !self.pending.contains(&path) {
                                self.pending.push(path);
                            }
                        }
                        if self.state.on_change() {
                            self.start();
                        } else {
                            debug!("rebuild"; "build in progress, queued follow-up");
                        }
                    }
                    Some(RebuildMsg::Shutdown) | None => break,
                },
                Some(done) = self.done_rx.recv() => {
                    if !self.finish(done).await {
                        break;
                    }
                }
            }
        }
        debug!("rebuild"; "stopped");
    }

    fn start(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        let changed = std::mem::take(&mut self.pending);
        let builder = Arc::clone(&self.builder);
        let done_tx = self.done_tx.clone();

        enter_phase(ServerPhase::Rebuilding);
        tokio::task::spawn_blocking(move || {
            let result = builder.rebuild(&changed);
            let _ = done_tx.blocking_send(Finished { generation, result });
        });
    }

    /// Returns `false` once WsActor is gone.
    async fn finish(&mut self, done: Finished) -> bool {
        enter_phase(ServerPhase::Listening);

        let delivered = match done.result {
            Ok(stats) => {
                status_success(&format!(
                    "build #{} ok ({} page(s), {} asset(s))",
                    done.generation, stats.pages, stats.assets
                ));
                self.ws_tx
                    .send(WsMsg::Reload {
                        generation: done.generation,
                    })
                    .await
                    .is_ok()
            }
            Err(e) => {
                status_error(&format!("build #{} failed", done.generation), &format!("{e:#}"));
                true
            }
        };

        if self.state.on_finished() {
            self.start();
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_state_machine() {
        let mut state = RebuildState::Idle;
        assert!(state.on_change());
        assert_eq!(state, RebuildState::Rebuilding);

        assert!(!state.on_change());
        assert!(!state.on_change());
        assert_eq!(state, RebuildState::RebuildPending);

        assert!(state.on_finished());
        assert_eq!(state, RebuildState::Rebuilding);

        assert!(!state.on_finished());
        assert_eq!(state, RebuildState::Idle);
    }

    #[derive(Default)]
    struct SlowBuild {
        running: AtomicBool,
        overlapped: AtomicBool,
        builds: AtomicUsize,
        batches: parking_lot::Mutex<Vec<Vec<PathBuf>>>,
        fail: bool,
    }

    impl Rebuild for SlowBuild {
        fn rebuild(&self, changed: &[PathBuf]) -> Result<BuildStats> {
            if self.running.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            std::thread::sleep(Duration::from_millis(100));
            self.batches.lock().push(changed.to_vec());
            self.builds.fetch_add(1, Ordering::SeqCst);
            self.running.store(false, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(BuildStats { pages: 1, assets: 0 })
        }
    }

    #[tokio::test]
    async fn test_changes_during_build_collapse() {
        let (tx, rx) = mpsc::channel(8);
        let (ws_tx, mut ws_rx) = mpsc::channel(8);
        let builder = Arc::new(SlowBuild::default());
        let actor = RebuildActor::new(rx, ws_tx, builder.clone());
        let handle = tokio::spawn(actor.run());

        for name in ["a", "b", "c"] {
            tx.send(RebuildMsg::Changes(vec![PathBuf::from(name)]))
                .await
                .unwrap();
        }

        assert_eq!(ws_rx.recv().await, Some(WsMsg::Reload { generation: 1 }));
        assert_eq!(ws_rx.recv().await, Some(WsMsg::Reload { generation: 2 }));

        tx.send(RebuildMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert_eq!(builder.builds.load(Ordering::SeqCst), 2);
        assert!(!builder.overlapped.load(Ordering::SeqCst));
        let batches = builder.batches.lock();
        assert_eq!(batches[0], vec![PathBuf::from("a")]);
        assert_eq!(batches[1], vec![PathBuf::from("b"), PathBuf::from("c")]);
    }

    #[tokio::test]
    async fn test_failed_build_sends_no_reload() {
        let (tx, rx) = mpsc::channel(8);
        let (ws_tx, mut ws_rx) = mpsc::channel(8);
        let builder = Arc::new(SlowBuild {
            fail: true,
            ..Default::default()
        });
        let handle = tokio::spawn(RebuildActor::new(rx, ws_tx, builder.clone()).run());

        tx.send(RebuildMsg::Changes(vec![PathBuf::from("a")]))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(RebuildMsg::Shutdown).await.unwrap();
        handle.await.unwrap();

        assert_eq!(builder.builds.load(Ordering::SeqCst), 1);
        assert!(ws_rx.try_recv().is_err());
    }
}

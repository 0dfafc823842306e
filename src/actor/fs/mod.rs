//! FileSystem Actor
//!
//! Watches the site sources and sends debounced change batches to the
//! RebuildActor.
//!
//! ```text
//! Watcher (native | poll) → Debouncer (timing, dedup) → ignore output dir → RebuildMsg
//! ```

mod backend;
mod debouncer;

use std::path::PathBuf;

use tokio::sync::mpsc;

use super::messages::RebuildMsg;
use crate::utils::path::relative_to;
use crate::{debug, log};
use backend::WatchBackend;
use debouncer::Debouncer;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    backend: WatchBackend,
    rebuild_tx: mpsc::Sender<RebuildMsg>,
    debouncer: Debouncer,
    /// Changes under these paths never trigger a rebuild (the output dir)
    ignored: Vec<PathBuf>,
    /// Root used for log display
    root: PathBuf,
}

impl FsActor {
    /// Start watching immediately; events buffer until `run` is polled.
    pub fn new(
        roots: &[PathBuf],
        ignored: Vec<PathBuf>,
        root: PathBuf,
        rebuild_tx: mpsc::Sender<RebuildMsg>,
    ) -> Self {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let backend = WatchBackend::start(roots, notify_tx);
        debug!("watch"; "{} watcher on {} root(s)", backend.label(), roots.len());

        Self {
            notify_rx,
            backend,
            rebuild_tx,
            debouncer: Debouncer::new(),
            ignored,
            root,
        }
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            backend: _backend,
            rebuild_tx,
            mut debouncer,
            ignored,
            root,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(batch) = take_batch(&mut debouncer, &ignored) else {
                        continue;
                    };
                    for path in &batch {
                        log!("watch"; "{}", relative_to(path, &root));
                    }
                    if rebuild_tx.send(RebuildMsg::Changes(batch)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Ready changes outside the ignored roots, sorted.
fn take_batch(debouncer: &mut Debouncer, ignored: &[PathBuf]) -> Option<Vec<PathBuf>> {
    let mut batch: Vec<PathBuf> = debouncer
        .take_if_ready()?
        .into_keys()
        .filter(|path| !ignored.iter().any(|dir| path.starts_with(dir)))
        .collect();
    if batch.is_empty() {
        return None;
    }
    batch.sort();
    Some(batch)
}

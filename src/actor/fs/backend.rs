//! Watcher backends.
//!
//! The native recursive watcher is preferred. If it cannot be created or
//! cannot attach a root, each root gets its own `PollWatcher` instead, so one
//! unwatchable root does not blind the others.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Duration;

use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};

use crate::log;

const POLL_INTERVAL_MS: u64 = 500;

pub(super) type EventSender = Sender<notify::Result<Event>>;

/// Keeps the active watcher(s) alive.
pub(super) enum WatchBackend {
    Native(RecommendedWatcher),
    Poll(Vec<PollWatcher>),
}

impl WatchBackend {
    pub(super) fn start(roots: &[PathBuf], tx: EventSender) -> Self {
        match Self::native(roots, tx.clone()) {
            Ok(backend) => backend,
            Err(e) => {
                log!("warning"; "native file watcher unavailable ({}), falling back to polling", e);
                Self::poll(roots, tx)
            }
        }
    }

    pub(super) fn native(roots: &[PathBuf], tx: EventSender) -> notify::Result<Self> {
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        for root in roots {
            watcher.watch(root, mode_for(root))?;
        }
        Ok(Self::Native(watcher))
    }

    pub(super) fn poll(roots: &[PathBuf], tx: EventSender) -> Self {
        let mut watchers = Vec::with_capacity(roots.len());
        for root in roots {
            // PollWatcher accepts paths that do not exist yet.
            if !root.exists() {
                log!("warning"; "cannot watch {}: path does not exist", root.display());
                continue;
            }
            let tx = tx.clone();
            let config = Config::default().with_poll_interval(Duration::from_millis(POLL_INTERVAL_MS));
            let attached = PollWatcher::new(
                move |res| {
                    let _ = tx.send(res);
                },
                config,
            )
            .and_then(|mut watcher| watcher.watch(root, mode_for(root)).map(|()| watcher));

            match attached {
                Ok(watcher) => watchers.push(watcher),
                Err(e) => log!("warning"; "cannot watch {}: {}", root.display(), e),
            }
        }
        Self::Poll(watchers)
    }

    pub(super) fn label(&self) -> &'static str {
        match self {
            Self::Native(_) => "native",
            Self::Poll(_) => "polling",
        }
    }
}

fn mode_for(path: &Path) -> RecursiveMode {
    if path.is_dir() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    }
}

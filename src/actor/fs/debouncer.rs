use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::utils::path::normalize_path;

pub(super) const DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Pure debouncer: only handles timing and event deduplication.
pub(super) struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Add a notify event. Metadata-only changes are dropped.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        for path in &event.paths {
            self.add_path(path, kind);
        }
    }

    /// Record one change, applying dedup rules:
    /// - Removed + Created/Modified → the new kind (file was restored)
    /// - Modified + Removed → Removed
    /// - Created + Removed → dropped
    /// - otherwise the first event wins
    pub(super) fn add_path(&mut self, path: &Path, kind: ChangeKind) {
        if is_temp_file(path) {
            return;
        }
        let path = normalize_path(path);

        match self.changes.get(&path).copied() {
            None => {
                crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                self.changes.insert(path, kind);
            }
            Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                self.changes.insert(path, ChangeKind::Removed);
            }
            Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                self.changes.remove(&path);
            }
            Some(_) => {}
        }
        self.last_event = Some(Instant::now());
    }

    /// Take the batch once the debounce window has passed quietly.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        (!changes.is_empty()).then_some(changes)
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, MetadataKind, ModifyKind, RemoveKind};

    fn elapse(debouncer: &mut Debouncer) {
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 10));
    }

    #[test]
    fn test_coalesces_repeated_events() {
        let mut d = Debouncer::new();
        for _ in 0..5 {
            d.add_path(Path::new("/site/pages/index.json"), ChangeKind::Modified);
        }
        d.add_path(Path::new("/site/pages/about.json"), ChangeKind::Modified);
        assert!(!d.is_ready());

        elapse(&mut d);
        let batch = d.take_if_ready().unwrap();
        assert_eq!(batch.len(), 2);
        assert!(d.take_if_ready().is_none());
    }

    #[test]
    fn test_not_ready_inside_window() {
        let mut d = Debouncer::new();
        d.add_path(Path::new("/site/pages/a.json"), ChangeKind::Created);
        assert!(d.take_if_ready().is_none());
        assert!(d.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));
    }

    #[test]
    fn test_dedup_rules() {
        let mut d = Debouncer::new();
        let p = Path::new("/site/pages/a.json");

        d.add_path(p, ChangeKind::Removed);
        d.add_path(p, ChangeKind::Created);
        assert_eq!(d.changes.get(p), Some(&ChangeKind::Created));

        d.add_path(p, ChangeKind::Removed);
        assert!(d.changes.is_empty());

        d.add_path(p, ChangeKind::Modified);
        d.add_path(p, ChangeKind::Removed);
        assert_eq!(d.changes.get(p), Some(&ChangeKind::Removed));
    }

    #[test]
    fn test_ignores_temp_files_and_metadata() {
        let mut d = Debouncer::new();
        d.add_path(Path::new("/site/pages/.index.json.swp"), ChangeKind::Modified);
        d.add_path(Path::new("/site/pages/index.json~"), ChangeKind::Modified);
        d.add_event(
            &notify::Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)))
                .add_path("/site/pages/index.json".into()),
        );
        assert!(d.changes.is_empty());
        assert!(d.last_event.is_none());

        d.add_event(
            &notify::Event::new(EventKind::Create(CreateKind::File))
                .add_path("/site/pages/new.json".into()),
        );
        d.add_event(
            &notify::Event::new(EventKind::Remove(RemoveKind::File))
                .add_path("/site/pages/gone.json".into()),
        );
        assert_eq!(d.changes.len(), 2);
    }
}

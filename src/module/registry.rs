//! Module cache with explicit dependency edges.
//!
//! Every loaded module is keyed by its canonical path and remembers which
//! modules it imported (children) and who imported it first (parent).
//! [`ModuleRegistry::evict`] walks those edges so the next import re-reads
//! the module and everything below it from disk.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::source::ModuleSource;
use super::{ModuleError, evaluate};
use crate::debug;
use crate::element::Element;
use crate::utils::path::normalize_path;

/// Export evaluated as a page's root element.
pub const ENTRY_EXPORT: &str = "page";

/// A loaded module.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub path: PathBuf,
    pub source: Arc<ModuleSource>,
    /// Import binding → resolved module path.
    pub imports: FxHashMap<String, PathBuf>,
    /// Modules this one imported, in first-import order.
    pub children: Vec<PathBuf>,
    /// The module that imported this one first.
    pub parent: Option<PathBuf>,
}

/// Owned module cache.
///
/// # Invariants
/// - Keys are normalized absolute paths
/// - A record is inserted before its imports load, so cycles terminate
/// - After `evict`, no record reachable from the evicted module remains
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    cache: FxHashMap<PathBuf, ModuleRecord>,
    /// Number of times a module was read and parsed from disk.
    executions: usize,
}

impl ModuleRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a module and its imports, returning its resolved path.
    ///
    /// Cached modules are returned as is. A module that fails to load (or
    /// whose imports fail) is left out of the cache.
    pub fn import(&mut self, path: &Path) -> Result<PathBuf, ModuleError> {
        self.import_from(path, None)
    }

    /// Evict a module and everything it transitively imported.
    ///
    /// Both the child lists and the import bindings are followed, and evicted
    /// paths are detached from every remaining importer.
    ///
    /// Returns the number of evicted records; unknown paths are a no-op.
    pub fn evict(&mut self, path: &Path) -> usize {
        let id = normalize_path(path);
        if !self.cache.contains_key(&id) {
            return 0;
        }

        // Iterative DFS: dependency chains may be arbitrarily deep.
        let mut stack = vec![id];
        let mut visited = FxHashSet::default();
        let mut evicted = 0;
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let Some(record) = self.cache.remove(&current) else {
                continue;
            };

            evicted += 1;
            stack.extend(record.children);
            stack.extend(record.imports.into_values());
        }

        // A shared module may be listed under several importers, not only its first parent.
        for record in self.cache.values_mut() {
            record.children.retain(|child| !visited.contains(child));
        }

        debug!("module"; "evicted {} module(s) from {}", evicted, path.display());
        evicted
    }

    /// Evaluate the `page` export of a loaded module.
    pub fn evaluate_entry(&self, path: &Path) -> Result<Element, ModuleError> {
        let id = normalize_path(path);
        let record = self
            .cache
            .get(&id)
            .ok_or_else(|| ModuleError::NotLoaded(id.clone()))?;
        if !record.source.exports.contains_key(ENTRY_EXPORT) {
            return Err(ModuleError::MissingEntryPoint(id));
        }
        evaluate::entry(self, &id, ENTRY_EXPORT)
    }

    #[inline]
    pub fn get(&self, path: &Path) -> Option<&ModuleRecord> {
        self.cache.get(path)
    }

    #[inline]
    pub fn contains(&self, path: &Path) -> bool {
        self.cache.contains_key(&normalize_path(path))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[inline]
    pub fn executions(&self) -> usize {
        self.executions
    }

    // -------------------------------------------------------------------------
    // Private
    // -------------------------------------------------------------------------

    fn import_from(&mut self, path: &Path, importer: Option<&Path>) -> Result<PathBuf, ModuleError> {
        if !path.is_file() {
            return Err(ModuleError::NotFound(path.to_path_buf()));
        }
        let id = normalize_path(path);

        if self.cache.contains_key(&id) {
            self.link(importer, &id);
            return Ok(id);
        }

        let text = std::fs::read_to_string(&id).map_err(|source| ModuleError::Io {
            path: id.clone(),
            source,
        })?;
        let source = ModuleSource::parse(&text).map_err(|message| ModuleError::Parse {
            path: id.clone(),
            message,
        })?;
        let source = Arc::new(source);
        self.executions += 1;

        self.cache.insert(
            id.clone(),
            ModuleRecord {
                path: id.clone(),
                source: Arc::clone(&source),
                imports: FxHashMap::default(),
                children: Vec::new(),
                parent: importer.map(Path::to_path_buf),
            },
        );
        self.link(importer, &id);

        let dir = id.parent().unwrap_or_else(|| Path::new("/")).to_path_buf();
        for (binding, specifier) in &source.imports {
            match self.import_from(&dir.join(specifier), Some(&id)) {
                Ok(dep) => {
                    if let Some(record) = self.cache.get_mut(&id) {
                        record.imports.insert(binding.clone(), dep);
                    }
                }
                Err(err) => {
                    self.evict(&id);
                    return Err(err);
                }
            }
        }

        Ok(id)
    }

    /// Record `child` under `importer`'s children.
    fn link(&mut self, importer: Option<&Path>, child: &Path) {
        let Some(record) = importer.and_then(|p| self.cache.get_mut(p)) else {
            return;
        };
        if !record.children.iter().any(|c| c == child) {
            record.children.push(child.to_path_buf());
        }
    }
}

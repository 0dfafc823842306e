//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "public"      # Rendered site
//! pages = "pages"        # Page modules, one output page each
//! static = "static"      # Copied verbatim into the output directory
//! extension = "json"     # Page module file extension
//! deps = ["components"]  # Extra paths the dev server watches
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::path::normalize_path;

/// Build paths. Relative paths are resolved against the site root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub output: PathBuf,
    pub pages: PathBuf,
    #[serde(rename = "static")]
    pub static_dir: PathBuf,
    /// Extension of page module files, without the dot.
    pub extension: String,
    /// Additional files or directories to watch.
    pub deps: Vec<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "public".into(),
            pages: "pages".into(),
            static_dir: "static".into(),
            extension: "json".into(),
            deps: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Resolve every path against `root`.
    pub fn normalize(&mut self, root: &Path) {
        self.output = normalize_path(&root.join(&self.output));
        self.pages = normalize_path(&root.join(&self.pages));
        self.static_dir = normalize_path(&root.join(&self.static_dir));
        self.deps = self
            .deps
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();
    }

    /// Whether `path` is a page module by extension.
    pub fn is_page(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == self.extension)
    }
}

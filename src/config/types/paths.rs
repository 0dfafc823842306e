//! Resolved site directories, handed to hooks.

use std::path::PathBuf;

/// Absolute site directories after config resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub root: PathBuf,
    pub output: PathBuf,
    pub pages: PathBuf,
    pub static_dir: PathBuf,
}

impl SitePaths {
    /// `$PAGEKILN_*` variables describing these paths.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("PAGEKILN_ROOT", self.root.display().to_string()),
            ("PAGEKILN_OUTPUT_DIR", self.output.display().to_string()),
            ("PAGEKILN_PAGES_DIR", self.pages.display().to_string()),
            ("PAGEKILN_STATIC_DIR", self.static_dir.display().to_string()),
        ]
    }
}

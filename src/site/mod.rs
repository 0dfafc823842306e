//! Site builder: render every page module and copy static assets.
//!
//! ```text
//! pages/*.json ──evict/import/evaluate──► Element ──render_page──► public/**/index.html
//! static/**    ──────────────copy─────────────────────────────────► public/**
//!                                                         └──► after-render hook
//! ```
//!
//! Both passes run concurrently. Every page is rendered in memory before any
//! output is written, so a failing page leaves the previous output in place.

mod assets;
mod hooks;
mod output;
mod pages;

pub use hooks::{AfterRender, CommandHooks, HookError, NoHooks};
pub use output::{output_path, write_atomic};

use jwalk::{Parallelism, WalkDir};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::debug;
use crate::module::{ModuleError, ModuleRegistry};
use crate::render::RenderError;

/// Why a single page failed.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to render page {}", path.display())]
    Page {
        path: PathBuf,
        #[source]
        source: PageError,
    },

    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Hook(#[from] HookError),
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Every regular file under `dir`, dotfiles included, in sorted order.
///
/// The walk is serial: both passes already run on the rayon pool and a
/// nested parallel walk would be refused by jwalk. Walk errors fail the build.
pub(crate) fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .sort(true)
    {
        let entry = entry.map_err(|err| BuildError::Io {
            path: err.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf),
            source: err.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Summary of one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub pages: usize,
    pub assets: usize,
}

/// Render all pages, copy static assets, then run `hook`.
///
/// The registry lock is held per page across evict, import and evaluation,
/// so concurrent pages never observe a half-evicted dependency graph.
pub fn render_site(
    config: &SiteConfig,
    registry: &Mutex<ModuleRegistry>,
    hook: &dyn AfterRender,
) -> Result<BuildStats, BuildError> {
    let (pages, assets) = rayon::join(
        || pages::render_pages(&config.build, registry),
        || assets::copy_static(&config.build.static_dir, &config.build.output),
    );
    let stats = BuildStats {
        pages: pages?,
        assets: assets?,
    };

    hook.after_render(&config.paths())?;
    debug!("build"; "{} page(s), {} asset(s)", stats.pages, stats.assets);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn page(text: &str) -> String {
        json!({"exports": {"page": {"body": {"tag": "html", "children": [text]}}}}).to_string()
    }

    fn build(root: &Path) -> Result<BuildStats, BuildError> {
        let config = test_site_config(root);
        let registry = Mutex::new(ModuleRegistry::new());
        render_site(&config, &registry, &NoHooks)
    }

    #[test]
    fn test_renders_pages_and_assets() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "pages/index.json", &page("home"));
        write(root, "pages/about.json", &page("about"));
        write(root, "pages/blog/index.json", &page("blog"));
        write(root, "pages/blog/first.json", &page("first"));
        write(root, "static/css/site.css", "body{}");

        let stats = build(root).unwrap();
        assert_eq!(stats, BuildStats { pages: 4, assets: 1 });

        let out = root.join("public");
        assert_eq!(
            fs::read_to_string(out.join("index.html")).unwrap(),
            "<!DOCTYPE html><html>home</html>"
        );
        assert!(out.join("about/index.html").is_file());
        assert!(out.join("blog/index.html").is_file());
        assert!(out.join("blog/first/index.html").is_file());
        assert_eq!(fs::read_to_string(out.join("css/site.css")).unwrap(), "body{}");
    }

    #[test]
    fn test_non_page_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages/index.json", &page("home"));
        write(dir.path(), "pages/notes.txt", "not a page");

        assert_eq!(build(dir.path()).unwrap().pages, 1);
        assert!(!dir.path().join("public/notes").exists());
    }

    #[test]
    fn test_missing_static_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages/index.json", &page("home"));
        assert_eq!(build(dir.path()).unwrap().assets, 0);
    }

    #[test]
    fn test_missing_pages_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = build(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }

    #[test]
    fn test_failing_page_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "pages/index.json", &page("v1"));
        write(root, "pages/other.json", &page("other"));
        build(root).unwrap();

        write(root, "pages/index.json", &page("v2"));
        write(
            root,
            "pages/other.json",
            &json!({"exports": {"page": {"body": {"tag": "div"}}}}).to_string(),
        );

        let err = build(root).unwrap_err();
        let BuildError::Page { path, source } = err else {
            panic!("expected page error");
        };
        assert!(path.ends_with("other.json"));
        assert!(matches!(source, PageError::Render(RenderError::NonHtmlRoot(_))));
        assert_eq!(
            fs::read_to_string(root.join("public/index.html")).unwrap(),
            "<!DOCTYPE html><html>v1</html>"
        );
    }

    #[test]
    fn test_missing_entry_point_names_page() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages/index.json", r#"{"exports": {}}"#);

        let err = build(dir.path()).unwrap_err();
        assert!(err.to_string().contains("index.json"));
        assert!(matches!(
            err,
            BuildError::Page { source: PageError::Module(ModuleError::MissingEntryPoint(_)), .. }
        ));
    }

    #[test]
    fn test_shared_component_is_fresh_for_every_page() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let layout = |version: &str| {
            json!({"exports": {"Layout": {"body": {"tag": "html", "children": [version]}}}}).to_string()
        };
        let user = json!({
            "imports": {"Layout": "../components/layout.json"},
            "exports": {"page": {"body": {"component": "Layout"}}}
        })
        .to_string();
        write(root, "components/layout.json", &layout("v1"));
        write(root, "pages/a.json", &user);
        write(root, "pages/b.json", &user);

        let config = test_site_config(root);
        let registry = Mutex::new(ModuleRegistry::new());
        render_site(&config, &registry, &NoHooks).unwrap();
        render_site(&config, &registry, &NoHooks).unwrap();

        write(root, "components/layout.json", &layout("v2"));
        render_site(&config, &registry, &NoHooks).unwrap();

        for page in ["a", "b"] {
            assert_eq!(
                fs::read_to_string(root.join("public").join(page).join("index.html")).unwrap(),
                "<!DOCTYPE html><html>v2</html>"
            );
        }
    }

    #[test]
    fn test_walk_files_inside_rayon_join() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/.hidden/x.txt", "x");
        write(dir.path(), "a/y.txt", "y");
        write(dir.path(), "b/z.txt", "z");

        let (a, b) = rayon::join(
            || walk_files(&dir.path().join("a")),
            || walk_files(&dir.path().join("b")),
        );
        let a = a.unwrap();
        assert_eq!(a.len(), 2);
        assert!(a.iter().any(|p| p.ends_with(".hidden/x.txt")));
        assert_eq!(b.unwrap().len(), 1);
    }

    #[test]
    fn test_rebuild_sees_edited_dependency() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let layout = |title: &str| {
            json!({"exports": {"Layout": {"body": {"tag": "html", "children": [title, {"prop": "children"}]}}}})
                .to_string()
        };
        write(root, "components/layout.json", &layout("A:"));
        write(
            root,
            "pages/index.json",
            &json!({
                "imports": {"Layout": "../components/layout.json"},
                "exports": {"page": {"body": {"component": "Layout", "children": ["body"]}}}
            })
            .to_string(),
        );

        let config = test_site_config(root);
        let registry = Mutex::new(ModuleRegistry::new());
        render_site(&config, &registry, &NoHooks).unwrap();

        write(root, "components/layout.json", &layout("B:"));
        render_site(&config, &registry, &NoHooks).unwrap();

        assert_eq!(
            fs::read_to_string(root.join("public/index.html")).unwrap(),
            "<!DOCTYPE html><html>B:body</html>"
        );
        assert_eq!(registry.lock().executions(), 4);
    }

    #[test]
    fn test_hook_runs_after_both_passes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pages/index.json", &page("home"));
        write(dir.path(), "static/a.txt", "a");

        let config = test_site_config(dir.path());
        let registry = Mutex::new(ModuleRegistry::new());
        let calls = AtomicUsize::new(0);
        let hook = |paths: &crate::config::SitePaths| -> Result<(), HookError> {
            assert!(paths.output.join("index.html").is_file());
            assert!(paths.output.join("a.txt").is_file());
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        render_site(&config, &registry, &hook).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

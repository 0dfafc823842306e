//! Page pass: evaluate every page module and write its HTML.

use parking_lot::Mutex;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use super::{BuildError, PageError, output, walk_files};
use crate::config::BuildConfig;
use crate::element::Element;
use crate::module::ModuleRegistry;
use crate::render::render_page;

pub(super) fn render_pages(
    build: &BuildConfig,
    registry: &Mutex<ModuleRegistry>,
) -> Result<usize, BuildError> {
    let pages = collect_pages(build)?;

    let rendered = pages
        .par_iter()
        .map(|page| {
            let html = render_one(page, registry).map_err(|source| BuildError::Page {
                path: page.clone(),
                source,
            })?;
            let target = output::output_path(page, &build.pages, &build.output).ok_or_else(|| {
                BuildError::Io {
                    path: page.clone(),
                    source: std::io::Error::other("page is outside the pages directory"),
                }
            })?;
            Ok((target, html))
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    for (target, html) in &rendered {
        output::write_atomic(target, html.as_bytes())?;
    }
    Ok(rendered.len())
}

/// Page files under the pages directory, sorted for stable logs.
fn collect_pages(build: &BuildConfig) -> Result<Vec<PathBuf>, BuildError> {
    if !build.pages.is_dir() {
        return Err(BuildError::Io {
            path: build.pages.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "pages directory does not exist",
            ),
        });
    }

    let mut pages = walk_files(&build.pages)?;
    pages.retain(|p| build.is_page(p));
    Ok(pages)
}

fn render_one(page: &Path, registry: &Mutex<ModuleRegistry>) -> Result<String, PageError> {
    let root: Element = {
        let mut registry = registry.lock();
        registry.evict(page);
        let id = registry.import(page)?;
        registry.evaluate_entry(&id)?
    };
    Ok(render_page(&root)?)
}

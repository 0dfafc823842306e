//! Static asset pass.

use std::fs;
use std::path::Path;

use super::{BuildError, walk_files};
use crate::log;

/// Copy every file under `static_dir` into `output` at the same relative path.
///
/// A missing static directory is an empty asset set.
pub(super) fn copy_static(static_dir: &Path, output: &Path) -> Result<usize, BuildError> {
    if !static_dir.is_dir() {
        return Ok(0);
    }

    let mut count = 0;
    for src in walk_files(static_dir)? {
        let Ok(rel) = src.strip_prefix(static_dir) else {
            log!("warning"; "skipping asset outside {}: {}", static_dir.display(), src.display());
            continue;
        };
        let dest = output.join(rel);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
        }
        fs::copy(&src, &dest).map_err(BuildError::io(&src))?;
        count += 1;
    }

    Ok(count)
}

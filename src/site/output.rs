//! Output path mapping and atomic writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::BuildError;

/// Map a page file to its output file.
///
/// `pages/a/foo.json` → `out/a/foo/index.html`, `pages/a/index.json` →
/// `out/a/index.html`. Returns `None` for files outside `pages_dir`.
pub fn output_path(page: &Path, pages_dir: &Path, output_dir: &Path) -> Option<PathBuf> {
    let rel = page.strip_prefix(pages_dir).ok()?;
    let stem = rel.file_stem()?;
    let dir = output_dir.join(rel.parent().unwrap_or(Path::new("")));

    Some(if stem == "index" {
        dir.join("index.html")
    } else {
        dir.join(stem).join("index.html")
    })
}

/// Write via a sibling temp file and rename, so readers never see a partial file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), BuildError> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(BuildError::io(parent))?;

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("out");
    let tmp = parent.join(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = fs::File::create(&tmp)
        .and_then(|mut file| file.write_all(content).and_then(|()| file.sync_all()))
        .and_then(|()| fs::rename(&tmp, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp);
        return Err(BuildError::Io {
            path: path.to_path_buf(),
            source: err,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path() {
        let pages = Path::new("/site/pages");
        let out = Path::new("/site/public");
        let map = |p: &str| output_path(Path::new(p), pages, out);

        assert_eq!(map("/site/pages/index.json"), Some(out.join("index.html")));
        assert_eq!(map("/site/pages/foo.json"), Some(out.join("foo/index.html")));
        assert_eq!(map("/site/pages/a/index.json"), Some(out.join("a/index.html")));
        assert_eq!(map("/site/pages/a/b/foo.json"), Some(out.join("a/b/foo/index.html")));
        assert_eq!(map("/elsewhere/foo.json"), None);
    }

    #[test]
    fn test_write_atomic_creates_dirs_and_replaces() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/index.html");

        write_atomic(&target, b"one").unwrap();
        write_atomic(&target, b"two").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "two");
        let leftovers = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}

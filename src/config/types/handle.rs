//! Global config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement, so
//! `pagekiln.toml` can be edited while the dev server runs.

use crate::config::SiteConfig;
use anyhow::Result;
use arc_swap::ArcSwap;
use rustc_hash::FxBuildHasher;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<SiteConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(SiteConfig::default()));

/// Hash of the config file content last loaded (0 = no file).
static CONFIG_HASH: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn cfg() -> Arc<SiteConfig> {
    CONFIG.load_full()
}

fn content_hash(config: &SiteConfig) -> u64 {
    std::fs::read_to_string(&config.config_path)
        .map(|content| FxBuildHasher.hash_one(content))
        .unwrap_or(0)
}

/// Reload config from disk if the file changed.
///
/// Returns `Ok(true)` if config was replaced, `Ok(false)` if unchanged.
/// On error the current config stays in place.
pub fn reload_config() -> Result<bool> {
    let current = cfg();
    let new_hash = content_hash(&current);
    if new_hash == CONFIG_HASH.load(Ordering::Relaxed) {
        return Ok(false);
    }

    let new_config = SiteConfig::load_at(&current.root, &current.config_path, current.cli)?;
    CONFIG.store(Arc::new(new_config));
    CONFIG_HASH.store(new_hash, Ordering::Relaxed);
    Ok(true)
}

#[inline]
pub fn init_config(config: SiteConfig) -> Arc<SiteConfig> {
    CONFIG_HASH.store(content_hash(&config), Ordering::Relaxed);
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}

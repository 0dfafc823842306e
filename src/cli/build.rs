//! `pagekiln build`: render the site once.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::time::Instant;

use crate::config::SiteConfig;
use crate::log;
use crate::module::ModuleRegistry;
use crate::site::{BuildStats, CommandHooks, render_site};
use crate::utils::path::relative_to;

/// Render every page, copy static assets and run the after-render hooks.
pub fn build_site(config: &SiteConfig, registry: &Mutex<ModuleRegistry>) -> Result<BuildStats> {
    let hooks = CommandHooks::new(&config.hooks.after_render);
    render_site(config, registry, &hooks)
        .with_context(|| format!("failed to build site at {}", config.root.display()))
}

/// Entry point for the `build` subcommand.
pub fn run(config: &SiteConfig) -> Result<()> {
    let started = Instant::now();
    let registry = Mutex::new(ModuleRegistry::new());
    let stats = build_site(config, &registry)?;

    log!(
        "build";
        "{} page(s), {} asset(s) → {} in {:.2?}",
        stats.pages,
        stats.assets,
        relative_to(&config.build.output, &config.root),
        started.elapsed()
    );
    Ok(())
}

//! Site configuration management for `pagekiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build], [serve], [hooks]
//! ├── types/         # ConfigError, global handle, SitePaths
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The config file is optional: a site with only a `pages/` directory
//! builds with the defaults.

pub mod section;
pub mod types;

pub use section::{BuildConfig, HookConfig, HooksConfig, ServeConfig};
pub use types::{ConfigError, SitePaths, cfg, init_config, reload_config};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug, log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, looked up in the site root.
pub const CONFIG_FILE: &str = "pagekiln.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pagekiln.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file, which may not exist
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub hooks: HooksConfig,
}

impl SiteConfig {
    /// Load configuration for the parsed command line.
    ///
    /// The root is `ROOT_DIR` when given, else the nearest ancestor of the
    /// working directory holding a config file, else the working directory.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = Self::resolve_root(cli)?;
        let config_path = root.join(&cli.config);
        Self::load_at(&root, &config_path, Some(cli))
    }

    /// Load configuration for an explicit root and config path.
    pub fn load_at(root: &Path, config_path: &Path, cli: Option<&'static Cli>) -> Result<Self> {
        let mut config = if config_path.is_file() {
            Self::from_path(config_path)?
        } else {
            debug!("config"; "{} not found, using defaults", config_path.display());
            Self::default()
        };

        config.cli = cli;
        config.root = normalize_path(root);
        config.config_path = normalize_path(config_path);
        if let Some(cli) = cli {
            config.apply_command_options(cli);
        }
        let root = config.root.clone();
        config.build.normalize(&root);
        config.validate()?;

        Ok(config)
    }

    fn resolve_root(cli: &Cli) -> Result<PathBuf> {
        if let Some(root) = &cli.command.build_args().root {
            if !root.is_dir() {
                bail!(ConfigError::Validation(format!(
                    "site root `{}` is not a directory",
                    root.display()
                )));
            }
            return Ok(root.clone());
        }

        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Ok(find_config_file(&cwd, &cli.config)
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .unwrap_or(cwd))
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {} ignored: {}", path.display(), ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Resolved site directories.
    pub fn paths(&self) -> SitePaths {
        SitePaths {
            root: self.root.clone(),
            output: self.build.output.clone(),
            pages: self.build.pages.clone(),
            static_dir: self.build.static_dir.clone(),
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Serve {
                build_args,
                interface,
                port,
                watch,
                live_reload,
            } => {
                self.apply_build_args(build_args);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
                Self::update_option(&mut self.serve.live_reload, live_reload.as_ref());
            }
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.build.pages, args.pages.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate resolved (absolute) paths.
    pub fn validate(&self) -> Result<()> {
        let build = &self.build;
        if build.extension.is_empty() || build.extension.starts_with('.') {
            bail!(ConfigError::Validation(format!(
                "[build] extension must be non-empty and without a leading dot, got `{}`",
                build.extension
            )));
        }
        for (name, dir) in [("pages", &build.pages), ("static", &build.static_dir)] {
            if build.output == *dir || dir.starts_with(&build.output) || build.output.starts_with(dir) {
                bail!(ConfigError::Validation(format!(
                    "[build] output `{}` must not overlap {} `{}`",
                    build.output.display(),
                    name,
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

/// Find `config_name` in `start` or its ancestors.
fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with default directories and no config file.
#[cfg(test)]
pub fn test_site_config(root: &Path) -> SiteConfig {
    SiteConfig::load_at(root, &root.join(CONFIG_FILE), None).unwrap()
}

// ============================================================================
// tests
// ============================================================================

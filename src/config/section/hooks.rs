//! `[hooks]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [[hooks.after_render]]
//! command = ["npx", "tailwindcss", "-o", "$PAGEKILN_OUTPUT_DIR/site.css"]
//!
//! [[hooks.after_render]]
//! name = "sitemap"
//! command = ["./scripts/sitemap.sh"]
//! quiet = false
//! ```

use serde::Deserialize;

/// Hooks run by the site builder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Run in order once all pages and assets are written.
    pub after_render: Vec<HookConfig>,
}

/// A single hook command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    pub enable: bool,

    /// Display name for logging (defaults to command[0]).
    pub name: Option<String>,

    /// Command and arguments. `$PAGEKILN_*` variables are substituted.
    pub command: Vec<String>,

    /// Suppress the command's stdout.
    pub quiet: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            enable: true,
            name: None,
            command: Vec::new(),
            quiet: true,
        }
    }
}

impl HookConfig {
    /// `name` if set, otherwise `command[0]`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.command.first().map_or("hook", String::as_str))
    }
}

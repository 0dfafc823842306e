//! After-render hooks.
//!
//! Hooks run once per build after pages and assets are written. Commands
//! from `[[hooks.after_render]]` receive the site directories as
//! `$PAGEKILN_*` environment variables and placeholders.

use std::process::Command;
use thiserror::Error;

use crate::config::{HookConfig, SitePaths};
use crate::log;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to spawn hook `{name}`")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hook `{name}` failed ({status})")]
    Failed { name: String, status: String },
}

/// Runs after a successful build with the resolved site paths.
pub trait AfterRender: Sync {
    fn after_render(&self, paths: &SitePaths) -> Result<(), HookError>;
}

impl<F> AfterRender for F
where
    F: Fn(&SitePaths) -> Result<(), HookError> + Sync,
{
    fn after_render(&self, paths: &SitePaths) -> Result<(), HookError> {
        self(paths)
    }
}

/// No-op hook.
pub struct NoHooks;

impl AfterRender for NoHooks {
    fn after_render(&self, _: &SitePaths) -> Result<(), HookError> {
        Ok(())
    }
}

/// Configured shell commands, run in order from the site root.
pub struct CommandHooks<'a> {
    hooks: &'a [HookConfig],
}

impl<'a> CommandHooks<'a> {
    pub fn new(hooks: &'a [HookConfig]) -> Self {
        Self { hooks }
    }
}

impl AfterRender for CommandHooks<'_> {
    fn after_render(&self, paths: &SitePaths) -> Result<(), HookError> {
        let vars = paths.env_vars();
        for hook in self.hooks {
            run_hook(hook, paths, &vars)?;
        }
        Ok(())
    }
}

fn run_hook(hook: &HookConfig, paths: &SitePaths, vars: &[(&str, String)]) -> Result<(), HookError> {
    let Some((program, args)) = hook.command.split_first() else {
        return Ok(());
    };
    if !hook.enable {
        return Ok(());
    }

    let name = hook.display_name().to_string();
    if !hook.quiet {
        log!("hook"; "`{}` running", name);
    }

    let output = Command::new(program)
        .args(resolve_args(args, vars))
        .current_dir(&paths.root)
        .envs(vars.iter().map(|(k, v)| (*k, v.as_str())))
        .output()
        .map_err(|source| HookError::Spawn {
            name: name.clone(),
            source,
        })?;

    if !hook.quiet {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if !stdout.is_empty() {
            println!("{stdout}");
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !stderr.is_empty() {
            log!("hook"; "`{}`: {}", name, stderr);
        }
        return Err(HookError::Failed {
            name,
            status: output.status.to_string(),
        });
    }
    Ok(())
}

/// Replace `$PAGEKILN_*` placeholders in command arguments.
fn resolve_args(args: &[String], vars: &[(&str, String)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for (key, value) in vars {
                result = result.replace(&format!("${key}"), value);
            }
            result
        })
        .collect()
}

//! Configuration section definitions.
//!
//! Each module corresponds to a section in `pagekiln.toml`:
//!
//! | Module  | TOML Section | Purpose                              |
//! |---------|--------------|--------------------------------------|
//! | `build` | `[build]`    | Output, pages and static directories |
//! | `serve` | `[serve]`    | Development server                   |
//! | `hooks` | `[hooks]`    | Commands run after each site render  |

mod build;
mod hooks;
mod serve;

pub use build::BuildConfig;
pub use hooks::{HookConfig, HooksConfig};
pub use serve::ServeConfig;

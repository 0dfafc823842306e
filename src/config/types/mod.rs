//! Configuration utility types.
//!
//! | Module   | Purpose                                   |
//! |----------|-------------------------------------------|
//! | `error`  | Configuration error types                 |
//! | `handle` | Global configuration handle (thread-safe) |
//! | `paths`  | Resolved site directories                 |

mod error;
pub mod handle;
mod paths;

pub use error::ConfigError;
pub use handle::{cfg, init_config, reload_config};
pub use paths::SitePaths;

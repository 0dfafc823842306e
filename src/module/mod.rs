//! Compiled page modules: loading, caching, invalidation and evaluation.
//!
//! - [`ModuleRegistry`]: the module cache and its eviction walk
//! - [`source`]: the JSON module format
//! - `evaluate`: export body → element tree

mod evaluate;
mod registry;
pub mod source;

pub use registry::{ENTRY_EXPORT, ModuleRecord, ModuleRegistry};

use std::path::PathBuf;
use thiserror::Error;

use crate::element::ElementError;

/// Errors resolving, loading or evaluating a module.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("cannot resolve module {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read module {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid module {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("module {} must export `page`", .0.display())]
    MissingEntryPoint(PathBuf),

    #[error("module {} is not loaded", .0.display())]
    NotLoaded(PathBuf),

    #[error("unknown template `{name}` in {}", .module.display())]
    UnknownTemplate { name: String, module: PathBuf },

    #[error("template `{name}` in {} must produce a tag, got {got}", .module.display())]
    NotATag {
        name: String,
        module: PathBuf,
        got: String,
    },

    #[error("templates in {} nest deeper than {limit} levels", .module.display())]
    TooDeep { module: PathBuf, limit: usize },

    #[error(transparent)]
    Element(#[from] ElementError),
}

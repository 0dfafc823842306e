//! Actor Message Definitions
//!
//! ```text
//! FsActor --Changes--> RebuildActor --Reload--> WsActor
//! ```

use std::path::PathBuf;

/// Messages to RebuildActor
#[derive(Debug)]
pub enum RebuildMsg {
    /// One debounced batch of changed paths
    Changes(Vec<PathBuf>),
    Shutdown,
}

/// Messages to WsActor
#[derive(Debug, PartialEq, Eq)]
pub enum WsMsg {
    /// Build `generation` is on disk, tell clients to reload
    Reload { generation: u64 },
    Shutdown,
}

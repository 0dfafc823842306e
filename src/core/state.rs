//! Dev server state.
//!
//! `PHASE` follows `Starting → Listening → (Rebuilding ⇄ Listening) → Stopped`.
//! `SHUTDOWN` is set once by the Ctrl+C handler and never cleared.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerPhase {
    Starting = 0,
    Listening = 1,
    Rebuilding = 2,
    Stopped = 3,
}

impl ServerPhase {
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Starting,
            1 => Self::Listening,
            2 => Self::Rebuilding,
            _ => Self::Stopped,
        }
    }

    /// Whether `self → next` is a legal transition.
    pub const fn can_enter(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Starting, Self::Listening)
                | (Self::Listening, Self::Rebuilding)
                | (Self::Rebuilding, Self::Listening)
                | (_, Self::Stopped)
        )
    }
}

static PHASE: AtomicU8 = AtomicU8::new(ServerPhase::Starting as u8);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

// =============================================================================
// PHASE
// =============================================================================

pub fn phase() -> ServerPhase {
    ServerPhase::from_u8(PHASE.load(Ordering::SeqCst))
}

/// Move to `next` if the transition is legal; returns whether it happened.
///
/// `Stopped` is terminal.
pub fn enter_phase(next: ServerPhase) -> bool {
    PHASE
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
            let current = ServerPhase::from_u8(current);
            (current != ServerPhase::Stopped && current.can_enter(next)).then_some(next as u8)
        })
        .is_ok()
}

// =============================================================================
// SHUTDOWN
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_server()`: exits immediately
/// - After `register_server()`: unblocks the server and notifies actors
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::ServerPhase::*;

    #[test]
    fn test_transitions() {
        assert!(Starting.can_enter(Listening));
        assert!(Listening.can_enter(Rebuilding));
        assert!(Rebuilding.can_enter(Listening));
        assert!(Rebuilding.can_enter(Stopped));

        assert!(!Starting.can_enter(Rebuilding));
        assert!(!Listening.can_enter(Starting));
        assert!(!Rebuilding.can_enter(Rebuilding));
    }

    #[test]
    fn test_from_u8_roundtrip() {
        for phase in [Starting, Listening, Rebuilding, Stopped] {
            assert_eq!(super::ServerPhase::from_u8(phase as u8), phase);
        }
    }
}

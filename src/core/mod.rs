//! Process-wide dev server state.

mod state;

pub use state::{
    ServerPhase, enter_phase, is_shutdown, phase, register_server, setup_shutdown_handler,
};

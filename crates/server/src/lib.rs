//! Observer API server for the Orbit Engine simulation.
//!
//! Exposes the engine over:
//!
//! - a WebSocket endpoint (`/ws/engine`) streaming per-tick state snapshots
//!   with bounded, drop-oldest backpressure per session
//! - REST endpoints for time control, body focus, trajectory and porkchop
//!   planning, and mission launch
//!
//! All REST reads go through the engine handle's latest-snapshot watch or
//! pure ephemeris propagation, so observers never block the tick cycle.

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use router::build_router;
pub use server::{serve, ServerError};
pub use state::AppState;

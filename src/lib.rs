//! Facade over the Orbit Engine workspace crates.
//!
//! The physics, planning, simulation, and serving layers live in their own
//! crates; re-exporting them here lets front-ends and the integration tests
//! address one coherent API.

pub use orbit_config as config;
pub use orbit_ephemeris as ephemeris;
pub use orbit_impulsive as impulsive;
pub use orbit_planner as planner;
pub use orbit_server as server;
pub use orbit_sim as sim;

/// Returns the version of the workspace for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Heliocentric ephemeris built from a fixed mean-element catalog.
//!
//! The catalog holds the Sun and the eight planets with their J2000 mean
//! orbital elements; propagation is pure two-body Kepler, so a state vector
//! is a function of `(body, seconds since epoch)` and nothing else.

use thiserror::Error;

pub mod bodies;
pub mod conic;
pub mod kepler;

pub use bodies::{catalog, get_body, Body, BodyId, OrbitalElements};
pub use kepler::{propagate, StateVector};

/// Errors surfaced while resolving bodies or propagating orbits.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("unknown body `{name}`")]
    UnknownBody { name: String },
    #[error("Kepler iteration failed to converge after {iterations} iterations")]
    ConvergenceFailure { iterations: u32 },
}

impl EphemerisError {
    /// Stable machine-readable kind tag, used in wire error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            EphemerisError::UnknownBody { .. } => "UnknownBody",
            EphemerisError::ConvergenceFailure { .. } => "ConvergenceFailure",
        }
    }
}

/// Resolve a case-insensitive body name from the external boundary.
pub fn parse_body(name: &str) -> Result<BodyId, EphemerisError> {
    let lowered = name.trim().to_ascii_lowercase();
    BodyId::ALL
        .iter()
        .copied()
        .find(|id| id.key() == lowered)
        .ok_or_else(|| EphemerisError::UnknownBody {
            name: name.to_string(),
        })
}

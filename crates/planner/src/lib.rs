//! Mission planning: single transfers and porkchop launch-window grids.

use orbit_ephemeris::EphemerisError;
use orbit_impulsive::LambertError;
use thiserror::Error;

pub mod porkchop;
pub mod transfer;

pub use porkchop::{PorkchopGrid, PorkchopRequest, TimeWindow};
pub use transfer::{compute_transfer, Transfer, TrajectorySample};

/// Planner-level failures surfaced to the requesting session.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("no feasible transfers in the requested window")]
    NoFeasibleTransfers,
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    #[error(transparent)]
    Lambert(#[from] LambertError),
}

impl PlannerError {
    /// Stable machine-readable kind tag, used in wire error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::NoFeasibleTransfers => "NoFeasibleTransfers",
            PlannerError::Ephemeris(err) => err.kind(),
            PlannerError::Lambert(err) => err.kind(),
        }
    }
}

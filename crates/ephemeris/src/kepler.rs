//! Two-body Kepler propagation from mean elements.

use orbit_core::vector::Vector3;
use serde::{Deserialize, Serialize};

use crate::bodies::{get_body, BodyId, OrbitalElements};
use crate::EphemerisError;

/// Convergence tolerance for the eccentric-anomaly Newton iteration.
const KEPLER_TOLERANCE: f64 = 1e-12;
/// Iteration cap before reporting `ConvergenceFailure`.
const KEPLER_MAX_ITERATIONS: u32 = 50;

/// Heliocentric position and velocity, SI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position_m: Vector3,
    pub velocity_m_s: Vector3,
}

impl StateVector {
    /// The state pinned to the origin (the Sun).
    pub const ZERO: StateVector = StateVector {
        position_m: [0.0, 0.0, 0.0],
        velocity_m_s: [0.0, 0.0, 0.0],
    };
}

/// Propagate a catalog body to `t` seconds past epoch J.
///
/// Pure in `(body, t)`: mean anomaly M = M₀ + n·t, Newton on Kepler's
/// equation for E, true anomaly from the half-angle identity, then the
/// perifocal state rotated by Rz(Ω)·Rx(i)·Rz(ω) into the heliocentric
/// ecliptic frame. Velocity comes from the analytic Ė = n/(1 − e·cos E).
pub fn propagate(id: BodyId, t_seconds: f64) -> Result<StateVector, EphemerisError> {
    let body = get_body(id);
    let elements = match body.elements.as_ref() {
        Some(elements) => elements,
        None => return Ok(StateVector::ZERO),
    };
    let n = body
        .mean_motion_rad_s()
        .unwrap_or(0.0);

    let mean_anomaly =
        (elements.mean_anomaly_epoch_rad + n * t_seconds).rem_euclid(std::f64::consts::TAU);
    let eccentric_anomaly = solve_kepler(mean_anomaly, elements.eccentricity)?;

    Ok(state_from_anomaly(elements, n, eccentric_anomaly))
}

/// Solve M = E − e·sin E for E by Newton iteration starting at E₀ = M.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, EphemerisError> {
    let mut e_anom = mean_anomaly;
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let residual = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let derivative = 1.0 - eccentricity * e_anom.cos();
        let delta = residual / derivative;
        e_anom -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            return Ok(e_anom);
        }
    }
    Err(EphemerisError::ConvergenceFailure {
        iterations: KEPLER_MAX_ITERATIONS,
    })
}

fn state_from_anomaly(elements: &OrbitalElements, n: f64, e_anom: f64) -> StateVector {
    let a = elements.semi_major_axis_m;
    let e = elements.eccentricity;

    let true_anomaly = 2.0
        * ((1.0 + e).sqrt() * (e_anom / 2.0).sin())
            .atan2((1.0 - e).sqrt() * (e_anom / 2.0).cos());
    let radius = a * (1.0 - e * e_anom.cos());

    let position_pf = [
        radius * true_anomaly.cos(),
        radius * true_anomaly.sin(),
        0.0,
    ];

    // dE/dt from Kepler's equation; perifocal velocity follows analytically.
    let e_dot = n / (1.0 - e * e_anom.cos());
    let velocity_pf = [
        -a * e_anom.sin() * e_dot,
        a * (1.0 - e * e).sqrt() * e_anom.cos() * e_dot,
        0.0,
    ];

    StateVector {
        position_m: rotate_to_ecliptic(position_pf, elements),
        velocity_m_s: rotate_to_ecliptic(velocity_pf, elements),
    }
}

/// Rotate a perifocal vector by ω about +z, i about +x, then Ω about +z.
fn rotate_to_ecliptic(v: Vector3, elements: &OrbitalElements) -> Vector3 {
    let (sin_w, cos_w) = elements.arg_periapsis_rad.sin_cos();
    let (sin_i, cos_i) = elements.inclination_rad.sin_cos();
    let (sin_o, cos_o) = elements.ascending_node_rad.sin_cos();

    let x1 = v[0] * cos_w - v[1] * sin_w;
    let y1 = v[0] * sin_w + v[1] * cos_w;

    let y2 = y1 * cos_i;
    let z2 = y1 * sin_i;

    [
        x1 * cos_o - y2 * sin_o,
        x1 * sin_o + y2 * cos_o,
        z2,
    ]
}

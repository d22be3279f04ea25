//! Keplerian propagation of an arbitrary conic arc from a state vector.
//!
//! Universal-variable (Stumpff) formulation: the osculating orbit at
//! `(r0, v0)` is advanced by `dt` without converting through classical
//! elements, which keeps near-ecliptic transfer arcs away from the Ω/ω
//! singularities. Used for planner trajectory sampling and live mission
//! positions.

use orbit_core::vector;

use crate::kepler::StateVector;
use crate::EphemerisError;

const UNIVERSAL_TOLERANCE: f64 = 1e-8;
const UNIVERSAL_MAX_ITERATIONS: u32 = 60;

/// Propagate the conic defined by `state` around a body of parameter `mu`
/// by `dt_seconds`.
pub fn propagate_arc(
    state: &StateVector,
    mu: f64,
    dt_seconds: f64,
) -> Result<StateVector, EphemerisError> {
    if dt_seconds == 0.0 {
        return Ok(*state);
    }

    let r0 = state.position_m;
    let v0 = state.velocity_m_s;
    let r0n = vector::norm(&r0);
    let v02 = vector::dot(&v0, &v0);
    let rdotv = vector::dot(&r0, &v0);
    let sqrt_mu = mu.sqrt();

    // Reciprocal semi-major axis; sign selects the conic family.
    let alpha = 2.0 / r0n - v02 / mu;

    let mut chi = if alpha > 1e-12 {
        sqrt_mu * dt_seconds * alpha
    } else {
        sqrt_mu * dt_seconds / r0n
    };

    let mut converged = false;
    let mut radius = r0n;
    let mut psi = 0.0;
    let mut c2 = 0.5;
    let mut c3 = 1.0 / 6.0;

    for _ in 0..UNIVERSAL_MAX_ITERATIONS {
        let chi2 = chi * chi;
        psi = alpha * chi2;
        let (s2, s3) = stumpff_c2c3(psi);
        c2 = s2;
        c3 = s3;

        radius = chi2 * c2 + rdotv / sqrt_mu * chi * (1.0 - psi * c3) + r0n * (1.0 - psi * c2);
        let residual = chi2 * chi * c3
            + rdotv / sqrt_mu * chi2 * c2
            + r0n * chi * (1.0 - psi * c3)
            - sqrt_mu * dt_seconds;

        let delta = residual / radius;
        chi -= delta;
        if delta.abs() < UNIVERSAL_TOLERANCE * chi.abs().max(1.0) {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(EphemerisError::ConvergenceFailure {
            iterations: UNIVERSAL_MAX_ITERATIONS,
        });
    }

    let chi2 = chi * chi;
    let f = 1.0 - chi2 / r0n * c2;
    let g = dt_seconds - chi2 * chi / sqrt_mu * c3;
    let g_dot = 1.0 - chi2 / radius * c2;
    let f_dot = sqrt_mu / (radius * r0n) * chi * (psi * c3 - 1.0);

    Ok(StateVector {
        position_m: vector::add(&vector::scale(&r0, f), &vector::scale(&v0, g)),
        velocity_m_s: vector::add(&vector::scale(&r0, f_dot), &vector::scale(&v0, g_dot)),
    })
}

/// Stumpff coefficients c₂(ψ) and c₃(ψ), series-expanded near zero.
fn stumpff_c2c3(psi: f64) -> (f64, f64) {
    if psi > 1e-6 {
        let sqrt_psi = psi.sqrt();
        (
            (1.0 - sqrt_psi.cos()) / psi,
            (sqrt_psi - sqrt_psi.sin()) / (psi * sqrt_psi),
        )
    } else if psi < -1e-6 {
        let sqrt_neg = (-psi).sqrt();
        (
            (1.0 - sqrt_neg.cosh()) / psi,
            (sqrt_neg.sinh() - sqrt_neg) / (-psi * sqrt_neg),
        )
    } else {
        (0.5 - psi / 24.0, 1.0 / 6.0 - psi / 120.0)
    }
}

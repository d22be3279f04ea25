//! Lambert's problem in the Izzo universal-variable formulation.
//!
//! Given two position vectors and a time of flight about a central body,
//! find the terminal velocities of the connecting conic. Zero-revolution
//! transfers only; the solver is unit-agnostic as long as positions, time,
//! and μ agree.

use orbit_core::vector::{self, Vector3};
use thiserror::Error;

/// Residual tolerance on the non-dimensional time equation |T(x) − T*|.
const TIME_TOLERANCE: f64 = 1e-8;
/// Householder iteration cap before reporting `ConvergenceFailure`.
const MAX_ITERATIONS: u32 = 35;
/// Sine of the transfer angle below which the geometry is unusable.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Failure modes of the Lambert solver.
#[derive(Debug, Error)]
pub enum LambertError {
    #[error("time of flight must be positive (got {tof_s} s)")]
    InvalidTimeOfFlight { tof_s: f64 },
    #[error("transfer geometry is degenerate")]
    DegenerateGeometry,
    #[error("multi-revolution transfers are not supported (requested {revolutions})")]
    UnsupportedRevolutions { revolutions: u32 },
    #[error("Lambert iteration failed to converge after {iterations} iterations")]
    ConvergenceFailure { iterations: u32 },
}

impl LambertError {
    /// Stable machine-readable kind tag, used in wire error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            LambertError::InvalidTimeOfFlight { .. } => "InvalidTimeOfFlight",
            LambertError::DegenerateGeometry => "DegenerateGeometry",
            LambertError::UnsupportedRevolutions { .. } => "UnsupportedRevolutions",
            LambertError::ConvergenceFailure { .. } => "ConvergenceFailure",
        }
    }
}

/// Solve Lambert's problem between `r1` and `r2` with time of flight
/// `tof_s` about a body of gravitational parameter `mu`.
///
/// Returns the velocity vectors at `r1` and `r2`. `prograde` selects the
/// direction of motion relative to +z of the frame; `revolutions` must be 0.
pub fn solve(
    r1: Vector3,
    r2: Vector3,
    tof_s: f64,
    mu: f64,
    prograde: bool,
    revolutions: u32,
) -> Result<(Vector3, Vector3), LambertError> {
    if tof_s <= 0.0 {
        return Err(LambertError::InvalidTimeOfFlight { tof_s });
    }
    if revolutions > 0 {
        return Err(LambertError::UnsupportedRevolutions { revolutions });
    }

    let r1n = vector::norm(&r1);
    let r2n = vector::norm(&r2);
    if r1n == 0.0 || r2n == 0.0 {
        return Err(LambertError::DegenerateGeometry);
    }

    let chord = vector::sub(&r2, &r1);
    let c = vector::norm(&chord);
    let s = (r1n + r2n + c) / 2.0;

    let ir1 = vector::scale(&r1, 1.0 / r1n);
    let ir2 = vector::scale(&r2, 1.0 / r2n);
    let h = vector::cross(&ir1, &ir2);
    let hn = vector::norm(&h);
    if hn < COLLINEAR_TOLERANCE {
        // Collinear endpoints: opposite vectors leave the transfer plane
        // undefined, coincident ones leave the tangential direction undefined.
        return Err(LambertError::DegenerateGeometry);
    }
    let ih = vector::scale(&h, 1.0 / hn);

    let mut lambda = (1.0 - (c / s).min(1.0)).sqrt();
    let (mut it1, mut it2) = if ih[2] < 0.0 {
        // Transfer angle exceeds π for prograde motion.
        lambda = -lambda;
        (vector::cross(&ir1, &ih), vector::cross(&ir2, &ih))
    } else {
        (vector::cross(&ih, &ir1), vector::cross(&ih, &ir2))
    };
    if !prograde {
        lambda = -lambda;
        it1 = vector::scale(&it1, -1.0);
        it2 = vector::scale(&it2, -1.0);
    }

    let t_target = tof_s * (2.0 * mu / s.powi(3)).sqrt();
    let (x, y) = householder(lambda, t_target)?;

    let gamma = (mu * s / 2.0).sqrt();
    let rho = (r1n - r2n) / c;
    let sigma = (1.0 - rho * rho).max(0.0).sqrt();

    let vr1 = gamma * ((lambda * y - x) - rho * (lambda * y + x)) / r1n;
    let vr2 = -gamma * ((lambda * y - x) + rho * (lambda * y + x)) / r2n;
    let vt1 = gamma * sigma * (y + lambda * x) / r1n;
    let vt2 = gamma * sigma * (y + lambda * x) / r2n;

    let v1 = vector::add(&vector::scale(&ir1, vr1), &vector::scale(&it1, vt1));
    let v2 = vector::add(&vector::scale(&ir2, vr2), &vector::scale(&it2, vt2));
    Ok((v1, v2))
}

fn calc_y(x: f64, lambda: f64) -> f64 {
    (1.0 - lambda * lambda * (1.0 - x * x)).max(0.0).sqrt()
}

/// Non-dimensional time of flight T(x, λ) for the zero-revolution branch.
fn time_of_flight(x: f64, y: f64, lambda: f64) -> f64 {
    let battin_window = (0.6_f64.sqrt())..(1.4_f64.sqrt());
    if battin_window.contains(&x) {
        // Battin series stays stable through the parabolic point x = 1.
        let eta = y - lambda * x;
        let s1 = (1.0 - lambda - x * eta) / 2.0;
        let q = 4.0 / 3.0 * hyp2f1(s1);
        (eta.powi(3) * q + 4.0 * lambda * eta) / 2.0
    } else {
        let psi = if (-1.0..1.0).contains(&x) {
            (x * y + lambda * (1.0 - x * x)).acos()
        } else if x > 1.0 {
            ((y - x * lambda) * (x * x - 1.0).sqrt()).asinh()
        } else {
            0.0
        };
        (psi / (1.0 - x * x).abs().sqrt() - x + lambda * y) / (1.0 - x * x)
    }
}

fn dtof(x: f64, y: f64, t: f64, lambda: f64) -> f64 {
    (3.0 * t * x - 2.0 + 2.0 * lambda.powi(3) * x / y) / (1.0 - x * x)
}

fn d2tof(x: f64, y: f64, t: f64, dt: f64, lambda: f64) -> f64 {
    (3.0 * t + 5.0 * x * dt + 2.0 * (1.0 - lambda * lambda) * lambda.powi(3) / y.powi(3))
        / (1.0 - x * x)
}

fn d3tof(x: f64, y: f64, dt: f64, ddt: f64, lambda: f64) -> f64 {
    (7.0 * x * ddt + 8.0 * dt - 6.0 * (1.0 - lambda * lambda) * lambda.powi(5) * x / y.powi(5))
        / (1.0 - x * x)
}

/// Third-order Householder iteration on T(x) − T*, from x₀ = 0.
fn householder(lambda: f64, t_target: f64) -> Result<(f64, f64), LambertError> {
    let mut x = 0.0_f64;
    for _ in 0..MAX_ITERATIONS {
        let y = calc_y(x, lambda);
        let t = time_of_flight(x, y, lambda);
        let residual = t - t_target;
        if residual.abs() < TIME_TOLERANCE {
            return Ok((x, y));
        }

        let dt = dtof(x, y, t, lambda);
        let ddt = d2tof(x, y, t, dt, lambda);
        let dddt = d3tof(x, y, dt, ddt, lambda);

        let step = residual * (dt * dt - residual * ddt / 2.0)
            / (dt * (dt * dt - residual * ddt) + dddt * residual * residual / 6.0);
        let mut next = x - step;
        if next <= -1.0 {
            // Zero-rev solutions live on x > −1; bisect toward the boundary
            // instead of leaving the domain.
            next = (x - 1.0) / 2.0;
        }
        x = next;
    }
    Err(LambertError::ConvergenceFailure {
        iterations: MAX_ITERATIONS,
    })
}

/// Gauss hypergeometric series ₂F₁(3, 1; 5/2; x) used by the Battin branch.
fn hyp2f1(x: f64) -> f64 {
    if x >= 1.0 {
        return f64::INFINITY;
    }
    let mut res = 1.0;
    let mut term = 1.0;
    let mut i = 0.0_f64;
    loop {
        term = term * (3.0 + i) * (1.0 + i) / (5.0 / 2.0 + i) * x / (i + 1.0);
        let previous = res;
        res += term;
        if previous == res {
            return res;
        }
        i += 1.0;
    }
}

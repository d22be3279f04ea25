//! Single-transfer evaluation: Lambert terminal velocities, launch energy,
//! and sampled trajectory points along the arc.

use orbit_core::constants::MU_SUN;
use orbit_core::units;
use orbit_core::vector::{self, Vector3};
use orbit_ephemeris::{conic, kepler, BodyId, StateVector};
use orbit_impulsive::lambert;

use crate::PlannerError;

/// Points sampled along the transfer arc for visualization.
const TRAJECTORY_SAMPLES: usize = 100;

/// One evenly spaced point on the transfer arc.
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySample {
    /// Seconds since epoch J.
    pub t_s: f64,
    pub position_m: Vector3,
}

/// A fully evaluated interplanetary transfer.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub departure: BodyId,
    pub arrival: BodyId,
    pub t_dep_s: f64,
    pub t_arr_s: f64,
    pub tof_s: f64,
    pub r1_m: Vector3,
    pub r2_m: Vector3,
    pub v1_m_s: Vector3,
    pub v2_m_s: Vector3,
    pub vinf_dep_m_s: f64,
    pub vinf_arr_m_s: f64,
    /// Characteristic energy |v∞_dep|², km²/s².
    pub c3_km2_s2: f64,
    /// Impulsive free-flight total |v∞_dep| + |v∞_arr|, km/s.
    pub delta_v_km_s: f64,
    pub samples: Vec<TrajectorySample>,
}

/// Scalar figures shared between single transfers and porkchop cells.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TransferMetrics {
    pub v1_m_s: Vector3,
    pub v2_m_s: Vector3,
    pub vinf_dep_m_s: f64,
    pub vinf_arr_m_s: f64,
    pub c3_km2_s2: f64,
    pub delta_v_km_s: f64,
}

/// Solve the prograde zero-revolution Lambert branch between two body
/// states and derive the planner's reported figures.
pub(crate) fn metrics(
    dep_state: &StateVector,
    arr_state: &StateVector,
    tof_s: f64,
) -> Result<TransferMetrics, PlannerError> {
    let (v1, v2) = lambert::solve(
        dep_state.position_m,
        arr_state.position_m,
        tof_s,
        MU_SUN,
        true,
        0,
    )?;

    let vinf_dep_vec = vector::sub(&v1, &dep_state.velocity_m_s);
    let vinf_arr_vec = vector::sub(&v2, &arr_state.velocity_m_s);
    let vinf_dep = vector::norm(&vinf_dep_vec);
    let vinf_arr = vector::norm(&vinf_arr_vec);

    Ok(TransferMetrics {
        v1_m_s: v1,
        v2_m_s: v2,
        vinf_dep_m_s: vinf_dep,
        vinf_arr_m_s: vinf_arr,
        c3_km2_s2: units::m2s2_to_km2s2(vinf_dep * vinf_dep),
        delta_v_km_s: units::ms_to_kms(vinf_dep + vinf_arr),
    })
}

/// Evaluate the transfer from `departure` at `t_dep_s` to `arrival` at
/// `t_arr_s` (seconds since epoch J), including the sampled arc.
pub fn compute_transfer(
    departure: BodyId,
    arrival: BodyId,
    t_dep_s: f64,
    t_arr_s: f64,
) -> Result<Transfer, PlannerError> {
    let tof_s = t_arr_s - t_dep_s;
    let dep_state = kepler::propagate(departure, t_dep_s)?;
    let arr_state = kepler::propagate(arrival, t_arr_s)?;

    let figures = metrics(&dep_state, &arr_state, tof_s)?;
    let samples = sample_arc(&dep_state.position_m, &figures.v1_m_s, t_dep_s, tof_s)?;

    Ok(Transfer {
        departure,
        arrival,
        t_dep_s,
        t_arr_s,
        tof_s,
        r1_m: dep_state.position_m,
        r2_m: arr_state.position_m,
        v1_m_s: figures.v1_m_s,
        v2_m_s: figures.v2_m_s,
        vinf_dep_m_s: figures.vinf_dep_m_s,
        vinf_arr_m_s: figures.vinf_arr_m_s,
        c3_km2_s2: figures.c3_km2_s2,
        delta_v_km_s: figures.delta_v_km_s,
        samples,
    })
}

fn sample_arc(
    r1_m: &Vector3,
    v1_m_s: &Vector3,
    t_dep_s: f64,
    tof_s: f64,
) -> Result<Vec<TrajectorySample>, PlannerError> {
    let start = StateVector {
        position_m: *r1_m,
        velocity_m_s: *v1_m_s,
    };
    let mut samples = Vec::with_capacity(TRAJECTORY_SAMPLES);
    for step in 0..TRAJECTORY_SAMPLES {
        let fraction = step as f64 / (TRAJECTORY_SAMPLES - 1) as f64;
        let dt = tof_s * fraction;
        let state = conic::propagate_arc(&start, MU_SUN, dt)?;
        samples.push(TrajectorySample {
            t_s: t_dep_s + dt,
            position_m: state.position_m,
        });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use orbit_core::time;
    use orbit_core::vector;

    use super::*;

    #[test]
    fn earth_self_transfer_over_one_period_is_nearly_free() {
        let t_dep = time::parse_instant("2024-01-01T00:00:00Z").unwrap();
        let t_arr = time::parse_instant("2025-01-01T00:00:00Z").unwrap();
        let transfer = compute_transfer(BodyId::Earth, BodyId::Earth, t_dep, t_arr).unwrap();

        assert!(
            transfer.delta_v_km_s < 0.1,
            "self-transfer delta-v {} km/s",
            transfer.delta_v_km_s
        );
        assert!(
            transfer.c3_km2_s2 < 0.5,
            "self-transfer C3 {} km2/s2",
            transfer.c3_km2_s2
        );
    }

    #[test]
    fn arc_samples_start_and_end_on_the_endpoints() {
        let t_dep = time::parse_instant("2024-10-07T00:00:00Z").unwrap();
        let t_arr = time::parse_instant("2025-08-18T00:00:00Z").unwrap();
        let transfer = compute_transfer(BodyId::Earth, BodyId::Mars, t_dep, t_arr).unwrap();

        assert!(transfer.samples.len() >= 30);
        let first = transfer.samples.first().unwrap();
        let last = transfer.samples.last().unwrap();
        let start_error = vector::norm(&vector::sub(&first.position_m, &transfer.r1_m));
        let end_error = vector::norm(&vector::sub(&last.position_m, &transfer.r2_m));
        assert!(start_error < 1.0, "first sample off by {start_error} m");
        assert!(end_error < 1_000.0, "last sample off by {end_error} m");
    }

    #[test]
    fn reversed_dates_fail_with_invalid_time_of_flight() {
        let t_dep = time::parse_instant("2025-01-01T00:00:00Z").unwrap();
        let t_arr = time::parse_instant("2024-01-01T00:00:00Z").unwrap();
        let err = compute_transfer(BodyId::Earth, BodyId::Mars, t_dep, t_arr).unwrap_err();
        assert_eq!(err.kind(), "InvalidTimeOfFlight");
    }
}

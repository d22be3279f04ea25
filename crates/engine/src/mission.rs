//! Spacecraft missions riding precomputed transfer arcs.

use orbit_core::constants::MU_SUN;
use orbit_core::vector::Vector3;
use orbit_ephemeris::{conic, StateVector};
use orbit_planner::Transfer;
use serde::Serialize;

/// Lifecycle of a launched mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    Pending,
    Active,
    Completed,
    Failed,
}

/// One launched mission. Created by the launch command and owned by the
/// engine; never mutated again once completed or failed.
#[derive(Debug, Clone)]
pub struct Mission {
    pub id: String,
    pub transfer: Transfer,
    pub status: MissionStatus,
    pub progress: f64,
    pub current_position_m: Option<Vector3>,
}

impl Mission {
    /// Build mission `sequence` from a resolved transfer, settling its
    /// initial status against the current simulation time.
    pub fn new(sequence: u64, transfer: Transfer, sim_time_s: f64) -> Self {
        let current_position_m = Some(transfer.r1_m);
        let mut mission = Mission {
            id: format!("mission-{sequence}"),
            transfer,
            status: MissionStatus::Pending,
            progress: 0.0,
            current_position_m,
        };
        mission.advance(sim_time_s);
        mission
    }

    /// Per-tick lifecycle update: pending → active at t_dep, active →
    /// completed at t_arr, with progress and position derived from sim
    /// time (never integrated, so time-scale changes cannot distort the
    /// arc). A propagation failure parks the mission as `failed`.
    pub fn advance(&mut self, sim_time_s: f64) {
        match self.status {
            MissionStatus::Completed | MissionStatus::Failed => return,
            MissionStatus::Pending => {
                if sim_time_s < self.transfer.t_dep_s {
                    return;
                }
                self.status = MissionStatus::Active;
            }
            MissionStatus::Active => {}
        }

        if sim_time_s >= self.transfer.t_arr_s {
            self.status = MissionStatus::Completed;
            self.progress = 1.0;
            self.current_position_m = Some(self.transfer.r2_m);
            return;
        }

        self.progress = ((sim_time_s - self.transfer.t_dep_s) / self.transfer.tof_s).clamp(0.0, 1.0);

        let start = StateVector {
            position_m: self.transfer.r1_m,
            velocity_m_s: self.transfer.v1_m_s,
        };
        match conic::propagate_arc(&start, MU_SUN, sim_time_s - self.transfer.t_dep_s) {
            Ok(state) => self.current_position_m = Some(state.position_m),
            Err(err) => {
                tracing::warn!(mission = %self.id, error = %err, "mission arc propagation failed");
                self.status = MissionStatus::Failed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use orbit_core::time;
    use orbit_ephemeris::BodyId;
    use orbit_planner::compute_transfer;

    use super::*;

    fn mars_transfer() -> Transfer {
        let t_dep = time::parse_instant("2026-11-15T00:00:00Z").unwrap();
        let t_arr = time::parse_instant("2027-09-01T00:00:00Z").unwrap();
        compute_transfer(BodyId::Earth, BodyId::Mars, t_dep, t_arr).unwrap()
    }

    #[test]
    fn future_departure_starts_pending() {
        let transfer = mars_transfer();
        let mission = Mission::new(1, transfer.clone(), transfer.t_dep_s - 100.0);
        assert_eq!(mission.status, MissionStatus::Pending);
        assert_eq!(mission.progress, 0.0);
    }

    #[test]
    fn lifecycle_progresses_in_order_with_monotonic_progress() {
        let transfer = mars_transfer();
        let t_dep = transfer.t_dep_s;
        let tof = transfer.tof_s;
        let mut mission = Mission::new(7, transfer, t_dep - 10.0);

        let mut previous = mission.progress;
        for step in 0..=10 {
            let sim_time = t_dep + tof * step as f64 / 10.0;
            mission.advance(sim_time);
            assert!(mission.progress >= previous, "progress regressed");
            previous = mission.progress;
        }
        assert_eq!(mission.status, MissionStatus::Completed);
        assert_eq!(mission.progress, 1.0);
    }

    #[test]
    fn midcourse_progress_tracks_sim_time_not_wall_time() {
        let transfer = mars_transfer();
        let t_dep = transfer.t_dep_s;
        let tof = transfer.tof_s;
        let mut mission = Mission::new(2, transfer, t_dep);
        mission.advance(t_dep + tof * 0.25);
        assert_eq!(mission.status, MissionStatus::Active);
        assert!((mission.progress - 0.25).abs() < 1e-9);
        assert!(mission.current_position_m.is_some());
    }

    #[test]
    fn completed_missions_are_frozen() {
        let transfer = mars_transfer();
        let t_arr = transfer.t_arr_s;
        let r2 = transfer.r2_m;
        let mut mission = Mission::new(3, transfer, t_arr + 1.0);
        assert_eq!(mission.status, MissionStatus::Completed);
        mission.advance(t_arr + 1.0e6);
        assert_eq!(mission.progress, 1.0);
        assert_eq!(mission.current_position_m, Some(r2));
    }
}

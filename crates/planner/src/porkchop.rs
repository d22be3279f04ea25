//! Porkchop grid generation: C₃ / Δv / time-of-flight surfaces over a
//! departure × arrival date window.

use std::time::{Duration, Instant};

use orbit_core::time::seconds_to_days;
use orbit_ephemeris::{kepler, BodyId, StateVector};

use crate::transfer::metrics;
use crate::PlannerError;

/// Inclusive date window along one grid axis, seconds since epoch J.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start_s: f64,
    pub end_s: f64,
}

impl TimeWindow {
    /// `count` evenly spaced instants across the window, endpoints included.
    pub fn axis(&self, count: usize) -> Vec<f64> {
        let count = count.max(1);
        if count == 1 {
            return vec![self.start_s];
        }
        let span = self.end_s - self.start_s;
        (0..count)
            .map(|step| self.start_s + span * step as f64 / (count - 1) as f64)
            .collect()
    }
}

/// Inputs for one porkchop evaluation.
#[derive(Debug, Clone)]
pub struct PorkchopRequest {
    pub departure: BodyId,
    pub arrival: BodyId,
    pub departure_window: TimeWindow,
    pub arrival_window: TimeWindow,
    /// Departure-axis resolution (grid rows).
    pub grid_rows: usize,
    /// Arrival-axis resolution (grid columns).
    pub grid_cols: usize,
}

/// The evaluated surfaces. Cells where no conic connects the endpoints
/// (reversed dates, degenerate geometry, solver non-convergence) are `None`.
#[derive(Debug, Clone)]
pub struct PorkchopGrid {
    pub departure_dates_s: Vec<f64>,
    pub arrival_dates_s: Vec<f64>,
    pub c3_km2_s2: Vec<Vec<Option<f64>>>,
    pub delta_v_km_s: Vec<Vec<Option<f64>>>,
    pub tof_days: Vec<Vec<Option<f64>>>,
    /// True when a deadline expired before every row was evaluated.
    pub partial: bool,
}

struct RowResult {
    c3: Vec<Option<f64>>,
    delta_v: Vec<Option<f64>>,
    tof: Vec<Option<f64>>,
}

/// Evaluate the full grid synchronously (no deadline).
pub fn generate(request: &PorkchopRequest) -> Result<PorkchopGrid, PlannerError> {
    let mut builder = GridBuilder::new(request);
    while builder.evaluate_next_row() {}
    builder.finish(false)
}

/// Evaluate the grid on a cooperative task: yields between rows and stops
/// at the first row boundary past `deadline`, returning the partial grid
/// with the remaining cells null.
pub async fn generate_with_deadline(
    request: &PorkchopRequest,
    deadline: Duration,
) -> Result<PorkchopGrid, PlannerError> {
    let started = Instant::now();
    let mut builder = GridBuilder::new(request);
    let mut expired = false;
    loop {
        if started.elapsed() >= deadline {
            expired = true;
            break;
        }
        if !builder.evaluate_next_row() {
            break;
        }
        tokio::task::yield_now().await;
    }
    builder.finish(expired)
}

struct GridBuilder {
    departure_dates: Vec<f64>,
    arrival_dates: Vec<f64>,
    dep_states: Vec<Option<StateVector>>,
    arr_states: Vec<Option<StateVector>>,
    rows: Vec<RowResult>,
}

impl GridBuilder {
    fn new(request: &PorkchopRequest) -> Self {
        let departure_dates = request.departure_window.axis(request.grid_rows);
        let arrival_dates = request.arrival_window.axis(request.grid_cols);

        // Kepler states are computed once per axis and shared by every cell.
        let dep_states = axis_states(request.departure, &departure_dates);
        let arr_states = axis_states(request.arrival, &arrival_dates);

        GridBuilder {
            departure_dates,
            arrival_dates,
            dep_states,
            arr_states,
            rows: Vec::new(),
        }
    }

    /// Evaluate one departure row; returns false once the grid is complete.
    fn evaluate_next_row(&mut self) -> bool {
        let row_index = self.rows.len();
        if row_index >= self.departure_dates.len() {
            return false;
        }

        let dep_t = self.departure_dates[row_index];
        let dep_state = self.dep_states[row_index];
        let cols = self.arrival_dates.len();
        let mut row = RowResult {
            c3: vec![None; cols],
            delta_v: vec![None; cols],
            tof: vec![None; cols],
        };

        if let Some(dep_state) = dep_state {
            for (col, (&arr_t, arr_state)) in self
                .arrival_dates
                .iter()
                .zip(self.arr_states.iter())
                .enumerate()
            {
                let arr_state = match arr_state {
                    Some(state) => state,
                    None => continue,
                };
                let tof = arr_t - dep_t;
                if tof <= 0.0 {
                    continue;
                }
                // Numeric failures are holes in the surface, not errors.
                if let Ok(cell) = metrics(&dep_state, arr_state, tof) {
                    row.c3[col] = Some(cell.c3_km2_s2);
                    row.delta_v[col] = Some(cell.delta_v_km_s);
                    row.tof[col] = Some(seconds_to_days(tof));
                }
            }
        }

        self.rows.push(row);
        true
    }

    fn finish(self, partial: bool) -> Result<PorkchopGrid, PlannerError> {
        let rows_total = self.departure_dates.len();
        let cols = self.arrival_dates.len();
        let mut c3 = Vec::with_capacity(rows_total);
        let mut delta_v = Vec::with_capacity(rows_total);
        let mut tof = Vec::with_capacity(rows_total);

        let mut any_cell = false;
        for row in &self.rows {
            any_cell |= row.c3.iter().any(Option::is_some);
        }
        if !any_cell && !partial {
            return Err(PlannerError::NoFeasibleTransfers);
        }

        for row in self.rows {
            c3.push(row.c3);
            delta_v.push(row.delta_v);
            tof.push(row.tof);
        }
        // Rows the deadline cut off stay entirely null.
        while c3.len() < rows_total {
            c3.push(vec![None; cols]);
            delta_v.push(vec![None; cols]);
            tof.push(vec![None; cols]);
        }

        Ok(PorkchopGrid {
            departure_dates_s: self.departure_dates,
            arrival_dates_s: self.arrival_dates,
            c3_km2_s2: c3,
            delta_v_km_s: delta_v,
            tof_days: tof,
            partial,
        })
    }
}

fn axis_states(body: BodyId, dates: &[f64]) -> Vec<Option<StateVector>> {
    dates
        .iter()
        .map(|&t| kepler::propagate(body, t).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use orbit_core::time;

    use super::*;

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow {
            start_s: time::parse_instant(start).unwrap(),
            end_s: time::parse_instant(end).unwrap(),
        }
    }

    #[test]
    fn axis_is_inclusive_and_evenly_spaced() {
        let axis = window("2026-01-01", "2026-01-05").axis(5);
        assert_eq!(axis.len(), 5);
        assert!((axis[1] - axis[0] - 86_400.0).abs() < 1e-6);
        assert!((axis[4] - time::parse_instant("2026-01-05").unwrap()).abs() < 1e-6);
    }

    #[test]
    fn reversed_cells_are_holes_not_errors() {
        let request = PorkchopRequest {
            departure: BodyId::Earth,
            arrival: BodyId::Mars,
            departure_window: window("2026-06-01", "2026-06-10"),
            arrival_window: window("2026-05-01", "2027-06-01"),
            grid_rows: 3,
            grid_cols: 6,
        };
        let grid = generate(&request).unwrap();
        // Arrival dates before departure must be null, later ones populated.
        assert!(grid.c3_km2_s2[0][0].is_none());
        assert!(grid.c3_km2_s2.iter().flatten().any(Option::is_some));
    }

    #[test]
    fn fully_reversed_window_reports_no_feasible_transfers() {
        let request = PorkchopRequest {
            departure: BodyId::Earth,
            arrival: BodyId::Mars,
            departure_window: window("2027-01-01", "2027-02-01"),
            arrival_window: window("2026-01-01", "2026-02-01"),
            grid_rows: 4,
            grid_cols: 4,
        };
        let err = generate(&request).unwrap_err();
        assert!(matches!(err, PlannerError::NoFeasibleTransfers));
    }

    #[tokio::test]
    async fn expired_deadline_returns_partial_grid() {
        let request = PorkchopRequest {
            departure: BodyId::Earth,
            arrival: BodyId::Mars,
            departure_window: window("2026-04-01", "2026-12-01"),
            arrival_window: window("2026-10-01", "2028-01-01"),
            grid_rows: 12,
            grid_cols: 12,
        };
        let grid = generate_with_deadline(&request, Duration::ZERO)
            .await
            .unwrap();
        assert!(grid.partial);
        assert_eq!(grid.c3_km2_s2.len(), 12);
        assert!(grid.c3_km2_s2.iter().flatten().all(Option::is_none));
    }

    #[tokio::test]
    async fn generous_deadline_completes_the_grid() {
        let request = PorkchopRequest {
            departure: BodyId::Earth,
            arrival: BodyId::Mars,
            departure_window: window("2026-04-01", "2026-12-01"),
            arrival_window: window("2026-10-01", "2028-01-01"),
            grid_rows: 8,
            grid_cols: 8,
        };
        let grid = generate_with_deadline(&request, Duration::from_secs(30))
            .await
            .unwrap();
        assert!(!grid.partial);
        assert!(grid.c3_km2_s2.iter().flatten().any(Option::is_some));
    }
}

use orbit_core::constants::MU_SUN;
use orbit_core::time;
use orbit_core::vector;
use orbit_engine::ephemeris::{self, conic, BodyId, StateVector};
use orbit_engine::impulsive::lambert;
use orbit_engine::planner::{porkchop, PorkchopRequest, TimeWindow};

/// Lambert round trip: propagating the departure state by the time of
/// flight must land within 1 km of the arrival position.
#[test]
fn solutions_propagate_onto_the_arrival_position() {
    let t_dep = time::parse_instant("2026-11-20T00:00:00Z").unwrap();
    let earth_period_s = ephemeris::get_body(BodyId::Earth).orbital_period_s().unwrap();

    for (arrival, tof_days) in [
        (BodyId::Mars, 200.0),
        (BodyId::Mars, 320.0),
        (BodyId::Venus, 150.0),
        (BodyId::Earth, 500.0),
    ] {
        let tof_s = time::days_to_seconds(tof_days);
        assert!(tof_s < 10.0 * earth_period_s);

        let dep = ephemeris::propagate(BodyId::Earth, t_dep).unwrap();
        let arr = ephemeris::propagate(arrival, t_dep + tof_s).unwrap();
        let (v1, _v2) = lambert::solve(
            dep.position_m,
            arr.position_m,
            tof_s,
            MU_SUN,
            true,
            0,
        )
        .unwrap();

        let start = StateVector {
            position_m: dep.position_m,
            velocity_m_s: v1,
        };
        let end = conic::propagate_arc(&start, MU_SUN, tof_s).unwrap();
        let miss = vector::norm(&vector::sub(&end.position_m, &arr.position_m));
        assert!(
            miss < 1_000.0,
            "earth->{arrival} over {tof_days} d missed by {miss} m"
        );
    }
}

/// Scenario: a 1x1 Earth-to-Earth grid one year apart finds the
/// circular-restart solution at near-zero cost.
#[test]
fn earth_self_transfer_grid_cell_is_nearly_free() {
    let request = PorkchopRequest {
        departure: BodyId::Earth,
        arrival: BodyId::Earth,
        departure_window: TimeWindow {
            start_s: time::parse_instant("2024-01-01T00:00:00Z").unwrap(),
            end_s: time::parse_instant("2024-01-02T00:00:00Z").unwrap(),
        },
        arrival_window: TimeWindow {
            start_s: time::parse_instant("2025-01-01T00:00:00Z").unwrap(),
            end_s: time::parse_instant("2025-01-02T00:00:00Z").unwrap(),
        },
        grid_rows: 1,
        grid_cols: 1,
    };

    let grid = porkchop::generate(&request).unwrap();
    let c3 = grid.c3_km2_s2[0][0].expect("single cell populated");
    let delta_v = grid.delta_v_km_s[0][0].expect("single cell populated");
    assert!(c3 < 0.5, "C3 {c3} km2/s2");
    assert!(delta_v < 0.1, "delta-v {delta_v} km/s");
}

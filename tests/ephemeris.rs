use orbit_core::constants::MU_SUN;
use orbit_core::vector;
use orbit_engine::ephemeris::{self, BodyId, StateVector};

const SAMPLE_TIMES_S: [f64; 5] = [0.0, 1.0e6, 5.0e7, 6.3e8, 2.4e9];

#[test]
fn orbital_energy_matches_the_semi_major_axis() {
    for &id in BodyId::ALL.iter().filter(|&&id| id != BodyId::Sun) {
        let body = ephemeris::get_body(id);
        let a = body.elements.as_ref().unwrap().semi_major_axis_m;
        let expected = -MU_SUN / (2.0 * a);

        for &t in &SAMPLE_TIMES_S {
            let state = ephemeris::propagate(id, t).unwrap();
            let r = vector::norm(&state.position_m);
            let v2 = vector::dot(&state.velocity_m_s, &state.velocity_m_s);
            let energy = v2 / 2.0 - MU_SUN / r;
            assert!(
                ((energy - expected) / expected).abs() < 1e-6,
                "{id} at t={t}: energy {energy} vs {expected}"
            );
        }
    }
}

#[test]
fn angular_momentum_matches_the_conic_parameters() {
    for &id in BodyId::ALL.iter().filter(|&&id| id != BodyId::Sun) {
        let body = ephemeris::get_body(id);
        let elements = body.elements.as_ref().unwrap();
        let expected = (MU_SUN
            * elements.semi_major_axis_m
            * (1.0 - elements.eccentricity * elements.eccentricity))
            .sqrt();

        for &t in &SAMPLE_TIMES_S {
            let state = ephemeris::propagate(id, t).unwrap();
            let h = vector::norm(&vector::cross(&state.position_m, &state.velocity_m_s));
            assert!(
                ((h - expected) / expected).abs() < 1e-6,
                "{id} at t={t}: |r x v| {h} vs {expected}"
            );
        }
    }
}

#[test]
fn propagation_repeats_after_one_orbital_period() {
    for &id in BodyId::ALL.iter().filter(|&&id| id != BodyId::Sun) {
        let period = ephemeris::get_body(id).orbital_period_s().unwrap();
        for &t in &[0.0, 3.3e7] {
            let now = ephemeris::propagate(id, t).unwrap();
            let next_lap = ephemeris::propagate(id, t + period).unwrap();
            let relative = vector::norm(&vector::sub(&now.position_m, &next_lap.position_m))
                / vector::norm(&now.position_m);
            assert!(
                relative < 1e-6,
                "{id}: position after one period drifted by {relative}"
            );
        }
    }
}

#[test]
fn the_sun_is_pinned_to_the_origin() {
    for &t in &SAMPLE_TIMES_S {
        assert_eq!(
            ephemeris::propagate(BodyId::Sun, t).unwrap(),
            StateVector::ZERO
        );
    }
}

#[test]
fn unknown_body_names_are_rejected_with_their_kind_tag() {
    let err = ephemeris::parse_body("planet-x").unwrap_err();
    assert_eq!(err.kind(), "UnknownBody");
    assert!(
        ephemeris::parse_body("  MARS ").is_ok(),
        "lookup is case-insensitive"
    );
}

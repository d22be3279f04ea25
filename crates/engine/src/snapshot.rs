//! Published views of simulation state.
//!
//! Snapshots are built once per tick and shared by `Arc`; sessions that
//! serialize the same snapshot produce byte-identical payloads because the
//! body map is ordered.

use std::collections::BTreeMap;

use orbit_core::{time, units, vector::Vector3};
use orbit_ephemeris::{Body, BodyId, StateVector};
use serde::Serialize;

use crate::mission::{Mission, MissionStatus};

/// Per-tick view of the whole simulation.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub tick: u64,
    /// Simulation seconds since epoch J.
    pub sim_time: f64,
    /// Wall-clock instant of the tick, ISO-8601.
    pub real_time: String,
    pub time_scale: f64,
    pub is_playing: bool,
    pub bodies: BTreeMap<BodyId, BodySnapshot>,
    pub missions: Vec<MissionSnapshot>,
}

/// One body's published state and catalog attributes.
#[derive(Debug, Clone, Serialize)]
pub struct BodySnapshot {
    pub name: &'static str,
    pub position_au: [f64; 3],
    pub velocity_ms: [f64; 3],
    pub mass_kg: f64,
    pub radius_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semi_major_axis_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eccentricity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbital_period_days: Option<f64>,
    pub color: &'static str,
    #[serde(rename = "type")]
    pub body_type: &'static str,
}

impl BodySnapshot {
    pub fn from_state(body: &Body, state: &StateVector) -> Self {
        BodySnapshot {
            name: body.name,
            position_au: to_au(&state.position_m),
            velocity_ms: state.velocity_m_s,
            mass_kg: body.mass_kg,
            radius_m: body.radius_m,
            semi_major_axis_m: body.elements.as_ref().map(|el| el.semi_major_axis_m),
            eccentricity: body.elements.as_ref().map(|el| el.eccentricity),
            orbital_period_days: body.orbital_period_days(),
            color: body.color,
            body_type: if body.id == BodyId::Sun {
                "star"
            } else {
                "planet"
            },
        }
    }
}

/// The external mission record (also the launch response).
#[derive(Debug, Clone, Serialize)]
pub struct MissionSnapshot {
    pub id: String,
    pub departure: BodyId,
    pub arrival: BodyId,
    pub departure_date: String,
    pub arrival_date: String,
    pub status: MissionStatus,
    pub progress: f64,
    /// Impulsive free-flight total, km/s.
    pub delta_v: f64,
    /// Characteristic energy, km²/s².
    pub c3: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_position_au: Option<[f64; 3]>,
    pub trajectory: Vec<TrajectoryPoint>,
}

/// One trajectory sample on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryPoint {
    pub t: String,
    pub position_au: [f64; 3],
}

impl MissionSnapshot {
    pub fn from_mission(mission: &Mission) -> Self {
        let transfer = &mission.transfer;
        MissionSnapshot {
            id: mission.id.clone(),
            departure: transfer.departure,
            arrival: transfer.arrival,
            departure_date: time::format_instant(transfer.t_dep_s),
            arrival_date: time::format_instant(transfer.t_arr_s),
            status: mission.status,
            progress: mission.progress,
            delta_v: transfer.delta_v_km_s,
            c3: transfer.c3_km2_s2,
            current_position_au: mission.current_position_m.as_ref().map(to_au),
            trajectory: transfer
                .samples
                .iter()
                .map(|sample| TrajectoryPoint {
                    t: time::format_instant(sample.t_s),
                    position_au: to_au(&sample.position_m),
                })
                .collect(),
        }
    }
}

fn to_au(v: &Vector3) -> [f64; 3] {
    [
        units::m_to_au(v[0]),
        units::m_to_au(v[1]),
        units::m_to_au(v[2]),
    ]
}

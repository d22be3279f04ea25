//! Wire types for the command channel and the request/response surface.
//!
//! All dates are ISO-8601 UTC strings here; conversion to internal epoch
//! seconds happens in the handlers.

use orbit_core::{time, units};
use orbit_ephemeris::{kepler, Body, BodyId};
use orbit_planner::{PorkchopGrid, Transfer};
use orbit_sim::{StateSnapshot, TrajectoryPoint};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Inbound session command, tagged by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Control {
        action: ControlAction,
        #[serde(default)]
        speed: Option<f64>,
    },
    Focus {
        body: String,
    },
    Subscribe,
    Unsubscribe,
}

/// Time-control verbs shared by the WebSocket and REST surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Play,
    Pause,
    SetSpeed,
}

/// REST body for `/api/control/time`.
#[derive(Debug, Deserialize)]
pub struct TimeControlRequest {
    pub action: ControlAction,
    #[serde(default)]
    pub speed: Option<f64>,
}

/// REST body for `/api/focus`.
#[derive(Debug, Deserialize)]
pub struct BodyFocusRequest {
    #[serde(alias = "body_name")]
    pub body: String,
}

/// One-shot transfer computation request.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub departure: String,
    pub arrival: String,
    pub departure_date: String,
    pub arrival_date: String,
}

/// Porkchop grid request. Launch requests reuse [`TransferRequest`]: a
/// precomputed `TransferResponse` payload carries the same four fields and
/// the extras are ignored, so the server re-resolves either shape.
#[derive(Debug, Deserialize)]
pub struct PorkchopApiRequest {
    pub departure: String,
    pub arrival: String,
    pub departure_start: String,
    pub departure_end: String,
    pub arrival_start: String,
    pub arrival_end: String,
    /// `[departure, arrival]` axis resolution; defaults from settings.
    #[serde(default)]
    pub grid: Option<[usize; 2]>,
}

/// Evaluated transfer on the wire.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub departure: BodyId,
    pub arrival: BodyId,
    pub departure_date: String,
    pub arrival_date: String,
    /// Characteristic energy, km²/s².
    pub c3: f64,
    /// Impulsive free-flight total, km/s.
    pub delta_v: f64,
    /// Days.
    pub time_of_flight: f64,
    pub trajectory: Vec<TrajectoryPoint>,
}

impl TransferResponse {
    pub fn from_transfer(transfer: &Transfer) -> Self {
        TransferResponse {
            departure: transfer.departure,
            arrival: transfer.arrival,
            departure_date: time::format_instant(transfer.t_dep_s),
            arrival_date: time::format_instant(transfer.t_arr_s),
            c3: transfer.c3_km2_s2,
            delta_v: transfer.delta_v_km_s,
            time_of_flight: time::seconds_to_days(transfer.tof_s),
            trajectory: transfer
                .samples
                .iter()
                .map(|sample| TrajectoryPoint {
                    t: time::format_instant(sample.t_s),
                    position_au: [
                        units::m_to_au(sample.position_m[0]),
                        units::m_to_au(sample.position_m[1]),
                        units::m_to_au(sample.position_m[2]),
                    ],
                })
                .collect(),
        }
    }
}

/// Porkchop surfaces on the wire; holes stay `null`.
#[derive(Debug, Serialize)]
pub struct PorkchopResponse {
    pub departure_dates: Vec<String>,
    pub arrival_dates: Vec<String>,
    pub c3: Vec<Vec<Option<f64>>>,
    pub delta_v: Vec<Vec<Option<f64>>>,
    pub time_of_flight: Vec<Vec<Option<f64>>>,
    pub partial: bool,
}

impl PorkchopResponse {
    pub fn from_grid(grid: PorkchopGrid) -> Self {
        PorkchopResponse {
            departure_dates: grid
                .departure_dates_s
                .iter()
                .map(|&t| time::format_instant(t))
                .collect(),
            arrival_dates: grid
                .arrival_dates_s
                .iter()
                .map(|&t| time::format_instant(t))
                .collect(),
            c3: grid.c3_km2_s2,
            delta_v: grid.delta_v_km_s,
            time_of_flight: grid.tof_days,
            partial: grid.partial,
        }
    }
}

/// Full body record: catalog attributes plus the current state.
#[derive(Debug, Serialize)]
pub struct BodyInfo {
    pub id: BodyId,
    pub name: &'static str,
    pub mass_kg: f64,
    pub radius_m: f64,
    pub mu_m3_s2: f64,
    pub color: &'static str,
    #[serde(rename = "type")]
    pub body_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semi_major_axis_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eccentricity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclination_rad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ascending_node_rad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_periapsis_rad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_anomaly_epoch_rad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbital_period_days: Option<f64>,
    pub position_au: [f64; 3],
    pub velocity_ms: [f64; 3],
}

impl BodyInfo {
    /// Assemble the record at `sim_time_s` via pure propagation.
    pub fn at_sim_time(body: &'static Body, sim_time_s: f64) -> Result<Self, ApiError> {
        let state = kepler::propagate(body.id, sim_time_s)?;
        let elements = body.elements.as_ref();
        Ok(BodyInfo {
            id: body.id,
            name: body.name,
            mass_kg: body.mass_kg,
            radius_m: body.radius_m,
            mu_m3_s2: body.mu_m3_s2,
            color: body.color,
            body_type: if body.id == BodyId::Sun {
                "star"
            } else {
                "planet"
            },
            semi_major_axis_m: elements.map(|el| el.semi_major_axis_m),
            eccentricity: elements.map(|el| el.eccentricity),
            inclination_rad: elements.map(|el| el.inclination_rad),
            ascending_node_rad: elements.map(|el| el.ascending_node_rad),
            arg_periapsis_rad: elements.map(|el| el.arg_periapsis_rad),
            mean_anomaly_epoch_rad: elements.map(|el| el.mean_anomaly_epoch_rad),
            orbital_period_days: body.orbital_period_days(),
            position_au: [
                units::m_to_au(state.position_m[0]),
                units::m_to_au(state.position_m[1]),
                units::m_to_au(state.position_m[2]),
            ],
            velocity_ms: state.velocity_m_s,
        })
    }
}

/// Outbound session messages, tagged by `type`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    Status { message: &'a str },
    StateUpdate { data: &'a StateSnapshot },
    BodyInfo { data: &'a BodyInfo },
    Error { error: &'static str, message: String },
}

impl ServerMessage<'_> {
    /// Serialize for the socket; infallible for these payloads.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            "{\"type\":\"error\",\"error\":\"ProtocolError\",\"message\":\"serialization failed\"}"
                .to_string()
        })
    }
}

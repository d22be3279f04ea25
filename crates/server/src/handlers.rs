//! REST handlers for the request/response surface.

use std::time::Duration;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use orbit_core::time;
use orbit_ephemeris::{get_body, parse_body};
use orbit_planner::{compute_transfer, porkchop, PorkchopRequest, TimeWindow, Transfer};
use orbit_sim::MissionSnapshot;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiJson};
use crate::protocol::{
    BodyFocusRequest, BodyInfo, ControlAction, PorkchopApiRequest, PorkchopResponse,
    TimeControlRequest, TransferRequest, TransferResponse,
};
use crate::state::AppState;

/// `GET /` service banner.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Orbit Engine API", "status": "running" }))
}

/// `GET /health` liveness view.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let latest = state.engine.latest();
    Json(json!({
        "status": "healthy",
        "timestamp": time::format_wall(Utc::now()),
        "uptime_s": (Utc::now() - state.started_at).num_seconds(),
        "simulation_running": latest.is_some(),
        "is_playing": latest.map(|snapshot| snapshot.is_playing).unwrap_or(false),
    }))
}

/// `POST /api/control/time`: play, pause, or set the acceleration factor.
pub async fn control_time(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TimeControlRequest>,
) -> Result<Json<Value>, ApiError> {
    match request.action {
        ControlAction::Play => {
            state.engine.play().await?;
            Ok(Json(json!({ "status": "playing" })))
        }
        ControlAction::Pause => {
            state.engine.pause().await?;
            Ok(Json(json!({ "status": "paused" })))
        }
        ControlAction::SetSpeed => {
            let speed = request
                .speed
                .ok_or_else(|| ApiError::protocol("set_speed requires a speed"))?;
            state.engine.set_speed(speed).await?;
            Ok(Json(json!({ "status": "speed_set", "speed": speed })))
        }
    }
}

/// `POST /api/focus`: full body record at the current simulation time.
pub async fn focus_body(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BodyFocusRequest>,
) -> Result<Json<BodyInfo>, ApiError> {
    let id = parse_body(&request.body)?;
    let sim_time = state
        .engine
        .latest()
        .map(|snapshot| snapshot.sim_time)
        .unwrap_or(0.0);
    Ok(Json(BodyInfo::at_sim_time(get_body(id), sim_time)?))
}

/// `POST /api/trajectory/calculate`: one Lambert transfer.
pub async fn calculate_trajectory(
    ApiJson(request): ApiJson<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let transfer = resolve_transfer(&request)?;
    Ok(Json(TransferResponse::from_transfer(&transfer)))
}

/// `POST /api/trajectory/porkchop`: grid evaluation on this session's
/// worker slot, yielding between rows so the tick loop never stalls. A
/// client that drops the request cancels the evaluation at the next row
/// boundary.
pub async fn porkchop_grid(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PorkchopApiRequest>,
) -> Result<Json<PorkchopResponse>, ApiError> {
    let departure = parse_body(&request.departure)?;
    let arrival = parse_body(&request.arrival)?;
    let departure_window = parse_window(&request.departure_start, &request.departure_end)?;
    let arrival_window = parse_window(&request.arrival_start, &request.arrival_end)?;

    let planner = &state.settings.planner;
    let [grid_rows, grid_cols] = request.grid.unwrap_or(planner.default_grid);
    for (axis, cells) in [("departure", grid_rows), ("arrival", grid_cols)] {
        if cells == 0 || cells > planner.max_grid {
            return Err(ApiError::protocol(format!(
                "{axis} grid axis must be in 1..={} (got {cells})",
                planner.max_grid
            )));
        }
    }

    let grid_request = PorkchopRequest {
        departure,
        arrival,
        departure_window,
        arrival_window,
        grid_rows,
        grid_cols,
    };
    let deadline = Duration::from_secs_f64(planner.deadline_s);

    let grid = porkchop::generate_with_deadline(&grid_request, deadline).await?;
    if grid.partial {
        tracing::warn!(
            departure = %departure,
            arrival = %arrival,
            "porkchop deadline expired, returning partial grid"
        );
    }
    Ok(Json(PorkchopResponse::from_grid(grid)))
}

/// `POST /api/mission/launch`: resolve the transfer and hand it to the
/// engine; answers with the created mission record.
pub async fn launch_mission(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TransferRequest>,
) -> Result<Json<MissionSnapshot>, ApiError> {
    let transfer = resolve_transfer(&request)?;
    let mission = state.engine.launch(transfer).await?;
    Ok(Json(mission))
}

/// Resolve a `(departure, arrival, dates)` request into an evaluated
/// transfer. Launch requests carrying a precomputed response resolve the
/// same way, so the reported figures always come from the planner.
pub(crate) fn resolve_transfer(request: &TransferRequest) -> Result<Transfer, ApiError> {
    let departure = parse_body(&request.departure)?;
    let arrival = parse_body(&request.arrival)?;
    let t_dep = time::parse_instant(&request.departure_date)?;
    let t_arr = time::parse_instant(&request.arrival_date)?;
    Ok(compute_transfer(departure, arrival, t_dep, t_arr)?)
}

pub(crate) fn parse_window(start: &str, end: &str) -> Result<TimeWindow, ApiError> {
    let start_s = time::parse_instant(start)?;
    let end_s = time::parse_instant(end)?;
    if end_s < start_s {
        return Err(ApiError::protocol(format!(
            "window end {end} precedes start {start}"
        )));
    }
    Ok(TimeWindow { start_s, end_s })
}

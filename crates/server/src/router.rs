//! Route table for the observer API.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the full router over the shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/control/time", post(handlers::control_time))
        .route("/api/focus", post(handlers::focus_body))
        .route("/api/trajectory/calculate", post(handlers::calculate_trajectory))
        .route("/api/trajectory/porkchop", post(handlers::porkchop_grid))
        .route("/api/mission/launch", post(handlers::launch_mission))
        .route("/ws/engine", get(ws::ws_engine))
        .with_state(state)
}

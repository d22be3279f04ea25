//! Structured error payloads for the request/response surface.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orbit_core::time::TimeError;
use serde::de::DeserializeOwned;
use orbit_ephemeris::EphemerisError;
use orbit_planner::PlannerError;
use orbit_sim::EngineError;
use serde_json::json;

/// A wire error: `{error: kind, message}` plus an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub kind: &'static str,
    pub message: String,
    pub status: StatusCode,
}

impl ApiError {
    pub fn new(kind: &'static str, message: String, status: StatusCode) -> Self {
        ApiError {
            kind,
            message,
            status,
        }
    }

    /// A malformed request at the protocol boundary.
    pub fn protocol(message: impl Into<String>) -> Self {
        ApiError::new("ProtocolError", message.into(), StatusCode::BAD_REQUEST)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.kind, "message": self.message }));
        (self.status, body).into_response()
    }
}

impl From<EphemerisError> for ApiError {
    fn from(err: EphemerisError) -> Self {
        let status = match &err {
            EphemerisError::UnknownBody { .. } => StatusCode::NOT_FOUND,
            EphemerisError::ConvergenceFailure { .. } => StatusCode::BAD_REQUEST,
        };
        ApiError::new(err.kind(), err.to_string(), status)
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::Ephemeris(inner) => inner.into(),
            PlannerError::NoFeasibleTransfers => ApiError::new(
                err.kind(),
                err.to_string(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            PlannerError::Lambert(_) => {
                ApiError::new(err.kind(), err.to_string(), StatusCode::BAD_REQUEST)
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let status = match &err {
            EngineError::InvalidSpeed { .. } => StatusCode::BAD_REQUEST,
            EngineError::EngineStopped => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError::new(err.kind(), err.to_string(), status)
    }
}

impl From<TimeError> for ApiError {
    fn from(err: TimeError) -> Self {
        ApiError::protocol(err.to_string())
    }
}

/// JSON extractor whose rejection keeps the structured error shape.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::protocol(rejection.body_text())),
        }
    }
}

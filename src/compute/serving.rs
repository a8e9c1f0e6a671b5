// HTTP serving of the prediction endpoint

use super::inference::{Prediction, PredictionService};
use crate::error::{PricingError, Result};
use crate::health::{ComponentHealth, HealthResponse, ReadinessResponse};
use crate::observability;
use crate::validation::validate_body;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::time::Instant;

/// Shared state for Axum handlers.
///
/// Built once at startup; the model slot inside is immutable.
#[derive(Clone, Debug)]
pub struct AppState {
    service: PredictionService,
    started_at: Instant,
}

impl AppState {
    /// Create state around a prediction service.
    pub fn new(service: PredictionService) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }

    /// The prediction service.
    pub fn service(&self) -> &PredictionService {
        &self.service
    }
}

/// Build the API router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/predict", post(handle_predict).fallback(method_not_allowed))
        .route("/model", get(handle_model))
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self {
            PricingError::Validation(errors) => json!({ "detail": errors }),
            PricingError::Inference(cause) => json!({
                "detail": "Model inference failed",
                "error": self.kind(),
                "cause": cause.to_string(),
            }),
            PricingError::ServiceUnavailable(reason) => json!({
                "detail": "Service unavailable: model is not loaded",
                "error": self.kind(),
                "cause": reason,
            }),
            other => json!({ "detail": other.to_string(), "error": other.kind() }),
        };

        (status, Json(body)).into_response()
    }
}

// API Handlers

async fn handle_predict(
    State(state): State<AppState>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let response = match body {
        Ok(body) => match predict(&state.service, &body) {
            Ok(prediction) => (StatusCode::OK, Json(prediction)).into_response(),
            Err(e) => e.into_response(),
        },
        Err(rejection) => {
            let status = rejection.status();
            (status, Json(json!({ "detail": rejection.body_text() }))).into_response()
        }
    };

    observability::record_http_response("/predict", response.status().as_u16());
    response
}

/// Slot guard first, then validation, then one inference call.
fn predict(service: &PredictionService, body: &[u8]) -> Result<Prediction> {
    service.slot().regressor()?;
    let input = validate_body(body)?;
    service.predict(&input)
}

async fn handle_model(State(state): State<AppState>) -> Response {
    let slot = state.service.slot();
    match slot.regressor() {
        Ok(_) => match slot.info() {
            Some(info) => (StatusCode::OK, Json(info.clone())).into_response(),
            None => PricingError::Internal("loaded model has no description".into()).into_response(),
        },
        Err(e) => e.into_response(),
    }
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = HealthResponse::new(env!("CARGO_PKG_VERSION"), state.started_at)
        .with_components(vec![ComponentHealth::for_model(state.service.slot())]);
    Json(response)
}

async fn handle_ready(State(state): State<AppState>) -> Response {
    let readiness = ReadinessResponse::for_model(state.service.slot());
    let status = StatusCode::from_u16(readiness.status_code())
        .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    (status, Json(readiness)).into_response()
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" }))).into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "detail": "Method Not Allowed" })),
    )
        .into_response()
}

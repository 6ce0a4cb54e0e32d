//! HTTP surface: `GET /` and `POST /predict`.

use crate::record::{HealthMessage, PatientRecord, PredictOutcome};
use crate::service::PredictionService;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Body returned when a request fails schema validation.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRejection {
    /// What was wrong with the body
    pub detail: String,
}

impl IntoResponse for SchemaRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}

impl From<JsonRejection> for SchemaRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            detail: rejection.body_text(),
        }
    }
}

/// Fully open CORS policy.
///
/// Origins, methods and headers are mirrored from the request because a
/// wildcard cannot be combined with credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the application router.
pub fn router(service: Arc<PredictionService>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(service)
}

async fn home(State(service): State<Arc<PredictionService>>) -> Json<HealthMessage> {
    Json(service.health_check())
}

async fn predict(
    State(service): State<Arc<PredictionService>>,
    body: Result<Json<PatientRecord>, JsonRejection>,
) -> Result<Json<PredictOutcome>, SchemaRejection> {
    let Json(record) = body.map_err(|rejection| {
        debug!("Rejected predict body: {}", rejection.body_text());
        SchemaRejection::from(rejection)
    })?;
    Ok(Json(service.handle_predict(&record)))
}

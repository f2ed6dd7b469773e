use super::types::{Endpoints, HealthStatus, InferenceRequest, InferenceResponse, ServiceInfo};
use crate::{ErrorResponse, scoring::ScoringPool};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ScoringPool>,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Grounded SAM2 Local API".to_string(),
        status: "running".to_string(),
        endpoints: Endpoints {
            inference: "/predict".to_string(),
            health: "/health".to_string(),
        },
    })
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    if state.pool.is_ready() {
        (
            StatusCode::OK,
            Json(HealthStatus {
                status: "healthy".to_string(),
                models_loaded: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "unavailable".to_string(),
                models_loaded: false,
            }),
        )
    }
}

/// Serves both `/predict` and `/score`.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<InferenceRequest>, JsonRejection>,
) -> Result<Json<InferenceResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected inference request: {}", rejection.body_text());
        (rejection.status(), Json(ErrorResponse::new(rejection.body_text())))
    })?;

    let request_id = Uuid::new_v4();
    info!(
        "Received inference request {}: {} image(s), caption {:?}",
        request_id,
        request.images.len(),
        request.caption
    );

    match state.pool.score(&request).await {
        Ok(response) => {
            info!(
                "Scored request {} (success: {})",
                request_id, response.success
            );
            Ok(Json(response))
        }
        Err(e) => {
            error!("Failed to score request {}: {}", request_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.detail())),
            ))
        }
    }
}

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::gateway::{ActivationSuccess, AnalysisGateway, AnalyzeRequest};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AnalysisGateway>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/analyze", post(analyze))
        .route("/license/activate", post(activate_license))
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    let envelope = state.gateway.handle_analyze(request).await?;
    Ok(Json(envelope))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivateRequest {
    #[serde(default)]
    license_key: String,
}

async fn activate_license(
    State(state): State<AppState>,
    Json(request): Json<ActivateRequest>,
) -> Result<Json<ActivationSuccess>, ApiError> {
    let result = state.gateway.activate_license(&request.license_key).await?;
    Ok(Json(result))
}

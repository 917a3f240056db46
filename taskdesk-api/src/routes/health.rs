/// Health check endpoint
///
/// `GET /health` verifies the database is reachable and reports the build
/// version. Used by load balancers and deploy checks.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::Serialize;
use taskdesk_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status ("ok")
    pub status: &'static str,

    /// Crate version
    pub version: &'static str,
}

/// Returns 200 when the service and its database are healthy
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    pool::health_check(&state.db).await?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

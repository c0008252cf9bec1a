//! Health check endpoint.

use actix_web::{HttpResponse, web};
use quill_shared::ApiResponse;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.actions.db().connection().ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = %err, "Database ping failed");
            "unavailable"
        }
    };

    let response = HealthResponse {
        status: "ok",
        database,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    HttpResponse::Ok().json(ApiResponse::new(response))
}

use actix_web::{web, HttpResponse, Result};
use chrono::Utc;

use crate::models::{ErrorResponse, HealthResponse};
use crate::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "healthy".to_string(),
        upstream_configured: !state.config.search.api_key.is_empty(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    Ok(HttpResponse::Ok().json(response))
}

pub async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(ErrorResponse::new("Endpoint not found")))
}

use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;

pub const SERVICE_NAME: &str = "vnf-broker";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp: String,
}

async fn health() -> Result<HttpResponse, AppError> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        timestamp,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)));
}

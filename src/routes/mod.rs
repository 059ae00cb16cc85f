// Route exports
pub mod connections;
pub mod creators;
pub mod discovery;

use actix_web::{http::StatusCode, web, HttpResponse};
use std::sync::Arc;
use validator::ValidationErrors;

use crate::error::ConnectionError;
use crate::models::ErrorResponse;
use crate::services::ConnectionEngine;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConnectionEngine>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(discovery::configure)
            .configure(connections::configure)
            .configure(creators::configure),
    );
}

/// Map an engine error onto its HTTP status and JSON body
pub(crate) fn error_response(err: &ConnectionError) -> HttpResponse {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }

    HttpResponse::build(status).json(ErrorResponse::from(err))
}

pub(crate) fn validation_error(errors: ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: {}", errors);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

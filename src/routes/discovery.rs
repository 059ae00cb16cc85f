use actix_web::{web, HttpResponse, Responder};
use rand::{rngs::StdRng, SeedableRng};
use validator::Validate;

use super::{error_response, validation_error, AppState};
use crate::models::{BrowseRequest, BrowseResponse, HealthResponse, SwipeRequest, SwipeResponse};

/// Configure health, browsing and swiping routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/browse", web::post().to(browse))
        .route("/swipes", web::post().to(record_swipe));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.engine.health_check().await;

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Build a browse stack
///
/// POST /api/v1/browse
///
/// Request body:
/// ```json
/// {
///   "memberId": "string",
///   "filters": { "orientations": ["straight"], "minAge": 21, "maxAge": 35 },
///   "seed": 42
/// }
/// ```
async fn browse(state: web::Data<AppState>, req: web::Json<BrowseRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let mut rng = match req.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match state.engine.browse_stack(&req.member_id, &req.filters, &mut rng).await {
        Ok(stack) => {
            tracing::info!(
                "Returning {} creators for member {} (from {} candidates)",
                stack.creators.len(),
                req.member_id,
                stack.total_candidates
            );
            HttpResponse::Ok().json(BrowseResponse {
                creators: stack.creators,
                total_candidates: stack.total_candidates,
                eligible_candidates: stack.eligible_candidates,
            })
        }
        Err(e) => error_response(&e),
    }
}

/// Record a member swipe
///
/// POST /api/v1/swipes
async fn record_swipe(state: web::Data<AppState>, req: web::Json<SwipeRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let req = req.into_inner();
    let input = req.to_input();

    match state
        .engine
        .record_member_swipe(&req.member_id, &req.creator_id, input, req.browse_context)
        .await
    {
        Ok(result) => HttpResponse::Ok().json(SwipeResponse {
            outcome: result.outcome,
            connection: result.connection,
        }),
        Err(e) => error_response(&e),
    }
}

use actix_web::{web, HttpResponse, Responder};

use super::{error_response, AppState};
use crate::models::{PurgeResponse, TopSpendersQuery};

/// Configure creator reporting and account purge routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/creators/{id}/top-spenders", web::get().to(top_spenders))
        .route("/creators/{id}/at-risk", web::get().to(at_risk))
        .route("/creators/{id}/stats", web::get().to(stats))
        .route("/participants/{id}", web::delete().to(purge_participant));
}

/// GET /api/v1/creators/{id}/top-spenders?limit=10
async fn top_spenders(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<TopSpendersQuery>,
) -> impl Responder {
    // Cap limit at 100 to keep responses bounded
    let limit = query.limit.min(100);

    match state.engine.top_spenders(&path, limit).await {
        Ok(connections) => HttpResponse::Ok().json(connections),
        Err(e) => error_response(&e),
    }
}

async fn at_risk(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.engine.at_risk(&path).await {
        Ok(connections) => HttpResponse::Ok().json(connections),
        Err(e) => error_response(&e),
    }
}

async fn stats(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.engine.creator_stats(&path).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => error_response(&e),
    }
}

/// Cascade delete when an account is permanently removed
async fn purge_participant(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let participant_id = path.into_inner();
    match state.engine.purge_participant(&participant_id).await {
        Ok(removed) => HttpResponse::Ok().json(PurgeResponse {
            participant_id,
            removed,
        }),
        Err(e) => error_response(&e),
    }
}

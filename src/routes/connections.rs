use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

use super::{error_response, validation_error, AppState};
use crate::core::EngagementEvent;
use crate::models::{
    BlockRequest, CanMessageResponse, CreatorResponseRequest, DirectConnectionRequest, DirectConnectionResponse,
    DisconnectRequest, EventResponse, FlagUpdate, NotificationPrefsRequest, RefundRequest, RefundResponse,
    StrengthResponse,
};

/// Configure per-connection routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/connections/direct", web::post().to(direct_connection))
        .route("/connections/{id}", web::get().to(get_connection))
        .route("/connections/{id}/respond", web::post().to(respond))
        .route("/connections/{id}/disconnect", web::post().to(disconnect))
        .route("/connections/{id}/events", web::post().to(record_event))
        .route("/connections/{id}/refunds", web::post().to(refund))
        .route("/connections/{id}/block", web::post().to(block))
        .route("/connections/{id}/flags", web::post().to(set_flags))
        .route("/connections/{id}/notifications", web::post().to(notification_prefs))
        .route("/connections/{id}/can-message", web::get().to(can_message))
        .route("/connections/{id}/strength", web::get().to(strength));
}

async fn direct_connection(state: web::Data<AppState>, req: web::Json<DirectConnectionRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state
        .engine
        .find_or_create_direct_connection(&req.creator_id, &req.member_id)
        .await
    {
        Ok((connection, true)) => HttpResponse::Created().json(DirectConnectionResponse {
            connection,
            created: true,
        }),
        Ok((connection, false)) => HttpResponse::Ok().json(DirectConnectionResponse {
            connection,
            created: false,
        }),
        Err(e) => error_response(&e),
    }
}

async fn get_connection(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match state.engine.get_connection(path.into_inner()).await {
        Ok(connection) => HttpResponse::Ok().json(connection),
        Err(e) => error_response(&e),
    }
}

/// Creator accepts or declines a pending like
///
/// POST /api/v1/connections/{id}/respond
///
/// Request body:
/// ```json
/// { "creatorId": "string", "direction": "left|right" }
/// ```
async fn respond(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CreatorResponseRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state
        .engine
        .record_creator_response(&req.creator_id, path.into_inner(), req.direction)
        .await
    {
        Ok(connection) => HttpResponse::Ok().json(connection),
        Err(e) => error_response(&e),
    }
}

async fn disconnect(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<DisconnectRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.engine.disconnect(&req.actor(), path.into_inner()).await {
        Ok(connection) => HttpResponse::Ok().json(connection),
        Err(e) => error_response(&e),
    }
}

/// Engagement event from the messaging or payment collaborator
///
/// POST /api/v1/connections/{id}/events
///
/// Request body:
/// ```json
/// { "type": "tip_sent", "amount": 25.0 }
/// ```
async fn record_event(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    event: web::Json<EngagementEvent>,
) -> impl Responder {
    match state.engine.apply_event(path.into_inner(), event.into_inner()).await {
        Ok((connection, purchase_id)) => HttpResponse::Ok().json(EventResponse {
            connection,
            purchase_id,
        }),
        Err(e) => error_response(&e),
    }
}

async fn refund(state: web::Data<AppState>, path: web::Path<Uuid>, req: web::Json<RefundRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state
        .engine
        .apply_refund(path.into_inner(), req.purchase_id, req.amount, &req.reason)
        .await
    {
        Ok((connection, refund)) => HttpResponse::Ok().json(RefundResponse { connection, refund }),
        Err(e) => error_response(&e),
    }
}

async fn block(state: web::Data<AppState>, path: web::Path<Uuid>, req: web::Json<BlockRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.engine.block(path.into_inner(), &req.reason).await {
        Ok(connection) => HttpResponse::Ok().json(connection),
        Err(e) => error_response(&e),
    }
}

async fn set_flags(state: web::Data<AppState>, path: web::Path<Uuid>, req: web::Json<FlagUpdate>) -> impl Responder {
    match state.engine.set_flags(path.into_inner(), req.into_inner()).await {
        Ok(connection) => HttpResponse::Ok().json(connection),
        Err(e) => error_response(&e),
    }
}

async fn notification_prefs(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<NotificationPrefsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let req = req.into_inner();
    match state
        .engine
        .update_notification_preferences(&req.actor(), path.into_inner(), req.prefs)
        .await
    {
        Ok(connection) => HttpResponse::Ok().json(connection),
        Err(e) => error_response(&e),
    }
}

async fn can_message(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let connection_id = path.into_inner();
    match state.engine.can_message(connection_id).await {
        Ok(can_message) => HttpResponse::Ok().json(CanMessageResponse {
            connection_id,
            can_message,
        }),
        Err(e) => error_response(&e),
    }
}

async fn strength(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let connection_id = path.into_inner();
    match state.engine.relationship_strength(connection_id).await {
        Ok(strength) => HttpResponse::Ok().json(StrengthResponse {
            connection_id,
            strength,
        }),
        Err(e) => error_response(&e),
    }
}

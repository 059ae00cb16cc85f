use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::swipe::SwipeOutcome;
use crate::error::ConnectionError;
use crate::models::connection::{Connection, Refund};
use crate::models::domain::ScoredCreator;

/// Response for the browse endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub creators: Vec<ScoredCreator>,
    pub total_candidates: usize,
    pub eligible_candidates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub outcome: SwipeOutcome,
    pub connection: Connection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectConnectionResponse {
    pub connection: Connection,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub connection: Connection,
    pub purchase_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundResponse {
    pub connection: Connection,
    pub refund: Refund,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanMessageResponse {
    pub connection_id: Uuid,
    pub can_message: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthResponse {
    pub connection_id: Uuid,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub participant_id: String,
    pub removed: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl From<&ConnectionError> for ErrorResponse {
    fn from(err: &ConnectionError) -> Self {
        Self {
            error: err.code().to_string(),
            message: err.to_string(),
            status_code: err.status_code(),
        }
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::swipe::MemberSwipeInput;
use crate::models::connection::{
    Actor, BrowseContext, ConnectionFlags, Decision, Party, PartyNotificationPrefs, SessionSignals,
};
use crate::models::domain::BrowseFilters;

/// Request a browse stack for a member
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BrowseRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "member_id", rename = "memberId")]
    pub member_id: String,
    #[serde(default)]
    pub filters: BrowseFilters,
    /// Fixes the diversity term and shuffle for reproducible stacks
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Member swipe on a creator
///
/// ```json
/// {
///   "memberId": "string",
///   "creatorId": "string",
///   "direction": "left|right",
///   "superLike": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "member_id", rename = "memberId")]
    pub member_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "creator_id", rename = "creatorId")]
    pub creator_id: String,
    #[serde(default)]
    pub direction: Option<Decision>,
    #[serde(default, alias = "super_like", rename = "superLike")]
    pub super_like: bool,
    #[serde(default)]
    pub signals: SessionSignals,
    #[serde(default, alias = "browse_context", rename = "browseContext")]
    pub browse_context: Option<BrowseContext>,
}

impl SwipeRequest {
    pub fn to_input(&self) -> MemberSwipeInput {
        MemberSwipeInput {
            direction: self.direction,
            super_like: self.super_like,
            signals: self.signals.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatorResponseRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "creator_id", rename = "creatorId")]
    pub creator_id: String,
    pub direction: Decision,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DirectConnectionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "creator_id", rename = "creatorId")]
    pub creator_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "member_id", rename = "memberId")]
    pub member_id: String,
}

/// Identifies which participant is acting
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DisconnectRequest {
    pub role: Party,
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
}

impl DisconnectRequest {
    pub fn actor(&self) -> Actor {
        actor_for(self.role, &self.actor_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefundRequest {
    #[serde(alias = "purchase_id", rename = "purchaseId")]
    pub purchase_id: Uuid,
    #[validate(range(min = 0.01))]
    pub amount: f64,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BlockRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Partial update of moderation flags; absent fields are left alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagUpdate {
    #[serde(default)]
    pub inappropriate: Option<bool>,
    #[serde(default)]
    pub reported: Option<bool>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub vip: Option<bool>,
}

impl FlagUpdate {
    pub fn apply(&self, flags: &mut ConnectionFlags) {
        if let Some(value) = self.inappropriate {
            flags.inappropriate = value;
        }
        if let Some(value) = self.reported {
            flags.reported = value;
        }
        if let Some(value) = self.verified {
            flags.verified = value;
        }
        if let Some(value) = self.vip {
            flags.vip = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationPrefsRequest {
    pub role: Party,
    #[validate(length(min = 1))]
    #[serde(alias = "actor_id", rename = "actorId")]
    pub actor_id: String,
    #[serde(flatten)]
    pub prefs: PartyNotificationPrefs,
}

impl NotificationPrefsRequest {
    pub fn actor(&self) -> Actor {
        actor_for(self.role, &self.actor_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopSpendersQuery {
    #[serde(default = "default_top_limit")]
    pub limit: usize,
}

fn default_top_limit() -> usize {
    10
}

fn actor_for(role: Party, id: &str) -> Actor {
    match role {
        Party::Member => Actor::Member(id.to_string()),
        Party::Creator => Actor::Creator(id.to_string()),
    }
}

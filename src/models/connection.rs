use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{BrowseFilters, CompatibilityScore};

/// Connection lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Connected,
    Disconnected,
    Blocked,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "connected" => Some(Self::Connected),
            "disconnected" => Some(Self::Disconnected),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// How a connection came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionSource {
    Swipe,
    AutoConnect,
    CreatorInitiated,
}

/// Direction recorded for a member swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Super,
}

impl SwipeDirection {
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Right | Self::Super)
    }
}

/// A left/right decision as submitted by either party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Left,
    Right,
}

/// Which side of the pair acted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Member,
    Creator,
}

/// Session-quality signals captured with a member swipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSignals {
    #[serde(default)]
    pub time_on_profile_ms: Option<u64>,
    #[serde(default)]
    pub photos_viewed: Option<u32>,
    #[serde(default)]
    pub session_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSwipe {
    pub direction: SwipeDirection,
    pub swiped_at: DateTime<Utc>,
    #[serde(default)]
    pub signals: SessionSignals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSwipe {
    pub direction: Option<Decision>,
    pub swiped_at: Option<DateTime<Utc>>,
    pub auto_connected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwipeData {
    pub member: Option<MemberSwipe>,
    pub creator: CreatorSwipe,
}

/// Snapshot of what the member was looking at when shown this creator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseContext {
    #[serde(default)]
    pub filters: BrowseFilters,
    #[serde(default)]
    pub algorithm_score: Option<f64>,
    #[serde(default)]
    pub session_position: Option<u32>,
    #[serde(default)]
    pub profiles_viewed_in_session: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub messages_from_member: u64,
    pub messages_from_creator: u64,
    pub content_unlocks: u64,
    pub unlock_spend: f64,
    pub dm_purchases: u64,
    pub dm_spend: f64,
    pub avg_dm_price: f64,
    pub tip_count: u64,
    pub tip_total: f64,
    pub largest_tip: f64,
    pub last_active_at: Option<DateTime<Utc>>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_message_from: Option<Party>,
    pub creator_replies: u64,
}

impl Engagement {
    pub fn total_messages(&self) -> u64 {
        self.messages_from_member + self.messages_from_creator
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingTier {
    #[default]
    None,
    Low,
    Medium,
    High,
    Whale,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberScore {
    pub engagement_level: u8,
    pub spending_tier: SpendingTier,
    pub loyalty_score: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorScore {
    pub response_rate: u8,
    pub avg_response_time_mins: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Thriving,
    Active,
    Cooling,
    Dormant,
    AtRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub churn_risk: u8,
    pub days_since_last_interaction: i64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub member: MemberScore,
    pub creator: CreatorScore,
    pub compatibility: Option<CompatibilityScore>,
    pub health: HealthSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseKind {
    ContentUnlock,
    Dm,
    Tip,
}

/// Itemized monetization record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub kind: PurchaseKind,
    pub amount: f64,
    #[serde(default)]
    pub reference: Option<String>,
    pub purchased_at: DateTime<Utc>,
    #[serde(default)]
    pub refunded_amount: f64,
}

impl Purchase {
    pub fn refundable(&self) -> f64 {
        (self.amount - self.refunded_amount).max(0.0)
    }
}

/// Refund ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refund {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub amount: f64,
    pub reason: String,
    pub refunded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseFrequency {
    #[default]
    None,
    OneTime,
    Occasional,
    Regular,
    Frequent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monetization {
    pub purchases: Vec<Purchase>,
    pub refunds: Vec<Refund>,
    pub total_revenue: f64,
    pub refunded_total: f64,
    pub avg_transaction_value: f64,
    pub purchase_frequency: PurchaseFrequency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyNotificationPrefs {
    pub muted: bool,
    pub messages: bool,
    pub new_content: bool,
}

impl Default for PartyNotificationPrefs {
    fn default() -> Self {
        Self {
            muted: false,
            messages: true,
            new_content: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub member: PartyNotificationPrefs,
    pub creator: PartyNotificationPrefs,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionFlags {
    pub inappropriate: bool,
    pub reported: bool,
    pub verified: bool,
    pub vip: bool,
}

/// The record of a creator–member relationship.
///
/// One record exists per (creator, member) pair. `version` is bumped on every
/// committed write and is what the stores compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    pub creator_id: String,
    pub member_id: String,
    pub status: ConnectionStatus,
    pub source: ConnectionSource,
    pub swipe_data: SwipeData,
    pub connected_at: Option<DateTime<Utc>>,
    pub disconnected_at: Option<DateTime<Utc>>,
    pub blocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub block_reason: Option<String>,
    pub browse_context: Option<BrowseContext>,
    pub engagement: Engagement,
    pub relationship: Relationship,
    pub monetization: Monetization,
    pub notifications: NotificationPrefs,
    pub flags: ConnectionFlags,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Connection {
    /// Fresh pending record for a pair
    pub fn new(creator_id: &str, member_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id: creator_id.to_string(),
            member_id: member_id.to_string(),
            status: ConnectionStatus::Pending,
            source: ConnectionSource::Swipe,
            swipe_data: SwipeData::default(),
            connected_at: None,
            disconnected_at: None,
            blocked_at: None,
            block_reason: None,
            browse_context: None,
            engagement: Engagement::default(),
            relationship: Relationship {
                member: MemberScore::default(),
                creator: CreatorScore::default(),
                compatibility: None,
                health: HealthSnapshot {
                    status: HealthStatus::Thriving,
                    churn_risk: 0,
                    days_since_last_interaction: 0,
                    computed_at: now,
                },
            },
            monetization: Monetization::default(),
            notifications: NotificationPrefs::default(),
            flags: ConnectionFlags::default(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn involves(&self, actor: &Actor) -> bool {
        match actor {
            Actor::Member(id) => &self.member_id == id,
            Actor::Creator(id) => &self.creator_id == id,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

/// The participant performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Actor {
    Member(String),
    Creator(String),
}

impl Actor {
    pub fn id(&self) -> &str {
        match self {
            Actor::Member(id) | Actor::Creator(id) => id,
        }
    }

    pub fn party(&self) -> Party {
        match self {
            Actor::Member(_) => Party::Member,
            Actor::Creator(_) => Party::Creator,
        }
    }
}

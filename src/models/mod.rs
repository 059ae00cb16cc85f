// Model exports
pub mod connection;
pub mod domain;
pub mod requests;
pub mod responses;

pub use connection::{
    Actor, BrowseContext, Connection, ConnectionFlags, ConnectionSource, ConnectionStatus, CreatorScore,
    CreatorSwipe, Decision, Engagement, HealthSnapshot, HealthStatus, MemberScore, MemberSwipe, Monetization,
    NotificationPrefs, PartyNotificationPrefs, Party, Purchase, PurchaseFrequency, PurchaseKind, Refund,
    Relationship, SessionSignals, SpendingTier, SwipeData, SwipeDirection,
};
pub use domain::{
    BrowseFilters, CompatibilityFactors, CompatibilityScore, CreatorProfile, MemberProfile, Orientation,
    RankingParams, ScoredCreator,
};
pub use requests::{
    BlockRequest, BrowseRequest, CreatorResponseRequest, DirectConnectionRequest, DisconnectRequest,
    FlagUpdate, NotificationPrefsRequest, RefundRequest, SwipeRequest, TopSpendersQuery,
};
pub use responses::{
    BrowseResponse, CanMessageResponse, DirectConnectionResponse, ErrorResponse, EventResponse, HealthResponse,
    PurgeResponse, RefundResponse, StrengthResponse, SwipeResponse,
};

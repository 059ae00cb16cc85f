//! Lume Connect - connection and relationship engine for the Lume creator platform
//!
//! Runs the member/creator swipe state machine, builds ranked browse stacks,
//! and keeps per-pair engagement, monetization and health data that
//! messaging, payment and CRM collaborators query.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{DiscoveryRanker, EngagementEvent, MemberSwipeInput, SwipeOutcome};
pub use crate::error::ConnectionError;
pub use crate::models::{Actor, Connection, ConnectionStatus, CreatorProfile, MemberProfile};
pub use crate::services::{ConnectionEngine, EngineOptions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let connection = Connection::new("creator_1", "member_1", chrono::Utc::now());
        assert_eq!(connection.status, ConnectionStatus::Pending);
        assert!(connection.involves(&Actor::Member("member_1".to_string())));
    }
}

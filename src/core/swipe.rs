//! Swipe state machine.
//!
//! ```text
//! pending ──► connected ──► disconnected
//!    └──────────────────────► disconnected
//! any ──► blocked (terminal)
//! ```
//!
//! Every function here mutates a connection in memory and never performs
//! I/O; the engine runs them inside the store's compare-and-swap loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{engagement, health};
use crate::error::ConnectionError;
use crate::models::{
    Actor, Connection, ConnectionSource, ConnectionStatus, Decision, MemberSwipe, SessionSignals,
    SwipeDirection,
};

/// Result of a member swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeOutcome {
    /// Left swipe recorded, creator excluded from future stacks
    Passed,
    /// Right swipe waiting on the creator
    Pending,
    /// Creator had already accepted
    Matched,
    /// Creator has auto-connect enabled
    InstantConnection,
}

impl SwipeOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Matched | Self::InstantConnection)
    }
}

/// A member's swipe as submitted
#[derive(Debug, Clone, Default)]
pub struct MemberSwipeInput {
    pub direction: Option<Decision>,
    pub super_like: bool,
    pub signals: SessionSignals,
}

impl MemberSwipeInput {
    pub fn new(direction: Decision, super_like: bool) -> Self {
        Self {
            direction: Some(direction),
            super_like,
            signals: SessionSignals::default(),
        }
    }

    /// Resolve the stored direction; a super like must be a right swipe
    pub fn resolve(&self) -> Result<SwipeDirection, ConnectionError> {
        match (self.direction, self.super_like) {
            (Some(Decision::Left), true) => Err(ConnectionError::InvalidInput(
                "a super like must be a right swipe".to_string(),
            )),
            (Some(Decision::Left), false) => Ok(SwipeDirection::Left),
            (Some(Decision::Right), false) => Ok(SwipeDirection::Right),
            (Some(Decision::Right), true) | (None, true) => Ok(SwipeDirection::Super),
            (None, false) => Err(ConnectionError::InvalidInput("swipe direction is required".to_string())),
        }
    }
}

/// Move a record into `connected`.
///
/// Auto-connect, mutual swipes and creator-initiated contact all go through
/// here so engagement tracking starts from the same state.
pub fn establish_connection(connection: &mut Connection, source: ConnectionSource, now: DateTime<Utc>) {
    connection.status = ConnectionStatus::Connected;
    connection.source = source;
    connection.connected_at = Some(now);
    connection.engagement.last_active_at = Some(now);
    engagement::recompute_scores(connection, now);
    health::refresh(connection, now);
}

/// Record a member swipe on a (possibly freshly created) record
pub fn apply_member_swipe(
    connection: &mut Connection,
    input: &MemberSwipeInput,
    creator_auto_connect: bool,
    now: DateTime<Utc>,
) -> Result<SwipeOutcome, ConnectionError> {
    let direction = input.resolve()?;

    if connection.swipe_data.member.is_some() {
        return Err(ConnectionError::AlreadySwiped {
            member_id: connection.member_id.clone(),
            creator_id: connection.creator_id.clone(),
        });
    }

    match connection.status {
        ConnectionStatus::Blocked => {
            return Err(ConnectionError::InvalidState(format!("connection {} is blocked", connection.id)));
        }
        ConnectionStatus::Disconnected => {
            return Err(ConnectionError::InvalidState(format!(
                "connection {} was disconnected",
                connection.id
            )));
        }
        ConnectionStatus::Pending | ConnectionStatus::Connected => {}
    }

    connection.swipe_data.member = Some(MemberSwipe {
        direction,
        swiped_at: now,
        signals: input.signals.clone(),
    });

    if !direction.is_positive() {
        return Ok(SwipeOutcome::Passed);
    }

    // Creator reached out first; the swipe only completes the record
    if connection.status == ConnectionStatus::Connected {
        return Ok(SwipeOutcome::Matched);
    }

    if creator_auto_connect {
        let creator = &mut connection.swipe_data.creator;
        creator.direction = Some(Decision::Right);
        creator.swiped_at = Some(now);
        creator.auto_connected = true;
        establish_connection(connection, ConnectionSource::AutoConnect, now);
        return Ok(SwipeOutcome::InstantConnection);
    }

    // The engine never records a creator right swipe ahead of the member's; this
    // completes records written by other writers (imports, backfills) that did
    if connection.swipe_data.creator.direction == Some(Decision::Right) {
        establish_connection(connection, ConnectionSource::Swipe, now);
        return Ok(SwipeOutcome::Matched);
    }

    Ok(SwipeOutcome::Pending)
}

/// Creator accepts or declines a pending like
pub fn apply_creator_response(
    connection: &mut Connection,
    creator_id: &str,
    decision: Decision,
    now: DateTime<Utc>,
) -> Result<(), ConnectionError> {
    if connection.creator_id != creator_id {
        return Err(ConnectionError::Unauthorized(format!(
            "creator {} is not part of connection {}",
            creator_id, connection.id
        )));
    }

    if connection.status != ConnectionStatus::Pending {
        return Err(ConnectionError::InvalidState(format!(
            "connection {} is {}, expected pending",
            connection.id,
            connection.status.as_str()
        )));
    }

    let member_liked = connection
        .swipe_data
        .member
        .as_ref()
        .map_or(false, |swipe| swipe.direction.is_positive());
    if !member_liked {
        return Err(ConnectionError::InvalidState(format!(
            "connection {} has no pending like from the member",
            connection.id
        )));
    }

    let creator = &mut connection.swipe_data.creator;
    creator.direction = Some(decision);
    creator.swiped_at = Some(now);
    creator.auto_connected = false;

    match decision {
        Decision::Right => establish_connection(connection, ConnectionSource::Swipe, now),
        Decision::Left => {
            connection.status = ConnectionStatus::Disconnected;
            connection.disconnected_at = Some(now);
        }
    }

    Ok(())
}

/// Disconnect a pair. Returns `false` when it was already disconnected.
pub fn apply_disconnect(
    connection: &mut Connection,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<bool, ConnectionError> {
    if !connection.involves(actor) {
        return Err(ConnectionError::Unauthorized(format!(
            "{} is not part of connection {}",
            actor.id(),
            connection.id
        )));
    }

    match connection.status {
        ConnectionStatus::Blocked => Err(ConnectionError::InvalidState(format!(
            "connection {} is blocked",
            connection.id
        ))),
        ConnectionStatus::Disconnected => Ok(false),
        ConnectionStatus::Pending | ConnectionStatus::Connected => {
            connection.status = ConnectionStatus::Disconnected;
            connection.disconnected_at = Some(now);
            Ok(true)
        }
    }
}

/// Moderation block. Returns `false` when it was already blocked.
pub fn apply_block(connection: &mut Connection, reason: &str, now: DateTime<Utc>) -> bool {
    if connection.status == ConnectionStatus::Blocked {
        return false;
    }
    connection.status = ConnectionStatus::Blocked;
    connection.blocked_at = Some(now);
    connection.block_reason = Some(reason.to_string());
    true
}

/// Build a record for a creator reaching out directly
pub fn new_direct_connection(creator_id: &str, member_id: &str, now: DateTime<Utc>) -> Connection {
    let mut connection = Connection::new(creator_id, member_id, now);
    connection.swipe_data.creator.direction = Some(Decision::Right);
    connection.swipe_data.creator.swiped_at = Some(now);
    establish_connection(&mut connection, ConnectionSource::CreatorInitiated, now);
    connection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthStatus;
    use chrono::Duration;

    fn pending() -> Connection {
        Connection::new("creator_1", "member_1", Utc::now())
    }

    #[test]
    fn test_left_swipe_passes() {
        let mut connection = pending();
        let outcome = apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Left, false), false, Utc::now())
            .unwrap();

        assert_eq!(outcome, SwipeOutcome::Passed);
        assert_eq!(connection.status, ConnectionStatus::Pending);
        assert_eq!(connection.swipe_data.member.unwrap().direction, SwipeDirection::Left);
    }

    #[test]
    fn test_right_swipe_auto_connect() {
        let mut connection = pending();
        let now = Utc::now();
        let outcome =
            apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Right, false), true, now).unwrap();

        assert_eq!(outcome, SwipeOutcome::InstantConnection);
        assert_eq!(connection.status, ConnectionStatus::Connected);
        assert_eq!(connection.connected_at, Some(now));
        assert_eq!(connection.source, ConnectionSource::AutoConnect);
        assert!(connection.swipe_data.creator.auto_connected);
        assert_eq!(connection.relationship.health.status, HealthStatus::Thriving);
    }

    #[test]
    fn test_right_swipe_after_creator_right_matches() {
        let mut connection = pending();
        connection.swipe_data.creator.direction = Some(Decision::Right);

        let outcome =
            apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Right, false), false, Utc::now())
                .unwrap();

        assert_eq!(outcome, SwipeOutcome::Matched);
        assert!(connection.is_connected());
    }

    #[test]
    fn test_super_like_recorded() {
        let mut connection = pending();
        let outcome =
            apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Right, true), false, Utc::now())
                .unwrap();

        assert_eq!(outcome, SwipeOutcome::Pending);
        assert_eq!(connection.swipe_data.member.unwrap().direction, SwipeDirection::Super);
    }

    #[test]
    fn test_super_like_left_rejected() {
        let mut connection = pending();
        let result =
            apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Left, true), false, Utc::now());

        assert!(matches!(result, Err(ConnectionError::InvalidInput(_))));
        assert!(connection.swipe_data.member.is_none());
    }

    #[test]
    fn test_second_swipe_rejected() {
        let mut connection = pending();
        let input = MemberSwipeInput::new(Decision::Right, false);
        apply_member_swipe(&mut connection, &input, false, Utc::now()).unwrap();
        let before = connection.clone();

        let result = apply_member_swipe(&mut connection, &input, true, Utc::now());
        assert!(matches!(result, Err(ConnectionError::AlreadySwiped { .. })));
        assert_eq!(connection, before);
    }

    #[test]
    fn test_creator_response_right_connects() {
        let mut connection = pending();
        let swiped_at = Utc::now() - Duration::hours(3);
        apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Right, false), false, swiped_at).unwrap();

        let now = Utc::now();
        apply_creator_response(&mut connection, "creator_1", Decision::Right, now).unwrap();

        assert_eq!(connection.status, ConnectionStatus::Connected);
        assert_eq!(connection.connected_at, Some(now));
        assert_eq!(connection.engagement.last_active_at, Some(now));
    }

    #[test]
    fn test_creator_response_left_disconnects() {
        let mut connection = pending();
        apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Right, false), false, Utc::now()).unwrap();

        apply_creator_response(&mut connection, "creator_1", Decision::Left, Utc::now()).unwrap();

        assert_eq!(connection.status, ConnectionStatus::Disconnected);
        assert!(connection.disconnected_at.is_some());
        assert!(connection.connected_at.is_none());
    }

    #[test]
    fn test_creator_response_preconditions() {
        let mut connection = pending();

        // No like yet
        let result = apply_creator_response(&mut connection, "creator_1", Decision::Right, Utc::now());
        assert!(matches!(result, Err(ConnectionError::InvalidState(_))));

        apply_member_swipe(&mut connection, &MemberSwipeInput::new(Decision::Right, false), false, Utc::now()).unwrap();

        let result = apply_creator_response(&mut connection, "someone_else", Decision::Right, Utc::now());
        assert!(matches!(result, Err(ConnectionError::Unauthorized(_))));

        apply_creator_response(&mut connection, "creator_1", Decision::Right, Utc::now()).unwrap();
        let result = apply_creator_response(&mut connection, "creator_1", Decision::Left, Utc::now());
        assert!(matches!(result, Err(ConnectionError::InvalidState(_))));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut connection = new_direct_connection("creator_1", "member_1", Utc::now());
        let actor = Actor::Member("member_1".to_string());

        assert!(apply_disconnect(&mut connection, &actor, Utc::now()).unwrap());
        let first = connection.disconnected_at;

        assert!(!apply_disconnect(&mut connection, &actor, Utc::now()).unwrap());
        assert_eq!(connection.disconnected_at, first);
        assert_eq!(connection.status, ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_disconnect_requires_participant() {
        let mut connection = new_direct_connection("creator_1", "member_1", Utc::now());

        let result = apply_disconnect(&mut connection, &Actor::Creator("creator_2".to_string()), Utc::now());
        assert!(matches!(result, Err(ConnectionError::Unauthorized(_))));

        // A member id that happens to equal the creator id is still the wrong role
        let result = apply_disconnect(&mut connection, &Actor::Member("creator_1".to_string()), Utc::now());
        assert!(matches!(result, Err(ConnectionError::Unauthorized(_))));
    }

    #[test]
    fn test_blocked_is_terminal() {
        let mut connection = new_direct_connection("creator_1", "member_1", Utc::now());
        assert!(apply_block(&mut connection, "spam", Utc::now()));
        assert!(!apply_block(&mut connection, "spam", Utc::now()));

        let result = apply_disconnect(&mut connection, &Actor::Creator("creator_1".to_string()), Utc::now());
        assert!(matches!(result, Err(ConnectionError::InvalidState(_))));
        assert_eq!(connection.status, ConnectionStatus::Blocked);
    }

    #[test]
    fn test_direct_connection() {
        let now = Utc::now();
        let connection = new_direct_connection("creator_1", "member_1", now);

        assert_eq!(connection.status, ConnectionStatus::Connected);
        assert_eq!(connection.source, ConnectionSource::CreatorInitiated);
        assert_eq!(connection.connected_at, Some(now));
        assert!(connection.swipe_data.member.is_none());
    }
}

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::{
    compatibility::compatibility,
    engagement::{self, EngagementEvent},
    health,
    ranker::{BrowseStack, DiscoveryRanker},
    reporting::{self, CreatorStats},
    swipe::{self, MemberSwipeInput, SwipeOutcome},
};
use crate::error::ConnectionError;
use crate::models::{
    Actor, BrowseContext, BrowseFilters, Connection, ConnectionStatus, Decision, FlagUpdate, Party,
    PartyNotificationPrefs, Refund,
};
use crate::services::directory::ProfileDirectory;
use crate::services::notifier::{ConnectionSignal, Notifier};
use crate::services::store::{ConnectionStore, StoreError};

/// Tunables for the engine
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Attempts per atomic update before giving up with `Conflict`
    pub max_update_retries: u32,
    /// Age after which cached health is recomputed on read
    pub health_freshness: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_update_retries: 5,
            health_freshness: Duration::hours(1),
        }
    }
}

/// Result of a member swipe
#[derive(Debug, Clone)]
pub struct SwipeResult {
    pub connection: Connection,
    pub outcome: SwipeOutcome,
}

/// Connection & relationship engine
///
/// Every write goes through [`ConnectionEngine::mutate`], which reloads the
/// record, applies a pure mutation and commits it with a version check.
pub struct ConnectionEngine {
    store: Arc<dyn ConnectionStore>,
    directory: Arc<dyn ProfileDirectory>,
    notifier: Arc<dyn Notifier>,
    ranker: DiscoveryRanker,
    options: EngineOptions,
}

impl ConnectionEngine {
    pub fn new(
        store: Arc<dyn ConnectionStore>,
        directory: Arc<dyn ProfileDirectory>,
        notifier: Arc<dyn Notifier>,
        ranker: DiscoveryRanker,
        options: EngineOptions,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            ranker,
            options,
        }
    }

    pub fn ranker(&self) -> &DiscoveryRanker {
        &self.ranker
    }

    /// Atomic read-modify-write of one connection with bounded retry
    async fn mutate<T, F>(&self, id: Uuid, mut apply: F) -> Result<(Connection, T), ConnectionError>
    where
        F: FnMut(&mut Connection, DateTime<Utc>) -> Result<T, ConnectionError> + Send,
        T: Send,
    {
        let attempts = self.options.max_update_retries.max(1);

        for attempt in 1..=attempts {
            let current = self
                .store
                .get(id)
                .await?
                .ok_or_else(|| ConnectionError::NotFound(format!("connection {}", id)))?;

            let now = Utc::now();
            let mut next = current.clone();
            let result = apply(&mut next, now)?;

            // Nothing changed, nothing to write
            if next == current {
                return Ok((current, result));
            }

            next.version = current.version + 1;
            next.updated_at = now;

            if self.store.compare_and_swap(current.version, &next).await? {
                return Ok((next, result));
            }

            debug!("Version conflict on connection {} (attempt {}/{})", id, attempt, attempts);
        }

        Err(ConnectionError::Conflict(format!(
            "connection {} was modified concurrently {} times",
            id, attempts
        )))
    }

    async fn emit(&self, signal: ConnectionSignal) {
        if let Err(e) = self.notifier.notify(signal).await {
            warn!("Failed to deliver connection signal: {}", e);
        }
    }

    /// Signals for a committed swipe; `was_connected` is the state it was applied to
    async fn announce_swipe(&self, connection: &Connection, outcome: SwipeOutcome, super_like: bool, was_connected: bool) {
        match outcome {
            SwipeOutcome::Pending => {
                self.emit(ConnectionSignal::like_received(connection, super_like)).await;
            }
            SwipeOutcome::InstantConnection | SwipeOutcome::Matched if !was_connected => {
                self.emit(ConnectionSignal::connection_established(connection)).await;
            }
            SwipeOutcome::InstantConnection | SwipeOutcome::Matched | SwipeOutcome::Passed => {}
        }
    }

    /// Record a member's swipe on a creator
    pub async fn record_member_swipe(
        &self,
        member_id: &str,
        creator_id: &str,
        input: MemberSwipeInput,
        context: Option<BrowseContext>,
    ) -> Result<SwipeResult, ConnectionError> {
        input.resolve()?;

        let member = self.directory.get_member(member_id).await?;
        let creator = self.directory.get_creator(creator_id).await?;
        let auto_connect = creator.auto_connect_enabled;

        for attempt in 1..=self.options.max_update_retries.max(1) {
            if let Some(existing) = self.store.find_pair(creator_id, member_id).await? {
                let (connection, (outcome, was_connected)) = self
                    .mutate(existing.id, |c, now| {
                        let was_connected = c.is_connected();
                        swipe::apply_member_swipe(c, &input, auto_connect, now).map(|o| (o, was_connected))
                    })
                    .await?;

                info!("Member {} swiped on creator {}: {:?}", member_id, creator_id, outcome);
                self.announce_swipe(&connection, outcome, input.super_like, was_connected).await;
                return Ok(SwipeResult { connection, outcome });
            }

            let now = Utc::now();
            let mut connection = Connection::new(creator_id, member_id, now);
            connection.browse_context = context.clone();
            connection.relationship.compatibility = Some(compatibility(&member, &creator));
            let outcome = swipe::apply_member_swipe(&mut connection, &input, auto_connect, now)?;
            connection.updated_at = now;

            match self.store.insert(&connection).await {
                Ok(()) => {
                    info!("Member {} swiped on creator {}: {:?}", member_id, creator_id, outcome);
                    self.announce_swipe(&connection, outcome, input.super_like, false).await;
                    return Ok(SwipeResult { connection, outcome });
                }
                Err(StoreError::DuplicatePair { .. }) => {
                    // Another request created the pair first; go through the update path
                    debug!(
                        "Lost first-swipe race for {} -> {} (attempt {})",
                        member_id, creator_id, attempt
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ConnectionError::ConstraintViolation(format!(
            "could not create or update connection for creator {} and member {}",
            creator_id, member_id
        )))
    }

    /// Creator accepts or declines a pending like
    pub async fn record_creator_response(
        &self,
        creator_id: &str,
        connection_id: Uuid,
        decision: Decision,
    ) -> Result<Connection, ConnectionError> {
        let (connection, _) = self
            .mutate(connection_id, |c, now| swipe::apply_creator_response(c, creator_id, decision, now))
            .await?;

        info!("Creator {} responded {:?} on {}", creator_id, decision, connection_id);

        if connection.is_connected() {
            self.emit(ConnectionSignal::connection_established(&connection)).await;
        }

        Ok(connection)
    }

    /// Disconnect a pair; repeating it is a no-op
    pub async fn disconnect(&self, actor: &Actor, connection_id: Uuid) -> Result<Connection, ConnectionError> {
        let (connection, changed) = self
            .mutate(connection_id, |c, now| swipe::apply_disconnect(c, actor, now))
            .await?;

        if changed {
            info!("Connection {} disconnected by {:?}", connection_id, actor.party());
        }

        Ok(connection)
    }

    /// Creator reaches out directly; an existing record is returned unchanged
    pub async fn find_or_create_direct_connection(
        &self,
        creator_id: &str,
        member_id: &str,
    ) -> Result<(Connection, bool), ConnectionError> {
        if let Some(existing) = self.store.find_pair(creator_id, member_id).await? {
            return Ok((existing, false));
        }

        let member = self.directory.get_member(member_id).await?;
        let creator = self.directory.get_creator(creator_id).await?;

        let mut connection = swipe::new_direct_connection(creator_id, member_id, Utc::now());
        connection.relationship.compatibility = Some(compatibility(&member, &creator));

        match self.store.insert(&connection).await {
            Ok(()) => {
                info!("Creator {} connected directly with member {}", creator_id, member_id);
                self.emit(ConnectionSignal::connection_established(&connection)).await;
                Ok((connection, true))
            }
            Err(StoreError::DuplicatePair { .. }) => {
                let existing = self.store.find_pair(creator_id, member_id).await?.ok_or_else(|| {
                    ConnectionError::ConstraintViolation(format!(
                        "connection for creator {} and member {} vanished during creation",
                        creator_id, member_id
                    ))
                })?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a messaging or payment event
    pub async fn apply_event(
        &self,
        connection_id: Uuid,
        event: EngagementEvent,
    ) -> Result<(Connection, Option<Uuid>), ConnectionError> {
        let (connection, purchase_id) = self
            .mutate(connection_id, |c, now| engagement::apply_event(c, &event, now))
            .await?;

        debug!(
            "Applied {} to {} (revenue {:.2}, health {:?})",
            event.name(),
            connection_id,
            connection.monetization.total_revenue,
            connection.relationship.health.status
        );

        Ok((connection, purchase_id))
    }

    /// Reverse all or part of an itemized purchase
    pub async fn apply_refund(
        &self,
        connection_id: Uuid,
        purchase_id: Uuid,
        amount: f64,
        reason: &str,
    ) -> Result<(Connection, Refund), ConnectionError> {
        let (connection, refund) = self
            .mutate(connection_id, |c, now| engagement::apply_refund(c, purchase_id, amount, reason, now))
            .await?;

        info!(
            "Refunded {:.2} of purchase {} on connection {}: {}",
            refund.amount, purchase_id, connection_id, reason
        );

        Ok((connection, refund))
    }

    /// Moderation block; terminal
    pub async fn block(&self, connection_id: Uuid, reason: &str) -> Result<Connection, ConnectionError> {
        let (connection, changed) = self
            .mutate(connection_id, |c, now| Ok(swipe::apply_block(c, reason, now)))
            .await?;

        if changed {
            warn!("Connection {} blocked: {}", connection_id, reason);
        }

        Ok(connection)
    }

    /// Moderation and verification flags
    pub async fn set_flags(&self, connection_id: Uuid, update: FlagUpdate) -> Result<Connection, ConnectionError> {
        let (connection, _) = self
            .mutate(connection_id, |c, _| {
                update.apply(&mut c.flags);
                Ok(())
            })
            .await?;

        Ok(connection)
    }

    /// Update the acting party's notification preferences
    pub async fn update_notification_preferences(
        &self,
        actor: &Actor,
        connection_id: Uuid,
        prefs: PartyNotificationPrefs,
    ) -> Result<Connection, ConnectionError> {
        let (connection, _) = self
            .mutate(connection_id, |c, _| {
                if !c.involves(actor) {
                    return Err(ConnectionError::Unauthorized(format!(
                        "{} is not part of connection {}",
                        actor.id(),
                        c.id
                    )));
                }
                match actor.party() {
                    Party::Member => c.notifications.member = prefs.clone(),
                    Party::Creator => c.notifications.creator = prefs.clone(),
                }
                Ok(())
            })
            .await?;

        Ok(connection)
    }

    /// Recompute stale health and persist it; a failed write keeps the
    /// recomputed copy for this read only
    async fn refresh_if_stale(&self, connection: Connection) -> Connection {
        let now = Utc::now();
        if !health::is_stale(&connection, now, self.options.health_freshness) {
            return connection;
        }

        match self
            .mutate(connection.id, |c, now| {
                health::refresh(c, now);
                Ok(())
            })
            .await
        {
            Ok((fresh, _)) => fresh,
            Err(e) => {
                warn!("Failed to persist health refresh for {}: {}", connection.id, e);
                let mut local = connection;
                health::refresh(&mut local, now);
                local
            }
        }
    }

    async fn refresh_all(&self, connections: Vec<Connection>) -> Vec<Connection> {
        let mut fresh = Vec::with_capacity(connections.len());
        for connection in connections {
            fresh.push(self.refresh_if_stale(connection).await);
        }
        fresh
    }

    pub async fn get_connection(&self, connection_id: Uuid) -> Result<Connection, ConnectionError> {
        let connection = self
            .store
            .get(connection_id)
            .await?
            .ok_or_else(|| ConnectionError::NotFound(format!("connection {}", connection_id)))?;

        Ok(self.refresh_if_stale(connection).await)
    }

    pub async fn find_pair(&self, creator_id: &str, member_id: &str) -> Result<Option<Connection>, ConnectionError> {
        Ok(self.store.find_pair(creator_id, member_id).await?)
    }

    /// Messaging is allowed only between connected parties
    pub async fn can_message(&self, connection_id: Uuid) -> Result<bool, ConnectionError> {
        let connection = self
            .store
            .get(connection_id)
            .await?
            .ok_or_else(|| ConnectionError::NotFound(format!("connection {}", connection_id)))?;

        Ok(connection.status == ConnectionStatus::Connected)
    }

    pub async fn top_spenders(&self, creator_id: &str, limit: usize) -> Result<Vec<Connection>, ConnectionError> {
        let connections = self.store.list_for_creator(creator_id, None).await?;
        Ok(reporting::top_spenders(connections, limit))
    }

    pub async fn at_risk(&self, creator_id: &str) -> Result<Vec<Connection>, ConnectionError> {
        let connections = self
            .store
            .list_for_creator(creator_id, Some(ConnectionStatus::Connected))
            .await?;
        let fresh = self.refresh_all(connections).await;
        Ok(reporting::at_risk(fresh))
    }

    pub async fn relationship_strength(&self, connection_id: Uuid) -> Result<f64, ConnectionError> {
        let connection = self.get_connection(connection_id).await?;
        Ok(reporting::relationship_strength(&connection, Utc::now()))
    }

    pub async fn list_for_creator(
        &self,
        creator_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, ConnectionError> {
        let connections = self.store.list_for_creator(creator_id, status).await?;
        Ok(self.refresh_all(connections).await)
    }

    pub async fn list_for_member(
        &self,
        member_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, ConnectionError> {
        let connections = self.store.list_for_member(member_id, status).await?;
        Ok(self.refresh_all(connections).await)
    }

    pub async fn creator_stats(&self, creator_id: &str) -> Result<CreatorStats, ConnectionError> {
        let connections = self.list_for_creator(creator_id, None).await?;
        Ok(reporting::creator_stats(creator_id, &connections))
    }

    /// Creators the member has a record with; these never reappear in browsing
    pub async fn swiped_creator_ids(&self, member_id: &str) -> Result<HashSet<String>, ConnectionError> {
        Ok(self.store.creator_ids_for_member(member_id).await?.into_iter().collect())
    }

    /// Build a browse stack for a member
    pub async fn browse_stack<R: Rng + Send + ?Sized>(
        &self,
        member_id: &str,
        filters: &BrowseFilters,
        rng: &mut R,
    ) -> Result<BrowseStack, ConnectionError> {
        let member = self.directory.get_member(member_id).await?;
        let excluded = self.swiped_creator_ids(member_id).await?;
        let exclude_ids: Vec<String> = excluded.iter().cloned().collect();

        // Orientation is evaluated locally, so over-fetch
        let fetch_limit = self.ranker.params().candidate_limit * 2;
        let candidates = self
            .directory
            .query_creators(filters, &exclude_ids, fetch_limit)
            .await?;

        debug!(
            "Browsing for {}: {} candidates, {} excluded",
            member_id,
            candidates.len(),
            excluded.len()
        );

        Ok(self
            .ranker
            .build_stack(&member, filters, candidates, &excluded, Utc::now(), rng))
    }

    /// Remove every connection of a permanently deleted account
    pub async fn purge_participant(&self, participant_id: &str) -> Result<u64, ConnectionError> {
        let removed = self.store.delete_for_participant(participant_id).await?;
        info!("Purged {} connections for participant {}", removed, participant_id);
        Ok(removed)
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }
}

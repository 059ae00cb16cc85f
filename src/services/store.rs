use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Connection, ConnectionStatus};

/// Errors a connection store can report
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate connection for creator {creator_id} and member {member_id}")]
    DuplicatePair { creator_id: String, member_id: String },

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Persistence for connection records.
///
/// Implementations must enforce pair uniqueness themselves and apply
/// `compare_and_swap` atomically against the stored `version`.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// Insert a new record; fails with `DuplicatePair` if the pair already exists
    async fn insert(&self, connection: &Connection) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Connection>, StoreError>;

    async fn find_pair(&self, creator_id: &str, member_id: &str) -> Result<Option<Connection>, StoreError>;

    /// Replace the record if its stored version still equals `expected_version`.
    /// Returns `false` when another writer got there first.
    async fn compare_and_swap(&self, expected_version: i64, connection: &Connection) -> Result<bool, StoreError>;

    async fn list_for_creator(
        &self,
        creator_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, StoreError>;

    async fn list_for_member(
        &self,
        member_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, StoreError>;

    /// Creator ids the member already has a record with
    async fn creator_ids_for_member(&self, member_id: &str) -> Result<Vec<String>, StoreError>;

    /// Remove every record the participant is part of; returns how many were removed
    async fn delete_for_participant(&self, participant_id: &str) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

#[derive(Default)]
struct MemoryInner {
    by_id: HashMap<Uuid, Connection>,
    by_pair: HashMap<(String, String), Uuid>,
}

/// In-process store used by tests and local development
///
/// A single lock covers both the records and the pair index, so
/// check-and-insert cannot interleave with another insert.
#[derive(Default)]
pub struct MemoryConnectionStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn status_matches(connection: &Connection, status: Option<ConnectionStatus>) -> bool {
    status.map_or(true, |s| connection.status == s)
}

#[async_trait]
impl ConnectionStore for MemoryConnectionStore {
    async fn insert(&self, connection: &Connection) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = (connection.creator_id.clone(), connection.member_id.clone());

        if inner.by_pair.contains_key(&key) || inner.by_id.contains_key(&connection.id) {
            return Err(StoreError::DuplicatePair {
                creator_id: connection.creator_id.clone(),
                member_id: connection.member_id.clone(),
            });
        }

        inner.by_pair.insert(key, connection.id);
        inner.by_id.insert(connection.id, connection.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Connection>, StoreError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn find_pair(&self, creator_id: &str, member_id: &str) -> Result<Option<Connection>, StoreError> {
        let inner = self.inner.read().await;
        let key = (creator_id.to_string(), member_id.to_string());
        Ok(inner.by_pair.get(&key).and_then(|id| inner.by_id.get(id)).cloned())
    }

    async fn compare_and_swap(&self, expected_version: i64, connection: &Connection) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.by_id.get_mut(&connection.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = connection.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn list_for_creator(
        &self,
        creator_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_id
            .values()
            .filter(|c| c.creator_id == creator_id && status_matches(c, status))
            .cloned()
            .collect())
    }

    async fn list_for_member(
        &self,
        member_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_id
            .values()
            .filter(|c| c.member_id == member_id && status_matches(c, status))
            .cloned()
            .collect())
    }

    async fn creator_ids_for_member(&self, member_id: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_pair
            .keys()
            .filter(|(_, member)| member == member_id)
            .map(|(creator, _)| creator.clone())
            .collect())
    }

    async fn delete_for_participant(&self, participant_id: &str) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let doomed: Vec<(Uuid, (String, String))> = inner
            .by_id
            .values()
            .filter(|c| c.creator_id == participant_id || c.member_id == participant_id)
            .map(|c| (c.id, (c.creator_id.clone(), c.member_id.clone())))
            .collect();

        for (id, pair) in &doomed {
            inner.by_id.remove(id);
            inner.by_pair.remove(pair);
        }

        Ok(doomed.len() as u64)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

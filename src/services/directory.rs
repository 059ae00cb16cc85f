use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{BrowseFilters, CreatorProfile, MemberProfile};
use crate::services::cache::{CacheError, CacheKey, CacheManager};

/// Errors that can occur while looking up profiles
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the member and creator profiles owned by other services
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn get_member(&self, member_id: &str) -> Result<MemberProfile, DirectoryError>;

    async fn get_creator(&self, creator_id: &str) -> Result<CreatorProfile, DirectoryError>;

    /// Active, browsable creators, pre-filtered as far as the backend allows
    async fn query_creators(
        &self,
        filters: &BrowseFilters,
        exclude_ids: &[String],
        limit: usize,
    ) -> Result<Vec<CreatorProfile>, DirectoryError>;
}

/// In-process profile directory used by tests and local development
#[derive(Default)]
pub struct MemoryProfileDirectory {
    members: RwLock<HashMap<String, MemberProfile>>,
    creators: RwLock<HashMap<String, CreatorProfile>>,
}

impl MemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_member(&self, member: MemberProfile) {
        self.members.write().await.insert(member.member_id.clone(), member);
    }

    pub async fn upsert_creator(&self, creator: CreatorProfile) {
        self.creators.write().await.insert(creator.creator_id.clone(), creator);
    }
}

#[async_trait]
impl ProfileDirectory for MemoryProfileDirectory {
    async fn get_member(&self, member_id: &str) -> Result<MemberProfile, DirectoryError> {
        self.members
            .read()
            .await
            .get(member_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("member {}", member_id)))
    }

    async fn get_creator(&self, creator_id: &str) -> Result<CreatorProfile, DirectoryError> {
        self.creators
            .read()
            .await
            .get(creator_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("creator {}", creator_id)))
    }

    async fn query_creators(
        &self,
        _filters: &BrowseFilters,
        exclude_ids: &[String],
        limit: usize,
    ) -> Result<Vec<CreatorProfile>, DirectoryError> {
        let creators = self.creators.read().await;
        let mut found: Vec<CreatorProfile> = creators
            .values()
            .filter(|c| c.is_active && c.is_browsable && !exclude_ids.contains(&c.creator_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.creator_id.cmp(&b.creator_id));
        found.truncate(limit);
        Ok(found)
    }
}

/// Profile directory that serves member lookups through the cache
pub struct CachedDirectory {
    inner: Arc<dyn ProfileDirectory>,
    cache: Arc<CacheManager>,
}

impl CachedDirectory {
    pub fn new(inner: Arc<dyn ProfileDirectory>, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl ProfileDirectory for CachedDirectory {
    async fn get_member(&self, member_id: &str) -> Result<MemberProfile, DirectoryError> {
        let key = CacheKey::member(member_id);
        match self.cache.get::<MemberProfile>(&key).await {
            Ok(member) => return Ok(member),
            Err(CacheError::CacheMiss(_)) => {}
            Err(e) => tracing::warn!("Cache read failed for {}: {}", key, e),
        }

        let member = self.inner.get_member(member_id).await?;
        if let Err(e) = self.cache.set(&key, &member).await {
            tracing::warn!("Failed to cache member {}: {}", member_id, e);
        }
        Ok(member)
    }

    async fn get_creator(&self, creator_id: &str) -> Result<CreatorProfile, DirectoryError> {
        // Creator settings such as auto-connect gate the swipe outcome; always read live
        self.inner.get_creator(creator_id).await
    }

    async fn query_creators(
        &self,
        filters: &BrowseFilters,
        exclude_ids: &[String],
        limit: usize,
    ) -> Result<Vec<CreatorProfile>, DirectoryError> {
        // Candidate lists depend on live activity; never cached
        self.inner.query_creators(filters, exclude_ids, limit).await
    }
}

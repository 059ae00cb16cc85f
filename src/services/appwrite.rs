use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{BrowseFilters, CreatorProfile, MemberProfile};
use crate::services::directory::{DirectoryError, ProfileDirectory};

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<AppwriteError> for DirectoryError {
    fn from(value: AppwriteError) -> Self {
        match value {
            AppwriteError::NotFound(what) => DirectoryError::NotFound(what),
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}

/// Appwrite API client
///
/// Reads the member and creator profile collections owned by the profile
/// service. The engine never writes to Appwrite.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub creator_profiles: String,
    pub member_profiles: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        })
    }

    /// List documents of a collection matching the given Appwrite queries
    async fn list_documents(&self, collection: &str, queries: &[String]) -> Result<Vec<Value>, AppwriteError> {
        let url = format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        );

        // Build query array for Appwrite
        let queries_json = serde_json::to_string(queries)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to encode queries: {}", e)))?;
        let full_url = format!("{}?query={}", url, urlencoding::encode(&queries_json));

        let response = self
            .client
            .get(&full_url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppwriteError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Appwrite query on {} failed: {} - {}", collection, status, body);
            return Err(AppwriteError::ApiError(format!("Failed to list {}: {}", collection, status)));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        Ok(documents.clone())
    }

    /// Fetch the single document whose `field` equals `id`
    async fn get_document<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        id: &str,
        what: &str,
    ) -> Result<T, AppwriteError> {
        tracing::debug!("Fetching {} {}", what, id);

        let queries = vec![format!("equal(\"{}\", \"{}\")", field, id), "limit(1)".to_string()];
        let documents = self.list_documents(collection, &queries).await?;

        let doc = documents
            .first()
            .ok_or_else(|| AppwriteError::NotFound(format!("{} {}", what, id)))?;

        // Extract data from Appwrite document format
        let data = doc.get("data").unwrap_or(doc);

        serde_json::from_value(data.clone())
            .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    /// Query browsable creators, pushing the hard filters Appwrite can evaluate
    pub async fn query_creators(
        &self,
        filters: &BrowseFilters,
        exclude_ids: &[String],
        limit: usize,
    ) -> Result<Vec<CreatorProfile>, AppwriteError> {
        let queries = creator_queries(filters, exclude_ids, limit);
        let documents = self.list_documents(&self.collections.creator_profiles, &queries).await?;

        let creators: Vec<CreatorProfile> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                match serde_json::from_value(data.clone()) {
                    Ok(creator) => Some(creator),
                    Err(e) => {
                        tracing::warn!("Skipping malformed creator document: {}", e);
                        None
                    }
                }
            })
            .filter(|c: &CreatorProfile| !exclude_ids.contains(&c.creator_id))
            .collect();

        tracing::debug!("Queried {} creator candidates", creators.len());

        Ok(creators)
    }
}

/// Appwrite `equal` is case-sensitive, so body type and ethnicity are left to
/// the case-insensitive local filters
fn creator_queries(filters: &BrowseFilters, exclude_ids: &[String], limit: usize) -> Vec<String> {
    let mut queries = vec![
        "equal(\"isActive\", true)".to_string(),
        "equal(\"isBrowsable\", true)".to_string(),
        "orderDesc(\"lastActive\")".to_string(),
        format!("limit({})", limit),
    ];

    if let Some(min_age) = filters.min_age {
        queries.push(format!("greaterThanEqual(\"age\", {})", min_age));
    }
    if let Some(max_age) = filters.max_age {
        queries.push(format!("lessThanEqual(\"age\", {})", max_age));
    }
    if !exclude_ids.is_empty() {
        queries.push(format!("notEqual(\"creatorId\", {})", quoted_list(exclude_ids)));
    }

    queries
}

fn quoted_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("\"{}\"", v)).collect();
    format!("[{}]", quoted.join(","))
}

#[async_trait]
impl ProfileDirectory for AppwriteClient {
    async fn get_member(&self, member_id: &str) -> Result<MemberProfile, DirectoryError> {
        Ok(self
            .get_document(&self.collections.member_profiles, "memberId", member_id, "member")
            .await?)
    }

    async fn get_creator(&self, creator_id: &str) -> Result<CreatorProfile, DirectoryError> {
        Ok(self
            .get_document(&self.collections.creator_profiles, "creatorId", creator_id, "creator")
            .await?)
    }

    async fn query_creators(
        &self,
        filters: &BrowseFilters,
        exclude_ids: &[String],
        limit: usize,
    ) -> Result<Vec<CreatorProfile>, DirectoryError> {
        Ok(AppwriteClient::query_creators(self, filters, exclude_ids, limit).await?)
    }
}

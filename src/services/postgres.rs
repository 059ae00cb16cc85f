use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Connection, ConnectionStatus};
use crate::services::store::{ConnectionStore, StoreError};

/// Name of the unique constraint guarding one record per pair
const PAIR_CONSTRAINT: &str = "connections_pair_unique";

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl From<PostgresError> for StoreError {
    fn from(value: PostgresError) -> Self {
        StoreError::Backend(value.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        StoreError::Backend(value.to_string())
    }
}

/// PostgreSQL-backed connection store
///
/// Each connection is kept as a JSONB document next to the columns needed
/// for lookups (pair, status, revenue, churn risk) and the `version` stamp
/// used for compare-and-swap updates. The `(creator_id, member_id)` unique
/// constraint is what closes the race between two first swipes.
pub struct PostgresConnectionStore {
    pool: PgPool,
}

impl PostgresConnectionStore {
    /// Create a new PostgreSQL store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    fn decode_rows(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<Connection>, StoreError> {
        rows.iter()
            .map(|row| -> Result<Connection, StoreError> {
                let Json(connection): Json<Connection> = row.try_get("document")?;
                Ok(connection)
            })
            .collect()
    }
}

#[async_trait]
impl ConnectionStore for PostgresConnectionStore {
    async fn insert(&self, connection: &Connection) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO connections
                (id, creator_id, member_id, status, total_revenue, churn_risk, version, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#;

        let result = sqlx::query(query)
            .bind(connection.id)
            .bind(&connection.creator_id)
            .bind(&connection.member_id)
            .bind(connection.status.as_str())
            .bind(connection.monetization.total_revenue)
            .bind(connection.relationship.health.churn_risk as i16)
            .bind(connection.version)
            .bind(Json(connection))
            .bind(connection.created_at)
            .bind(connection.updated_at)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(
                    "Inserted connection {} ({} -> {})",
                    connection.id,
                    connection.member_id,
                    connection.creator_id
                );
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.constraint() == Some(PAIR_CONSTRAINT) || db.is_unique_violation() => {
                Err(StoreError::DuplicatePair {
                    creator_id: connection.creator_id.clone(),
                    member_id: connection.member_id.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Connection>, StoreError> {
        let row = sqlx::query("SELECT document FROM connections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<Connection, StoreError> {
            let Json(connection): Json<Connection> = row.try_get("document")?;
            Ok(connection)
        })
        .transpose()
    }

    async fn find_pair(&self, creator_id: &str, member_id: &str) -> Result<Option<Connection>, StoreError> {
        let row = sqlx::query("SELECT document FROM connections WHERE creator_id = $1 AND member_id = $2")
            .bind(creator_id)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| -> Result<Connection, StoreError> {
            let Json(connection): Json<Connection> = row.try_get("document")?;
            Ok(connection)
        })
        .transpose()
    }

    async fn compare_and_swap(&self, expected_version: i64, connection: &Connection) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE connections
            SET status = $3,
                total_revenue = $4,
                churn_risk = $5,
                version = $6,
                document = $7,
                updated_at = $8
            WHERE id = $1 AND version = $2
        "#;

        let result = sqlx::query(query)
            .bind(connection.id)
            .bind(expected_version)
            .bind(connection.status.as_str())
            .bind(connection.monetization.total_revenue)
            .bind(connection.relationship.health.churn_risk as i16)
            .bind(connection.version)
            .bind(Json(connection))
            .bind(connection.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_for_creator(
        &self,
        creator_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, StoreError> {
        let query = r#"
            SELECT document
            FROM connections
            WHERE creator_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(creator_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Self::decode_rows(rows)
    }

    async fn list_for_member(
        &self,
        member_id: &str,
        status: Option<ConnectionStatus>,
    ) -> Result<Vec<Connection>, StoreError> {
        let query = r#"
            SELECT document
            FROM connections
            WHERE member_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(member_id)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        Self::decode_rows(rows)
    }

    async fn creator_ids_for_member(&self, member_id: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT creator_id FROM connections WHERE member_id = $1")
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<String> = rows.iter().map(|row| row.get("creator_id")).collect();

        tracing::debug!("Member {} has records with {} creators", member_id, ids.len());

        Ok(ids)
    }

    async fn delete_for_participant(&self, participant_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM connections WHERE creator_id = $1 OR member_id = $1")
            .bind(participant_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "Removed {} connections for participant {}",
            result.rows_affected(),
            participant_id
        );

        Ok(result.rows_affected())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_error_maps_to_backend() {
        let err: StoreError = PostgresError::SqlxError(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_pair_constraint_enforced() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresConnectionStore::from_settings(&url, Some(2), Some(1), None, None)
            .await
            .expect("Failed to connect");

        let creator = format!("creator_{}", Uuid::new_v4());
        let first = Connection::new(&creator, "member_pg", chrono::Utc::now());
        let second = Connection::new(&creator, "member_pg", chrono::Utc::now());

        store.insert(&first).await.unwrap();
        assert!(matches!(store.insert(&second).await, Err(StoreError::DuplicatePair { .. })));

        store.delete_for_participant(&creator).await.unwrap();
    }
}

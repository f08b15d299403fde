//! SQLite implementation of the DurableStore.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::parse_datetime;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{SessionSnapshot, ShareArtifact, SharedValue};
use crate::domain::ports::DurableStore;

#[derive(Clone)]
pub struct SqliteDurableStore {
    pool: SqlitePool,
}

impl SqliteDurableStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DurableStore for SqliteDurableStore {
    async fn upsert_session(&self, snapshot: &SessionSnapshot) -> DomainResult<()> {
        let snapshot_json = serde_json::to_string(snapshot)?;

        sqlx::query(
            r#"INSERT INTO sessions (id, share_slug, snapshot, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   share_slug = excluded.share_slug,
                   snapshot = excluded.snapshot,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&snapshot.session_id)
        .bind(&snapshot.share_slug)
        .bind(&snapshot_json)
        .bind(snapshot.created_at.map(|t| t.to_rfc3339()))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_session_by_slug(&self, slug: &str) -> DomainResult<Option<SessionSnapshot>> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"SELECT snapshot FROM sessions
               WHERE share_slug = ?
                  OR id = (SELECT session_id FROM share_artifacts WHERE slug = ?)
               LIMIT 1"#,
        )
        .bind(slug)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(json,)| serde_json::from_str(&json).map_err(DomainError::from))
            .transpose()
    }

    async fn create_share(&self, artifact: &ShareArtifact) -> DomainResult<()> {
        let values_json = serde_json::to_string(&artifact.values)?;

        sqlx::query(
            r#"INSERT INTO share_artifacts (slug, session_id, share_values, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(&artifact.slug)
        .bind(&artifact.session_id)
        .bind(&values_json)
        .bind(artifact.created_at.to_rfc3339())
        .bind(artifact.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_share(&self, slug: &str) -> DomainResult<Option<ShareArtifact>> {
        let row: Option<ShareRow> = sqlx::query_as(
            "SELECT slug, session_id, share_values, created_at, updated_at FROM share_artifacts WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn update_share(&self, artifact: &ShareArtifact) -> DomainResult<()> {
        let values_json = serde_json::to_string(&artifact.values)?;

        let result = sqlx::query(
            "UPDATE share_artifacts SET share_values = ?, updated_at = ? WHERE slug = ?",
        )
        .bind(&values_json)
        .bind(artifact.updated_at.to_rfc3339())
        .bind(&artifact.slug)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ShareNotFound(artifact.slug.clone()));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ShareRow {
    slug: String,
    session_id: String,
    share_values: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ShareRow> for ShareArtifact {
    type Error = DomainError;

    fn try_from(row: ShareRow) -> Result<Self, Self::Error> {
        let values: Vec<SharedValue> = serde_json::from_str(&row.share_values)?;

        Ok(ShareArtifact {
            slug: row.slug,
            session_id: row.session_id,
            values,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

//! 角色进度仓储
//!
//! 快照以 JSONB 存储于 `actor_progress` 表，`version` 在每次写入时递增

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use super::ProgressRow;
use super::traits::ProgressRepositoryTrait;
use crate::error::Result;
use crate::models::{ActorId, ProgressSnapshot};

#[derive(Debug, FromRow)]
struct ActorProgressRow {
    actor_id: String,
    data: Json<ProgressSnapshot>,
    version: i64,
    updated_at: DateTime<Utc>,
}

impl From<ActorProgressRow> for ProgressRow {
    fn from(row: ActorProgressRow) -> Self {
        Self {
            actor_id: ActorId::from(row.actor_id),
            snapshot: row.data.0,
            version: row.version,
            updated_at: Some(row.updated_at),
        }
    }
}

pub struct ProgressRepository {
    pool: PgPool,
}

impl ProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepositoryTrait for ProgressRepository {
    async fn get_progress(&self, actor_id: &ActorId) -> Result<Option<ProgressRow>> {
        let row = sqlx::query_as::<_, ActorProgressRow>(
            r#"
            SELECT actor_id, data, version, updated_at
            FROM actor_progress
            WHERE actor_id = $1
            "#,
        )
        .bind(actor_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProgressRow::from))
    }

    async fn get_progress_many(&self, actor_ids: &[ActorId]) -> Result<Vec<ProgressRow>> {
        if actor_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = actor_ids.iter().map(ToString::to_string).collect();
        let rows = sqlx::query_as::<_, ActorProgressRow>(
            r#"
            SELECT actor_id, data, version, updated_at
            FROM actor_progress
            WHERE actor_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProgressRow::from).collect())
    }

    async fn replace_progress(
        &self,
        actor_id: &ActorId,
        snapshot: &ProgressSnapshot,
    ) -> Result<i64> {
        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO actor_progress (actor_id, data, version, updated_at)
            VALUES ($1, $2, 1, NOW())
            ON CONFLICT (actor_id) DO UPDATE
            SET data = EXCLUDED.data,
                version = actor_progress.version + 1,
                updated_at = NOW()
            RETURNING version
            "#,
        )
        .bind(actor_id.as_str())
        .bind(Json(snapshot))
        .fetch_one(&self.pool)
        .await?;

        Ok(version)
    }
}

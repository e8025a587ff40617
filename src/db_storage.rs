use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, PipelineColumn};
use crate::stores::{ColumnStore, LeadStore};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed lead store
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn get_lead(&self, id: Uuid) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, org_id, name, email, phone, stage_id,
                   gclid, fbclid, msclkid, deal_value, currency
            FROM leads
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Loading lead {}", id))?
        .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))
    }

    /// Only the stage column is written; the rest of the lead is owned elsewhere
    async fn set_stage(&self, id: Uuid, column_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET stage_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(column_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Updating stage of lead {}", id))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Lead {} disappeared before its stage could be updated",
                id
            )));
        }

        tracing::debug!("Stored stage {} for lead {}", column_id, id);
        Ok(())
    }
}

/// Postgres-backed pipeline column store (read-only)
pub struct PgColumnStore {
    pool: PgPool,
}

impl PgColumnStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ColumnStore for PgColumnStore {
    async fn list_columns(&self, org_id: Uuid) -> Result<Vec<PipelineColumn>, AppError> {
        let columns = sqlx::query_as::<_, PipelineColumn>(
            r#"
            SELECT id, title
            FROM pipeline_columns
            WHERE org_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Listing pipeline columns for org {}", org_id))?;

        Ok(columns)
    }
}

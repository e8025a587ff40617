use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Tables this service reads; `leads.stage_id` is the only column it writes.
const REQUIRED_TABLES: [&str; 2] = ["leads", "pipeline_columns"];

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        // Schema is owned by the CRM; only check that what we need is there
        for table in REQUIRED_TABLES {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
            )
            .bind(table)
            .fetch_one(&pool)
            .await?;

            if !exists {
                anyhow::bail!("Required table '{}' not found in database", table);
            }
        }

        Ok(Self { pool })
    }
}

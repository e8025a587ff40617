//! Utility to show how each status maps to a pipeline column for one organization.

use conversion_sync_api::config::Config;
use conversion_sync_api::db::Database;
use conversion_sync_api::db_storage::PgColumnStore;
use conversion_sync_api::models::TargetStatus;
use conversion_sync_api::stage_transition::resolve_column;
use conversion_sync_api::stores::ColumnStore;
use std::env;
use uuid::Uuid;

/// Main entry point for the column inspection utility.
///
/// Usage: `inspect_columns <org_id>`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let org_id: Uuid = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Usage: inspect_columns <org_id>"))?
        .parse()?;

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;
    let columns = PgColumnStore::new(db.pool.clone())
        .list_columns(org_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    println!("Pipeline columns for org {}:", org_id);
    for column in &columns {
        println!("  - {} ({})", column.title, column.id);
    }
    println!();

    for status in TargetStatus::ALL {
        match resolve_column(status, &columns, &config.stage_columns) {
            Some(column) => println!("{} -> {} ({})", status, column.title, column.id),
            None => println!("{} -> no matching column, stage left unchanged", status),
        }
    }

    Ok(())
}

//! Collaborator interfaces for lead and pipeline column persistence.
use crate::errors::AppError;
use crate::models::{Lead, PipelineColumn};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Loads a lead; `AppError::NotFound` when it does not exist.
    async fn get_lead(&self, id: Uuid) -> Result<Lead, AppError>;

    async fn set_stage(&self, id: Uuid, column_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ColumnStore: Send + Sync {
    /// Columns of an organization's pipeline, in board order.
    async fn list_columns(&self, org_id: Uuid) -> Result<Vec<PipelineColumn>, AppError>;
}

/// Short-lived per-organization cache in front of another column store.
pub struct CachedColumnStore {
    inner: Arc<dyn ColumnStore>,
    cache: Cache<Uuid, Arc<Vec<PipelineColumn>>>,
}

impl CachedColumnStore {
    pub fn new(inner: Arc<dyn ColumnStore>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(10_000)
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl ColumnStore for CachedColumnStore {
    async fn list_columns(&self, org_id: Uuid) -> Result<Vec<PipelineColumn>, AppError> {
        if let Some(cached) = self.cache.get(&org_id).await {
            tracing::debug!("Column cache hit for org {}", org_id);
            return Ok(cached.as_ref().clone());
        }

        let columns = self.inner.list_columns(org_id).await?;
        self.cache
            .insert(org_id, Arc::new(columns.clone()))
            .await;
        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ColumnStore for CountingStore {
        async fn list_columns(&self, _org_id: Uuid) -> Result<Vec<PipelineColumn>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![PipelineColumn {
                id: Uuid::nil(),
                title: "Won".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn test_second_listing_served_from_cache() {
        let inner = Arc::new(CountingStore {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedColumnStore::new(inner.clone(), Duration::from_secs(60));
        let org = Uuid::new_v4();

        let first = cached.list_columns(org).await.unwrap();
        let second = cached.list_columns(org).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}

//! Concurrent fan-out of platform syncs.
use crate::adapters::{AnalyticsAdapter, ConversionAdapter, PlatformAdapter};
use crate::analytics_client::Ga4Client;
use crate::config::Config;
use crate::errors::AppError;
use crate::google_ads_client::GoogleAdsClient;
use crate::meta_ads_client::MetaAdsClient;
use crate::microsoft_ads_client::MicrosoftAdsClient;
use crate::models::{Lead, PlatformName, SyncOutcome, TargetStatus};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Holds one adapter per configured platform and runs them concurrently.
///
/// A platform without an adapter is not configured for this tenant and
/// resolves to a neutral skip without any call.
#[derive(Clone)]
pub struct SyncDispatcher {
    adapters: HashMap<PlatformName, Arc<dyn PlatformAdapter>>,
    timeout: Duration,
}

impl SyncDispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            adapters: HashMap::new(),
            timeout,
        }
    }

    /// Registers an adapter, replacing any previous one for the same platform.
    pub fn with_adapter(mut self, adapter: Arc<dyn PlatformAdapter>) -> Self {
        self.adapters.insert(adapter.platform(), adapter);
        self
    }

    pub fn configured_platforms(&self) -> BTreeSet<PlatformName> {
        self.adapters.keys().copied().collect()
    }

    /// Runs every applicable adapter at once and waits for all of them.
    ///
    /// Each call is bounded by the per-adapter timeout. A call that times out
    /// or panics becomes a `Failed` outcome; the others are unaffected.
    /// Outcome order is unspecified.
    pub async fn dispatch(
        &self,
        lead: Arc<Lead>,
        status: TargetStatus,
        applicable: &BTreeSet<PlatformName>,
    ) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::with_capacity(applicable.len());
        let mut handles = Vec::with_capacity(applicable.len());

        for &platform in applicable {
            let Some(adapter) = self.adapters.get(&platform).cloned() else {
                tracing::info!("{} not configured; skipping", platform);
                outcomes.push(SyncOutcome::neutral_skip(platform));
                continue;
            };

            let lead = Arc::clone(&lead);
            let timeout = self.timeout;
            let handle = tokio::spawn(async move {
                match tokio::time::timeout(timeout, adapter.sync(&lead, status)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!("⏱️  {} sync timed out after {:?}", platform, timeout);
                        SyncOutcome::failed(platform, format!("timed out after {:?}", timeout))
                    }
                }
            });
            handles.push((platform, handle));
        }

        tracing::debug!(
            "Dispatched {} sync call(s) for lead {}",
            handles.len(),
            lead.id
        );

        for (platform, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!("{} adapter crashed: {}", platform, e);
                    outcomes.push(SyncOutcome::failed(
                        platform,
                        format!("internal adapter error: {}", e),
                    ));
                }
            }
        }

        outcomes
    }
}

/// Builds the dispatcher with an adapter for every platform configured in `config`.
pub fn dispatcher_from_config(config: &Config) -> Result<SyncDispatcher, AppError> {
    let timeout = config.sync_timeout;
    let mut dispatcher = SyncDispatcher::new(timeout);

    if let Some(google) = &config.google_ads {
        let client = GoogleAdsClient::new(google.clone(), timeout)?;
        dispatcher = dispatcher.with_adapter(Arc::new(ConversionAdapter::new(Arc::new(client))));
    }
    if let Some(meta) = &config.meta {
        let client = MetaAdsClient::new(meta.clone(), config.default_phone_region.clone(), timeout)?;
        dispatcher = dispatcher.with_adapter(Arc::new(ConversionAdapter::new(Arc::new(client))));
    }
    if let Some(microsoft) = &config.microsoft_ads {
        let client = MicrosoftAdsClient::new(microsoft.clone(), timeout)?;
        dispatcher = dispatcher.with_adapter(Arc::new(ConversionAdapter::new(Arc::new(client))));
    }
    if let Some(analytics) = &config.analytics {
        let client = Ga4Client::new(analytics.clone(), timeout)?;
        dispatcher = dispatcher.with_adapter(Arc::new(AnalyticsAdapter::new(Arc::new(client))));
    }

    tracing::info!(
        "Sync dispatcher ready with {:?}",
        dispatcher.configured_platforms()
    );
    Ok(dispatcher)
}

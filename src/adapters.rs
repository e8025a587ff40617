//! Platform adapters: one outbound call each, every failure folded into a `SyncOutcome`.
//!
//! Adapters wrap injected clients so the orchestrator only depends on these traits.
//! Clients own the wire format; adapters own classification.
use crate::models::{Lead, PlatformName, SyncOutcome, TargetStatus};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Longest body excerpt kept in a failure message.
const BODY_EXCERPT_CHARS: usize = 200;

/// Raw response of a platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl PlatformResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Reads a `reqwest` response into memory.
    pub async fn from_reqwest(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(Self { status, body })
    }
}

/// Errors raised by platform clients before a usable response exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Timeout, DNS, connection reset and other network-layer failures.
    Transport(String),
    /// The tenant has no integration for this platform (or this status).
    NotConfigured,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ClientError::NotConfigured => write!(f, "Integration not configured"),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// What a successful (2xx) body says about the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseVerdict {
    Accepted,
    /// Business-level errors embedded in an otherwise successful response.
    Rejected(Vec<String>),
}

/// Advertising platform conversion client.
#[async_trait]
pub trait ConversionClient: Send + Sync {
    fn platform(&self) -> PlatformName;

    async fn submit_conversion(
        &self,
        lead: &Lead,
        status: TargetStatus,
    ) -> Result<PlatformResponse, ClientError>;

    /// Interprets a 2xx body. `None` means the body is not in the expected format.
    fn inspect_body(&self, body: &[u8]) -> Option<ResponseVerdict>;
}

/// Analytics event sink client.
#[async_trait]
pub trait AnalyticsClient: Send + Sync {
    async fn send_event(
        &self,
        lead_id: Uuid,
        event_name: &str,
        params: Value,
    ) -> Result<PlatformResponse, ClientError>;

    /// Collection endpoints usually answer with an empty body.
    fn inspect_body(&self, body: &[u8]) -> Option<ResponseVerdict> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Some(ResponseVerdict::Accepted);
        }
        let value: Value = serde_json::from_slice(body).ok()?;
        let messages: Vec<String> = value
            .get("validationMessages")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|m| m.get("description").and_then(|d| d.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if messages.is_empty() {
            Some(ResponseVerdict::Accepted)
        } else {
            Some(ResponseVerdict::Rejected(messages))
        }
    }
}

/// One downstream sync target as seen by the dispatcher. Never fails.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> PlatformName;

    async fn sync(&self, lead: &Lead, status: TargetStatus) -> SyncOutcome;
}

/// Folds a client result into an outcome.
pub fn classify<F>(
    platform: PlatformName,
    result: Result<PlatformResponse, ClientError>,
    inspect: F,
) -> SyncOutcome
where
    F: FnOnce(&[u8]) -> Option<ResponseVerdict>,
{
    let response = match result {
        Ok(response) => response,
        Err(ClientError::NotConfigured) => return SyncOutcome::neutral_skip(platform),
        Err(ClientError::Transport(msg)) => return SyncOutcome::failed(platform, msg),
    };

    if !response.is_success() {
        return SyncOutcome::failed(
            platform,
            format!("HTTP {}: {}", response.status, body_excerpt(&response.body)),
        );
    }

    match inspect(&response.body) {
        None => SyncOutcome::failed(platform, "unexpected response format"),
        Some(ResponseVerdict::Accepted) => SyncOutcome::succeeded(platform),
        Some(ResponseVerdict::Rejected(errors)) if errors.is_empty() => {
            SyncOutcome::failed(platform, "platform rejected the submission")
        }
        Some(ResponseVerdict::Rejected(errors)) => SyncOutcome::failed(platform, errors.join("; ")),
    }
}

/// UTF-8 safe, truncated copy of a response body.
fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.chars().count() > BODY_EXCERPT_CHARS {
        let truncated: String = text.chars().take(BODY_EXCERPT_CHARS).collect();
        format!("{}…", truncated)
    } else {
        text.to_string()
    }
}

fn log_outcome(outcome: &SyncOutcome, lead_id: Uuid) {
    match &outcome.error_message {
        Some(err) => tracing::warn!(
            "❌ {} sync failed for lead {}: {}",
            outcome.platform,
            lead_id,
            err
        ),
        None => tracing::info!(
            "{} sync for lead {}: {:?}",
            outcome.platform,
            lead_id,
            outcome.classification
        ),
    }
}

/// Adapter for Google Ads, Meta Ads and Microsoft Ads.
pub struct ConversionAdapter {
    client: Arc<dyn ConversionClient>,
}

impl ConversionAdapter {
    pub fn new(client: Arc<dyn ConversionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlatformAdapter for ConversionAdapter {
    fn platform(&self) -> PlatformName {
        self.client.platform()
    }

    async fn sync(&self, lead: &Lead, status: TargetStatus) -> SyncOutcome {
        let platform = self.platform();
        tracing::debug!("Submitting {} conversion for lead {}", platform, lead.id);

        let result = self.client.submit_conversion(lead, status).await;
        let outcome = classify(platform, result, |body| self.client.inspect_body(body));
        log_outcome(&outcome, lead.id);
        outcome
    }
}

/// Adapter for the analytics event sink.
pub struct AnalyticsAdapter {
    client: Arc<dyn AnalyticsClient>,
}

impl AnalyticsAdapter {
    pub fn new(client: Arc<dyn AnalyticsClient>) -> Self {
        Self { client }
    }

    fn event_params(lead: &Lead, status: TargetStatus) -> Value {
        let mut params = json!({
            "lead_id": lead.id.to_string(),
            "lead_status": status.label(),
        });
        if let Some(value) = lead.deal_value {
            params["value"] = json!(value);
            params["currency"] = json!(lead.currency.as_deref().unwrap_or("USD"));
        }
        params
    }
}

#[async_trait]
impl PlatformAdapter for AnalyticsAdapter {
    fn platform(&self) -> PlatformName {
        PlatformName::GoogleAnalytics
    }

    async fn sync(&self, lead: &Lead, status: TargetStatus) -> SyncOutcome {
        let event_name = status.analytics_event_name();
        tracing::debug!("Sending analytics event {} for lead {}", event_name, lead.id);

        let result = self
            .client
            .send_event(lead.id, event_name, Self::event_params(lead, status))
            .await;
        let outcome = classify(PlatformName::GoogleAnalytics, result, |body| {
            self.client.inspect_body(body)
        });
        log_outcome(&outcome, lead.id);
        outcome
    }
}

use crate::models::{PlatformName, TargetStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// CRM lead-status webhook - can be single object or array
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum LeadStatusWebhookPayload {
    Single(LeadStatusEvent),
    Batch(Vec<LeadStatusEvent>),
}

impl LeadStatusWebhookPayload {
    /// Convert to a vec of events for uniform processing
    pub fn into_events(self) -> Vec<LeadStatusEvent> {
        match self {
            LeadStatusWebhookPayload::Single(event) => vec![event],
            LeadStatusWebhookPayload::Batch(events) => events,
        }
    }
}

/// One status change reported by the CRM
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LeadStatusEvent {
    pub lead_id: Uuid,

    /// New status label (e.g., "won"); other labels are ignored
    pub status: String,

    /// When the change happened in the CRM, for logging only
    #[serde(default)]
    pub changed_at: Option<String>,
}

/// Per-event result in the webhook response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookEventResult {
    pub lead_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TargetStatus>,
    pub synced_platforms: Vec<PlatformName>,
    pub failed_platforms: Vec<PlatformName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub status: String,
    pub received: usize,
    pub processed: usize,
    pub ignored: usize,
    pub failed: usize,
    pub results: Vec<WebhookEventResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_batch_payloads() {
        let id = Uuid::new_v4();
        let single: LeadStatusWebhookPayload =
            serde_json::from_value(serde_json::json!({"lead_id": id, "status": "won"})).unwrap();
        assert_eq!(single.into_events().len(), 1);

        let batch: LeadStatusWebhookPayload = serde_json::from_value(serde_json::json!([
            {"lead_id": id, "status": "qualified", "changed_at": "2024-05-01T10:00:00Z"},
            {"lead_id": id, "status": "won"}
        ]))
        .unwrap();
        let events = batch.into_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].changed_at.as_deref(), Some("2024-05-01T10:00:00Z"));
    }
}

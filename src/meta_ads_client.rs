use crate::adapters::{ClientError, ConversionClient, PlatformResponse, ResponseVerdict};
use crate::config::MetaConfig;
use crate::errors::AppError;
use crate::models::{Lead, PlatformName, TargetStatus};
use crate::pii_hashing::{hash_email, hash_phone};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;

/// Sends CRM events to the Meta Conversions API.
///
/// Email and phone are hashed before they are placed in the payload.
#[derive(Clone)]
pub struct MetaAdsClient {
    client: reqwest::Client,
    config: MetaConfig,
    default_phone_region: String,
}

/// Standard Meta event for a status, `None` when the status is not a conversion.
fn event_name(status: TargetStatus) -> Option<&'static str> {
    match status {
        TargetStatus::Qualified => Some("Lead"),
        TargetStatus::Won => Some("Purchase"),
        TargetStatus::Lost => None,
    }
}

impl MetaAdsClient {
    pub fn new(
        config: MetaConfig,
        default_phone_region: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Meta client: {}", e))
            })?;

        Ok(Self {
            client,
            config,
            default_phone_region,
        })
    }

    /// Builds the `/events` payload. Only hashed identifiers and the click id are sent.
    pub fn build_payload(&self, lead: &Lead, event_name: &str, fbclid: &str) -> Value {
        let event_time = Utc::now().timestamp();

        let mut user_data = json!({
            // Click id format: fb.{subdomain_index}.{creation_time_ms}.{fbclid}
            "fbc": format!("fb.1.{}.{}", event_time * 1000, fbclid),
            "lead_id": lead.id.to_string(),
        });
        if let Some(em) = lead.email.as_deref().and_then(hash_email) {
            user_data["em"] = json!([em]);
        }
        if let Some(ph) = lead
            .phone
            .as_deref()
            .and_then(|p| hash_phone(p, &self.default_phone_region))
        {
            user_data["ph"] = json!([ph]);
        }

        let mut custom_data = json!({
            "event_source": "crm",
            "lead_event_source": "conversion-sync-api",
        });
        if let Some(value) = lead.deal_value {
            custom_data["value"] = json!(value);
            custom_data["currency"] = json!(lead.currency.as_deref().unwrap_or("USD"));
        }

        let mut payload = json!({
            "data": [{
                "event_name": event_name,
                "event_time": event_time,
                "event_id": format!("{}-{}", lead.id, event_name),
                "action_source": "system_generated",
                "user_data": user_data,
                "custom_data": custom_data,
            }]
        });
        if let Some(code) = &self.config.test_event_code {
            payload["test_event_code"] = json!(code);
        }
        payload
    }
}

#[async_trait]
impl ConversionClient for MetaAdsClient {
    fn platform(&self) -> PlatformName {
        PlatformName::MetaAds
    }

    async fn submit_conversion(
        &self,
        lead: &Lead,
        status: TargetStatus,
    ) -> Result<PlatformResponse, ClientError> {
        let Some(event_name) = event_name(status) else {
            return Err(ClientError::NotConfigured);
        };
        let Some(fbclid) = lead.fbclid.as_deref().filter(|f| !f.trim().is_empty()) else {
            return Err(ClientError::NotConfigured);
        };

        let url = format!(
            "{}/{}/events",
            self.config.graph_base_url, self.config.pixel_id
        );
        tracing::info!("Sending Meta {} event for lead {}", event_name, lead.id);
        // Token goes in the query string; never log the full URL
        tracing::debug!("Meta URL: {}?access_token=[REDACTED]", url);

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", self.config.access_token.as_str())])
            .json(&self.build_payload(lead, event_name, fbclid))
            .send()
            .await?;
        PlatformResponse::from_reqwest(response).await
    }

    fn inspect_body(&self, body: &[u8]) -> Option<ResponseVerdict> {
        let value: Value = serde_json::from_slice(body).ok()?;

        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown Meta error");
            return Some(ResponseVerdict::Rejected(vec![message.to_string()]));
        }

        let received = value.get("events_received").and_then(|v| v.as_u64())?;
        if received == 0 {
            return Some(ResponseVerdict::Rejected(vec![
                "Meta received no events".to_string(),
            ]));
        }
        Some(ResponseVerdict::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pii_hashing::sha256_hex;
    use uuid::Uuid;

    fn client() -> MetaAdsClient {
        MetaAdsClient::new(
            MetaConfig {
                graph_base_url: "https://example.com".to_string(),
                pixel_id: "pixel".to_string(),
                access_token: "token".to_string(),
                test_event_code: None,
            },
            "US".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn lead() -> Lead {
        Lead {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            name: "Jane Roe".to_string(),
            email: Some("Jane@Example.com".to_string()),
            phone: Some("(650) 253-0000".to_string()),
            stage_id: None,
            gclid: None,
            fbclid: Some("IwAR123".to_string()),
            msclkid: None,
            deal_value: Some(250.0),
            currency: Some("EUR".to_string()),
        }
    }

    #[test]
    fn test_payload_contains_only_hashed_pii() {
        let lead = lead();
        let payload = client().build_payload(&lead, "Purchase", "IwAR123");
        let text = payload.to_string();

        assert!(!text.contains("Jane@Example.com"));
        assert!(!text.contains("jane@example.com"));
        assert!(!text.contains("253-0000"));
        assert!(!text.contains("Jane Roe"));

        let user_data = &payload["data"][0]["user_data"];
        assert_eq!(user_data["em"][0], sha256_hex("jane@example.com"));
        assert_eq!(user_data["ph"][0], sha256_hex("16502530000"));
        assert!(user_data["fbc"].as_str().unwrap().ends_with(".IwAR123"));
        assert_eq!(payload["data"][0]["custom_data"]["currency"], "EUR");
    }

    #[test]
    fn test_lost_is_not_a_meta_event() {
        assert_eq!(event_name(TargetStatus::Lost), None);
        assert_eq!(event_name(TargetStatus::Won), Some("Purchase"));
    }

    #[test]
    fn test_inspect_body() {
        let c = client();
        assert_eq!(
            c.inspect_body(br#"{"events_received": 1, "messages": []}"#),
            Some(ResponseVerdict::Accepted)
        );
        assert_eq!(
            c.inspect_body(br#"{"events_received": 0}"#),
            Some(ResponseVerdict::Rejected(vec!["Meta received no events".to_string()]))
        );
        assert_eq!(
            c.inspect_body(br#"{"error": {"message": "Invalid parameter"}}"#),
            Some(ResponseVerdict::Rejected(vec!["Invalid parameter".to_string()]))
        );
        assert_eq!(c.inspect_body(br#"{"fbtrace_id": "x"}"#), None);
    }
}

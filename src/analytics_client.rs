use crate::adapters::{AnalyticsClient, ClientError, PlatformResponse};
use crate::config::AnalyticsConfig;
use crate::errors::AppError;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

/// GA4 Measurement Protocol event sender.
#[derive(Clone)]
pub struct Ga4Client {
    client: reqwest::Client,
    config: AnalyticsConfig,
}

impl Ga4Client {
    pub fn new(config: AnalyticsConfig, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create GA4 client: {}", e))
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl AnalyticsClient for Ga4Client {
    async fn send_event(
        &self,
        lead_id: Uuid,
        event_name: &str,
        params: Value,
    ) -> Result<PlatformResponse, ClientError> {
        let url = format!("{}/mp/collect", self.config.api_base_url);
        tracing::info!("Sending GA4 event {} for lead {}", event_name, lead_id);

        let body = json!({
            "client_id": lead_id.to_string(),
            "events": [{
                "name": event_name,
                "params": params,
            }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[
                ("measurement_id", self.config.measurement_id.as_str()),
                ("api_secret", self.config.api_secret.as_str()),
            ])
            .json(&body)
            .send()
            .await?;
        PlatformResponse::from_reqwest(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ResponseVerdict;

    fn client() -> Ga4Client {
        Ga4Client::new(
            AnalyticsConfig {
                api_base_url: "https://example.com".to_string(),
                measurement_id: "G-TEST".to_string(),
                api_secret: "secret".to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_body_is_accepted() {
        assert_eq!(client().inspect_body(b""), Some(ResponseVerdict::Accepted));
    }

    #[test]
    fn test_validation_messages_rejected() {
        let verdict = client().inspect_body(
            br#"{"validationMessages": [{"fieldPath": "events", "description": "Event name is reserved."}]}"#,
        );
        assert_eq!(
            verdict,
            Some(ResponseVerdict::Rejected(vec!["Event name is reserved.".to_string()]))
        );
    }
}

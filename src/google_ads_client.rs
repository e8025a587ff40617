use crate::adapters::{ClientError, ConversionClient, PlatformResponse, ResponseVerdict};
use crate::config::GoogleAdsConfig;
use crate::errors::AppError;
use crate::google_ads_models::{
    ClickConversion, UploadClickConversionsRequest, UploadClickConversionsResponse,
};
use crate::models::{Lead, PlatformName, TargetStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;

/// Uploads offline click conversions to Google Ads.
#[derive(Clone)]
pub struct GoogleAdsClient {
    client: reqwest::Client,
    config: GoogleAdsConfig,
}

impl GoogleAdsClient {
    /// Creates a new `GoogleAdsClient`.
    ///
    /// # Arguments
    ///
    /// * `config` - Google Ads credentials and conversion actions.
    /// * `timeout` - Upper bound for one upload.
    pub fn new(config: GoogleAdsConfig, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Google Ads client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn build_request(
        &self,
        lead: &Lead,
        conversion_action: &str,
    ) -> Option<UploadClickConversionsRequest> {
        let gclid = lead.gclid.as_deref().filter(|g| !g.trim().is_empty())?;

        Some(UploadClickConversionsRequest {
            conversions: vec![ClickConversion {
                gclid: gclid.to_string(),
                conversion_action: conversion_action.to_string(),
                conversion_date_time: Utc::now().format("%Y-%m-%d %H:%M:%S+00:00").to_string(),
                conversion_value: lead.deal_value,
                currency_code: lead.deal_value.map(|_| {
                    lead.currency.clone().unwrap_or_else(|| "USD".to_string())
                }),
                order_id: Some(lead.id.to_string()),
            }],
            partial_failure: true,
            validate_only: false,
        })
    }
}

#[async_trait]
impl ConversionClient for GoogleAdsClient {
    fn platform(&self) -> PlatformName {
        PlatformName::GoogleAds
    }

    async fn submit_conversion(
        &self,
        lead: &Lead,
        status: TargetStatus,
    ) -> Result<PlatformResponse, ClientError> {
        let Some(conversion_action) = self.config.conversion_actions.get(&status) else {
            tracing::info!("No Google Ads conversion action configured for '{}'", status);
            return Err(ClientError::NotConfigured);
        };
        let Some(body) = self.build_request(lead, conversion_action) else {
            return Err(ClientError::NotConfigured);
        };

        let url = format!(
            "{}/customers/{}:uploadClickConversions",
            self.config.api_base_url, self.config.customer_id
        );
        tracing::info!("Uploading Google Ads conversion for lead {}", lead.id);

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .header("developer-token", &self.config.developer_token)
            .json(&body);
        if let Some(login_id) = &self.config.login_customer_id {
            request = request.header("login-customer-id", login_id);
        }

        let response = request.send().await?;
        PlatformResponse::from_reqwest(response).await
    }

    fn inspect_body(&self, body: &[u8]) -> Option<ResponseVerdict> {
        let parsed: UploadClickConversionsResponse = serde_json::from_slice(body).ok()?;
        let errors = parsed.business_errors();
        if errors.is_empty() {
            Some(ResponseVerdict::Accepted)
        } else {
            Some(ResponseVerdict::Rejected(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> GoogleAdsClient {
        GoogleAdsClient::new(
            GoogleAdsConfig {
                api_base_url: "https://example.com".to_string(),
                developer_token: "dev".to_string(),
                customer_id: "1234567890".to_string(),
                login_customer_id: None,
                access_token: "token".to_string(),
                conversion_actions: HashMap::new(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_body_is_unexpected_format() {
        assert_eq!(client().inspect_body(b""), None);
    }

    #[test]
    fn test_success_body_is_accepted() {
        assert_eq!(
            client().inspect_body(br#"{"results": [{"gclid": "x"}]}"#),
            Some(ResponseVerdict::Accepted)
        );
    }

    #[tokio::test]
    async fn test_missing_conversion_action_is_not_configured() {
        let lead = Lead {
            id: uuid::Uuid::new_v4(),
            org_id: uuid::Uuid::new_v4(),
            name: "Test".to_string(),
            email: None,
            phone: None,
            stage_id: None,
            gclid: Some("gclid".to_string()),
            fbclid: None,
            msclkid: None,
            deal_value: None,
            currency: None,
        };

        let result = client().submit_conversion(&lead, TargetStatus::Won).await;
        assert_eq!(result, Err(ClientError::NotConfigured));
    }
}

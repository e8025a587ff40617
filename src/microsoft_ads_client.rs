use crate::adapters::{ClientError, ConversionClient, PlatformResponse, ResponseVerdict};
use crate::config::MicrosoftAdsConfig;
use crate::errors::AppError;
use crate::models::{Lead, PlatformName, TargetStatus};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Applies offline conversions through the Microsoft Advertising REST API.
#[derive(Clone)]
pub struct MicrosoftAdsClient {
    client: reqwest::Client,
    config: MicrosoftAdsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApplyOfflineConversionsResponse {
    #[serde(default)]
    partial_errors: Option<Vec<BatchError>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BatchError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl MicrosoftAdsClient {
    pub fn new(config: MicrosoftAdsConfig, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Microsoft Ads client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    fn build_payload(lead: &Lead, conversion_name: &str, msclkid: &str) -> Value {
        let mut conversion = json!({
            "ConversionName": conversion_name,
            "ConversionTime": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "MicrosoftClickId": msclkid,
        });
        if let Some(value) = lead.deal_value {
            conversion["ConversionValue"] = json!(value);
            conversion["ConversionCurrencyCode"] =
                json!(lead.currency.as_deref().unwrap_or("USD"));
        }

        json!({ "OfflineConversions": [conversion] })
    }
}

#[async_trait]
impl ConversionClient for MicrosoftAdsClient {
    fn platform(&self) -> PlatformName {
        PlatformName::MicrosoftAds
    }

    async fn submit_conversion(
        &self,
        lead: &Lead,
        status: TargetStatus,
    ) -> Result<PlatformResponse, ClientError> {
        let Some(conversion_name) = self.config.conversion_names.get(&status) else {
            tracing::info!("No Microsoft Ads conversion goal configured for '{}'", status);
            return Err(ClientError::NotConfigured);
        };
        let Some(msclkid) = lead.msclkid.as_deref().filter(|m| !m.trim().is_empty()) else {
            return Err(ClientError::NotConfigured);
        };

        let url = format!("{}/OfflineConversions/Apply", self.config.api_base_url);
        tracing::info!("Applying Microsoft Ads conversion for lead {}", lead.id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .header("DeveloperToken", &self.config.developer_token)
            .header("CustomerId", &self.config.customer_id)
            .header("CustomerAccountId", &self.config.account_id)
            .json(&Self::build_payload(lead, conversion_name, msclkid))
            .send()
            .await?;
        PlatformResponse::from_reqwest(response).await
    }

    fn inspect_body(&self, body: &[u8]) -> Option<ResponseVerdict> {
        let parsed: ApplyOfflineConversionsResponse = serde_json::from_slice(body).ok()?;
        let errors: Vec<String> = parsed
            .partial_errors
            .unwrap_or_default()
            .into_iter()
            .map(|e| match (e.error_code, e.message) {
                (Some(code), Some(msg)) => format!("{}: {}", code, msg),
                (None, Some(msg)) => msg,
                (Some(code), None) => code,
                (None, None) => "unknown Microsoft Ads error".to_string(),
            })
            .collect();

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

    fn client() -> MicrosoftAdsClient {
        MicrosoftAdsClient::new(
            MicrosoftAdsConfig {
                api_base_url: "https://example.com".to_string(),
                developer_token: "dev".to_string(),
                customer_id: "1".to_string(),
                account_id: "2".to_string(),
                access_token: "token".to_string(),
                conversion_names: HashMap::new(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_partial_errors_rejected() {
        let verdict = client().inspect_body(
            br#"{"PartialErrors": [{"ErrorCode": "InvalidMicrosoftClickId", "Message": "The click id is invalid."}]}"#,
        );
        assert_eq!(
            verdict,
            Some(ResponseVerdict::Rejected(vec![
                "InvalidMicrosoftClickId: The click id is invalid.".to_string()
            ]))
        );
    }

    #[test]
    fn test_null_partial_errors_accepted() {
        assert_eq!(
            client().inspect_body(br#"{"PartialErrors": null}"#),
            Some(ResponseVerdict::Accepted)
        );
        assert_eq!(client().inspect_body(b"{}"), Some(ResponseVerdict::Accepted));
    }

    #[test]
    fn test_non_json_is_unexpected() {
        assert_eq!(client().inspect_body(b"OK"), None);
    }
}

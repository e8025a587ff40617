use serde::{Deserialize, Serialize};

/// Body of `customers/{id}:uploadClickConversions`.
/// Documentation: https://developers.google.com/google-ads/api/rest/reference/rest/latest/customers/uploadClickConversions
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadClickConversionsRequest {
    pub conversions: Vec<ClickConversion>,

    /// Must be true: per-row errors come back in `partialFailureError`
    pub partial_failure: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub validate_only: bool,
}

/// One click conversion row
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickConversion {
    /// Google Click ID captured with the lead
    pub gclid: String,

    /// Resource name, e.g. `customers/123/conversionActions/456`
    pub conversion_action: String,

    /// `yyyy-mm-dd hh:mm:ss+|-hh:mm`
    pub conversion_date_time: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,

    /// Lead id, lets Google deduplicate repeated uploads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// Response of `uploadClickConversions`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadClickConversionsResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,

    /// Present when at least one row failed
    #[serde(default)]
    pub partial_failure_error: Option<PartialFailureError>,
}

/// `google.rpc.Status` carrying per-row failures
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PartialFailureError {
    #[serde(default)]
    pub code: i32,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub details: Vec<PartialFailureDetail>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PartialFailureDetail {
    #[serde(default)]
    pub errors: Vec<GoogleAdsError>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleAdsError {
    #[serde(default)]
    pub message: String,
}

impl UploadClickConversionsResponse {
    /// Row-level error messages, falling back to the top-level status message
    pub fn business_errors(&self) -> Vec<String> {
        let Some(failure) = &self.partial_failure_error else {
            return Vec::new();
        };

        // An empty status object is sent by some API versions on full success
        if failure.code == 0 && failure.message.is_empty() && failure.details.is_empty() {
            return Vec::new();
        }

        let detailed: Vec<String> = failure
            .details
            .iter()
            .flat_map(|d| d.errors.iter())
            .map(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .collect();

        if detailed.is_empty() {
            vec![failure.message.clone()]
        } else {
            detailed
        }
    }
}

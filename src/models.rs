use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Pipeline status that triggers a conversion sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Qualified,
    Won,
    Lost,
}

impl TargetStatus {
    pub const ALL: [TargetStatus; 3] = [TargetStatus::Qualified, TargetStatus::Won, TargetStatus::Lost];

    /// Plain word used to match pipeline column titles.
    pub fn label(&self) -> &'static str {
        match self {
            TargetStatus::Qualified => "qualified",
            TargetStatus::Won => "won",
            TargetStatus::Lost => "lost",
        }
    }

    /// Analytics event name emitted for this status.
    pub fn analytics_event_name(&self) -> &'static str {
        match self {
            TargetStatus::Qualified => "lead_qualified",
            TargetStatus::Won => "lead_won",
            TargetStatus::Lost => "lead_lost",
        }
    }

    /// Whether advertising platforms treat this status as a conversion.
    pub fn is_conversion(&self) -> bool {
        !matches!(self, TargetStatus::Lost)
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TargetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qualified" => Ok(TargetStatus::Qualified),
            "won" => Ok(TargetStatus::Won),
            "lost" => Ok(TargetStatus::Lost),
            other => Err(format!(
                "Unknown status '{}' (expected qualified, won or lost)",
                other
            )),
        }
    }
}

/// Downstream sync target.
///
/// Declaration order is the display order used for aggregation and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlatformName {
    GoogleAds,
    MetaAds,
    MicrosoftAds,
    GoogleAnalytics,
}

impl PlatformName {
    pub const ALL: [PlatformName; 4] = [
        PlatformName::GoogleAds,
        PlatformName::MetaAds,
        PlatformName::MicrosoftAds,
        PlatformName::GoogleAnalytics,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformName::GoogleAds => "Google Ads",
            PlatformName::MetaAds => "Meta Ads",
            PlatformName::MicrosoftAds => "Microsoft Ads",
            PlatformName::GoogleAnalytics => "Google Analytics",
        }
    }

    /// Advertising platforms only receive conversion events; analytics receives everything.
    pub fn is_ad_platform(&self) -> bool {
        !matches!(self, PlatformName::GoogleAnalytics)
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Click identifiers attached to a lead by the campaign that brought it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attribution {
    /// Google click id (gclid).
    pub gclid: Option<String>,
    /// Meta click id (fbclid).
    pub fbclid: Option<String>,
    /// Microsoft click id (msclkid).
    pub msclkid: Option<String>,
}

impl Attribution {
    /// Identifier carried for an advertising platform, if any.
    pub fn click_id(&self, platform: PlatformName) -> Option<&str> {
        let value = match platform {
            PlatformName::GoogleAds => self.gclid.as_deref(),
            PlatformName::MetaAds => self.fbclid.as_deref(),
            PlatformName::MicrosoftAds => self.msclkid.as_deref(),
            PlatformName::GoogleAnalytics => None,
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

/// Lead record as loaded from the lead store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub stage_id: Option<Uuid>,
    pub gclid: Option<String>,
    pub fbclid: Option<String>,
    pub msclkid: Option<String>,
    pub deal_value: Option<f64>,
    pub currency: Option<String>,
}

impl Lead {
    pub fn attribution(&self) -> Attribution {
        Attribution {
            gclid: self.gclid.clone(),
            fbclid: self.fbclid.clone(),
            msclkid: self.msclkid.clone(),
        }
    }
}

/// One request to sync a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub lead_id: Uuid,
    pub target_status: TargetStatus,
    pub attribution: Attribution,
}

impl SyncRequest {
    pub fn for_lead(lead: &Lead, target_status: TargetStatus) -> Self {
        Self {
            lead_id: lead.id,
            target_status,
            attribution: lead.attribution(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncClassification {
    Succeeded,
    Failed,
    /// Integration not configured for this tenant; counted neither way.
    NeutralSkip,
}

/// Result of one adapter call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncOutcome {
    pub platform: PlatformName,
    pub classification: SyncClassification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SyncOutcome {
    pub fn succeeded(platform: PlatformName) -> Self {
        Self {
            platform,
            classification: SyncClassification::Succeeded,
            error_message: None,
        }
    }

    pub fn failed(platform: PlatformName, message: impl Into<String>) -> Self {
        Self {
            platform,
            classification: SyncClassification::Failed,
            error_message: Some(message.into()),
        }
    }

    pub fn neutral_skip(platform: PlatformName) -> Self {
        Self {
            platform,
            classification: SyncClassification::NeutralSkip,
            error_message: None,
        }
    }
}

/// Consolidated view of every outcome of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AggregatedResult {
    /// Ordered by `PlatformName` declaration order.
    #[schema(value_type = Vec<PlatformName>)]
    pub succeeded_platforms: BTreeSet<PlatformName>,
    #[schema(value_type = Vec<PlatformName>)]
    pub failed_platforms: BTreeSet<PlatformName>,
}

impl AggregatedResult {
    /// True when nothing was synced and nothing failed.
    pub fn is_empty(&self) -> bool {
        self.succeeded_platforms.is_empty() && self.failed_platforms.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PipelineColumn {
    pub id: Uuid,
    pub title: String,
}

/// What the stage transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Moved { column_id: Uuid },
    NoMatchingColumn,
}

/// Human-readable summary returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Request body for `POST /api/v1/leads/:id/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    /// One of `qualified`, `won`, `lost` (case-insensitive).
    pub status: String,
}

/// Response body for a status change.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    pub lead_id: Uuid,
    pub status: TargetStatus,
    pub report: ReportMessage,
    pub synced_platforms: Vec<PlatformName>,
    pub failed_platforms: Vec<PlatformName>,
    pub outcomes: Vec<SyncOutcome>,
    pub transition: Option<TransitionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("Won".parse::<TargetStatus>(), Ok(TargetStatus::Won));
        assert_eq!(" QUALIFIED ".parse::<TargetStatus>(), Ok(TargetStatus::Qualified));
        assert_eq!("lost".parse::<TargetStatus>(), Ok(TargetStatus::Lost));
        assert!("open".parse::<TargetStatus>().is_err());
    }

    #[test]
    fn test_analytics_event_names() {
        assert_eq!(TargetStatus::Qualified.analytics_event_name(), "lead_qualified");
        assert_eq!(TargetStatus::Won.analytics_event_name(), "lead_won");
        assert_eq!(TargetStatus::Lost.analytics_event_name(), "lead_lost");
    }

    #[test]
    fn test_platform_order_matches_display_order() {
        let mut shuffled = vec![
            PlatformName::GoogleAnalytics,
            PlatformName::MicrosoftAds,
            PlatformName::GoogleAds,
            PlatformName::MetaAds,
        ];
        shuffled.sort();
        assert_eq!(shuffled, PlatformName::ALL.to_vec());
    }

    #[test]
    fn test_blank_click_id_is_absent() {
        let attribution = Attribution {
            gclid: Some("   ".to_string()),
            fbclid: Some("fb.123".to_string()),
            msclkid: None,
        };

        assert_eq!(attribution.click_id(PlatformName::GoogleAds), None);
        assert_eq!(attribution.click_id(PlatformName::MetaAds), Some("fb.123"));
        assert_eq!(attribution.click_id(PlatformName::MicrosoftAds), None);
    }
}

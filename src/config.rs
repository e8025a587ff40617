use crate::models::TargetStatus;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Google Ads click-conversion upload settings.
#[derive(Debug, Clone)]
pub struct GoogleAdsConfig {
    pub api_base_url: String,
    pub developer_token: String,
    pub customer_id: String,
    pub login_customer_id: Option<String>,
    pub access_token: String,
    /// Conversion action resource name per status, e.g. `customers/123/conversionActions/456`.
    pub conversion_actions: HashMap<TargetStatus, String>,
}

/// Meta Conversions API settings.
#[derive(Debug, Clone)]
pub struct MetaConfig {
    pub graph_base_url: String,
    pub pixel_id: String,
    pub access_token: String,
    pub test_event_code: Option<String>,
}

/// Microsoft Advertising offline conversion settings.
#[derive(Debug, Clone)]
pub struct MicrosoftAdsConfig {
    pub api_base_url: String,
    pub developer_token: String,
    pub customer_id: String,
    pub account_id: String,
    pub access_token: String,
    /// Offline conversion goal name per status.
    pub conversion_names: HashMap<TargetStatus, String>,
}

/// GA4 Measurement Protocol settings.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub api_base_url: String,
    pub measurement_id: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub webhook_secret: Option<String>,
    /// Per-adapter call timeout.
    pub sync_timeout: Duration,
    /// Region used to normalize phone numbers without a country code.
    pub default_phone_region: String,
    pub column_cache_ttl: Duration,
    /// Explicit status → column id mapping; wins over title matching.
    pub stage_columns: HashMap<TargetStatus, Uuid>,
    pub google_ads: Option<GoogleAdsConfig>,
    pub meta: Option<MetaConfig>,
    pub microsoft_ads: Option<MicrosoftAdsConfig>,
    pub analytics: Option<AnalyticsConfig>,
}

fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn url_var(key: &str, default: &str) -> anyhow::Result<String> {
    let url = optional_var(key).unwrap_or_else(|| default.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", key);
    }
    Ok(url.trim_end_matches('/').to_string())
}

fn seconds_var(key: &str, default: u64) -> anyhow::Result<Duration> {
    let secs = match optional_var(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds", key))?,
        None => default,
    };
    if secs == 0 {
        anyhow::bail!("{} must be greater than zero", key);
    }
    Ok(Duration::from_secs(secs))
}

/// First 20 characters of a connection string, for logs.
fn url_preview(url: &str) -> String {
    url.chars().take(20).collect()
}

/// Reads `{prefix}_QUALIFIED`, `{prefix}_WON` and `{prefix}_LOST` into a map.
fn per_status_vars(prefix: &str) -> HashMap<TargetStatus, String> {
    TargetStatus::ALL
        .into_iter()
        .filter_map(|status| {
            let key = format!("{}_{}", prefix, status.label().to_uppercase());
            optional_var(&key).map(|value| (status, value))
        })
        .collect()
}

/// Returns `Some` only when every required key is present; logs what is missing otherwise.
fn required_block(platform: &str, keys: &[&str]) -> Option<Vec<String>> {
    let values: Vec<Option<String>> = keys.iter().map(|k| optional_var(k)).collect();
    if values.iter().all(Option::is_some) {
        return Some(values.into_iter().flatten().collect());
    }
    let missing: Vec<&str> = keys
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| *k)
        .collect();
    if missing.len() < keys.len() {
        tracing::warn!(
            "{} partially configured, missing {:?}; integration disabled",
            platform,
            missing
        );
    } else {
        tracing::info!("{} not configured; syncs will be skipped", platform);
    }
    None
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DB_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map_err(|_| anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required"))
            .and_then(|url| {
                if url.trim().is_empty() {
                    anyhow::bail!("DB_URL cannot be empty");
                }
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                }
                Ok(url)
            })?;

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let mut stage_columns = HashMap::new();
        for (status, raw) in per_status_vars("STAGE_COLUMN") {
            let id = Uuid::parse_str(raw.trim()).map_err(|_| {
                anyhow::anyhow!("STAGE_COLUMN_{} must be a UUID", status.label().to_uppercase())
            })?;
            stage_columns.insert(status, id);
        }

        let google_ads = match required_block(
            "Google Ads",
            &[
                "GOOGLE_ADS_DEVELOPER_TOKEN",
                "GOOGLE_ADS_CUSTOMER_ID",
                "GOOGLE_ADS_ACCESS_TOKEN",
            ],
        ) {
            Some(values) => Some(GoogleAdsConfig {
                api_base_url: url_var(
                    "GOOGLE_ADS_API_BASE_URL",
                    "https://googleads.googleapis.com/v17",
                )?,
                developer_token: values[0].clone(),
                customer_id: values[1].replace('-', ""),
                login_customer_id: optional_var("GOOGLE_ADS_LOGIN_CUSTOMER_ID")
                    .map(|id| id.replace('-', "")),
                access_token: values[2].clone(),
                conversion_actions: per_status_vars("GOOGLE_ADS_CONVERSION_ACTION"),
            }),
            None => None,
        };

        let meta = match required_block("Meta Ads", &["META_PIXEL_ID", "META_ACCESS_TOKEN"]) {
            Some(values) => Some(MetaConfig {
                graph_base_url: url_var("META_GRAPH_BASE_URL", "https://graph.facebook.com/v19.0")?,
                pixel_id: values[0].clone(),
                access_token: values[1].clone(),
                test_event_code: optional_var("META_TEST_EVENT_CODE"),
            }),
            None => None,
        };

        let microsoft_ads = match required_block(
            "Microsoft Ads",
            &[
                "MICROSOFT_ADS_DEVELOPER_TOKEN",
                "MICROSOFT_ADS_CUSTOMER_ID",
                "MICROSOFT_ADS_ACCOUNT_ID",
                "MICROSOFT_ADS_ACCESS_TOKEN",
            ],
        ) {
            Some(values) => Some(MicrosoftAdsConfig {
                api_base_url: url_var(
                    "MICROSOFT_ADS_API_BASE_URL",
                    "https://campaign.api.bingads.microsoft.com/CampaignManagement/v13",
                )?,
                developer_token: values[0].clone(),
                customer_id: values[1].clone(),
                account_id: values[2].clone(),
                access_token: values[3].clone(),
                conversion_names: per_status_vars("MICROSOFT_ADS_CONVERSION_NAME"),
            }),
            None => None,
        };

        let analytics = match required_block("Google Analytics", &["GA4_MEASUREMENT_ID", "GA4_API_SECRET"]) {
            Some(values) => Some(AnalyticsConfig {
                api_base_url: url_var("GA4_API_BASE_URL", "https://www.google-analytics.com")?,
                measurement_id: values[0].clone(),
                api_secret: values[1].clone(),
            }),
            None => None,
        };

        let config = Self {
            database_url,
            port,
            webhook_secret: optional_var("WEBHOOK_SECRET"),
            sync_timeout: seconds_var("SYNC_TIMEOUT_SECS", 30)?,
            default_phone_region: optional_var("DEFAULT_PHONE_REGION")
                .unwrap_or_else(|| "US".to_string())
                .to_uppercase(),
            column_cache_ttl: seconds_var("COLUMN_CACHE_TTL_SECS", 30)?,
            stage_columns,
            google_ads,
            meta,
            microsoft_ads,
            analytics,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}...", url_preview(&config.database_url));
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Sync timeout: {:?}", config.sync_timeout);
        if config.webhook_secret.is_none() {
            tracing::warn!("WEBHOOK_SECRET not set; lead-status webhook accepts unauthenticated calls");
        }
        if !config.stage_columns.is_empty() {
            tracing::info!(
                "Explicit stage column mapping configured for {} status(es)",
                config.stage_columns.len()
            );
        }

        Ok(config)
    }

    /// Configuration with every integration disabled, for tests and tooling.
    pub fn minimal(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            port: 3000,
            webhook_secret: None,
            sync_timeout: Duration::from_secs(30),
            default_phone_region: "US".to_string(),
            column_cache_ttl: Duration::from_secs(30),
            stage_columns: HashMap::new(),
            google_ads: None,
            meta: None,
            microsoft_ads: None,
            analytics: None,
        }
    }
}

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{StatusChangeRequest, StatusChangeResponse, TargetStatus};
use crate::orchestrator::{ConversionSyncService, SyncResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The one orchestrator every status-change entry point goes through.
    pub sync_service: ConversionSyncService,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "conversion-sync-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Parses a status label, rejecting anything but qualified/won/lost.
pub fn parse_status(raw: &str) -> Result<TargetStatus, AppError> {
    raw.parse::<TargetStatus>().map_err(AppError::BadRequest)
}

impl From<SyncResult> for StatusChangeResponse {
    fn from(result: SyncResult) -> Self {
        Self {
            lead_id: result.lead_id,
            status: result.status,
            report: result.report,
            synced_platforms: result.aggregated.succeeded_platforms.into_iter().collect(),
            failed_platforms: result.aggregated.failed_platforms.into_iter().collect(),
            outcomes: result.outcomes,
            transition: result.transition,
            transition_error: result.transition_error.map(|e| e.to_string()),
        }
    }
}

/// POST /api/v1/leads/:lead_id/status
///
/// Changes a lead's pipeline status and syncs the event to every applicable
/// ad platform and analytics. Partial sync failures come back as a warning in
/// the report; only a failed stage write turns the response into a 500.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `lead_id` - The UUID of the lead.
/// * `body` - JSON body with the new status.
///
/// # Returns
///
/// * `Result<(StatusCode, Json<StatusChangeResponse>), AppError>` - The consolidated report.
#[utoipa::path(
    post,
    path = "/api/v1/leads/{lead_id}/status",
    params(("lead_id" = Uuid, Path, description = "Lead id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed, syncs attempted", body = StatusChangeResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Lead not found"),
        (status = 500, description = "Stage could not be saved", body = StatusChangeResponse)
    )
)]
pub async fn update_lead_status(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<Uuid>,
    Json(body): Json<StatusChangeRequest>,
) -> Result<(StatusCode, Json<StatusChangeResponse>), AppError> {
    tracing::info!("POST /leads/{}/status - status: {}", lead_id, body.status);

    let status = parse_status(&body.status)?;
    let result = state
        .sync_service
        .sync_and_transition(lead_id, status)
        .await?;

    let code = if result.transition_error.is_some() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    Ok((code, Json(result.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_rejects_unknown_labels() {
        assert_eq!(parse_status("Won").unwrap(), TargetStatus::Won);

        let err = parse_status("negotiation").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

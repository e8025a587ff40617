use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::TargetStatus;
use crate::webhook_models::{
    LeadStatusEvent, LeadStatusWebhookPayload, WebhookEventResult, WebhookResponse,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

/// CRM lead-status webhook
///
/// Receives status changes made in the CRM and runs each through the same
/// sync service as the HTTP endpoint. Events are processed in order so that
/// repeated changes of one lead within a batch apply in sequence.
///
/// Expected payload: Single event object OR array of events
/// Authentication: X-Webhook-Token header must match WEBHOOK_SECRET env var (if set)
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/lead-status",
    request_body = LeadStatusWebhookPayload,
    responses(
        (status = 200, description = "Events processed", body = WebhookResponse),
        (status = 401, description = "Missing or invalid webhook token")
    )
)]
pub async fn lead_status_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<LeadStatusWebhookPayload>,
) -> Result<(StatusCode, Json<WebhookResponse>), AppError> {
    tracing::info!("Received lead-status webhook");

    validate_webhook_secret(&state, &headers)?;

    let events = payload.into_events();
    let received = events.len();
    tracing::info!("Processing {} status event(s)", received);

    let mut results = Vec::with_capacity(received);
    let (mut processed, mut ignored, mut failed) = (0, 0, 0);

    for event in events {
        let result = process_event(&state, event).await;
        match (&result.status, &result.error) {
            (None, _) => ignored += 1,
            (Some(_), Some(_)) => failed += 1,
            (Some(_), None) => processed += 1,
        }
        results.push(result);
    }

    tracing::info!(
        "Webhook processing complete: {} received, {} processed, {} ignored, {} failed",
        received,
        processed,
        ignored,
        failed
    );

    Ok((
        StatusCode::OK,
        Json(WebhookResponse {
            status: "received".to_string(),
            received,
            processed,
            ignored,
            failed,
            results,
        }),
    ))
}

/// Runs one event; failures are reported per event, never abort the batch
async fn process_event(state: &AppState, event: LeadStatusEvent) -> WebhookEventResult {
    let mut result = WebhookEventResult {
        lead_id: event.lead_id,
        status: None,
        synced_platforms: Vec::new(),
        failed_platforms: Vec::new(),
        error: None,
    };

    // The CRM reports every status; only conversion-relevant ones are synced
    let status = match event.status.parse::<TargetStatus>() {
        Ok(status) => status,
        Err(_) => {
            tracing::debug!(
                "Ignoring status '{}' for lead {}",
                event.status,
                event.lead_id
            );
            return result;
        }
    };
    result.status = Some(status);

    tracing::debug!(
        "Status event: lead_id={}, status={}, changed_at={:?}",
        event.lead_id,
        status,
        event.changed_at
    );

    match state
        .sync_service
        .sync_and_transition(event.lead_id, status)
        .await
    {
        Ok(sync) => {
            result.synced_platforms = sync.aggregated.succeeded_platforms.into_iter().collect();
            result.failed_platforms = sync.aggregated.failed_platforms.into_iter().collect();
            result.error = sync.transition_error.map(|e| e.to_string());
        }
        Err(e) => {
            tracing::error!("Failed to process status event for {}: {}", event.lead_id, e);
            result.error = Some(e.to_string());
        }
    }

    result
}

/// Validate webhook secret from X-Webhook-Token header
fn validate_webhook_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    // If no secret is configured, skip validation (warn was already logged at startup)
    let Some(ref expected_secret) = state.config.webhook_secret else {
        return Ok(());
    };

    let token = headers
        .get("X-Webhook-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing X-Webhook-Token header".to_string()))?;

    if !constant_time_compare(token, expected_secret) {
        tracing::warn!("Invalid webhook token received");
        return Err(AppError::Unauthorized("Invalid webhook token".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

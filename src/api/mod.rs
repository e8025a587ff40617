// Thin namespace wrapper for API-layer components
use utoipa::OpenApi;

pub mod handlers {
    pub use crate::handlers::*;
}

pub mod webhook_handler {
    pub use crate::webhook_handler::*;
}

/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        crate::handlers::update_lead_status,
        crate::webhook_handler::lead_status_webhook,
    ),
    components(schemas(
        crate::models::TargetStatus,
        crate::models::PlatformName,
        crate::models::SyncClassification,
        crate::models::SyncOutcome,
        crate::models::TransitionOutcome,
        crate::models::ReportMessage,
        crate::models::StatusChangeRequest,
        crate::models::StatusChangeResponse,
        crate::webhook_models::LeadStatusEvent,
        crate::webhook_models::LeadStatusWebhookPayload,
        crate::webhook_models::WebhookEventResult,
        crate::webhook_models::WebhookResponse,
    )),
    tags((name = "conversion-sync", description = "Lead status changes and conversion sync"))
)]
pub struct ApiDoc;

//! Conversion Sync API Library
//!
//! When a lead's pipeline status changes to qualified, won or lost, this
//! library syncs the event to the ad platforms the lead came from (Google Ads,
//! Meta, Microsoft Advertising) and to analytics, then moves the lead to the
//! matching pipeline column.
//!
//! # Modules
//!
//! - `api`: API definitions and OpenAPI document.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `adapters`: Platform adapters and outcome classification.
//! - `aggregator`: Reduces outcomes to synced/failed sets.
//! - `analytics_client`: GA4 Measurement Protocol client.
//! - `attribution`: Decides which platforms apply to a status change.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Postgres lead and column stores.
//! - `dispatcher`: Concurrent fan-out of platform syncs.
//! - `errors`: Error handling types.
//! - `google_ads_client`: Google Ads click conversion upload.
//! - `google_ads_models`: Google Ads wire models.
//! - `handlers`: HTTP request handlers.
//! - `meta_ads_client`: Meta Conversions API client.
//! - `microsoft_ads_client`: Microsoft Advertising offline conversions client.
//! - `models`: Core data models.
//! - `orchestrator`: The sync-and-transition service.
//! - `pii_hashing`: SHA-256 hashing of emails and phones.
//! - `reporter`: User-facing outcome message.
//! - `stage_transition`: Column resolution and stage write.
//! - `stores`: Lead and column store interfaces.
//! - `webhook_handler`: CRM lead-status webhook.
//! - `webhook_models`: Webhook payload models.

pub mod api;
pub mod core;
pub mod integrations;

pub mod adapters;
pub mod aggregator;
pub mod analytics_client;
pub mod attribution;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod dispatcher;
pub mod errors;
pub mod google_ads_client;
pub mod google_ads_models;
pub mod handlers;
pub mod meta_ads_client;
pub mod microsoft_ads_client;
pub mod models;
pub mod orchestrator;
pub mod pii_hashing;
pub mod reporter;
pub mod stage_transition;
pub mod stores;
pub mod webhook_handler;
pub mod webhook_models;

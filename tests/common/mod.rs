//! In-memory doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use conversion_sync_api::core::adapters::PlatformAdapter;
use conversion_sync_api::dispatcher::SyncDispatcher;
use conversion_sync_api::core::errors::AppError;
use conversion_sync_api::models::{
    Lead, PipelineColumn, PlatformName, SyncClassification, SyncOutcome, TargetStatus,
};
use conversion_sync_api::orchestrator::ConversionSyncService;
use conversion_sync_api::stage_transition::StageTransitioner;
use conversion_sync_api::stores::{ColumnStore, LeadStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub fn lead(gclid: Option<&str>, fbclid: Option<&str>, msclkid: Option<&str>) -> Lead {
    Lead {
        id: Uuid::new_v4(),
        org_id: Uuid::new_v4(),
        name: "Jane Roe".to_string(),
        email: Some("jane@example.com".to_string()),
        phone: Some("+1 650 253 0000".to_string()),
        stage_id: None,
        gclid: gclid.map(String::from),
        fbclid: fbclid.map(String::from),
        msclkid: msclkid.map(String::from),
        deal_value: Some(1200.0),
        currency: Some("USD".to_string()),
    }
}

pub fn column(title: &str) -> PipelineColumn {
    PipelineColumn {
        id: Uuid::new_v4(),
        title: title.to_string(),
    }
}

pub fn board() -> Vec<PipelineColumn> {
    vec![
        column("New"),
        column("Qualified"),
        column("Won"),
        column("Lost"),
    ]
}

#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: Mutex<HashMap<Uuid, Lead>>,
    pub set_stage_calls: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl InMemoryLeadStore {
    pub fn with_lead(lead: Lead) -> Arc<Self> {
        let store = Self::default();
        store.leads.lock().unwrap().insert(lead.id, lead);
        Arc::new(store)
    }

    pub fn stage_of(&self, id: Uuid) -> Option<Uuid> {
        self.leads.lock().unwrap().get(&id).and_then(|l| l.stage_id)
    }

    pub fn writes(&self) -> usize {
        self.set_stage_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn get_lead(&self, id: Uuid) -> Result<Lead, AppError> {
        self.leads
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))
    }

    async fn set_stage(&self, id: Uuid, column_id: Uuid) -> Result<(), AppError> {
        self.set_stage_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::InternalError("write rejected".to_string()));
        }
        let mut leads = self.leads.lock().unwrap();
        let lead = leads
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))?;
        lead.stage_id = Some(column_id);
        Ok(())
    }
}

pub struct InMemoryColumnStore {
    pub columns: Vec<PipelineColumn>,
}

#[async_trait]
impl ColumnStore for InMemoryColumnStore {
    async fn list_columns(&self, _org_id: Uuid) -> Result<Vec<PipelineColumn>, AppError> {
        Ok(self.columns.clone())
    }
}

pub struct BrokenColumnStore;

#[async_trait]
impl ColumnStore for BrokenColumnStore {
    async fn list_columns(&self, _org_id: Uuid) -> Result<Vec<PipelineColumn>, AppError> {
        Err(AppError::InternalError("columns unavailable".to_string()))
    }
}

/// Adapter double returning a fixed classification and recording every call.
pub struct ScriptedAdapter {
    platform: PlatformName,
    classification: SyncClassification,
    calls: Arc<Mutex<Vec<(PlatformName, TargetStatus)>>>,
}

#[async_trait]
impl PlatformAdapter for ScriptedAdapter {
    fn platform(&self) -> PlatformName {
        self.platform
    }

    async fn sync(&self, _lead: &Lead, status: TargetStatus) -> SyncOutcome {
        self.calls.lock().unwrap().push((self.platform, status));
        match self.classification {
            SyncClassification::Succeeded => SyncOutcome::succeeded(self.platform),
            SyncClassification::Failed => SyncOutcome::failed(self.platform, "scripted failure"),
            SyncClassification::NeutralSkip => SyncOutcome::neutral_skip(self.platform),
        }
    }
}

/// Builds a dispatcher where every platform answers with the given classification.
pub struct Scripted {
    pub calls: Arc<Mutex<Vec<(PlatformName, TargetStatus)>>>,
    classifications: HashMap<PlatformName, SyncClassification>,
}

impl Scripted {
    pub fn all(classification: SyncClassification) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            classifications: PlatformName::ALL
                .into_iter()
                .map(|p| (p, classification))
                .collect(),
        }
    }

    pub fn set(mut self, platform: PlatformName, classification: SyncClassification) -> Self {
        self.classifications.insert(platform, classification);
        self
    }

    pub fn dispatcher(&self) -> SyncDispatcher {
        self.classifications.iter().fold(
            SyncDispatcher::new(Duration::from_secs(5)),
            |dispatcher, (platform, classification)| {
                dispatcher.with_adapter(Arc::new(ScriptedAdapter {
                    platform: *platform,
                    classification: *classification,
                    calls: self.calls.clone(),
                }))
            },
        )
    }

    pub fn called(&self) -> Vec<PlatformName> {
        let mut platforms: Vec<PlatformName> =
            self.calls.lock().unwrap().iter().map(|(p, _)| *p).collect();
        platforms.sort();
        platforms
    }
}

pub fn service(
    lead_store: Arc<InMemoryLeadStore>,
    columns: Vec<PipelineColumn>,
    dispatcher: SyncDispatcher,
) -> ConversionSyncService {
    ConversionSyncService::new(
        lead_store.clone(),
        Arc::new(InMemoryColumnStore { columns }),
        dispatcher,
        StageTransitioner::new(lead_store),
    )
}

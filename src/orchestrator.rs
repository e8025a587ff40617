//! Status-change orchestration shared by every call site.
//!
//! Flow for one request:
//!
//! 1. Gate: decide which platforms apply from the lead's click identifiers.
//! 2. Dispatch: call them concurrently, every failure folded into an outcome.
//! 3. Aggregate: ordered success and failure sets.
//! 4. Transition: move the lead to the status column. Always runs, once.
//! 5. Report: one message plus an optional warning.
use crate::aggregator::aggregate;
use crate::attribution::applicable_platforms;
use crate::dispatcher::SyncDispatcher;
use crate::errors::{AppError, TransitionError};
use crate::models::{
    AggregatedResult, Lead, ReportMessage, SyncOutcome, SyncRequest, TargetStatus,
    TransitionOutcome,
};
use crate::reporter;
use crate::stage_transition::StageTransitioner;
use crate::stores::{ColumnStore, LeadStore};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Phases of one sync request. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncPhase {
    Idle,
    Gating,
    Dispatching,
    Aggregating,
    Transitioning,
    Reporting,
    Done,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Gating => "gating",
            SyncPhase::Dispatching => "dispatching",
            SyncPhase::Aggregating => "aggregating",
            SyncPhase::Transitioning => "transitioning",
            SyncPhase::Reporting => "reporting",
            SyncPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Tracks the current phase and logs each step.
struct PhaseTracker {
    lead_id: Uuid,
    phase: SyncPhase,
}

impl PhaseTracker {
    fn new(lead_id: Uuid) -> Self {
        Self {
            lead_id,
            phase: SyncPhase::Idle,
        }
    }

    fn enter(&mut self, next: SyncPhase) {
        debug_assert!(next > self.phase, "sync phase moved backwards");
        tracing::debug!("Lead {}: {} → {}", self.lead_id, self.phase, next);
        self.phase = next;
    }
}

/// Everything the caller needs to present the result of a status change.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub lead_id: Uuid,
    pub status: TargetStatus,
    pub report: ReportMessage,
    pub aggregated: AggregatedResult,
    pub outcomes: Vec<SyncOutcome>,
    /// `None` only when the transition failed.
    pub transition: Option<TransitionOutcome>,
    pub transition_error: Option<TransitionError>,
}

/// The conversion sync service: gate, fan out, aggregate, move, report.
#[derive(Clone)]
pub struct ConversionSyncService {
    lead_store: Arc<dyn LeadStore>,
    column_store: Arc<dyn ColumnStore>,
    dispatcher: SyncDispatcher,
    transitioner: Arc<StageTransitioner>,
}

impl ConversionSyncService {
    pub fn new(
        lead_store: Arc<dyn LeadStore>,
        column_store: Arc<dyn ColumnStore>,
        dispatcher: SyncDispatcher,
        transitioner: StageTransitioner,
    ) -> Self {
        Self {
            lead_store,
            column_store,
            dispatcher,
            transitioner: Arc::new(transitioner),
        }
    }

    /// Loads the lead and runs the full flow.
    ///
    /// Errors only when the lead cannot be loaded. Sync failures are part of
    /// the report; a failed stage write is returned in `transition_error`.
    pub async fn sync_and_transition(
        &self,
        lead_id: Uuid,
        status: TargetStatus,
    ) -> Result<SyncResult, AppError> {
        let lead = self.lead_store.get_lead(lead_id).await?;
        Ok(self.sync_lead(lead, status).await)
    }

    /// Runs the flow for an already loaded lead.
    pub async fn sync_lead(&self, lead: Lead, status: TargetStatus) -> SyncResult {
        let mut tracker = PhaseTracker::new(lead.id);
        let lead = Arc::new(lead);
        tracing::info!("🔄 Syncing status '{}' for lead {}", status, lead.id);

        tracker.enter(SyncPhase::Gating);
        let request = SyncRequest::for_lead(&lead, status);
        let applicable = applicable_platforms(&request.attribution, request.target_status);
        tracing::info!(
            "Applicable platforms for lead {}: {:?}",
            request.lead_id,
            applicable
        );

        tracker.enter(SyncPhase::Dispatching);
        let outcomes = self
            .dispatcher
            .dispatch(Arc::clone(&lead), status, &applicable)
            .await;

        tracker.enter(SyncPhase::Aggregating);
        let aggregated = aggregate(&outcomes);

        tracker.enter(SyncPhase::Transitioning);
        let (transition, transition_error) = match self.transition(&lead, status).await {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => (None, Some(e)),
        };

        tracker.enter(SyncPhase::Reporting);
        let report = reporter::report(&aggregated, status);
        if let Some(warning) = &report.warning {
            tracing::warn!("⚠️  Lead {}: {}", lead.id, warning);
        }

        tracker.enter(SyncPhase::Done);
        tracing::info!(
            "✅ Lead {} sync done: {} synced, {} failed",
            lead.id,
            aggregated.succeeded_platforms.len(),
            aggregated.failed_platforms.len()
        );

        SyncResult {
            lead_id: lead.id,
            status,
            report,
            aggregated,
            outcomes,
            transition,
            transition_error,
        }
    }

    async fn transition(
        &self,
        lead: &Lead,
        status: TargetStatus,
    ) -> Result<TransitionOutcome, TransitionError> {
        let columns = self
            .column_store
            .list_columns(lead.org_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list columns for org {}: {}", lead.org_id, e);
                TransitionError::ColumnLookup(e.to_string())
            })?;

        self.transitioner.transition(lead.id, status, &columns).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_ordered() {
        let phases = [
            SyncPhase::Idle,
            SyncPhase::Gating,
            SyncPhase::Dispatching,
            SyncPhase::Aggregating,
            SyncPhase::Transitioning,
            SyncPhase::Reporting,
            SyncPhase::Done,
        ];
        assert!(phases.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_tracker_walks_forward() {
        let mut tracker = PhaseTracker::new(Uuid::nil());
        tracker.enter(SyncPhase::Gating);
        tracker.enter(SyncPhase::Done);
        assert_eq!(tracker.phase, SyncPhase::Done);
    }
}

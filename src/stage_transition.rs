use crate::errors::TransitionError;
use crate::models::{PipelineColumn, TargetStatus, TransitionOutcome};
use crate::stores::LeadStore;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Picks the pipeline column for a status.
///
/// A configured column id wins when that column exists in `columns`. Otherwise
/// titles are compared case-insensitively with the status word and the first
/// match in board order is used.
pub fn resolve_column<'a>(
    status: TargetStatus,
    columns: &'a [PipelineColumn],
    configured: &HashMap<TargetStatus, Uuid>,
) -> Option<&'a PipelineColumn> {
    if let Some(id) = configured.get(&status) {
        match columns.iter().find(|c| c.id == *id) {
            Some(column) => return Some(column),
            None => tracing::warn!(
                "Configured column {} for '{}' is not on this board; matching by title",
                id,
                status
            ),
        }
    }

    let mut matches = columns
        .iter()
        .filter(|c| c.title.eq_ignore_ascii_case(status.label()));
    let first = matches.next()?;
    if matches.next().is_some() {
        tracing::warn!(
            "Several columns titled '{}'; using the first ({})",
            status,
            first.id
        );
    }
    Some(first)
}

/// Moves a lead to the column of its new status. The only writer of `Lead.stage_id`.
pub struct StageTransitioner {
    lead_store: Arc<dyn LeadStore>,
    configured_columns: HashMap<TargetStatus, Uuid>,
}

impl StageTransitioner {
    pub fn new(lead_store: Arc<dyn LeadStore>) -> Self {
        Self {
            lead_store,
            configured_columns: HashMap::new(),
        }
    }

    pub fn with_configured_columns(mut self, configured: HashMap<TargetStatus, Uuid>) -> Self {
        self.configured_columns = configured;
        self
    }

    /// Persists the new stage. No matching column is a no-op, not an error.
    pub async fn transition(
        &self,
        lead_id: Uuid,
        status: TargetStatus,
        columns: &[PipelineColumn],
    ) -> Result<TransitionOutcome, TransitionError> {
        let Some(column) = resolve_column(status, columns, &self.configured_columns) else {
            tracing::warn!(
                "No '{}' column on the board; lead {} stays in its current stage",
                status,
                lead_id
            );
            return Ok(TransitionOutcome::NoMatchingColumn);
        };

        self.lead_store
            .set_stage(lead_id, column.id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to move lead {} to '{}': {}", lead_id, column.title, e);
                TransitionError::Persistence(e.to_string())
            })?;

        tracing::info!("✓ Lead {} moved to column '{}'", lead_id, column.title);
        Ok(TransitionOutcome::Moved {
            column_id: column.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(title: &str) -> PipelineColumn {
        PipelineColumn {
            id: Uuid::new_v4(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_title_match_is_case_insensitive() {
        let columns = vec![column("New"), column("QUALIFIED"), column("Won")];
        let resolved = resolve_column(TargetStatus::Qualified, &columns, &HashMap::new());
        assert_eq!(resolved, Some(&columns[1]));
    }

    #[test]
    fn test_partial_title_does_not_match() {
        let columns = vec![column("Won - pending invoice"), column("Not won")];
        assert_eq!(
            resolve_column(TargetStatus::Won, &columns, &HashMap::new()),
            None
        );
    }

    #[test]
    fn test_padded_title_does_not_match() {
        let columns = vec![column(" Won "), column("won")];
        let resolved = resolve_column(TargetStatus::Won, &columns, &HashMap::new());
        assert_eq!(resolved.map(|c| c.id), Some(columns[1].id));

        let padded_only = vec![column("Lost ")];
        assert_eq!(
            resolve_column(TargetStatus::Lost, &padded_only, &HashMap::new()),
            None
        );
    }

    #[test]
    fn test_first_duplicate_wins() {
        let columns = vec![column("lost"), column("Lost")];
        let resolved = resolve_column(TargetStatus::Lost, &columns, &HashMap::new());
        assert_eq!(resolved.map(|c| c.id), Some(columns[0].id));
    }

    #[test]
    fn test_configured_column_wins_over_title() {
        let columns = vec![column("Won"), column("Closed - Won")];
        let configured = HashMap::from([(TargetStatus::Won, columns[1].id)]);
        let resolved = resolve_column(TargetStatus::Won, &columns, &configured);
        assert_eq!(resolved.map(|c| c.id), Some(columns[1].id));
    }

    #[test]
    fn test_unknown_configured_column_falls_back_to_title() {
        let columns = vec![column("Won")];
        let configured = HashMap::from([(TargetStatus::Won, Uuid::new_v4())]);
        let resolved = resolve_column(TargetStatus::Won, &columns, &configured);
        assert_eq!(resolved.map(|c| c.id), Some(columns[0].id));
    }
}

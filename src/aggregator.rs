use crate::models::{AggregatedResult, SyncClassification, SyncOutcome};

/// Reduces dispatch outcomes to ordered success and failure sets.
///
/// Neutral skips are dropped. Sets are ordered by platform, not by completion.
/// A platform reported both ways counts as failed, keeping the sets disjoint.
pub fn aggregate(outcomes: &[SyncOutcome]) -> AggregatedResult {
    let mut result = AggregatedResult::default();

    for outcome in outcomes {
        match outcome.classification {
            SyncClassification::Succeeded => {
                result.succeeded_platforms.insert(outcome.platform);
            }
            SyncClassification::Failed => {
                result.failed_platforms.insert(outcome.platform);
            }
            SyncClassification::NeutralSkip => {}
        }
    }

    let failed = result.failed_platforms.clone();
    result.succeeded_platforms.retain(|p| !failed.contains(p));
    result
}

use crate::models::{AggregatedResult, PlatformName, ReportMessage, TargetStatus};
use std::collections::BTreeSet;

/// Joins names as "A", "A and B", "A, B and C".
fn join_names(platforms: &BTreeSet<PlatformName>) -> String {
    let names: Vec<&str> = platforms.iter().map(|p| p.display_name()).collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}

/// Builds the single message shown to the user after a status change.
///
/// The warning about failed platforms is additive and never replaces the
/// primary message.
pub fn report(aggregated: &AggregatedResult, status: TargetStatus) -> ReportMessage {
    let message = if aggregated.succeeded_platforms.is_empty() {
        format!("Lead status updated to {}.", status)
    } else {
        format!(
            "Lead marked as {} and synced to {}.",
            status,
            join_names(&aggregated.succeeded_platforms)
        )
    };

    let warning = if aggregated.failed_platforms.is_empty() {
        None
    } else {
        Some(format!(
            "Could not sync to {}.",
            join_names(&aggregated.failed_platforms)
        ))
    };

    ReportMessage { message, warning }
}

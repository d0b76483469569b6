//! End-to-end run: load, merge, classify.

use std::sync::Arc;

use rocks_model::ChannelSnapshot;
use snapshot_merge::merge_snapshots;
use tracing::info;

use crate::aggregate::{build_report, StatusReport};
use crate::error::Result;
use crate::ingest::{load_snapshots, SnapshotSource};
use crate::metrics::METRICS;
use crate::obs::{emit_merge_conflict, ReportSpan};

/// Merge `snapshots` in the order given and classify the result.
///
/// Conflicts are logged and carried on the report; they never fail the run.
pub fn reconcile<I>(location: &str, snapshots: I) -> Result<StatusReport>
where
    I: IntoIterator<Item = ChannelSnapshot>,
{
    let _span = ReportSpan::enter(location);

    let outcome = merge_snapshots(snapshots);
    for conflict in &outcome.conflicts {
        emit_merge_conflict(conflict);
    }
    METRICS.add_merge_conflicts(outcome.conflicts.len() as u64);

    let report = build_report(&outcome)?;
    info!(
        packages = report.packages.len(),
        distros = report.distros.len(),
        conflicts = report.conflicts.len(),
        "status report built"
    );
    Ok(report)
}

/// Load every snapshot from `source` and build the status report.
pub async fn build_status_report(source: Arc<dyn SnapshotSource>) -> Result<StatusReport> {
    let location = source.location();
    let snapshots = load_snapshots(source).await?;
    let report = reconcile(&location, snapshots)?;
    METRICS.flush();
    Ok(report)
}

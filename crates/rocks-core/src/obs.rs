//! Structured tracing hooks for a status run.
//!
//! Events carry an `event` field so log pipelines can filter on it. Use
//! `ROCKS_LOG` to adjust verbosity and `--json` for JSON output.

use std::path::Path;

use snapshot_merge::MergeConflict;
use tracing::{debug, info, warn};

use crate::classify::StatusClassification;

/// RAII guard for a report-scoped span.
///
/// ```ignore
/// let _span = ReportSpan::enter("/var/cache/rocks");
/// ```
pub struct ReportSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReportSpan {
    /// Create and enter a span tagged with the snapshot source.
    pub fn enter(source: &str) -> Self {
        let span = tracing::info_span!("rocks.report", source = %source);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: one channel snapshot loaded.
pub fn emit_snapshot_loaded(distro: &str, channel: &str, packages: usize) {
    info!(
        event = "snapshot.loaded",
        distro = %distro,
        channel = %channel,
        packages = packages,
    );
}

/// Emit event: a snapshot file was skipped (warning level).
pub fn emit_snapshot_skipped(locator: &str, reason: &str) {
    warn!(event = "snapshot.skipped", locator = %locator, reason = %reason);
}

/// Emit event: two channels disagreed on one cell (warning level).
pub fn emit_merge_conflict(conflict: &MergeConflict) {
    warn!(
        event = "merge.conflict",
        package = %conflict.package,
        distro = %conflict.distro,
        channel = %conflict.channel,
        os_name = %conflict.os_name,
        os_code_name = %conflict.os_code_name,
        arch = %conflict.arch,
        stage = %conflict.stage,
        kept = %conflict.kept.as_deref().unwrap_or("<none>"),
        rejected = %conflict.rejected.as_deref().unwrap_or("<none>"),
    );
}

/// Emit event: one package classified in one distribution.
pub fn emit_package_classified(package: &str, distro: &str, classification: &StatusClassification) {
    debug!(
        event = "package.classified",
        package = %package,
        distro = %distro,
        class = %classification.class,
        version = %classification.version,
    );
}

/// Emit event: report artifact written.
pub fn emit_report_written(path: &Path, packages: usize) {
    info!(
        event = "report.written",
        path = %path.display(),
        packages = packages,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_span_create() {
        let _span = ReportSpan::enter("memory");
    }
}

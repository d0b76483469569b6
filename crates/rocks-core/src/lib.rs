//! Rocks-Core: Release Status Reconciliation for ROS Rocks
//!
//! Loads channel snapshots, merges them, and classifies how consistently
//! each package is released across operating systems, OS releases,
//! architectures and build stages.
//!
//! ## Layer 2 - Reconciliation
//!
//! - `VersionMatrix`: which context keys observed which version
//! - `find_optimal_split`: the minimal dimension set explaining the variation
//! - `describe`: the classification decision table
//! - `build_report` / `build_status_report`: one report for every package

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod ingest;
pub mod matrix;
pub mod metrics;
pub mod obs;
pub mod pipeline;
pub mod reporting;
pub mod split;
pub mod telemetry;

pub use aggregate::{
    all_distros, build_report, package_report, package_status, PackageReport, StatusReport,
};
pub use classify::{
    classify_matrix, describe, describe_grouping, StatusClass, StatusClassification,
    DOMINANT_SHARE, UNKNOWN_VERSION,
};
pub use error::{Result, RocksError};
pub use ingest::{
    load_snapshots, parse_snapshot, CacheDirSource, MemorySnapshotSource, SnapshotId,
    SnapshotSource,
};
pub use matrix::VersionMatrix;
pub use metrics::METRICS;
pub use obs::{
    emit_merge_conflict, emit_package_classified, emit_report_written, emit_snapshot_loaded,
    emit_snapshot_skipped, ReportSpan,
};
pub use pipeline::{build_status_report, reconcile};
pub use reporting::{render_summary_md, write_report_json, write_summary_md};
pub use split::{
    candidate_combos, find_optimal_split, partition_by, Grouping, SplitCombo, SplitOutcome,
    ALL_CONTEXTS,
};
pub use telemetry::{init_tracing, log_filter, LOG_ENV};

/// Crate version, shared by every workspace member.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

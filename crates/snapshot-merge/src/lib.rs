//! Snapshot-Merge: Channel Snapshot Merging for ROS Rocks
//!
//! Status information for one distribution arrives from several upstream
//! feeds (channels). This crate folds those snapshots into a single
//! [`PackageRecord`](rocks_model::PackageRecord) per package.
//!
//! ## Layer 1 - Ingestion Logic
//!
//! Focus: Deterministic first-seen-wins merging with structured conflicts.

pub mod merge;
pub mod repo_url;

pub use merge::{merge_snapshots, MergeConflict, MergeOutcome, SnapshotMerger};
pub use repo_url::{classify_repo_url, match_repo_url, RepoHost};

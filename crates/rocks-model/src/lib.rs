//! Rocks-Model: Typed Build-Status Data Model for ROS Rocks
//!
//! This crate holds the shapes every other layer agrees on: the nested
//! build-status tree reported by the buildfarm status pages, per-channel
//! snapshots, merged package records and the context keys that version
//! agreement is measured over.
//!
//! ## Layer 0 - Data Model
//!
//! Focus: Explicit dimensions, no untyped nested maps.
//!
//! ## Key Components
//!
//! - `BuildStatus`: os -> os release -> arch -> build stage -> binary id
//! - `ChannelSnapshot`: one upstream status feed for one distribution
//! - `ContextKey` / `Dimension`: the atomic observation cell and its axes
//! - `VersionKey`: numeric ordering of dotted versions

mod build_status;
mod context;
mod distro;
mod error;
mod snapshot;
mod version;

pub use build_status::{ArchStatus, BuildStatus, OsStatus, ReleaseStatus, SOURCE_ARCH};
pub use context::{BuildStage, ContextKey, Dimension};
pub use distro::{distro_order, sort_distros, LEGACY_DISTROS};
pub use error::ModelError;
pub use snapshot::{ChannelSnapshot, Maintainer, PackageRecord, PackageSnapshot, RepoRef};
pub use version::{semantic_version, VersionKey, MISSING};

/// Result type for rocks-model operations
pub type Result<T> = std::result::Result<T, ModelError>;

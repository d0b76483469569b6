//! Merging channel snapshots into package records.
//!
//! The same package usually arrives from several feeds for the same
//! distribution. Build-status trees are merged level by level; when two feeds
//! report different binaries for the same cell, the first-seen value is kept
//! and a [`MergeConflict`] is recorded for the caller to report.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use rocks_model::{
    ArchStatus, BuildStatus, ChannelSnapshot, OsStatus, PackageRecord, ReleaseStatus,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::repo_url::classify_repo_url;

/// Two snapshots disagreed on one build-status cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub package: String,
    pub distro: String,
    /// Channel whose value was rejected.
    pub channel: String,
    pub os_name: String,
    pub os_code_name: String,
    pub arch: String,
    pub stage: String,
    /// First-seen value, which stays in the record.
    pub kept: Option<String>,
    pub rejected: Option<String>,
}

impl fmt::Display for MergeConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}/{}/{}/{}: kept {} over {} from channel {}",
            self.package,
            self.distro,
            self.os_name,
            self.os_code_name,
            self.arch,
            self.stage,
            self.kept.as_deref().unwrap_or("<none>"),
            self.rejected.as_deref().unwrap_or("<none>"),
            self.channel,
        )
    }
}

/// Result of merging a batch of snapshots.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Merged records keyed by package name.
    pub records: BTreeMap<String, PackageRecord>,
    pub conflicts: Vec<MergeConflict>,
}

/// Where in the tree the merge currently is, plus the conflict sink.
struct MergeScope<'a> {
    package: &'a str,
    distro: &'a str,
    channel: &'a str,
    os_name: String,
    os_code_name: String,
    arch: String,
    conflicts: &'a mut Vec<MergeConflict>,
}

#[derive(Clone, Copy)]
enum Level {
    Os,
    Release,
    Arch,
}

impl MergeScope<'_> {
    fn enter(&mut self, level: Level, key: &str) {
        let slot = match level {
            Level::Os => &mut self.os_name,
            Level::Release => &mut self.os_code_name,
            Level::Arch => &mut self.arch,
        };
        key.clone_into(slot);
    }

    fn conflict(&mut self, stage: &str, kept: Option<String>, rejected: Option<String>) {
        self.conflicts.push(MergeConflict {
            package: self.package.to_string(),
            distro: self.distro.to_string(),
            channel: self.channel.to_string(),
            os_name: self.os_name.clone(),
            os_code_name: self.os_code_name.clone(),
            arch: self.arch.clone(),
            stage: stage.to_string(),
            kept,
            rejected,
        });
    }
}

/// Recursive first-seen-wins merge of one tree level.
trait DeepMerge {
    fn deep_merge(&mut self, other: Self, scope: &mut MergeScope<'_>);
}

fn merge_level<V: DeepMerge>(
    ours: &mut BTreeMap<String, V>,
    theirs: BTreeMap<String, V>,
    level: Level,
    scope: &mut MergeScope<'_>,
) {
    for (key, value) in theirs {
        match ours.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                scope.enter(level, slot.key());
                slot.get_mut().deep_merge(value, scope);
            }
        }
    }
}

impl DeepMerge for BuildStatus {
    fn deep_merge(&mut self, other: Self, scope: &mut MergeScope<'_>) {
        merge_level(&mut self.oses, other.oses, Level::Os, scope);
    }
}

impl DeepMerge for OsStatus {
    fn deep_merge(&mut self, other: Self, scope: &mut MergeScope<'_>) {
        merge_level(&mut self.releases, other.releases, Level::Release, scope);
    }
}

impl DeepMerge for ReleaseStatus {
    fn deep_merge(&mut self, other: Self, scope: &mut MergeScope<'_>) {
        merge_level(&mut self.arches, other.arches, Level::Arch, scope);
    }
}

impl DeepMerge for ArchStatus {
    fn deep_merge(&mut self, other: Self, scope: &mut MergeScope<'_>) {
        for (stage, value) in other.stages {
            match self.stages.entry(stage) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(slot) => {
                    if *slot.get() != value {
                        scope.conflict(slot.key(), slot.get().clone(), value);
                    }
                }
            }
        }
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Accumulates channel snapshots into one record per package.
#[derive(Debug, Default)]
pub struct SnapshotMerger {
    records: BTreeMap<String, PackageRecord>,
    conflicts: Vec<MergeConflict>,
}

impl SnapshotMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one snapshot into the accumulated records.
    ///
    /// Returns the number of conflicts this snapshot produced.
    pub fn absorb(&mut self, snapshot: ChannelSnapshot) -> usize {
        let ChannelSnapshot {
            distro,
            channel,
            packages,
        } = snapshot;
        let before = self.conflicts.len();

        for (name, mut package) in packages {
            package.build_status.rename_source_arches(&channel);

            let record = self
                .records
                .entry(name.clone())
                .or_insert_with(|| PackageRecord::new(name.as_str()));

            for maintainer in package.maintainers {
                push_unique(&mut record.maintainers, maintainer);
            }
            if let Some(repo) = classify_repo_url(package.url.as_deref()) {
                push_unique(&mut record.repos, repo);
            }

            match record.build_status.entry(distro.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(package.build_status);
                }
                Entry::Occupied(mut slot) => {
                    let mut scope = MergeScope {
                        package: &name,
                        distro: &distro,
                        channel: &channel,
                        os_name: String::new(),
                        os_code_name: String::new(),
                        arch: String::new(),
                        conflicts: &mut self.conflicts,
                    };
                    slot.get_mut().deep_merge(package.build_status, &mut scope);
                }
            }
        }

        let added = self.conflicts.len() - before;
        debug!(
            distro = %distro,
            channel = %channel,
            packages = self.records.len(),
            conflicts = added,
            "snapshot absorbed"
        );
        added
    }

    /// Conflicts recorded so far.
    pub fn conflicts(&self) -> &[MergeConflict] {
        &self.conflicts
    }

    pub fn finish(self) -> MergeOutcome {
        MergeOutcome {
            records: self.records,
            conflicts: self.conflicts,
        }
    }
}

/// Merge `snapshots` in iteration order. Earlier snapshots win conflicts.
pub fn merge_snapshots<I>(snapshots: I) -> MergeOutcome
where
    I: IntoIterator<Item = ChannelSnapshot>,
{
    let mut merger = SnapshotMerger::new();
    for snapshot in snapshots {
        merger.absorb(snapshot);
    }
    merger.finish()
}

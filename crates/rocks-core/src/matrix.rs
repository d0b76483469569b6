//! Version matrix: which context keys observed which semantic version.

use std::collections::BTreeMap;

use rocks_model::{semantic_version, BuildStage, BuildStatus, ContextKey};

/// Context keys grouped by the semantic version they observed, for one
/// package in one distribution.
///
/// A `None` version means the stage had no binary. The sentinel stays an
/// absence here so it can never collide with a real version string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionMatrix {
    entries: BTreeMap<Option<String>, Vec<ContextKey>>,
}

impl VersionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a build-status tree.
    ///
    /// Every `(os, os release, arch)` leaf contributes one key per canonical
    /// build stage, whether or not the stage is present in the leaf.
    pub fn from_build_status(status: &BuildStatus) -> Self {
        let mut matrix = Self::new();
        for (os_name, os_code_name, arch, leaf) in status.arches() {
            for stage in BuildStage::ALL {
                let version = leaf.stage(stage.as_str()).map(semantic_version);
                matrix.observe(version, ContextKey::new(os_name, os_code_name, arch, stage));
            }
        }
        matrix
    }

    /// Record that `key` observed `version`.
    pub fn observe(&mut self, version: Option<&str>, key: ContextKey) -> &mut Self {
        self.entries
            .entry(version.map(str::to_string))
            .or_default()
            .push(key);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct versions (the missing sentinel included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of context keys across all versions.
    pub fn total_contexts(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &[ContextKey])> {
        self.entries
            .iter()
            .map(|(version, keys)| (version.as_deref(), keys.as_slice()))
    }

    /// Keys that observed `version`.
    pub fn contexts(&self, version: Option<&str>) -> Option<&[ContextKey]> {
        self.iter()
            .find(|(v, _)| *v == version)
            .map(|(_, keys)| keys)
    }
}

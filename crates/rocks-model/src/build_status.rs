//! The four-level build-status tree.
//!
//! Status feeds report, per package and distribution, a nested mapping
//! `os -> os release -> arch -> build stage -> binary id`. Each level gets
//! its own type so dimension order can never be confused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arch name that status feeds use for source-package builds.
pub const SOURCE_ARCH: &str = "source";

/// Build status of one package in one distribution, keyed by OS name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildStatus {
    pub oses: BTreeMap<String, OsStatus>,
}

/// Releases (code names) of a single operating system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OsStatus {
    pub releases: BTreeMap<String, ReleaseStatus>,
}

/// Architectures built for one OS release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseStatus {
    pub arches: BTreeMap<String, ArchStatus>,
}

/// Leaf level: build stage name -> binary package identifier.
///
/// A `None` value (YAML `null`) and an absent stage both mean the stage has
/// no binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchStatus {
    pub stages: BTreeMap<String, Option<String>>,
}

impl ReleaseStatus {
    /// Rename a `source` arch to `<channel>_source` so source builds from
    /// different channels land in separate leaves.
    ///
    /// Returns `true` when a rename happened.
    pub fn rename_source_arch(&mut self, channel: &str) -> bool {
        match self.arches.remove(SOURCE_ARCH) {
            Some(status) => {
                self.arches.insert(format!("{channel}_{SOURCE_ARCH}"), status);
                true
            }
            None => false,
        }
    }
}

impl ArchStatus {
    /// Binary identifier recorded for `stage`, if any.
    pub fn stage(&self, stage: &str) -> Option<&str> {
        self.stages.get(stage).and_then(|v| v.as_deref())
    }
}

impl BuildStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.oses.is_empty()
    }

    /// Record `binary` for one cell, creating intermediate levels as needed.
    pub fn set_stage(
        &mut self,
        os_name: &str,
        os_code_name: &str,
        arch: &str,
        stage: &str,
        binary: Option<&str>,
    ) -> &mut Self {
        self.oses
            .entry(os_name.to_string())
            .or_default()
            .releases
            .entry(os_code_name.to_string())
            .or_default()
            .arches
            .entry(arch.to_string())
            .or_default()
            .stages
            .insert(stage.to_string(), binary.map(str::to_string));
        self
    }

    /// Iterate every `(os, os release, arch)` leaf in key order.
    pub fn arches(&self) -> impl Iterator<Item = (&str, &str, &str, &ArchStatus)> {
        self.oses.iter().flat_map(|(os_name, os)| {
            os.releases.iter().flat_map(move |(code_name, release)| {
                release.arches.iter().map(move |(arch, status)| {
                    (os_name.as_str(), code_name.as_str(), arch.as_str(), status)
                })
            })
        })
    }

    /// Apply [`ReleaseStatus::rename_source_arch`] to every OS release.
    ///
    /// Returns the number of releases renamed.
    pub fn rename_source_arches(&mut self, channel: &str) -> usize {
        self.oses
            .values_mut()
            .flat_map(|os| os.releases.values_mut())
            .map(|release| release.rename_source_arch(channel))
            .filter(|renamed| *renamed)
            .count()
    }
}

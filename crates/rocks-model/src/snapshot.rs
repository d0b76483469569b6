//! Per-channel snapshots and the merged package record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::build_status::BuildStatus;

/// A package maintainer as listed in a status feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Maintainer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
        }
    }
}

/// Canonical source-control location of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Canonical root URL, e.g. `https://github.com/ros/ros_comm`.
    pub url: String,
    /// Project name, e.g. `ros_comm`.
    pub name: String,
}

impl RepoRef {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// One package entry of a status feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSnapshot {
    #[serde(default)]
    pub maintainers: Vec<Maintainer>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub build_status: BuildStatus,
}

/// Everything one upstream feed reported for one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    pub distro: String,
    /// Identifies which upstream feed this snapshot came from.
    pub channel: String,
    pub packages: BTreeMap<String, PackageSnapshot>,
}

impl ChannelSnapshot {
    pub fn new(distro: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            distro: distro.into(),
            channel: channel.into(),
            packages: BTreeMap::new(),
        }
    }

    pub fn with_package(mut self, name: impl Into<String>, package: PackageSnapshot) -> Self {
        self.packages.insert(name.into(), package);
        self
    }
}

/// A package after all channel snapshots have been merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub maintainers: Vec<Maintainer>,
    pub repos: Vec<RepoRef>,
    /// Build status per distribution name.
    pub build_status: BTreeMap<String, BuildStatus>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Distributions this package has build status for.
    pub fn distros(&self) -> impl Iterator<Item = &str> {
        self.build_status.keys().map(String::as_str)
    }
}

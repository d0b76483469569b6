//! Observation cells and the dimensions they are compared along.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Pipeline stage whose binary artifact is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    Build,
    Main,
    Test,
}

impl BuildStage {
    /// Stages read from every arch leaf, in extraction order.
    pub const ALL: [BuildStage; 3] = [BuildStage::Build, BuildStage::Main, BuildStage::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStage::Build => "build",
            BuildStage::Main => "main",
            BuildStage::Test => "test",
        }
    }

    /// Display rank used when sorting projected keys: build, test, main.
    pub fn sort_rank(&self) -> u8 {
        match self {
            BuildStage::Build => 0,
            BuildStage::Test => 1,
            BuildStage::Main => 2,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "build" => Some(BuildStage::Build),
            "main" => Some(BuildStage::Main),
            "test" => Some(BuildStage::Test),
            _ => None,
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildStage {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| ModelError::UnknownBuildStage(s.to_string()))
    }
}

/// One axis a [`ContextKey`] can be projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    ReleaseBuild,
    IsSource,
    OsName,
    OsCodeName,
    Arch,
}

impl Dimension {
    /// Split search order. Combinations keep this relative order.
    pub const PRIORITY: [Dimension; 5] = [
        Dimension::ReleaseBuild,
        Dimension::IsSource,
        Dimension::OsName,
        Dimension::OsCodeName,
        Dimension::Arch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::ReleaseBuild => "release_build",
            Dimension::IsSource => "is_source",
            Dimension::OsName => "os_name",
            Dimension::OsCodeName => "os_code_name",
            Dimension::Arch => "arch",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::PRIORITY
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ModelError::UnknownDimension(s.to_string()))
    }
}

/// The `(os, os release, arch, build stage)` cell one version is observed in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextKey {
    pub os_name: String,
    pub os_code_name: String,
    pub arch: String,
    pub release_build: BuildStage,
    /// True iff the arch token contains `source`.
    pub is_source: bool,
}

impl ContextKey {
    pub fn new(os_name: &str, os_code_name: &str, arch: &str, release_build: BuildStage) -> Self {
        Self {
            os_name: os_name.to_string(),
            os_code_name: os_code_name.to_string(),
            arch: arch.to_string(),
            release_build,
            is_source: arch.contains("source"),
        }
    }

    /// Token this key contributes when projected onto `dimension`.
    pub fn project(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::ReleaseBuild => self.release_build.as_str(),
            Dimension::IsSource => {
                if self.is_source {
                    "source"
                } else {
                    "binary"
                }
            }
            Dimension::OsName => &self.os_name,
            Dimension::OsCodeName => &self.os_code_name,
            Dimension::Arch => &self.arch,
        }
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.os_name, self.os_code_name, self.arch, self.release_build
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_source_derived_from_arch() {
        assert!(ContextKey::new("ubuntu", "focal", "source", BuildStage::Main).is_source);
        assert!(ContextKey::new("ubuntu", "focal", "amd64_source", BuildStage::Main).is_source);
        assert!(!ContextKey::new("ubuntu", "focal", "amd64", BuildStage::Main).is_source);
    }

    #[test]
    fn test_project_each_dimension() {
        let key = ContextKey::new("debian", "buster", "arm64", BuildStage::Test);
        let tokens: Vec<&str> = Dimension::PRIORITY.iter().map(|d| key.project(*d)).collect();
        assert_eq!(tokens, vec!["test", "binary", "debian", "buster", "arm64"]);
    }

    #[test]
    fn test_stage_sort_rank_puts_main_last() {
        let mut stages = BuildStage::ALL.to_vec();
        stages.sort_by_key(BuildStage::sort_rank);
        assert_eq!(
            stages,
            vec![BuildStage::Build, BuildStage::Test, BuildStage::Main]
        );
    }

    #[test]
    fn test_dimension_round_trips_through_name() {
        for d in Dimension::PRIORITY {
            assert_eq!(d.as_str().parse::<Dimension>().unwrap(), d);
        }
        assert!("distro".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_display_is_slash_path() {
        let key = ContextKey::new("ubuntu", "jammy", "amd64", BuildStage::Build);
        assert_eq!(key.to_string(), "ubuntu/jammy/amd64/build");
    }
}

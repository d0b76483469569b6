//! Semantic versions and their numeric ordering.

use std::cmp::Ordering;

use crate::error::ModelError;

/// Label a missing observation takes once it leaves the version matrix.
pub const MISSING: &str = "missing";

/// Semantic version carried by a binary package identifier.
///
/// Binary ids look like `1.4.2-1focal.20230101.000000`; everything before
/// the first hyphen is the upstream version.
pub fn semantic_version(binary: &str) -> &str {
    binary.split('-').next().unwrap_or(binary)
}

/// Dotted version parsed into integer components for comparison.
///
/// Components compare left to right; a shorter version that is a prefix of
/// a longer one sorts first. [`MISSING`] parses as `0.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionKey(Vec<u64>);

impl VersionKey {
    pub fn parse(version: &str) -> Result<Self, ModelError> {
        if version == MISSING {
            return Ok(VersionKey(vec![0, 0, 0]));
        }
        version
            .split('.')
            .map(|component| {
                component
                    .parse::<u64>()
                    .map_err(|_| ModelError::MalformedVersion {
                        version: version.to_string(),
                        component: component.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(VersionKey)
    }

    pub fn components(&self) -> &[u64] {
        &self.0
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

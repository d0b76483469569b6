//! Status aggregation: one classification per package and distribution.
//!
//! [`build_report`] turns a [`MergeOutcome`] into a [`StatusReport`] keyed by
//! package name, the shape handed to renderers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rocks_model::{sort_distros, Maintainer, PackageRecord, RepoRef};
use serde::{Deserialize, Serialize};
use snapshot_merge::{MergeConflict, MergeOutcome};

use crate::classify::{describe, StatusClass, StatusClassification};
use crate::error::{Result, RocksError};
use crate::matrix::VersionMatrix;
use crate::metrics::METRICS;
use crate::obs::emit_package_classified;
use crate::split::{find_optimal_split, SplitOutcome};

/// Status of one package across every distribution it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub maintainers: Vec<Maintainer>,
    pub repo: Vec<RepoRef>,
    /// Classification per distribution name.
    pub status: BTreeMap<String, StatusClassification>,
}

/// Classify `record` in every distribution it has build status for.
pub fn package_status(record: &PackageRecord) -> Result<BTreeMap<String, StatusClassification>> {
    let mut status = BTreeMap::new();
    for (distro, build_status) in &record.build_status {
        let matrix = VersionMatrix::from_build_status(build_status);
        let outcome = find_optimal_split(&matrix);
        if outcome == SplitOutcome::Irreducible {
            METRICS.inc_irreducible_splits();
        }

        let classification =
            describe(&matrix, &outcome).map_err(|source| RocksError::Classify {
                package: record.name.clone(),
                distro: distro.clone(),
                source,
            })?;

        METRICS.inc_packages_classified();
        emit_package_classified(&record.name, distro, &classification);
        status.insert(distro.clone(), classification);
    }
    Ok(status)
}

/// Full report entry for `record`.
pub fn package_report(record: &PackageRecord) -> Result<PackageReport> {
    Ok(PackageReport {
        maintainers: record.maintainers.clone(),
        repo: record.repos.clone(),
        status: package_status(record)?,
    })
}

/// Every distribution seen across `packages`, legacy distributions first.
pub fn all_distros<'a, I>(packages: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a PackageReport>,
{
    sort_distros(
        packages
            .into_iter()
            .flat_map(|report| report.status.keys().cloned()),
    )
}

/// The complete status report for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub generated_at: DateTime<Utc>,
    /// Sorted list of all distributions.
    pub distros: Vec<String>,
    pub packages: BTreeMap<String, PackageReport>,
    /// Merge diagnostics, in the order they were found.
    #[serde(default)]
    pub conflicts: Vec<MergeConflict>,
}

impl StatusReport {
    /// Number of (package, distribution) cells per class. Every class is
    /// present, zero or not.
    pub fn class_counts(&self) -> BTreeMap<StatusClass, usize> {
        let mut counts: BTreeMap<StatusClass, usize> =
            StatusClass::ALL.iter().map(|class| (*class, 0)).collect();
        for classification in self.packages.values().flat_map(|p| p.status.values()) {
            *counts.entry(classification.class).or_default() += 1;
        }
        counts
    }

    pub fn package(&self, name: &str) -> Option<&PackageReport> {
        self.packages.get(name)
    }
}

/// Classify every merged record.
pub fn build_report(outcome: &MergeOutcome) -> Result<StatusReport> {
    let packages = outcome
        .records
        .iter()
        .map(|(name, record)| Ok((name.clone(), package_report(record)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(StatusReport {
        generated_at: Utc::now(),
        distros: all_distros(packages.values()),
        packages,
        conflicts: outcome.conflicts.clone(),
    })
}

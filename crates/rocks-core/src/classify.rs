//! Release-consistency classification.
//!
//! Turns a version matrix and its split into a [`StatusClassification`]
//! using a fixed decision table:
//!
//! 1. nothing observed -> `bad`
//! 2. one version -> `good`
//! 3. split on build stage alone -> `new` (something missing) or `rerelease`
//! 4. newest version dominates (>= 75%), or a single straggler -> `multiple`
//! 5. at most two projected keys -> `multiple`
//! 6. otherwise -> `complicated`

use std::fmt;

use rocks_model::{ModelError, VersionKey, MISSING};
use serde::{Deserialize, Serialize};

use crate::matrix::VersionMatrix;
use crate::split::{find_optimal_split, projected_key_order, Grouping, SplitCombo, SplitOutcome};

/// Share of projected keys the newest version must hold to count as the
/// release with a few stragglers.
pub const DOMINANT_SHARE: f64 = 0.75;

/// Version reported when a package has no observations.
pub const UNKNOWN_VERSION: &str = "x.x.x";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Good,
    Bad,
    New,
    Rerelease,
    Multiple,
    Complicated,
}

impl StatusClass {
    pub const ALL: [StatusClass; 6] = [
        StatusClass::Good,
        StatusClass::Bad,
        StatusClass::New,
        StatusClass::Rerelease,
        StatusClass::Multiple,
        StatusClass::Complicated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Good => "good",
            StatusClass::Bad => "bad",
            StatusClass::New => "new",
            StatusClass::Rerelease => "rerelease",
            StatusClass::Multiple => "multiple",
            StatusClass::Complicated => "complicated",
        }
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classification of one package in one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusClassification {
    pub class: StatusClass,
    /// Human-readable description of the discrepancy.
    pub status: String,
    /// Representative current version.
    pub version: String,
}

impl StatusClassification {
    pub fn new(class: StatusClass, status: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            class,
            status: status.into(),
            version: version.into(),
        }
    }
}

/// Split and classify `matrix` in one step.
pub fn classify_matrix(matrix: &VersionMatrix) -> Result<StatusClassification, ModelError> {
    describe(matrix, &find_optimal_split(matrix))
}

/// Classify `matrix` given the outcome of the split search.
pub fn describe(
    matrix: &VersionMatrix,
    outcome: &SplitOutcome,
) -> Result<StatusClassification, ModelError> {
    match outcome {
        SplitOutcome::Irreducible => describe_irreducible(matrix),
        _ => describe_grouping(outcome.combo(), &outcome.grouping()),
    }
}

/// Versions of `grouping` in ascending numeric order.
fn sorted_versions(grouping: &Grouping) -> Result<Vec<&str>, ModelError> {
    let mut keyed = grouping
        .keys()
        .map(|v| VersionKey::parse(v).map(|key| (key, v.as_str())))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, v)| v).collect())
}

fn listing(grouping: &Grouping, versions: &[&str]) -> String {
    versions
        .iter()
        .map(|v| format!("{} ({})", v, grouping[*v].join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decision table over a version -> projected-keys grouping.
pub fn describe_grouping(
    combo: Option<&SplitCombo>,
    grouping: &Grouping,
) -> Result<StatusClassification, ModelError> {
    let versions = sorted_versions(grouping)?;
    let (oldest, newest) = match versions.as_slice() {
        [] => {
            return Ok(StatusClassification::new(
                StatusClass::Bad,
                "completely missing",
                UNKNOWN_VERSION,
            ))
        }
        [only] => return Ok(StatusClassification::new(StatusClass::Good, "released", *only)),
        [oldest, .., newest] => (*oldest, *newest),
    };

    if combo.is_some_and(SplitCombo::is_release_build_only) {
        return Ok(if grouping.contains_key(MISSING) {
            StatusClassification::new(StatusClass::New, "waiting for new release", newest)
        } else {
            StatusClassification::new(StatusClass::Rerelease, "waiting for re-release", newest)
        });
    }

    let total: usize = grouping.values().map(Vec::len).sum();
    let share = grouping[newest].len() as f64 / total as f64;
    if share >= DOMINANT_SHARE || (versions.len() == 2 && grouping[oldest].len() == 1) {
        let old = listing(grouping, &versions[..versions.len() - 1]);
        return Ok(StatusClassification::new(
            StatusClass::Multiple,
            format!("Old versions: {old}"),
            newest,
        ));
    }

    let all = listing(grouping, &versions);
    if total <= 2 {
        return Ok(StatusClassification::new(StatusClass::Multiple, all, newest));
    }
    Ok(StatusClassification::new(StatusClass::Complicated, all, newest))
}

/// No clean partition exists: list every raw context key per version.
fn describe_irreducible(matrix: &VersionMatrix) -> Result<StatusClassification, ModelError> {
    let grouping: Grouping = matrix
        .iter()
        .map(|(version, keys)| {
            let mut keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
            keys.sort_by(|a, b| projected_key_order(a).cmp(&projected_key_order(b)));
            keys.dedup();
            (version.unwrap_or(MISSING).to_string(), keys)
        })
        .collect();
    let versions = sorted_versions(&grouping)?;
    let newest = versions.last().copied().unwrap_or(UNKNOWN_VERSION);
    Ok(StatusClassification::new(
        StatusClass::Complicated,
        listing(&grouping, &versions),
        newest,
    ))
}

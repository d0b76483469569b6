//! Optimal split search.
//!
//! Looks for the smallest set of context dimensions along which a package's
//! versions partition cleanly: every context key that projects onto the same
//! dimension values must have observed the same version. Combinations are
//! tried by size, and within a size in [`Dimension::PRIORITY`] order, so the
//! first success is minimal.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use itertools::Itertools;
use rocks_model::{BuildStage, Dimension, MISSING};
use serde::{Deserialize, Serialize};

use crate::matrix::VersionMatrix;

/// Version label -> sorted projected keys (slash-joined dimension values).
pub type Grouping = BTreeMap<String, Vec<String>>;

/// Grouping label used when every context agrees.
pub const ALL_CONTEXTS: &str = "all";

/// Ordered subset of [`Dimension::PRIORITY`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitCombo(Vec<Dimension>);

impl SplitCombo {
    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self(dimensions)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True for the combo consisting of `release_build` alone.
    pub fn is_release_build_only(&self) -> bool {
        self.0 == [Dimension::ReleaseBuild]
    }
}

impl fmt::Display for SplitCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.iter().map(Dimension::as_str).join("/"))
    }
}

/// What the split search found for one version matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The matrix has no observations.
    Empty,
    /// Every context observed the same version; no split needed.
    Synced { version: String },
    /// Versions partition cleanly along `combo`.
    Split { combo: SplitCombo, grouping: Grouping },
    /// No combination of dimensions explains the variation.
    Irreducible,
}

impl SplitOutcome {
    /// The discovered split, if a partition was needed and found.
    pub fn combo(&self) -> Option<&SplitCombo> {
        match self {
            SplitOutcome::Split { combo, .. } => Some(combo),
            _ => None,
        }
    }

    /// Version -> projected keys. `Synced` maps its version to `["all"]`;
    /// `Empty` and `Irreducible` give an empty grouping.
    pub fn grouping(&self) -> Grouping {
        match self {
            SplitOutcome::Split { grouping, .. } => grouping.clone(),
            SplitOutcome::Synced { version } => {
                BTreeMap::from([(version.clone(), vec![ALL_CONTEXTS.to_string()])])
            }
            SplitOutcome::Empty | SplitOutcome::Irreducible => Grouping::new(),
        }
    }
}

/// Every candidate combo, in search order.
pub fn candidate_combos() -> impl Iterator<Item = SplitCombo> {
    (1..=Dimension::PRIORITY.len()).flat_map(|size| {
        Dimension::PRIORITY
            .into_iter()
            .combinations(size)
            .map(SplitCombo::new)
    })
}

/// Project `matrix` onto `combo`.
///
/// Returns `None` when two keys with the same projection observed different
/// versions, or when the matrix is empty.
pub fn partition_by(
    matrix: &VersionMatrix,
    combo: &SplitCombo,
) -> Option<BTreeMap<String, BTreeSet<String>>> {
    let mut seen: HashMap<Vec<&str>, &str> = HashMap::new();
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (version, keys) in matrix.iter() {
        let label = version.unwrap_or(MISSING);
        for key in keys {
            let projected: Vec<&str> = combo.dimensions().iter().map(|d| key.project(*d)).collect();
            let joined = projected.join("/");
            match seen.entry(projected) {
                Entry::Occupied(slot) => {
                    if *slot.get() != label {
                        return None;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(label);
                }
            }
            groups.entry(label.to_string()).or_default().insert(joined);
        }
    }

    if groups.is_empty() {
        None
    } else {
        Some(groups)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    Stage(u8),
    Other(&'a str),
}

/// Sort key for projected keys: build, test, main lead, then lexical.
pub(crate) fn projected_key_order(key: &str) -> impl Ord + '_ {
    key.split('/')
        .map(|part| match BuildStage::from_token(part) {
            Some(stage) => Segment::Stage(stage.sort_rank()),
            None => Segment::Other(part),
        })
        .collect::<Vec<_>>()
}

/// Search for the minimal clean split of `matrix`.
pub fn find_optimal_split(matrix: &VersionMatrix) -> SplitOutcome {
    if matrix.is_empty() {
        return SplitOutcome::Empty;
    }

    for combo in candidate_combos() {
        let Some(groups) = partition_by(matrix, &combo) else {
            continue;
        };

        if combo.is_release_build_only() && groups.len() == 1 {
            let version = groups.into_keys().next().unwrap_or_default();
            return SplitOutcome::Synced { version };
        }

        let grouping = groups
            .into_iter()
            .map(|(version, keys)| {
                let mut keys: Vec<String> = keys.into_iter().collect();
                keys.sort_by(|a, b| projected_key_order(a).cmp(&projected_key_order(b)));
                (version, keys)
            })
            .collect();
        return SplitOutcome::Split { combo, grouping };
    }

    SplitOutcome::Irreducible
}

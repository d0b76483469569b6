//! Property tests for the version matrix and split search.

use std::collections::HashSet;

use proptest::prelude::*;
use rocks_core::{
    candidate_combos, classify_matrix, find_optimal_split, partition_by, SplitOutcome,
    VersionMatrix,
};
use rocks_model::{BuildStatus, VersionKey};

const OSES: [&str; 2] = ["debian", "ubuntu"];
const CODES: [&str; 3] = ["bookworm", "focal", "jammy"];
const ARCHES: [&str; 4] = ["amd64", "arm64", "armhf", "source"];
const VERSIONS: [&str; 3] = ["1.0.0-1", "1.2.0-3", "1.10.0-1"];

type Leaf = (usize, usize, usize, [Option<usize>; 3]);

fn leaves() -> impl Strategy<Value = Vec<Leaf>> {
    let version = prop::option::of(0..VERSIONS.len());
    prop::collection::vec(
        (
            0..OSES.len(),
            0..CODES.len(),
            0..ARCHES.len(),
            [version.clone(), version.clone(), version],
        ),
        0..12,
    )
}

fn build_status(leaves: &[Leaf]) -> BuildStatus {
    let mut status = BuildStatus::new();
    for (os, code, arch, stages) in leaves {
        for (stage, version) in ["build", "main", "test"].into_iter().zip(stages) {
            status.set_stage(
                OSES[*os],
                CODES[*code],
                ARCHES[*arch],
                stage,
                version.map(|v| VERSIONS[v]),
            );
        }
    }
    status
}

proptest! {
    #[test]
    fn proptest_matrix_partitions_every_context_once(leaves in leaves()) {
        let status = build_status(&leaves);
        let matrix = VersionMatrix::from_build_status(&status);

        let mut seen = HashSet::new();
        for (_, keys) in matrix.iter() {
            for key in keys {
                prop_assert!(seen.insert(key.clone()), "key {} listed twice", key);
            }
        }
        prop_assert_eq!(seen.len(), status.arches().count() * 3);
        prop_assert_eq!(seen.len(), matrix.total_contexts());
    }

    #[test]
    fn proptest_split_is_minimal(leaves in leaves()) {
        let matrix = VersionMatrix::from_build_status(&build_status(&leaves));
        let outcome = find_optimal_split(&matrix);
        // distinct keys always separate once every dimension is used
        prop_assert!(outcome != SplitOutcome::Irreducible);

        match &outcome {
            SplitOutcome::Empty => prop_assert!(matrix.is_empty()),
            SplitOutcome::Synced { version } => {
                let first = candidate_combos().next().unwrap();
                let groups = partition_by(&matrix, &first).unwrap();
                prop_assert_eq!(groups.len(), 1);
                prop_assert!(groups.contains_key(version));
            }
            SplitOutcome::Split { combo, grouping } => {
                let groups = partition_by(&matrix, combo).unwrap();
                prop_assert_eq!(groups.len(), grouping.len());
                for earlier in candidate_combos().take_while(|c| c != combo) {
                    prop_assert!(
                        partition_by(&matrix, &earlier).is_none(),
                        "{} splits cleanly but {} was chosen",
                        earlier,
                        combo
                    );
                }
            }
            SplitOutcome::Irreducible => {}
        }
    }

    #[test]
    fn proptest_classification_is_deterministic(leaves in leaves()) {
        let status = build_status(&leaves);
        let first = classify_matrix(&VersionMatrix::from_build_status(&status)).unwrap();
        let second = classify_matrix(&VersionMatrix::from_build_status(&status)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn proptest_version_order_is_numeric(
        a in prop::array::uniform3(0u64..200),
        b in prop::array::uniform3(0u64..200),
    ) {
        let render = |v: [u64; 3]| format!("{}.{}.{}", v[0], v[1], v[2]);
        let ka = VersionKey::parse(&render(a)).unwrap();
        let kb = VersionKey::parse(&render(b)).unwrap();
        prop_assert_eq!(ka.cmp(&kb), a.cmp(&b));
    }
}

#[test]
fn version_order_examples() {
    let key = |v: &str| VersionKey::parse(v).unwrap();
    assert!(key("1.9.0") < key("1.10.0"));
    assert!(key("1.2.0") < key("1.10.0"));
    assert!(key("missing") < key("0.0.1"));
}

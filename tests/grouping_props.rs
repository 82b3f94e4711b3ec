//! Property-based tests for grouping, anchoring and normalization.

use composable_ddct::prelude::*;
use proptest::prelude::*;

fn records_for(sizes: &[usize], cts: &[f64]) -> Dataset {
    let n: usize = sizes.iter().sum();
    Dataset::from_pairs(
        "prop",
        (0..n).map(|i| (format!("s{}", i), cts[i % cts.len()])),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_group_then_flatten_roundtrips(
        sizes in prop::collection::vec(1usize..6, 1..6),
        cts in prop::collection::vec(10.0f64..40.0, 1..30),
    ) {
        let dataset = records_for(&sizes, &cts);
        let grouped = group_replicates(&dataset, &ReplicateSpec::Sizes(sizes.clone()), None).unwrap();

        prop_assert_eq!(grouped.n_groups(), sizes.len());
        for (group, size) in grouped.groups().iter().zip(&sizes) {
            prop_assert_eq!(group.len(), *size);
        }
        prop_assert_eq!(grouped.flatten(), dataset);
    }

    #[test]
    fn prop_grouped_anchor_first_replicate_is_neutral(
        n_groups in 1usize..5,
        replicates in 1usize..5,
        cts in prop::collection::vec(10.0f64..40.0, 1..30),
        linear in any::<bool>(),
    ) {
        let transform = if linear { Transform::Linear } else { Transform::Exponential };
        let sizes = vec![replicates; n_groups];
        let dataset = records_for(&sizes, &cts);
        let grouped = group_replicates(&dataset, &ReplicateSpec::Uniform(replicates), None).unwrap();

        let result = analyse(&grouped, &AnchorPolicy::Grouped, transform).unwrap();
        for group in result.groups() {
            prop_assert_eq!(group.values[0], transform.neutral());
        }
    }

    #[test]
    fn prop_neutral_normalizer_is_identity(
        values in prop::collection::vec(-5.0f64..5.0, 1..10),
        linear in any::<bool>(),
    ) {
        let transform = if linear { Transform::Linear } else { Transform::Exponential };
        let sample = DeltaCtResult::new(
            "sample",
            transform,
            vec![ValueGroup::new("Group1", values.clone())],
        ).unwrap();
        let neutral = DeltaCtResult::new(
            "ref",
            transform,
            vec![ValueGroup::new("Group1", vec![transform.neutral(); values.len()])],
        ).unwrap();

        let normalized = normalize(&sample, &neutral).unwrap();
        prop_assert_eq!(&normalized.groups()[0].values, &values);
    }
}

//! Property tests over randomly generated relation sets.

mod common;

use common::*;
use dpjoin_core::cost::DefaultCostModel;
use dpjoin_core::relation::Relation;
use dpjoin_core::search::{JoinOptimizer, SearchConfig, SearchStrategy};
use dpjoin_core::subset::EnumerationPolicy;
use proptest::prelude::*;
use std::sync::Arc;

const ATTRIBUTES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

/// Up to `max` relations with ids 1..=n, 1..=5000 tuples, and a random attribute subset.
fn relations(max: usize) -> impl Strategy<Value = Vec<Arc<Relation>>> {
    prop::collection::vec((1u64..=5000, prop::collection::vec(any::<bool>(), ATTRIBUTES.len())), 1..=max)
        .prop_map(|drawn| {
            drawn
                .into_iter()
                .enumerate()
                .map(|(i, (tuples, mask))| {
                    let attrs: Vec<&str> = ATTRIBUTES
                        .iter()
                        .zip(mask)
                        .filter_map(|(a, keep)| keep.then_some(*a))
                        .collect();
                    rel(i as u32 + 1, tuples, &attrs)
                })
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn dp_matches_brute_force(rels in relations(5)) {
        let mut optimizer = JoinOptimizer::default();
        let plan = optimizer.optimize(&rels).unwrap();
        prop_assert_eq!(plan.tuples(), brute_force_min(&rels));
        prop_assert_eq!(plan.covered_relations().len(), rels.len());
    }

    #[test]
    fn result_ignores_input_order(
        (rels, shuffled) in relations(6).prop_flat_map(|rels| {
            let shuffled = Just(rels.clone()).prop_shuffle();
            (Just(rels), shuffled)
        })
    ) {
        let expected = JoinOptimizer::default().optimize(&rels).unwrap();
        let actual = JoinOptimizer::default().optimize(&shuffled).unwrap();
        prop_assert_eq!(actual.as_ref(), expected.as_ref());
    }

    #[test]
    fn policies_and_strategies_agree(rels in relations(7)) {
        let expected = JoinOptimizer::default().optimize(&rels).unwrap();

        let mut parallel = JoinOptimizer::new(
            Arc::new(DefaultCostModel),
            SearchConfig { strategy: SearchStrategy::BottomUpParallel, ..SearchConfig::default() },
        );
        let got = parallel.optimize(&rels).unwrap();
        prop_assert_eq!(got.as_ref(), expected.as_ref());

        let mut canonical = JoinOptimizer::new(
            Arc::new(DefaultCostModel),
            SearchConfig { enumeration: EnumerationPolicy::Canonical, ..SearchConfig::default() },
        );
        prop_assert_eq!(canonical.optimize(&rels).unwrap().tuples(), expected.tuples());
    }

    #[test]
    fn join_nodes_derive_from_children(rels in relations(6)) {
        let plan = JoinOptimizer::default().optimize(&rels).unwrap();
        let mut stack = vec![plan];
        while let Some(node) = stack.pop() {
            if let Some((left, right)) = node.children() {
                let union: std::collections::BTreeSet<String> =
                    left.attributes().union(right.attributes()).cloned().collect();
                prop_assert_eq!(node.attributes(), &union);
                prop_assert!(left.covered_relations().is_disjoint(&right.covered_relations()));
                stack.push(left.clone());
                stack.push(right.clone());
            }
        }
    }
}

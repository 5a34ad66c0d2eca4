//! Helpers shared by the integration tests.

#![allow(dead_code)]

use dpjoin_core::cost::DefaultCostModel;
use dpjoin_core::plan::JoinPlan;
use dpjoin_core::relation::{Relation, RelationId};
use std::sync::Arc;

pub fn rel(id: u32, tuples: u64, attrs: &[&str]) -> Arc<Relation> {
    Arc::new(Relation::new(RelationId(id), tuples, attrs.iter().copied()).unwrap())
}

pub fn leaf(relation: &Arc<Relation>) -> Arc<JoinPlan> {
    Arc::new(JoinPlan::leaf(relation.clone()))
}

pub fn join(left: Arc<JoinPlan>, right: Arc<JoinPlan>) -> Arc<JoinPlan> {
    Arc::new(JoinPlan::join(left, right, &DefaultCostModel))
}

/// Every ordered binary bracketing of `relations`, built without any memoization.
pub fn all_bracketings(relations: &[Arc<Relation>]) -> Vec<Arc<JoinPlan>> {
    if relations.len() == 1 {
        return vec![leaf(&relations[0])];
    }

    let n = relations.len();
    let mut plans = Vec::new();
    for mask in 1..(1u32 << n) - 1 {
        let (left, right): (Vec<_>, Vec<_>) = relations
            .iter()
            .enumerate()
            .partition(|&(i, _)| mask & (1u32 << i) != 0);
        let left: Vec<_> = left.into_iter().map(|(_, r)| r.clone()).collect();
        let right: Vec<_> = right.into_iter().map(|(_, r)| r.clone()).collect();

        for l in all_bracketings(&left) {
            for r in all_bracketings(&right) {
                plans.push(join(l.clone(), r));
            }
        }
    }
    plans
}

/// Cheapest tuple count over every bracketing.
pub fn brute_force_min(relations: &[Arc<Relation>]) -> u64 {
    all_bracketings(relations)
        .iter()
        .map(|p| p.tuples())
        .min()
        .unwrap_or(0)
}

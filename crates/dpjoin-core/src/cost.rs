//! # Cost Model
//!
//! The cost of a join plan is its estimated output cardinality: the optimizer prefers
//! the bracketing whose root produces the fewest tuples. The cost model is consulted
//! exactly once per join node, when the node is built; leaves cost their relation's
//! tuple count and never reach the model.
//!
//! ## Pluggable Design
//!
//! `CostModel` is a trait so that callers can inject another estimate (for example one
//! driven by real selectivities). [`DefaultCostModel`] implements the halving rule from
//! [`stats`](crate::stats); [`SelectivityCostModel`] generalises it to an arbitrary
//! per-attribute selectivity.

use crate::plan::JoinPlan;
use crate::stats;

/// Trait for pluggable cardinality estimates.
pub trait CostModel: Send + Sync {
    /// Estimated tuple count of joining `left` with `right`.
    fn join_cardinality(&self, left: &JoinPlan, right: &JoinPlan) -> u64;
}

/// Each shared attribute halves the cross product; results are truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCostModel;

impl CostModel for DefaultCostModel {
    fn join_cardinality(&self, left: &JoinPlan, right: &JoinPlan) -> u64 {
        let shared = stats::shared_attribute_count(left.attributes(), right.attributes());
        stats::derive_join_cardinality(left.tuples(), right.tuples(), shared)
    }
}

/// Each shared attribute multiplies the cross product by `per_attribute`.
///
/// Evaluated in floating point, so very large inputs lose precision; use
/// [`DefaultCostModel`] when exact halving is wanted.
#[derive(Debug, Clone, Copy)]
pub struct SelectivityCostModel {
    /// Selectivity applied once per shared attribute, expected in `(0, 1]`.
    pub per_attribute: f64,
}

impl Default for SelectivityCostModel {
    fn default() -> Self {
        Self { per_attribute: 0.5 }
    }
}

impl CostModel for SelectivityCostModel {
    fn join_cardinality(&self, left: &JoinPlan, right: &JoinPlan) -> u64 {
        let shared = stats::shared_attribute_count(left.attributes(), right.attributes());
        let factor = self.per_attribute.powi(shared as i32);
        // `as` saturates and maps NaN to zero.
        (factor * left.tuples() as f64 * right.tuples() as f64) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{Relation, RelationId};
    use std::sync::Arc;

    fn leaf(id: u32, tuples: u64, attrs: &[&str]) -> JoinPlan {
        JoinPlan::leaf(Arc::new(Relation::new(RelationId(id), tuples, attrs.iter().copied()).unwrap()))
    }

    #[test]
    fn test_default_model_halves_per_shared_attribute() {
        let model = DefaultCostModel;
        let t1 = leaf(1, 10, &["A", "B", "E"]);
        let t2 = leaf(2, 20, &["B", "C", "D"]);
        let t3 = leaf(3, 15, &["A", "B", "D"]);

        assert_eq!(model.join_cardinality(&t1, &t2), 100);
        assert_eq!(model.join_cardinality(&t1, &t3), 37);
        assert_eq!(model.join_cardinality(&t2, &t3), 75);
    }

    #[test]
    fn test_selectivity_model_matches_default_at_one_half() {
        let t1 = leaf(1, 10, &["A", "B", "E"]);
        let t3 = leaf(3, 15, &["A", "B", "D"]);
        assert_eq!(
            SelectivityCostModel::default().join_cardinality(&t1, &t3),
            DefaultCostModel.join_cardinality(&t1, &t3)
        );

        let strict = SelectivityCostModel { per_attribute: 0.1 };
        assert_eq!(strict.join_cardinality(&t1, &t3), 1); // 150 * 0.01
    }
}

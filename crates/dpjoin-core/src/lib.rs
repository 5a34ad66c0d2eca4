//! # dpjoin-core: Memoized Join Ordering
//!
//! This crate computes a minimum-estimated-cost bushy join order for a set of base
//! relations using dynamic programming over relation subsets. Every subset's optimum
//! is computed once and memoized, so overlapping subproblems are never re-solved.
//!
//! ## Module Overview
//!
//! - **`relation`**: Base relations (identity, tuple count, attribute names).
//! - **`catalog`**: Catalog trait and an in-memory catalog assigning sequential ids.
//! - **`stats`**: Cardinality derivation (shared attributes halve the cross product).
//! - **`cost`**: Cost model trait and default implementation.
//! - **`plan`**: The join tree (`Leaf | Join`) with derived attributes and cardinality.
//! - **`subset`**: Relation-set bitmasks and lazy bipartition enumeration.
//! - **`memo`**: The memo table keyed by relation set.
//! - **`search`**: The memoized search, its configuration, and a parallel strategy.
//! - **`error`**: Errors raised at the API boundary.
//!
//! ## Example
//!
//! ```
//! use dpjoin_core::catalog::InMemoryCatalog;
//! use dpjoin_core::optimal_join_order;
//!
//! let mut catalog = InMemoryCatalog::new();
//! let t1 = catalog.add_relation(10, ["A", "B", "E"]).unwrap();
//! let t2 = catalog.add_relation(20, ["B", "C", "D"]).unwrap();
//!
//! let (plan, tuples) = optimal_join_order(&[t1, t2]).unwrap();
//! assert_eq!(plan.to_string(), "(T1 x T2)");
//! assert_eq!(tuples, 100);
//! ```

pub mod catalog;
pub mod cost;
pub mod error;
pub mod memo;
pub mod plan;
pub mod relation;
pub mod search;
pub mod stats;
pub mod subset;

use std::sync::Arc;

use crate::error::Result;
use crate::plan::JoinPlan;
use crate::relation::Relation;
use crate::search::JoinOptimizer;

/// Optimize `relations` with the default cost model and configuration.
///
/// Returns the cheapest plan and its estimated tuple count. A fresh memo is used for
/// every call.
pub fn optimal_join_order(relations: &[Arc<Relation>]) -> Result<(Arc<JoinPlan>, u64)> {
    let mut optimizer = JoinOptimizer::default();
    let plan = optimizer.optimize(relations)?;
    let tuples = plan.tuples();
    Ok((plan, tuples))
}

//! # Join Plans
//!
//! A [`JoinPlan`] is a binary tree: either a leaf wrapping one base relation, or a join
//! of two sub-plans. Both variants answer the same questions (`tuples()`,
//! `attributes()`), so callers walk the tree uniformly without caring which kind of
//! node they hold.
//!
//! ## Derived Properties
//!
//! A join node's attribute set and tuple count are computed once, when the node is
//! built, from its children and the cost model. They are never set independently and
//! never change afterwards.
//!
//! ## Sharing
//!
//! Children are held as `Arc<JoinPlan>`. The optimizer reuses the memoized optimum of a
//! subset as a child of many candidate parents; since nothing mutates a plan after
//! construction, this sharing is safe across threads.

use crate::cost::CostModel;
use crate::relation::{Relation, RelationId};
use crate::stats;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A node in a join tree.
#[derive(Debug, Clone)]
pub enum JoinPlan {
    /// A base relation.
    Leaf(Arc<Relation>),
    /// The join of two sub-plans with its derived properties.
    Join {
        left: Arc<JoinPlan>,
        right: Arc<JoinPlan>,
        attributes: BTreeSet<String>,
        tuples: u64,
    },
}

impl JoinPlan {
    pub fn leaf(relation: Arc<Relation>) -> Self {
        JoinPlan::Leaf(relation)
    }

    /// Join two plans. Always succeeds: inputs without shared attributes form a
    /// cross product.
    pub fn join(left: Arc<JoinPlan>, right: Arc<JoinPlan>, cost_model: &dyn CostModel) -> Self {
        let tuples = cost_model.join_cardinality(&left, &right);
        let attributes = stats::derive_join_attributes(left.attributes(), right.attributes());
        JoinPlan::Join {
            left,
            right,
            attributes,
            tuples,
        }
    }

    /// Estimated output cardinality. This is the plan's cost.
    pub fn tuples(&self) -> u64 {
        match self {
            JoinPlan::Leaf(relation) => relation.tuples(),
            JoinPlan::Join { tuples, .. } => *tuples,
        }
    }

    pub fn attributes(&self) -> &BTreeSet<String> {
        match self {
            JoinPlan::Leaf(relation) => relation.attributes(),
            JoinPlan::Join { attributes, .. } => attributes,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, JoinPlan::Leaf(_))
    }

    pub fn relation(&self) -> Option<&Arc<Relation>> {
        match self {
            JoinPlan::Leaf(relation) => Some(relation),
            JoinPlan::Join { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(&Arc<JoinPlan>, &Arc<JoinPlan>)> {
        match self {
            JoinPlan::Leaf(_) => None,
            JoinPlan::Join { left, right, .. } => Some((left, right)),
        }
    }

    /// Base relations under this plan, left to right.
    pub fn leaves(&self) -> Vec<&Arc<Relation>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Arc<Relation>>) {
        match self {
            JoinPlan::Leaf(relation) => out.push(relation),
            JoinPlan::Join { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    /// Identities of every base relation covered by this plan.
    pub fn covered_relations(&self) -> BTreeSet<RelationId> {
        self.leaves().into_iter().map(|r| r.id()).collect()
    }

    /// Number of join nodes in the tree.
    pub fn join_count(&self) -> usize {
        match self {
            JoinPlan::Leaf(_) => 0,
            JoinPlan::Join { left, right, .. } => 1 + left.join_count() + right.join_count(),
        }
    }

    /// Height of the tree; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            JoinPlan::Leaf(_) => 0,
            JoinPlan::Join { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Multi-line rendering with one node per line and per-node estimates.
    pub fn display(&self, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        match self {
            JoinPlan::Leaf(relation) => format!("{}{}\n", pad, relation),
            JoinPlan::Join {
                left, right, tuples, ..
            } => {
                let mut s = format!("{}Join (tuples={})\n", pad, tuples);
                s.push_str(&left.display(indent + 1));
                s.push_str(&right.display(indent + 1));
                s
            }
        }
    }
}

/// Renders as nested `(T1 x (T2 x T3))`.
impl fmt::Display for JoinPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinPlan::Leaf(relation) => write!(f, "{}", relation.label()),
            JoinPlan::Join { left, right, .. } => write!(f, "({} x {})", left, right),
        }
    }
}

/// Structural equality: same shape over the same relation identities.
impl PartialEq for JoinPlan {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JoinPlan::Leaf(a), JoinPlan::Leaf(b)) => a.id() == b.id(),
            (
                JoinPlan::Join {
                    left: l1, right: r1, ..
                },
                JoinPlan::Join {
                    left: l2, right: r2, ..
                },
            ) => l1 == l2 && r1 == r2,
            _ => false,
        }
    }
}

impl Eq for JoinPlan {}

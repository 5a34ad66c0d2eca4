//! # Memo Table
//!
//! The memo maps a relation set to the cheapest plan found for exactly that set. It is
//! what turns the exponential recursion into dynamic programming: every subset is
//! solved once, and every later request for it is a lookup.
//!
//! Keys are [`RelationSet`] bitmasks, so two entries collide only when they cover the
//! same base relations. Plan structure or cost never participates in the key.
//!
//! A memo belongs to one [`JoinOptimizer`](crate::search::JoinOptimizer) and lives as
//! long as that optimizer's relation universe; `clear` resets it for an independent run.

use crate::plan::JoinPlan;
use crate::subset::RelationSet;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Memo {
    best: HashMap<RelationSet, Arc<JoinPlan>>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, set: RelationSet) -> Option<&Arc<JoinPlan>> {
        self.best.get(&set)
    }

    pub fn contains(&self, set: RelationSet) -> bool {
        self.best.contains_key(&set)
    }

    /// Record the winner for `set`, returning the previous entry if any.
    pub fn insert(&mut self, set: RelationSet, plan: Arc<JoinPlan>) -> Option<Arc<JoinPlan>> {
        self.best.insert(set, plan)
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    pub fn clear(&mut self) {
        self.best.clear();
    }

    /// Solved sets in ascending mask order.
    pub fn sets(&self) -> Vec<RelationSet> {
        let mut sets: Vec<_> = self.best.keys().copied().collect();
        sets.sort();
        sets
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RelationSet, &Arc<JoinPlan>)> {
        self.best.iter()
    }
}

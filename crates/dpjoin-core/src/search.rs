//! # Dynamic-Programming Join Search
//!
//! This module implements the optimal bushy join-tree search: for a set of relations,
//! find the binary join tree whose root produces the fewest estimated tuples.
//!
//! ## How It Works
//!
//! The search is top-down with memoization. For a relation set `S`:
//!
//! 1. **Memo hit**: if `S` has already been solved, return the stored plan.
//! 2. **Base cases**: a single relation is its own leaf plan; a pair has exactly one
//!    bracketing.
//! 3. **Recursive case**: for every split `(S1, S2)` produced by [`Bipartitions`],
//!    solve `S1` and `S2` recursively, join the two optima, and keep the cheapest
//!    candidate. The first candidate with the smallest tuple count wins ties, so the
//!    result depends only on the (deterministic) enumeration order.
//!
//! Each of the `2^n` subsets is solved once; solving a subset of size `k` costs
//! `O(2^k)` candidate joins, for `O(3^n)` overall. The search is meant for small `n`,
//! which is why [`SearchConfig`] caps the input size and offers a deadline.
//!
//! ## Relation Universe
//!
//! The optimizer assigns each relation it sees a bit position on first contact, in
//! ascending id order within one call. Memo keys are bitmasks over those positions, so
//! the memo stays valid across calls on the same optimizer and any subset of the
//! universe can be optimized again without recomputation. `reset` forgets the universe
//! together with the memo.
//!
//! ## Parallel Strategy
//!
//! Every subset of size `k` depends only on subsets of size `< k`. The
//! `BottomUpParallel` strategy exploits this: it solves whole layers at once with
//! rayon, reading the smaller layers from an immutable memo, then merges the layer
//! into the memo. Per subset it evaluates the same splits in the same order as the
//! top-down search, so both strategies return identical plans.

use crate::catalog::Catalog;
use crate::cost::{CostModel, DefaultCostModel};
use crate::error::{OptimizeError, Result};
use crate::memo::Memo;
use crate::plan::JoinPlan;
use crate::relation::{Relation, RelationId};
use crate::subset::{Bipartitions, EnumerationPolicy, RelationSet, MAX_RELATIONS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// How the subset lattice is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStrategy {
    /// Memoized recursion from the full set downwards, single-threaded.
    #[default]
    TopDown,
    /// Layer-by-layer by subset size; each layer is solved concurrently.
    BottomUpParallel,
}

/// Configuration knobs for the join search.
///
/// The search is exponential in the number of relations, so `max_relations` is the
/// primary safety valve. `deadline` bounds wall-clock time per `optimize` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Largest input accepted by one `optimize` call. Never more than 64.
    pub max_relations: usize,
    /// Optional wall-clock budget per `optimize` call.
    pub deadline: Option<Duration>,
    /// Which splits of each subset are considered.
    pub enumeration: EnumerationPolicy,
    pub strategy: SearchStrategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_relations: 16,
            deadline: None,
            enumeration: EnumerationPolicy::Exhaustive,
            strategy: SearchStrategy::TopDown,
        }
    }
}

impl SearchConfig {
    /// The effective input limit after applying the bitmask ceiling.
    pub fn relation_limit(&self) -> usize {
        self.max_relations.min(MAX_RELATIONS)
    }
}

/// Counters accumulated across all `optimize` calls of one optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Subsets answered straight from the memo.
    pub memo_hits: u64,
    /// Subsets solved and written to the memo.
    pub subproblems_solved: u64,
    /// Join candidates built and costed.
    pub candidates_costed: u64,
}

/// The join-order optimizer.
///
/// Owns the memo table and the relation universe it is keyed on. One optimizer can
/// serve many `optimize` calls; solved subsets are reused between them.
pub struct JoinOptimizer {
    /// Cardinality estimate used to cost every join candidate.
    pub cost_model: Arc<dyn CostModel>,
    pub config: SearchConfig,
    /// Leaf plan per universe position.
    leaves: Vec<Arc<JoinPlan>>,
    positions: HashMap<RelationId, usize>,
    memo: Memo,
    stats: SearchStats,
}

impl Default for JoinOptimizer {
    fn default() -> Self {
        Self::new(Arc::new(DefaultCostModel), SearchConfig::default())
    }
}

impl JoinOptimizer {
    pub fn new(cost_model: Arc<dyn CostModel>, config: SearchConfig) -> Self {
        Self {
            cost_model,
            config,
            leaves: Vec::new(),
            positions: HashMap::new(),
            memo: Memo::new(),
            stats: SearchStats::default(),
        }
    }

    /// Find the cheapest join plan covering exactly `relations`.
    ///
    /// Input order does not matter. All validation happens before the search starts,
    /// and a validation error leaves the memo and universe untouched. A deadline abort
    /// happens after admission: the new relations stay in the universe, and the memo
    /// keeps the entries solved so far, which remain valid optima.
    pub fn optimize(&mut self, relations: &[Arc<Relation>]) -> Result<Arc<JoinPlan>> {
        let set = self.admit(relations)?;

        debug!(
            "Starting join-order optimization: relations={}, universe={}, memo_entries={}, strategy={:?}",
            set.len(),
            self.leaves.len(),
            self.memo.len(),
            self.config.strategy
        );

        let started = Instant::now();
        let plan = match self.config.strategy {
            SearchStrategy::TopDown => self.solve(set, started)?,
            SearchStrategy::BottomUpParallel => self.solve_layered(set, started)?,
        };

        debug!(
            "Optimization complete: plan={}, tuples={}, solved={}, costed={}, memo_hits={}, elapsed={:?}",
            plan,
            plan.tuples(),
            self.stats.subproblems_solved,
            self.stats.candidates_costed,
            self.stats.memo_hits,
            started.elapsed()
        );
        Ok(plan)
    }

    /// Optimize every relation registered in `catalog`.
    pub fn optimize_catalog(&mut self, catalog: &dyn Catalog) -> Result<Arc<JoinPlan>> {
        self.optimize(&catalog.relations())
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Relations known to this optimizer, in position order.
    pub fn universe(&self) -> Vec<Arc<Relation>> {
        self.leaves
            .iter()
            .filter_map(|leaf| leaf.relation().cloned())
            .collect()
    }

    /// The memo key for `ids`, if every id is already in the universe.
    pub fn relation_set(&self, ids: &[RelationId]) -> Option<RelationSet> {
        let mut set = RelationSet::empty();
        for id in ids {
            set.insert(*self.positions.get(id)?);
        }
        Some(set)
    }

    /// Forget the memo, the universe, and the counters.
    pub fn reset(&mut self) {
        self.leaves.clear();
        self.positions.clear();
        self.memo.clear();
        self.stats = SearchStats::default();
    }

    /// Validate the input and map it onto universe positions, registering new
    /// relations. Nothing is registered unless the whole input is valid.
    fn admit(&mut self, relations: &[Arc<Relation>]) -> Result<RelationSet> {
        if relations.is_empty() {
            return Err(OptimizeError::EmptyRelationSet);
        }
        let limit = self.config.relation_limit();
        if relations.len() > limit {
            return Err(OptimizeError::TooManyRelations {
                count: relations.len(),
                limit,
            });
        }

        let mut seen = HashSet::with_capacity(relations.len());
        let mut fresh = Vec::new();
        for relation in relations {
            let id = relation.id();
            if !seen.insert(id) {
                return Err(OptimizeError::DuplicateRelation { id });
            }
            match self.positions.get(&id) {
                // Same id must mean the same relation.
                Some(&pos) => {
                    if self.leaves[pos].relation().map(|r| r.as_ref()) != Some(relation.as_ref()) {
                        return Err(OptimizeError::DuplicateRelation { id });
                    }
                }
                None => fresh.push(relation.clone()),
            }
        }

        if self.leaves.len() + fresh.len() > MAX_RELATIONS {
            return Err(OptimizeError::TooManyRelations {
                count: self.leaves.len() + fresh.len(),
                limit: MAX_RELATIONS,
            });
        }

        fresh.sort_by_key(|r| r.id());
        for relation in fresh {
            self.positions.insert(relation.id(), self.leaves.len());
            self.leaves.push(Arc::new(JoinPlan::leaf(relation)));
        }

        let mut set = RelationSet::empty();
        for relation in relations {
            if let Some(&pos) = self.positions.get(&relation.id()) {
                set.insert(pos);
            }
        }
        Ok(set)
    }

    fn check_deadline(&self, started: Instant) -> Result<()> {
        match self.config.deadline {
            Some(deadline) if started.elapsed() >= deadline => {
                debug!("Hit deadline after {:?}", started.elapsed());
                Err(OptimizeError::DeadlineExceeded { deadline })
            }
            _ => Ok(()),
        }
    }

    /// Top-down memoized search for the optimum of `set`.
    fn solve(&mut self, set: RelationSet, started: Instant) -> Result<Arc<JoinPlan>> {
        if let Some(plan) = self.memo.get(set) {
            self.stats.memo_hits += 1;
            trace!("Memo hit for {}", set);
            return Ok(plan.clone());
        }

        match set.len() {
            0 => Err(OptimizeError::EmptyRelationSet),
            1 => Ok(self.leaf_of(set)),
            2 => {
                let plan = Arc::new(join_pair(set, &self.leaves, self.cost_model.as_ref()));
                self.stats.candidates_costed += 1;
                self.record(set, plan.clone());
                Ok(plan)
            }
            _ => {
                self.check_deadline(started)?;

                let mut best: Option<Arc<JoinPlan>> = None;
                for (s1, s2) in Bipartitions::new(set, self.config.enumeration) {
                    let left = self.solve(s1, started)?;
                    let right = self.solve(s2, started)?;
                    let candidate = JoinPlan::join(left, right, self.cost_model.as_ref());
                    self.stats.candidates_costed += 1;

                    // Strict comparison keeps the first minimal candidate.
                    if best.as_ref().map_or(true, |b| candidate.tuples() < b.tuples()) {
                        trace!("  New best for {}: {} tuples={}", set, candidate, candidate.tuples());
                        best = Some(Arc::new(candidate));
                    }
                }

                let best = best.ok_or(OptimizeError::EmptyRelationSet)?;
                self.record(set, best.clone());
                Ok(best)
            }
        }
    }

    /// Bottom-up search: solve all subsets of `set` one size layer at a time.
    fn solve_layered(&mut self, set: RelationSet, started: Instant) -> Result<Arc<JoinPlan>> {
        if let Some(plan) = self.memo.get(set) {
            self.stats.memo_hits += 1;
            return Ok(plan.clone());
        }
        if set.len() == 1 {
            return Ok(self.leaf_of(set));
        }

        for size in 2..=set.len() {
            // Pairs have a single bracketing and never consult the deadline.
            if size >= 3 {
                self.check_deadline(started)?;
            }

            let pending: Vec<RelationSet> = set
                .subsets_of_size(size)
                .into_iter()
                .filter(|s| !self.memo.contains(*s))
                .collect();
            self.stats.memo_hits += (set.subsets_of_size(size).len() - pending.len()) as u64;

            let memo = &self.memo;
            let leaves = &self.leaves;
            let cost_model = self.cost_model.as_ref();
            let policy = self.config.enumeration;

            let solved: Vec<(RelationSet, Option<Arc<JoinPlan>>, u64)> = pending
                .par_iter()
                .map(|&subset| {
                    let (plan, costed) = best_split(subset, memo, leaves, cost_model, policy);
                    (subset, plan, costed)
                })
                .collect();

            trace!("Solved layer {} ({} subsets)", size, solved.len());
            for (subset, plan, costed) in solved {
                self.stats.candidates_costed += costed;
                if let Some(plan) = plan {
                    self.record(subset, plan);
                }
            }
        }

        self.memo
            .get(set)
            .cloned()
            .ok_or(OptimizeError::EmptyRelationSet)
    }

    fn leaf_of(&self, set: RelationSet) -> Arc<JoinPlan> {
        let pos = set.first().unwrap_or_default();
        self.leaves[pos].clone()
    }

    fn record(&mut self, set: RelationSet, plan: Arc<JoinPlan>) {
        self.stats.subproblems_solved += 1;
        self.memo.insert(set, plan);
    }
}

/// The only bracketing of a two-relation set: lower position on the left.
fn join_pair(set: RelationSet, leaves: &[Arc<JoinPlan>], cost_model: &dyn CostModel) -> JoinPlan {
    let mut positions = set.positions();
    let left = positions.next().unwrap_or_default();
    let right = positions.next().unwrap_or(left);
    JoinPlan::join(leaves[left].clone(), leaves[right].clone(), cost_model)
}

/// Cheapest split of `set`, reading every proper subset from `memo` (or `leaves` for
/// singletons). Returns the winner and the number of candidates costed.
fn best_split(
    set: RelationSet,
    memo: &Memo,
    leaves: &[Arc<JoinPlan>],
    cost_model: &dyn CostModel,
    policy: EnumerationPolicy,
) -> (Option<Arc<JoinPlan>>, u64) {
    if set.len() == 2 {
        return (Some(Arc::new(join_pair(set, leaves, cost_model))), 1);
    }

    let lookup = |s: RelationSet| -> Option<Arc<JoinPlan>> {
        if s.len() == 1 {
            s.first().map(|pos| leaves[pos].clone())
        } else {
            memo.get(s).cloned()
        }
    };

    let mut best: Option<Arc<JoinPlan>> = None;
    let mut costed = 0;
    for (s1, s2) in Bipartitions::new(set, policy) {
        let (Some(left), Some(right)) = (lookup(s1), lookup(s2)) else {
            continue;
        };
        let candidate = JoinPlan::join(left, right, cost_model);
        costed += 1;
        if best.as_ref().map_or(true, |b| candidate.tuples() < b.tuples()) {
            best = Some(Arc::new(candidate));
        }
    }
    (best, costed)
}

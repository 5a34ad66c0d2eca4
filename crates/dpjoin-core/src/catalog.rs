//! # Relation Catalog
//!
//! The catalog is where callers declare their base relations before asking for a join
//! order. It owns identity assignment: relations added through
//! [`InMemoryCatalog::add_relation`] receive sequential ids starting at 1, so no global
//! counter is needed and two catalogs never interfere.
//!
//! ## Trait Design
//!
//! `Catalog` is a small trait object (`dyn Catalog`) so the optimizer can pull relations
//! from any backend. `InMemoryCatalog` is the HashMap-backed implementation used by the
//! server and the tests.

use crate::error::{OptimizeError, Result};
use crate::relation::{Relation, RelationId};
use std::collections::HashMap;
use std::sync::Arc;

/// Catalog provides the base relations available for optimization.
pub trait Catalog: Send + Sync {
    /// Look a relation up by its display label.
    fn get_relation(&self, name: &str) -> Option<Arc<Relation>>;
    /// All relations, in registration order.
    fn relations(&self) -> Vec<Arc<Relation>>;
}

/// In-memory catalog keyed by relation label.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    relations: Vec<Arc<Relation>>,
    by_label: HashMap<String, usize>,
    by_id: HashMap<RelationId, usize>,
    next_id: u32,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unnamed relation; it renders as `T<id>`.
    pub fn add_relation<I, S>(&mut self, tuples: u64, attributes: I) -> Result<Arc<Relation>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = self.next_identity()?;
        self.register(Relation::new(id, tuples, attributes)?)
    }

    /// Add a relation that renders under `name`.
    pub fn add_named_relation<I, S>(
        &mut self,
        name: impl Into<String>,
        tuples: u64,
        attributes: I,
    ) -> Result<Arc<Relation>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.by_label.contains_key(&name) {
            return Err(OptimizeError::DuplicateName { name });
        }
        let id = self.next_identity()?;
        self.register(Relation::named(id, name, tuples, attributes)?)
    }

    /// Register a relation whose id was chosen by the caller.
    pub fn register(&mut self, relation: Relation) -> Result<Arc<Relation>> {
        if self.by_id.contains_key(&relation.id()) {
            return Err(OptimizeError::DuplicateRelation { id: relation.id() });
        }
        let label = relation.label();
        if self.by_label.contains_key(&label) {
            return Err(OptimizeError::DuplicateName { name: label });
        }

        self.next_id = self.next_id.max(relation.id().0);

        let relation = Arc::new(relation);
        let idx = self.relations.len();
        self.by_id.insert(relation.id(), idx);
        self.by_label.insert(label, idx);
        self.relations.push(relation.clone());
        Ok(relation)
    }

    /// Resolve a list of labels, failing on the first unknown one.
    pub fn select(&self, names: &[&str]) -> Result<Vec<Arc<Relation>>> {
        names
            .iter()
            .map(|name| {
                self.get_relation(name).ok_or_else(|| OptimizeError::UnknownRelation {
                    name: (*name).to_string(),
                })
            })
            .collect()
    }

    pub fn get_by_id(&self, id: RelationId) -> Option<Arc<Relation>> {
        self.by_id.get(&id).map(|&idx| self.relations[idx].clone())
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// The first id past the largest registered one whose `T<id>` label is not
    /// already taken by an explicit name.
    fn next_identity(&self) -> Result<RelationId> {
        let mut candidate = self.next_id;
        loop {
            candidate = candidate
                .checked_add(1)
                .ok_or(OptimizeError::IdentitiesExhausted)?;
            let id = RelationId(candidate);
            if !self.by_id.contains_key(&id) && !self.by_label.contains_key(&id.to_string()) {
                return Ok(id);
            }
        }
    }
}

impl Catalog for InMemoryCatalog {
    fn get_relation(&self, name: &str) -> Option<Arc<Relation>> {
        self.by_label.get(name).map(|&idx| self.relations[idx].clone())
    }

    fn relations(&self) -> Vec<Arc<Relation>> {
        self.relations.clone()
    }
}

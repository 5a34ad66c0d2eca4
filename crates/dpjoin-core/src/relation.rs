//! # Base Relations
//!
//! A [`Relation`] is the leaf unit of join ordering: a base table with a known tuple
//! count and a set of attribute names. Relations are immutable once built and are
//! shared as `Arc<Relation>` between the catalog, plan leaves, and the optimizer.
//!
//! ## Identity
//!
//! Each relation carries a [`RelationId`]. The optimizer treats the id as the atomic
//! unit of subset membership: two relations with the same tuple count and attributes
//! are still different relations if their ids differ. Ids are either chosen by the
//! caller (`Relation::new`) or assigned sequentially by
//! [`InMemoryCatalog`](crate::catalog::InMemoryCatalog).

use crate::error::{OptimizeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identity of a base relation. Displayed as `T<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationId(pub u32);

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// A base table: identity, tuple count, and attribute names.
///
/// Deserialization goes through the same validation as [`Relation::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRelation")]
pub struct Relation {
    id: RelationId,
    name: Option<String>,
    tuples: u64,
    /// Ordered so that rendering and iteration are deterministic.
    attributes: BTreeSet<String>,
}

impl Relation {
    /// Build a relation, rejecting a zero tuple count and repeated attribute names.
    pub fn new<I, S>(id: RelationId, tuples: u64, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(id, None, tuples, attributes)
    }

    /// Build a relation that renders under `name` instead of `T<id>`.
    pub fn named<I, S>(id: RelationId, name: impl Into<String>, tuples: u64, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::build(id, Some(name.into()), tuples, attributes)
    }

    fn build<I, S>(id: RelationId, name: Option<String>, tuples: u64, attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = name.clone().unwrap_or_else(|| id.to_string());
        if tuples == 0 {
            return Err(OptimizeError::ZeroTuples { relation: label });
        }

        let mut set = BTreeSet::new();
        for attribute in attributes {
            let attribute = attribute.into();
            if set.contains(&attribute) {
                return Err(OptimizeError::DuplicateAttribute {
                    relation: label,
                    attribute,
                });
            }
            set.insert(attribute);
        }

        Ok(Self {
            id,
            name,
            tuples,
            attributes: set,
        })
    }

    pub fn id(&self) -> RelationId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The display label: the name if one was given, `T<id>` otherwise.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }

    pub fn tuples(&self) -> u64 {
        self.tuples
    }

    pub fn attributes(&self) -> &BTreeSet<String> {
        &self.attributes
    }
}

/// Wire shape of a relation before validation. Attributes stay a list so that
/// repeated names are caught rather than merged.
#[derive(Deserialize)]
struct RawRelation {
    id: RelationId,
    #[serde(default)]
    name: Option<String>,
    tuples: u64,
    #[serde(default)]
    attributes: Vec<String>,
}

impl TryFrom<RawRelation> for Relation {
    type Error = OptimizeError;

    fn try_from(raw: RawRelation) -> Result<Self> {
        Relation::build(raw.id, raw.name, raw.tuples, raw.attributes)
    }
}

/// Renders as `T1[A, B, E]: 10`.
impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.label())?;
        for (i, attribute) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", attribute)?;
        }
        write!(f, "]: {}", self.tuples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_display() {
        let rel = Relation::new(RelationId(1), 10, ["E", "A", "B"]).unwrap();
        assert_eq!(rel.to_string(), "T1[A, B, E]: 10");
        assert_eq!(rel.label(), "T1");

        let named = Relation::named(RelationId(7), "orders", 1500, ["o_id"]).unwrap();
        assert_eq!(named.to_string(), "orders[o_id]: 1500");
    }

    #[test]
    fn test_relation_rejects_zero_tuples() {
        let err = Relation::new(RelationId(1), 0, ["A"]).unwrap_err();
        assert_eq!(err, OptimizeError::ZeroTuples { relation: "T1".into() });
    }

    #[test]
    fn test_relation_rejects_duplicate_attribute() {
        let err = Relation::named(RelationId(2), "t2", 5, ["B", "C", "B"]).unwrap_err();
        assert_eq!(
            err,
            OptimizeError::DuplicateAttribute {
                relation: "t2".into(),
                attribute: "B".into(),
            }
        );
    }

    #[test]
    fn test_relation_deserialization_validates() {
        let rel: Relation =
            serde_json::from_str(r#"{"id":3,"name":"t3","tuples":15,"attributes":["D","A","B"]}"#).unwrap();
        assert_eq!(rel, Relation::named(RelationId(3), "t3", 15, ["A", "B", "D"]).unwrap());

        let err = serde_json::from_str::<Relation>(r#"{"id":1,"name":null,"tuples":0,"attributes":["A"]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("positive tuple count"), "{err}");

        let err = serde_json::from_str::<Relation>(r#"{"id":2,"tuples":5,"attributes":["B","B"]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("attribute 'B' more than once"), "{err}");
    }

    #[test]
    fn test_relation_without_attributes() {
        let rel = Relation::new(RelationId(4), 3, Vec::<String>::new()).unwrap();
        assert!(rel.attributes().is_empty());
        assert_eq!(rel.to_string(), "T4[]: 3");
    }
}

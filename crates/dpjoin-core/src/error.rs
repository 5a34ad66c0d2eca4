//! # Optimizer Errors
//!
//! Every error the optimizer can report is raised at the API boundary, before the
//! recursive search starts. Once the input is validated the search is pure arithmetic
//! over a closed set of relations, so the only failures left are resource limits
//! (input size and wall-clock deadline).
//!
//! Errors fall into two classes, exposed through [`ErrorKind`] so that callers such as
//! the HTTP service can map them without matching every variant:
//!
//! - **InvalidArgument**: the caller supplied data the model cannot accept.
//! - **ResourceExhausted**: the input is valid but too expensive to optimize.

use crate::relation::RelationId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coarse classification of an [`OptimizeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    InvalidArgument,
    ResourceExhausted,
}

/// Errors that can occur while building relations or optimizing a join order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptimizeError {
    /// `optimize` was called with no relations.
    #[error("cannot optimize an empty set of relations")]
    EmptyRelationSet,
    /// A relation was declared with zero tuples.
    #[error("relation {relation} must have a positive tuple count")]
    ZeroTuples { relation: String },
    /// An attribute name appears twice in one relation.
    #[error("relation {relation} declares attribute '{attribute}' more than once")]
    DuplicateAttribute { relation: String, attribute: String },
    /// Two distinct relations share one identity, or a relation was passed twice.
    #[error("relation identity {id} is used more than once")]
    DuplicateRelation { id: RelationId },
    /// Two catalog relations were registered under one name.
    #[error("relation name '{name}' is already registered")]
    DuplicateName { name: String },
    /// Every relation id up to `u32::MAX` is taken.
    #[error("no relation identity is left to assign")]
    IdentitiesExhausted,
    /// A lookup referenced a relation that was never registered.
    #[error("unknown relation '{name}'")]
    UnknownRelation { name: String },
    /// The input is larger than the configured (or absolute) relation limit.
    #[error("{count} relations exceed the limit of {limit}")]
    TooManyRelations { count: usize, limit: usize },
    /// The search ran past its configured deadline.
    #[error("optimization exceeded its deadline of {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

impl OptimizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OptimizeError::EmptyRelationSet
            | OptimizeError::ZeroTuples { .. }
            | OptimizeError::DuplicateAttribute { .. }
            | OptimizeError::DuplicateRelation { .. }
            | OptimizeError::DuplicateName { .. }
            | OptimizeError::IdentitiesExhausted
            | OptimizeError::UnknownRelation { .. } => ErrorKind::InvalidArgument,
            OptimizeError::TooManyRelations { .. } | OptimizeError::DeadlineExceeded { .. } => {
                ErrorKind::ResourceExhausted
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(OptimizeError::EmptyRelationSet.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            OptimizeError::DuplicateRelation { id: RelationId(3) }.kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            OptimizeError::TooManyRelations { count: 70, limit: 64 }.kind(),
            ErrorKind::ResourceExhausted
        );
    }

    #[test]
    fn test_error_messages() {
        let err = OptimizeError::DuplicateAttribute {
            relation: "T1".into(),
            attribute: "A".into(),
        };
        assert_eq!(err.to_string(), "relation T1 declares attribute 'A' more than once");
        assert_eq!(
            OptimizeError::DuplicateRelation { id: RelationId(2) }.to_string(),
            "relation identity T2 is used more than once"
        );
    }
}

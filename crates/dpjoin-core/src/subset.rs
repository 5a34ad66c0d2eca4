//! # Relation Sets and Subset Enumeration
//!
//! The optimizer splits every relation set into two non-empty halves and solves each
//! half independently. This module provides the set representation and the lazy
//! enumeration of those splits.
//!
//! ## RelationSet
//!
//! A `RelationSet` is a 64-bit mask over positions in an optimizer's relation universe
//! (position `i` is the `i`-th relation the optimizer has seen). Membership is by
//! identity, so the mask doubles as the memo key.
//!
//! ## Bipartitions
//!
//! [`Bipartitions`] walks the sub-masks of a set in ascending numeric order using the
//! `next = (cur - set) & set` step, which visits every sub-mask exactly once without
//! touching bits outside the set. Two policies are available:
//!
//! - `Exhaustive` visits all `2^k - 2` proper non-empty sub-masks, so each unordered
//!   split appears twice, once per orientation.
//! - `Canonical` keeps only sub-masks containing the lowest member, so each unordered
//!   split appears once. The optimal cost is the same; only tie-breaks can differ.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest number of relations a single optimizer universe can address.
pub const MAX_RELATIONS: usize = u64::BITS as usize;

/// A set of relation positions, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RelationSet(u64);

impl RelationSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The set containing only position `pos`. `pos` must be below [`MAX_RELATIONS`].
    pub fn singleton(pos: usize) -> Self {
        debug_assert!(pos < MAX_RELATIONS);
        Self(1u64 << pos)
    }

    /// The set of positions `0..n`.
    pub fn full(n: usize) -> Self {
        if n >= MAX_RELATIONS {
            Self(u64::MAX)
        } else {
            Self((1u64 << n) - 1)
        }
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos < MAX_RELATIONS && self.0 & (1u64 << pos) != 0
    }

    pub fn insert(&mut self, pos: usize) {
        self.0 |= Self::singleton(pos).0;
    }

    pub fn union(&self, other: &Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Position of the lowest member.
    pub fn first(&self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Member positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = usize> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let pos = rest.trailing_zeros() as usize;
            rest &= rest - 1;
            Some(pos)
        })
    }

    /// Every subset of `self` with exactly `k` members, in ascending mask order.
    pub fn subsets_of_size(&self, k: usize) -> Vec<RelationSet> {
        let mut out = Vec::new();
        let mut sub = 0u64;
        loop {
            sub = sub.wrapping_sub(self.0) & self.0;
            if sub == 0 {
                break;
            }
            if sub.count_ones() as usize == k {
                out.push(RelationSet(sub));
            }
        }
        out
    }
}

impl fmt::Display for RelationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, pos) in self.positions().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", pos)?;
        }
        write!(f, "}}")
    }
}

/// Which splits of a set the enumerator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnumerationPolicy {
    /// Every ordered split; each bipartition is seen in both orientations.
    #[default]
    Exhaustive,
    /// One orientation per bipartition: the half holding the lowest member comes first.
    Canonical,
}

/// Lazy sequence of `(subset, complement)` splits of a relation set.
#[derive(Debug, Clone)]
pub struct Bipartitions {
    set: u64,
    current: u64,
    anchor: u64,
}

impl Bipartitions {
    pub fn new(set: RelationSet, policy: EnumerationPolicy) -> Self {
        let anchor = match policy {
            EnumerationPolicy::Exhaustive => 0,
            // Lowest set bit.
            EnumerationPolicy::Canonical => set.0 & set.0.wrapping_neg(),
        };
        Self {
            set: set.0,
            current: 0,
            anchor,
        }
    }
}

impl Iterator for Bipartitions {
    type Item = (RelationSet, RelationSet);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.current = self.current.wrapping_sub(self.set) & self.set;
            // Wrapped back to zero, or reached the full set: nothing left with a
            // non-empty complement.
            if self.current == 0 || self.current == self.set {
                self.current = self.set;
                return None;
            }
            if self.current & self.anchor != self.anchor {
                continue;
            }
            return Some((
                RelationSet(self.current),
                RelationSet(self.set & !self.current),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_relation_set_basics() {
        let mut s = RelationSet::empty();
        assert!(s.is_empty());
        s.insert(0);
        s.insert(3);
        assert_eq!(s.len(), 2);
        assert!(s.contains(3));
        assert!(!s.contains(1));
        assert!(!s.contains(200));
        assert_eq!(s.first(), Some(0));
        assert_eq!(s.positions().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(s.to_string(), "{0, 3}");
        assert!(s.is_subset(&RelationSet::full(4)));
        assert_eq!(RelationSet::full(4).difference(&s), RelationSet::from_bits(0b0110));
        assert_eq!(RelationSet::full(64).len(), 64);
    }

    #[test]
    fn test_exhaustive_enumeration_visits_every_proper_subset() {
        let set = RelationSet::full(4);
        let splits: Vec<_> = Bipartitions::new(set, EnumerationPolicy::Exhaustive).collect();
        assert_eq!(splits.len(), (1 << 4) - 2);

        let firsts: HashSet<_> = splits.iter().map(|(s, _)| s.bits()).collect();
        assert_eq!(firsts.len(), splits.len());
        for (s, c) in &splits {
            assert!(!s.is_empty() && !c.is_empty());
            assert_eq!(s.union(c), set);
            assert!(s.difference(c) == *s);
        }
        // Ascending mask order.
        assert!(splits.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_canonical_enumeration_halves_the_work() {
        let set = RelationSet::from_bits(0b1011_0100);
        let splits: Vec<_> = Bipartitions::new(set, EnumerationPolicy::Canonical).collect();
        assert_eq!(splits.len(), (1 << 3) - 1);

        let lowest = set.first().unwrap();
        let mut seen = HashSet::new();
        for (s, c) in &splits {
            assert!(s.contains(lowest));
            assert!(s.is_subset(&set) && c.is_subset(&set));
            let key = if s < c { (*s, *c) } else { (*c, *s) };
            assert!(seen.insert(key), "bipartition produced twice");
        }
    }

    #[test]
    fn test_sparse_set_stays_inside_mask() {
        let set = RelationSet::from_bits(0b1010);
        let splits: Vec<_> = Bipartitions::new(set, EnumerationPolicy::Exhaustive).collect();
        assert_eq!(
            splits,
            vec![
                (RelationSet::from_bits(0b0010), RelationSet::from_bits(0b1000)),
                (RelationSet::from_bits(0b1000), RelationSet::from_bits(0b0010)),
            ]
        );
    }

    #[test]
    fn test_trivial_sets_have_no_splits() {
        assert_eq!(Bipartitions::new(RelationSet::empty(), EnumerationPolicy::Exhaustive).count(), 0);
        assert_eq!(
            Bipartitions::new(RelationSet::singleton(5), EnumerationPolicy::Canonical).count(),
            0
        );
    }

    #[test]
    fn test_subsets_of_size() {
        let set = RelationSet::full(4);
        assert_eq!(set.subsets_of_size(2).len(), 6);
        assert_eq!(set.subsets_of_size(4), vec![set]);
        assert!(set.subsets_of_size(5).is_empty());
    }
}

//! # Cardinality Derivation
//!
//! The optimizer does not model real column statistics. Instead every attribute name
//! shared by the two inputs of a join is treated as an equi-join column that halves
//! the output:
//!
//! ```text
//! shared = |attrs(L)| + |attrs(R)| - |attrs(L) ∪ attrs(R)|
//! |L JOIN R| = floor(|L| * |R| * 0.5^shared)
//! ```
//!
//! Inputs with no attribute in common degenerate to a cross product. The result is
//! truncated toward zero, never rounded.

use std::collections::BTreeSet;

/// Number of attribute names common to both sides.
pub fn shared_attribute_count(left: &BTreeSet<String>, right: &BTreeSet<String>) -> u32 {
    // Iterate the smaller set; both are ordered so `contains` is logarithmic.
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    small.iter().filter(|a| large.contains(*a)).count() as u32
}

/// Derive the output tuple count of joining two inputs.
///
/// Evaluated exactly: the 128-bit product is shifted right once per shared attribute,
/// which is `floor(product / 2^shared)`. Results above `u64::MAX` saturate.
pub fn derive_join_cardinality(left_tuples: u64, right_tuples: u64, shared: u32) -> u64 {
    let product = left_tuples as u128 * right_tuples as u128;
    let reduced = if shared >= u128::BITS {
        0
    } else {
        product >> shared
    };
    u64::try_from(reduced).unwrap_or(u64::MAX)
}

/// Union of two attribute sets.
pub fn derive_join_attributes(left: &BTreeSet<String>, right: &BTreeSet<String>) -> BTreeSet<String> {
    left.union(right).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shared_attribute_count() {
        assert_eq!(shared_attribute_count(&attrs(&["A", "B", "E"]), &attrs(&["B", "C", "D"])), 1);
        assert_eq!(shared_attribute_count(&attrs(&["A", "B", "E"]), &attrs(&["A", "B", "D"])), 2);
        assert_eq!(shared_attribute_count(&attrs(&["A"]), &attrs(&["B"])), 0);
        assert_eq!(shared_attribute_count(&attrs(&[]), &attrs(&["B"])), 0);
    }

    #[test]
    fn test_join_cardinality_truncates() {
        assert_eq!(derive_join_cardinality(10, 20, 1), 100);
        assert_eq!(derive_join_cardinality(10, 15, 2), 37); // 37.5
        assert_eq!(derive_join_cardinality(3, 3, 3), 1); // 1.125
        assert_eq!(derive_join_cardinality(1, 1, 1), 0); // 0.5
    }

    #[test]
    fn test_cross_product_and_saturation() {
        assert_eq!(derive_join_cardinality(7, 9, 0), 63);
        assert_eq!(derive_join_cardinality(u64::MAX, u64::MAX, 0), u64::MAX);
        assert_eq!(derive_join_cardinality(u64::MAX, 2, 1), u64::MAX);
        assert_eq!(derive_join_cardinality(u64::MAX, u64::MAX, 200), 0);
    }

    #[test]
    fn test_join_attributes_union() {
        let joined = derive_join_attributes(&attrs(&["A", "B", "E"]), &attrs(&["B", "C", "D"]));
        assert_eq!(joined, attrs(&["A", "B", "C", "D", "E"]));
    }
}

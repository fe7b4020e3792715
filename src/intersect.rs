//! Candidate set intersection.
//!
//! A pure function over a list of location sets. Merging starts from the
//! smallest set and folds the rest in ascending size order; the accumulator
//! only shrinks, so it stays no larger than the next set in line. The result
//! is the same for any merge order - the ordering is an efficiency choice,
//! not a semantic one.

use std::collections::BTreeSet;

use crate::types::Location;

/// Intersect all sets, smallest first.
///
/// An empty input list yields the empty set, as does any empty member -
/// a query word whose prefix never occurred kills the whole candidate set.
pub fn intersect_all(sets: &[&BTreeSet<Location>]) -> BTreeSet<Location> {
    let Some(first) = sets.first() else {
        return BTreeSet::new();
    };
    if sets.len() == 1 {
        return (*first).clone();
    }

    let mut order: Vec<&BTreeSet<Location>> = sets.to_vec();
    order.sort_by_key(|s| s.len());

    let mut acc = order[0].clone();
    for set in &order[1..] {
        if acc.is_empty() {
            break;
        }
        acc = acc.intersection(set).copied().collect();
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BlockId;

    fn set(locs: &[(u32, u32)]) -> BTreeSet<Location> {
        locs.iter()
            .map(|(b, o)| Location::new(BlockId(*b), *o))
            .collect()
    }

    #[test]
    fn test_no_sets_yields_empty() {
        assert!(intersect_all(&[]).is_empty());
    }

    #[test]
    fn test_single_set_is_identity() {
        let a = set(&[(0, 1), (0, 2)]);
        assert_eq!(intersect_all(&[&a]), a);
    }

    #[test]
    fn test_any_empty_set_kills_the_result() {
        let a = set(&[(0, 1), (0, 2)]);
        let empty = set(&[]);
        assert!(intersect_all(&[&a, &empty]).is_empty());
    }

    #[test]
    fn test_plain_intersection() {
        let a = set(&[(0, 1), (0, 2), (1, 0)]);
        let b = set(&[(0, 2), (1, 0), (2, 5)]);
        assert_eq!(intersect_all(&[&a, &b]), set(&[(0, 2), (1, 0)]));
    }

    #[test]
    fn test_order_independent() {
        let a = set(&[(0, 1), (0, 2), (0, 3), (1, 0)]);
        let b = set(&[(0, 2), (1, 0)]);
        let c = set(&[(0, 2), (0, 3), (1, 0), (3, 3)]);
        let expected = set(&[(0, 2), (1, 0)]);
        assert_eq!(intersect_all(&[&a, &b, &c]), expected);
        assert_eq!(intersect_all(&[&c, &b, &a]), expected);
        assert_eq!(intersect_all(&[&b, &a, &c]), expected);
    }

    #[test]
    fn test_disjoint_sets() {
        let a = set(&[(0, 1)]);
        let b = set(&[(0, 2)]);
        assert!(intersect_all(&[&a, &b]).is_empty());
    }
}

//! Link-level diff: compare previous and desired membership of a
//! multi-reference property.
//!
//! Membership is a set of identifiers. Identifiers present only in the
//! previous set are removed, identifiers present only in the desired set
//! are added, and identifiers in both are left alone.

use std::collections::BTreeSet;

use weft_types::Identifier;

/// The result of comparing two membership sets. Every list is sorted
/// ascending and free of duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkDiff {
    /// `previous \ desired`: edges to delete.
    pub removed: Vec<Identifier>,
    /// `desired \ previous`: edges to insert.
    pub added: Vec<Identifier>,
    /// `previous ∩ desired`: edges already in place.
    pub unchanged: Vec<Identifier>,
}

impl LinkDiff {
    /// Returns `true` if no edge needs to change.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Number of edge mutations the diff requires.
    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len()
    }
}

/// Compute the edge changes turning `previous` into `desired`.
///
/// Duplicates in either input are ignored.
pub fn diff_links(previous: &[Identifier], desired: &[Identifier]) -> LinkDiff {
    let previous: BTreeSet<Identifier> = previous.iter().copied().collect();
    let desired: BTreeSet<Identifier> = desired.iter().copied().collect();
    LinkDiff {
        removed: previous.difference(&desired).copied().collect(),
        added: desired.difference(&previous).copied().collect(),
        unchanged: previous.intersection(&desired).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(raw: &[u64]) -> Vec<Identifier> {
        raw.iter().filter_map(|n| Identifier::new(*n)).collect()
    }

    #[test]
    fn replaces_one_member() {
        let diff = diff_links(&ids(&[3, 5, 9]), &ids(&[5, 9, 12]));
        assert_eq!(diff.removed, ids(&[3]));
        assert_eq!(diff.added, ids(&[12]));
        assert_eq!(diff.unchanged, ids(&[5, 9]));
        assert_eq!(diff.len(), 2);
    }

    #[test]
    fn identical_sets_need_nothing() {
        let diff = diff_links(&ids(&[9, 1, 4]), &ids(&[1, 4, 9]));
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, ids(&[1, 4, 9]));
    }

    #[test]
    fn new_owner_inserts_everything() {
        let diff = diff_links(&[], &ids(&[2, 2, 7]));
        assert_eq!(diff.added, ids(&[2, 7]));
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn clearing_deletes_everything() {
        let diff = diff_links(&ids(&[2, 7]), &[]);
        assert_eq!(diff.removed, ids(&[2, 7]));
        assert!(diff.added.is_empty());
    }

    proptest! {
        #[test]
        fn applying_the_diff_yields_the_desired_set(
            previous in proptest::collection::vec(1u64..40, 0..20),
            desired in proptest::collection::vec(1u64..40, 0..20),
        ) {
            let previous = ids(&previous);
            let desired = ids(&desired);
            let diff = diff_links(&previous, &desired);

            let p: BTreeSet<_> = previous.iter().copied().collect();
            let d: BTreeSet<_> = desired.iter().copied().collect();
            let expected_removed: Vec<_> = p.difference(&d).copied().collect();
            let expected_added: Vec<_> = d.difference(&p).copied().collect();
            prop_assert_eq!(&diff.removed, &expected_removed);
            prop_assert_eq!(&diff.added, &expected_added);

            let mut stored = p.clone();
            for id in &diff.removed {
                stored.remove(id);
            }
            for id in &diff.added {
                stored.insert(*id);
            }
            prop_assert_eq!(&stored, &d);

            // A second pass against the reconciled state changes nothing.
            let stored: Vec<_> = stored.into_iter().collect();
            prop_assert!(diff_links(&stored, &desired).is_empty());
        }
    }
}

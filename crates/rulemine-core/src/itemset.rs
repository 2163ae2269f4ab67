//! Itemsets and their supports.

use crate::error::{ItemsetParseError, RuleMineError};
use crate::schema::Schema;
use crate::types::FeatureId;
use serde::{Deserialize, Serialize};

/// An unordered set of distinct features, stored sorted by feature id.
///
/// Never empty and never holds duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<FeatureId>")]
pub struct Itemset(Vec<FeatureId>);

impl Itemset {
    /// Build from any ids; sorts and removes duplicates. `None` if empty.
    pub fn new(mut ids: Vec<FeatureId>) -> Option<Self> {
        if ids.is_empty() {
            return None;
        }
        ids.sort_unstable();
        ids.dedup();
        Some(Self(ids))
    }

    pub fn single(id: FeatureId) -> Self {
        Self(vec![id])
    }

    /// Build from ids already sorted and unique (checked in debug builds).
    pub(crate) fn from_sorted(ids: Vec<FeatureId>) -> Self {
        debug_assert!(!ids.is_empty());
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        Self(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[FeatureId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.0.binary_search(&id).is_ok()
    }

    /// Whether every item of `self` is in `other`.
    pub fn is_subset_of(&self, other: &Itemset) -> bool {
        if self.len() > other.len() {
            return false;
        }
        let mut theirs = other.0.iter();
        'outer: for mine in &self.0 {
            for t in theirs.by_ref() {
                if t == mine {
                    continue 'outer;
                }
                if t > mine {
                    return false;
                }
            }
            return false;
        }
        true
    }

    pub fn is_proper_subset_of(&self, other: &Itemset) -> bool {
        self.len() < other.len() && self.is_subset_of(other)
    }

    /// Join two itemsets of equal length that share all but their last item
    /// (the Apriori prefix join). Returns `None` when they don't share the
    /// prefix or aren't in ascending last-item order.
    pub fn prefix_join(&self, other: &Itemset) -> Option<Itemset> {
        let k = self.len();
        if k != other.len() || k == 0 {
            return None;
        }
        if self.0[..k - 1] != other.0[..k - 1] || self.0[k - 1] >= other.0[k - 1] {
            return None;
        }
        let mut joined = self.0.clone();
        joined.push(other.0[k - 1]);
        Some(Self(joined))
    }

    /// All subsets of size `len - 1`. Empty for a single-item set.
    pub fn drop_one_subsets(&self) -> Vec<Itemset> {
        if self.len() < 2 {
            return Vec::new();
        }
        (0..self.len())
            .map(|skip| {
                let ids = self
                    .0
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, &id)| id)
                    .collect();
                Self::from_sorted(ids)
            })
            .collect()
    }

    /// Split into the items selected by `mask` and the rest. Bit `i` of
    /// `mask` selects the `i`-th smallest item. Either side may be empty.
    pub fn split_by_mask(&self, mask: u64) -> (Vec<FeatureId>, Vec<FeatureId>) {
        let mut selected = Vec::new();
        let mut rest = Vec::new();
        for (i, &id) in self.0.iter().enumerate() {
            if mask & (1u64 << i) != 0 {
                selected.push(id);
            } else {
                rest.push(id);
            }
        }
        (selected, rest)
    }

    /// Feature names, in id order.
    pub fn names<'a>(&self, schema: &'a Schema) -> Vec<&'a str> {
        self.0.iter().map(|&id| schema.name(id)).collect()
    }
}

/// Persisted itemsets must already be non-empty and strictly ascending.
impl TryFrom<Vec<FeatureId>> for Itemset {
    type Error = RuleMineError;

    fn try_from(ids: Vec<FeatureId>) -> Result<Self, Self::Error> {
        if ids.is_empty() {
            return Err(ItemsetParseError::EmptySet.into());
        }
        if ids.windows(2).any(|w| w[0] >= w[1]) {
            let listed: Vec<String> = ids.iter().map(|id| id.0.to_string()).collect();
            return Err(ItemsetParseError::UnorderedIds(listed.join(",")).into());
        }
        Ok(Self(ids))
    }
}

/// An itemset tagged with its support in the mined table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentItemset {
    pub items: Itemset,
    /// Number of transactions containing every item.
    pub count: usize,
    /// `count / total transactions`.
    pub support: f64,
}

impl FrequentItemset {
    pub fn new(items: Itemset, count: usize, total: usize) -> Self {
        let support = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        };
        Self {
            items,
            count,
            support,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[u32]) -> Itemset {
        Itemset::new(ids.iter().map(|&i| FeatureId(i)).collect()).unwrap()
    }

    #[test]
    fn new_sorts_and_dedups() {
        assert_eq!(set(&[3, 1, 3, 2]).ids(), &[FeatureId(1), FeatureId(2), FeatureId(3)]);
        assert!(Itemset::new(Vec::new()).is_none());
    }

    #[test]
    fn subset_checks() {
        assert!(set(&[1, 3]).is_subset_of(&set(&[1, 2, 3])));
        assert!(set(&[1, 3]).is_proper_subset_of(&set(&[1, 2, 3])));
        assert!(!set(&[1, 4]).is_subset_of(&set(&[1, 2, 3])));
        assert!(set(&[2]).is_subset_of(&set(&[2])));
        assert!(!set(&[2]).is_proper_subset_of(&set(&[2])));
        assert!(!set(&[0]).is_subset_of(&set(&[1, 2])));
    }

    #[test]
    fn prefix_join_requires_shared_prefix() {
        assert_eq!(set(&[1, 2]).prefix_join(&set(&[1, 4])), Some(set(&[1, 2, 4])));
        assert_eq!(set(&[1, 4]).prefix_join(&set(&[1, 2])), None);
        assert_eq!(set(&[1, 2]).prefix_join(&set(&[3, 4])), None);
        assert_eq!(set(&[1]).prefix_join(&set(&[5])), Some(set(&[1, 5])));
    }

    #[test]
    fn drop_one_subsets_of_triple() {
        let subsets = set(&[1, 2, 3]).drop_one_subsets();
        assert_eq!(subsets, vec![set(&[2, 3]), set(&[1, 3]), set(&[1, 2])]);
        assert!(set(&[7]).drop_one_subsets().is_empty());
    }

    #[test]
    fn deserialize_enforces_the_invariant() {
        let back: Itemset = serde_json::from_str("[0,2,5]").unwrap();
        assert_eq!(back, set(&[0, 2, 5]));
        assert_eq!(serde_json::to_string(&back).unwrap(), "[0,2,5]");

        for bad in ["[]", "[2,0]", "[1,1]", "[0,3,3]"] {
            assert!(serde_json::from_str::<Itemset>(bad).is_err(), "{} accepted", bad);
        }
        let frequent: std::result::Result<FrequentItemset, _> =
            serde_json::from_str(r#"{"items":[3,1],"count":2,"support":0.5}"#);
        assert!(frequent.is_err());
    }

    #[test]
    fn split_by_mask_partitions() {
        let (a, b) = set(&[4, 5, 6]).split_by_mask(0b101);
        assert_eq!(a, vec![FeatureId(4), FeatureId(6)]);
        assert_eq!(b, vec![FeatureId(5)]);
    }
}

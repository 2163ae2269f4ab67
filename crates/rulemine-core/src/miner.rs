//! The itemset-mining capability.
//!
//! Exhaustive and maximal-only mining are two implementations of one trait,
//! selected by configuration. Both hand back a [`MiningOutput`] so the rule
//! generator doesn't care which strategy ran.

use crate::error::Result;
use crate::itemset::FrequentItemset;
use crate::table::FeatureTable;
use crate::types::MiningMode;

/// What an itemset collection guarantees about subset supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemsetKind {
    /// Every frequent itemset is present: any subset support can be looked up.
    Frequent,
    /// Only maximal frequent itemsets: subset supports are unknown.
    Maximal,
}

/// Itemsets found in one mining pass.
#[derive(Debug, Clone)]
pub struct MiningOutput {
    pub kind: ItemsetKind,
    pub itemsets: Vec<FrequentItemset>,
    /// Number of transactions in the mined table.
    pub transactions: usize,
    pub min_support: f64,
}

impl MiningOutput {
    pub fn empty(kind: ItemsetKind, transactions: usize, min_support: f64) -> Self {
        Self {
            kind,
            itemsets: Vec::new(),
            transactions,
            min_support,
        }
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    /// Largest itemset size found, 0 when empty.
    pub fn max_len(&self) -> usize {
        self.itemsets.iter().map(|f| f.items.len()).max().unwrap_or(0)
    }
}

/// A strategy that finds itemsets meeting a minimum support.
pub trait ItemsetMiner: Send + Sync {
    /// The mode this miner implements.
    fn mode(&self) -> MiningMode;

    /// Mine `table` for itemsets with relative support `>= min_support`.
    ///
    /// An unreachable threshold yields an empty output, not an error.
    fn mine(&self, table: &FeatureTable, min_support: f64) -> Result<MiningOutput>;
}

/// Smallest absolute count `c` with `c / transactions >= min_support`.
///
/// The fraction is compared exactly as it is later reported, so an itemset
/// is frequent iff its relative support meets the threshold. Returns
/// `transactions + 1` when no count can qualify, and at least 1.
pub fn min_count(min_support: f64, transactions: usize) -> usize {
    if transactions == 0 {
        return 1;
    }
    let n = transactions as f64;
    let meets = |count: usize| count as f64 / n >= min_support;
    let mut count = ((min_support * n).ceil().max(1.0) as usize).min(transactions + 1);
    while count > 1 && meets(count - 1) {
        count -= 1;
    }
    while count <= transactions && !meets(count) {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_count_rounds_up() {
        assert_eq!(min_count(0.5, 4), 2);
        assert_eq!(min_count(0.3, 10), 3);
        assert_eq!(min_count(0.1, 7), 1);
        assert_eq!(min_count(0.26, 4), 2);
        assert_eq!(min_count(1.0, 5), 5);
    }

    #[test]
    fn min_count_matches_the_reported_fraction() {
        // 3/10 is just below this threshold and must not qualify
        let s = 0.3000000000005;
        assert!(3.0 / 10.0 < s);
        assert_eq!(min_count(s, 10), 4);

        for n in 1..=50usize {
            for step in 1..=20 {
                let s = step as f64 * 0.05;
                let c = min_count(s, n);
                if c <= n {
                    assert!(c as f64 / n as f64 >= s, "{}/{} below {}", c, n, s);
                }
                if c > 1 {
                    assert!(((c - 1) as f64 / n as f64) < s, "{}/{} also meets {}", c - 1, n, s);
                }
            }
        }
    }
}

//! Apriori: exhaustive level-wise frequent-itemset mining.
//!
//! Level k candidates come only from joining frequent (k-1)-itemsets that
//! share a (k-2)-prefix, and a candidate survives only if every one of its
//! (k-1)-subsets was frequent (downward closure). Support is counted by
//! AND-ing the parent's cover with the column of the joined item.
//!
//! Reference: Agrawal & Srikant (1994) "Fast algorithms for mining association rules"

use rulemine_core::error::{Result, RuleMineError};
use rulemine_core::itemset::{FrequentItemset, Itemset};
use rulemine_core::miner::{min_count, ItemsetKind, ItemsetMiner, MiningOutput};
use rulemine_core::table::{BitColumn, FeatureTable};
use rulemine_core::types::MiningMode;
use std::collections::HashSet;
use tracing::{debug, info};

/// Exhaustive miner producing every frequent itemset.
#[derive(Debug, Clone, Default)]
pub struct AprioriMiner {
    /// Stop after itemsets of this size.
    max_len: Option<usize>,
}

/// A frequent itemset of the current level, with the transactions it covers.
struct LevelEntry {
    items: Itemset,
    cover: BitColumn,
    count: usize,
}

/// Per-level candidate bookkeeping, reported through tracing.
#[derive(Debug, Default, Clone, Copy)]
struct LevelStats {
    joined: usize,
    pruned: usize,
    frequent: usize,
}

impl AprioriMiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }

    /// Frequent 1-itemsets by direct counting.
    fn first_level(table: &FeatureTable, threshold: usize) -> Vec<LevelEntry> {
        table
            .schema()
            .ids()
            .filter_map(|id| {
                let cover = table.column(id).clone();
                let count = cover.count_ones();
                (count >= threshold).then(|| LevelEntry {
                    items: Itemset::single(id),
                    cover,
                    count,
                })
            })
            .collect()
    }

    /// Build level k+1 from level k. `level` must be sorted by itemset.
    fn next_level(
        table: &FeatureTable,
        level: &[LevelEntry],
        threshold: usize,
    ) -> (Vec<LevelEntry>, LevelStats) {
        let previous: HashSet<&Itemset> = level.iter().map(|e| &e.items).collect();
        let mut stats = LevelStats::default();
        let mut next = Vec::new();

        for (i, left) in level.iter().enumerate() {
            for right in &level[i + 1..] {
                // Sorted order keeps entries sharing a prefix contiguous, so
                // the first failed join ends the run for `left`.
                let Some(candidate) = left.items.prefix_join(&right.items) else {
                    break;
                };
                stats.joined += 1;

                if !candidate
                    .drop_one_subsets()
                    .iter()
                    .all(|subset| previous.contains(subset))
                {
                    stats.pruned += 1;
                    continue;
                }

                let Some(&last) = candidate.ids().last() else {
                    continue;
                };
                let count = left.cover.and_count(table.column(last));
                if count >= threshold {
                    let mut cover = left.cover.clone();
                    cover.and_assign(table.column(last));
                    next.push(LevelEntry {
                        items: candidate,
                        cover,
                        count,
                    });
                }
            }
        }

        next.sort_by(|a, b| a.items.cmp(&b.items));
        stats.frequent = next.len();
        (next, stats)
    }
}

impl ItemsetMiner for AprioriMiner {
    fn mode(&self) -> MiningMode {
        MiningMode::Exhaustive
    }

    fn mine(&self, table: &FeatureTable, min_support: f64) -> Result<MiningOutput> {
        validate_min_support(min_support)?;
        let transactions = table.num_rows();
        if transactions == 0 || table.num_features() == 0 || self.max_len == Some(0) {
            return Ok(MiningOutput::empty(ItemsetKind::Frequent, transactions, min_support));
        }

        let threshold = min_count(min_support, transactions);
        let mut level = Self::first_level(table, threshold);
        level.sort_by(|a, b| a.items.cmp(&b.items));
        debug!(k = 1, frequent = level.len(), threshold, "apriori level complete");

        let mut itemsets = Vec::new();
        let mut k = 1;
        while !level.is_empty() {
            itemsets.extend(
                level
                    .iter()
                    .map(|e| FrequentItemset::new(e.items.clone(), e.count, transactions)),
            );
            if self.max_len.is_some_and(|max| k >= max) {
                break;
            }

            let (next, stats) = Self::next_level(table, &level, threshold);
            k += 1;
            debug!(
                k,
                joined = stats.joined,
                pruned = stats.pruned,
                frequent = stats.frequent,
                "apriori level complete"
            );
            level = next;
        }

        info!(
            itemsets = itemsets.len(),
            levels = k,
            transactions,
            min_support,
            "apriori finished"
        );
        Ok(MiningOutput {
            kind: ItemsetKind::Frequent,
            itemsets,
            transactions,
            min_support,
        })
    }
}

pub(crate) fn validate_min_support(min_support: f64) -> Result<()> {
    if !(min_support > 0.0 && min_support <= 1.0) {
        return Err(RuleMineError::out_of_range("min_support", "(0, 1]", min_support));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::types::NamespacePrefixes;

    fn scenario() -> FeatureTable {
        FeatureTable::from_transactions(
            &["inf_a1", "inf_a2", "usr_b1"],
            &[
                vec!["inf_a1", "inf_a2", "usr_b1"],
                vec!["inf_a1", "usr_b1"],
                vec!["inf_a2", "usr_b1"],
                vec!["inf_a1", "inf_a2"],
            ],
            &NamespacePrefixes::default(),
        )
        .unwrap()
    }

    fn names(table: &FeatureTable, f: &FrequentItemset) -> Vec<String> {
        f.items
            .names(table.schema())
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn half_support_excludes_the_triple() {
        let table = scenario();
        let out = AprioriMiner::new().mine(&table, 0.5).unwrap();
        assert_eq!(out.kind, ItemsetKind::Frequent);
        // 3 singletons + 3 pairs, each with support >= 2/4
        assert_eq!(out.len(), 6);
        let pair = out
            .itemsets
            .iter()
            .find(|f| names(&table, f) == ["inf_a1", "usr_b1"])
            .unwrap();
        assert_eq!(pair.count, 2);
        assert!((pair.support - 0.5).abs() < 1e-12);
        assert!(out.itemsets.iter().all(|f| f.items.len() < 3));
    }

    #[test]
    fn low_support_includes_the_triple() {
        let table = scenario();
        let out = AprioriMiner::new().mine(&table, 0.25).unwrap();
        let triple = out.itemsets.iter().find(|f| f.items.len() == 3).unwrap();
        assert_eq!(triple.count, 1);
        assert!((triple.support - 0.25).abs() < 1e-12);
    }

    #[test]
    fn unreachable_threshold_is_empty_not_error() {
        let table = FeatureTable::from_transactions(
            &["inf_a", "usr_b"],
            &[vec!["inf_a"], vec!["usr_b"], vec![]],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        let out = AprioriMiner::new().mine(&table, 0.9).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn max_len_caps_levels() {
        let table = scenario();
        let out = AprioriMiner::new()
            .with_max_len(Some(1))
            .mine(&table, 0.25)
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.max_len(), 1);
    }

    #[test]
    fn rejects_out_of_range_support() {
        let table = scenario();
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            let err = AprioriMiner::new().mine(&table, bad).unwrap_err();
            assert!(err.is_config(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn empty_table_yields_nothing() {
        let table = FeatureTable::from_transactions(
            &["inf_a"],
            &[],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        assert!(AprioriMiner::new().mine(&table, 0.1).unwrap().is_empty());
    }

    #[test]
    fn single_column_yields_at_most_the_singleton() {
        let table = FeatureTable::from_transactions(
            &["inf_a"],
            &[vec!["inf_a"], vec!["inf_a"], vec![]],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        let out = AprioriMiner::new().mine(&table, 0.5).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(names(&table, &out.itemsets[0]), ["inf_a"]);
        assert_eq!(out.itemsets[0].count, 2);

        assert!(AprioriMiner::new().mine(&table, 0.9).unwrap().is_empty());
    }
}

//! FP-Max: maximal frequent itemsets from a compressed prefix tree.
//!
//! Transactions are inserted into an FP-tree with their frequent items in
//! descending global frequency. Each item is then mined from its conditional
//! pattern base, least frequent first. A branch is abandoned as soon as
//! `head ∪ tail` is already covered by a maximal itemset found earlier, so
//! the full frequent lattice is never materialized.
//!
//! Reference: Grahne & Zhu (2003) "Efficiently using prefix-trees in mining
//! frequent itemsets"

use crate::apriori::validate_min_support;
use rulemine_core::error::Result;
use rulemine_core::itemset::{FrequentItemset, Itemset};
use rulemine_core::miner::{min_count, ItemsetKind, ItemsetMiner, MiningOutput};
use rulemine_core::table::{BitColumn, FeatureTable};
use rulemine_core::types::{FeatureId, MiningMode};
use std::cmp::Reverse;
use tracing::{debug, info};

const ROOT: usize = 0;

/// Maximal-only miner.
#[derive(Debug, Clone, Default)]
pub struct FpMaxMiner {
    /// Bound on itemset size. Itemsets are then maximal among those no
    /// longer than the bound.
    max_len: Option<usize>,
}

impl FpMaxMiner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }
}

#[derive(Debug)]
struct Node {
    /// Item rank; `usize::MAX` for the root.
    item: usize,
    count: usize,
    parent: usize,
    children: Vec<usize>,
}

/// Arena-backed prefix tree. Items are ranks: 0 is the most frequent item.
#[derive(Debug)]
struct FpTree {
    nodes: Vec<Node>,
    /// Node list per rank.
    header: Vec<Vec<usize>>,
}

impl FpTree {
    fn new(ranks: usize) -> Self {
        Self {
            nodes: vec![Node {
                item: usize::MAX,
                count: 0,
                parent: ROOT,
                children: Vec::new(),
            }],
            header: vec![Vec::new(); ranks],
        }
    }

    /// Insert a path of ascending ranks carrying `count` transactions.
    fn insert(&mut self, path: &[usize], count: usize) {
        let mut at = ROOT;
        for &item in path {
            let existing = self.nodes[at]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].item == item);
            at = match existing {
                Some(child) => {
                    self.nodes[child].count += count;
                    child
                }
                None => {
                    let id = self.nodes.len();
                    self.nodes.push(Node {
                        item,
                        count,
                        parent: at,
                        children: Vec::new(),
                    });
                    self.nodes[at].children.push(id);
                    self.header[item].push(id);
                    id
                }
            };
        }
    }

    /// The tree's only branch, if it has no fork.
    fn single_path(&self) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut at = ROOT;
        loop {
            match self.nodes[at].children.as_slice() {
                [] => return Some(path),
                [only] => {
                    path.push(self.nodes[*only].item);
                    at = *only;
                }
                _ => return None,
            }
        }
    }

    /// Ranks present in the tree, least frequent first.
    fn items_by_ascending_frequency(&self) -> Vec<usize> {
        (0..self.header.len())
            .rev()
            .filter(|&rank| !self.header[rank].is_empty())
            .collect()
    }

    /// Conditional pattern base of `item`: each prefix path (ascending
    /// ranks) with the count of the node it leads to.
    fn prefix_paths(&self, item: usize) -> Vec<(Vec<usize>, usize)> {
        self.header[item]
            .iter()
            .map(|&node| {
                let mut path = Vec::new();
                let mut at = self.nodes[node].parent;
                while at != ROOT {
                    path.push(self.nodes[at].item);
                    at = self.nodes[at].parent;
                }
                path.reverse();
                (path, self.nodes[node].count)
            })
            .collect()
    }
}

/// Recursive search state. Candidate maximal sets are bit sets over ranks.
struct MaximalSearch {
    threshold: usize,
    ranks: usize,
    max_len: Option<usize>,
    found: Vec<BitColumn>,
    pruned: usize,
}

impl MaximalSearch {
    fn rank_set(&self, ranks: &[usize]) -> BitColumn {
        let mut set = BitColumn::zeros(self.ranks);
        for &r in ranks {
            set.set(r);
        }
        set
    }

    fn is_subsumed(&self, set: &BitColumn) -> bool {
        let n = set.count_ones();
        self.found.iter().any(|m| m.and_count(set) == n)
    }

    fn record(&mut self, ranks: &[usize]) {
        if ranks.is_empty() {
            return;
        }
        let set = self.rank_set(ranks);
        if !self.is_subsumed(&set) {
            self.found.push(set);
        }
    }

    /// `head ∪ path` is frequent; with a length bound, every bounded
    /// extension of `head` along the path is a candidate instead.
    fn record_path(&mut self, head: &[usize], path: &[usize]) {
        match self.max_len {
            Some(max) if head.len() + path.len() > max => {
                for combo in combinations(path, max - head.len()) {
                    let mut set = head.to_vec();
                    set.extend(combo);
                    self.record(&set);
                }
            }
            _ => {
                let mut set = head.to_vec();
                set.extend_from_slice(path);
                self.record(&set);
            }
        }
    }

    fn search(&mut self, tree: &FpTree, head: &[usize]) {
        if let Some(path) = tree.single_path() {
            self.record_path(head, &path);
            return;
        }

        for item in tree.items_by_ascending_frequency() {
            let mut next_head = head.to_vec();
            next_head.push(item);

            let paths = tree.prefix_paths(item);
            let mut counts = vec![0usize; self.ranks];
            for (path, count) in &paths {
                for &r in path {
                    counts[r] += count;
                }
            }
            let tail: Vec<usize> = (0..self.ranks)
                .filter(|&r| counts[r] >= self.threshold)
                .collect();

            let mut union = next_head.clone();
            union.extend_from_slice(&tail);
            if self.is_subsumed(&self.rank_set(&union)) {
                self.pruned += 1;
                continue;
            }

            let at_bound = self.max_len.is_some_and(|max| next_head.len() >= max);
            if tail.is_empty() || at_bound {
                self.record(&next_head);
                continue;
            }

            let mut conditional = FpTree::new(self.ranks);
            for (path, count) in paths {
                let kept: Vec<usize> = path
                    .into_iter()
                    .filter(|&r| counts[r] >= self.threshold)
                    .collect();
                if !kept.is_empty() {
                    conditional.insert(&kept, count);
                }
            }
            self.search(&conditional, &next_head);
        }
    }

    /// Drop any set that is a proper subset of another.
    fn into_maximal(self) -> Vec<BitColumn> {
        let sizes: Vec<usize> = self.found.iter().map(BitColumn::count_ones).collect();
        self.found
            .iter()
            .enumerate()
            .filter(|&(i, set)| {
                !self
                    .found
                    .iter()
                    .enumerate()
                    .any(|(j, other)| sizes[j] > sizes[i] && other.and_count(set) == sizes[i])
            })
            .map(|(_, set)| set.clone())
            .collect()
    }
}

/// All `k`-element subsets of `items`, preserving order.
fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    if items.len() < k {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        for mut rest in combinations(&items[i + 1..], k - 1) {
            rest.insert(0, first);
            out.push(rest);
        }
    }
    out
}

impl ItemsetMiner for FpMaxMiner {
    fn mode(&self) -> MiningMode {
        MiningMode::MaximalOnly
    }

    fn mine(&self, table: &FeatureTable, min_support: f64) -> Result<MiningOutput> {
        validate_min_support(min_support)?;
        let transactions = table.num_rows();
        if transactions == 0 || table.num_features() == 0 || self.max_len == Some(0) {
            return Ok(MiningOutput::empty(ItemsetKind::Maximal, transactions, min_support));
        }
        let threshold = min_count(min_support, transactions);

        // Frequent items by descending count, ties by feature id.
        let mut order: Vec<(FeatureId, usize)> = table
            .schema()
            .ids()
            .map(|id| (id, table.column(id).count_ones()))
            .filter(|&(_, count)| count >= threshold)
            .collect();
        order.sort_by_key(|&(id, count)| (Reverse(count), id));
        let order: Vec<FeatureId> = order.into_iter().map(|(id, _)| id).collect();
        if order.is_empty() {
            info!(transactions, min_support, "fpmax found no frequent items");
            return Ok(MiningOutput::empty(ItemsetKind::Maximal, transactions, min_support));
        }

        let mut tree = FpTree::new(order.len());
        for row in 0..transactions {
            let path: Vec<usize> = order
                .iter()
                .enumerate()
                .filter(|&(_, &id)| table.value(row, id))
                .map(|(rank, _)| rank)
                .collect();
            if !path.is_empty() {
                tree.insert(&path, 1);
            }
        }
        debug!(
            frequent_items = order.len(),
            nodes = tree.nodes.len(),
            threshold,
            "fp-tree built"
        );

        let mut search = MaximalSearch {
            threshold,
            ranks: order.len(),
            max_len: self.max_len,
            found: Vec::new(),
            pruned: 0,
        };
        search.search(&tree, &[]);
        let pruned = search.pruned;

        let mut itemsets: Vec<FrequentItemset> = search
            .into_maximal()
            .into_iter()
            .filter_map(|set| Itemset::new(set.iter_ones().map(|rank| order[rank]).collect()))
            .map(|items| {
                let count = table.support_count(items.ids());
                FrequentItemset::new(items, count, transactions)
            })
            .collect();
        itemsets.sort_by(|a, b| a.items.cmp(&b.items));

        info!(
            itemsets = itemsets.len(),
            pruned_branches = pruned,
            transactions,
            min_support,
            "fpmax finished"
        );
        Ok(MiningOutput {
            kind: ItemsetKind::Maximal,
            itemsets,
            transactions,
            min_support,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apriori::AprioriMiner;
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

    #[test]
    fn pairs_are_maximal_at_half_support() {
        let out = FpMaxMiner::new().mine(&scenario(), 0.5).unwrap();
        assert_eq!(out.kind, ItemsetKind::Maximal);
        assert_eq!(out.len(), 3);
        assert!(out.itemsets.iter().all(|f| f.items.len() == 2 && f.count == 2));
    }

    #[test]
    fn triple_subsumes_everything_at_quarter_support() {
        let out = FpMaxMiner::new().mine(&scenario(), 0.25).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.itemsets[0].items.len(), 3);
        assert_eq!(out.itemsets[0].count, 1);
    }

    #[test]
    fn max_len_bounds_maximality() {
        let out = FpMaxMiner::new()
            .with_max_len(Some(1))
            .mine(&scenario(), 0.25)
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.max_len(), 1);

        let out = FpMaxMiner::new()
            .with_max_len(Some(2))
            .mine(&scenario(), 0.25)
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.itemsets.iter().all(|f| f.items.len() == 2));
    }

    #[test]
    fn agrees_with_apriori_on_maximal_sets() {
        let table = FeatureTable::from_transactions(
            &["inf_a", "inf_b", "inf_c", "usr_x", "usr_y"],
            &[
                vec!["inf_a", "inf_b", "usr_x"],
                vec!["inf_a", "inf_b", "usr_x", "usr_y"],
                vec!["inf_a", "inf_c", "usr_y"],
                vec!["inf_b", "inf_c", "usr_x"],
                vec!["inf_a", "inf_b", "inf_c", "usr_x"],
                vec!["usr_y"],
            ],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        let frequent = AprioriMiner::new().mine(&table, 0.3).unwrap();
        let mut expected: Vec<&Itemset> = frequent
            .itemsets
            .iter()
            .map(|f| &f.items)
            .filter(|items| {
                !frequent
                    .itemsets
                    .iter()
                    .any(|other| items.is_proper_subset_of(&other.items))
            })
            .collect();
        expected.sort();

        let maximal = FpMaxMiner::new().mine(&table, 0.3).unwrap();
        let found: Vec<&Itemset> = maximal.itemsets.iter().map(|f| &f.items).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn unreachable_threshold_is_empty() {
        let out = FpMaxMiner::new().mine(&scenario(), 1.0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn empty_table_yields_nothing() {
        let table =
            FeatureTable::from_transactions(&["inf_a", "usr_b"], &[], &NamespacePrefixes::default())
                .unwrap();
        let out = FpMaxMiner::new().mine(&table, 0.1).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.transactions, 0);
    }

    #[test]
    fn single_column_yields_at_most_the_singleton() {
        let table = FeatureTable::from_transactions(
            &["inf_a"],
            &[vec!["inf_a"], vec!["inf_a"], vec![]],
            &NamespacePrefixes::default(),
        )
        .unwrap();
        let out = FpMaxMiner::new().mine(&table, 0.5).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.itemsets[0].items.names(table.schema()), ["inf_a"]);
        assert_eq!(out.itemsets[0].count, 2);

        assert!(FpMaxMiner::new().mine(&table, 0.9).unwrap().is_empty());
    }

    #[test]
    fn combinations_enumerate_k_subsets() {
        assert_eq!(combinations(&[1, 2, 3], 2), vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
        assert_eq!(combinations(&[1], 2), Vec::<Vec<usize>>::new());
    }
}

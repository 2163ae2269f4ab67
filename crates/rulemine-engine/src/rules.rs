//! Rule generation: every antecedent/consequent split of every itemset.
//!
//! With the full frequent lattice every subset support is known, so
//! confidence and the auxiliary metrics are exact. With maximal itemsets
//! only the union's own support is known; rules then carry support alone
//! and the confidence threshold cannot be applied.

use rulemine_core::error::{Result, RuleMineError};
use rulemine_core::itemset::{FrequentItemset, Itemset};
use rulemine_core::miner::{ItemsetKind, MiningOutput};
use rulemine_core::rule::{AssociationRule, RuleMetrics};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Splits are enumerated as bitmasks, one bit per item.
pub const MAX_RULE_ITEMS: usize = 63;

/// Rules from one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GeneratedRules {
    pub rules: Vec<AssociationRule>,
    /// Antecedent/consequent splits examined before any threshold.
    pub candidates_considered: usize,
}

/// Expands itemsets into rules meeting a minimum confidence.
#[derive(Debug, Clone)]
pub struct RuleGenerator {
    min_confidence: f64,
}

impl RuleGenerator {
    pub fn new(min_confidence: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(RuleMineError::out_of_range(
                "min_confidence",
                "[0, 1]",
                min_confidence,
            ));
        }
        Ok(Self { min_confidence })
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Generate rules from a mining pass, picking the metric mode from the
    /// kind of itemsets it produced.
    pub fn generate(&self, output: &MiningOutput) -> Result<GeneratedRules> {
        if let Some(big) = output.itemsets.iter().find(|f| f.items.len() > MAX_RULE_ITEMS) {
            return Err(RuleMineError::invalid_config(
                "max_len",
                big.items.len().to_string(),
                format!("itemsets above {} items cannot be split into rules", MAX_RULE_ITEMS),
            ));
        }
        let generated = match output.kind {
            ItemsetKind::Frequent => self.full_metric(output),
            ItemsetKind::Maximal => Self::support_only(output),
        };
        debug!(
            kind = ?output.kind,
            candidates = generated.candidates_considered,
            rules = generated.rules.len(),
            "rule generation complete"
        );
        Ok(generated)
    }

    fn full_metric(&self, output: &MiningOutput) -> GeneratedRules {
        let counts: HashMap<&Itemset, usize> = output
            .itemsets
            .iter()
            .map(|f| (&f.items, f.count))
            .collect();
        let total = output.transactions as f64;
        let mut generated = GeneratedRules::default();

        for itemset in output.itemsets.iter().filter(|f| f.items.len() >= 2) {
            for (antecedent, consequent) in splits(itemset) {
                generated.candidates_considered += 1;
                let (Some(&ant_count), Some(&cons_count)) =
                    (counts.get(&antecedent), counts.get(&consequent))
                else {
                    // Downward closure guarantees both; a hand-built output may not.
                    warn!(?antecedent, ?consequent, "subset support missing, split skipped");
                    continue;
                };

                let confidence = itemset.count as f64 / ant_count as f64;
                if confidence < self.min_confidence {
                    continue;
                }
                let metrics = RuleMetrics::compute(
                    itemset.support,
                    ant_count as f64 / total,
                    cons_count as f64 / total,
                );
                generated.rules.push(AssociationRule {
                    antecedent,
                    consequent,
                    support_count: itemset.count,
                    support: itemset.support,
                    confidence: Some(confidence),
                    metrics: Some(metrics),
                });
            }
        }
        generated
    }

    fn support_only(output: &MiningOutput) -> GeneratedRules {
        let mut generated = GeneratedRules::default();
        for itemset in output.itemsets.iter().filter(|f| f.items.len() >= 2) {
            for (antecedent, consequent) in splits(itemset) {
                generated.candidates_considered += 1;
                generated.rules.push(AssociationRule {
                    antecedent,
                    consequent,
                    support_count: itemset.count,
                    support: itemset.support,
                    confidence: None,
                    metrics: None,
                });
            }
        }
        generated
    }
}

/// The `2^n - 2` ways to split an itemset into non-empty antecedent and
/// consequent.
pub fn splits(itemset: &FrequentItemset) -> impl Iterator<Item = (Itemset, Itemset)> + '_ {
    let n = itemset.items.len();
    let full = if n == 0 { 0 } else { (1u64 << n) - 1 };
    (1..full).filter_map(move |mask| {
        let (antecedent, consequent) = itemset.items.split_by_mask(mask);
        Some((Itemset::new(antecedent)?, Itemset::new(consequent)?))
    })
}

/// Stable sort by descending confidence. Rules without a confidence keep
/// their relative order after every rule that has one.
pub fn sort_by_confidence(rules: &mut [AssociationRule]) {
    rules.sort_by(|a, b| match (a.confidence, b.confidence) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

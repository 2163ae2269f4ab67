//! Held-out rule validation.
//!
//! Each rule is replayed against the validation table: the transactions
//! where the whole antecedent holds are its coverage, and the share of those
//! where the whole consequent also holds is its firing accuracy. A rule with
//! no coverage scores 0 and still counts toward the unweighted mean.

use crate::rule_store::{RuleFormat, RuleRecord};
use rayon::prelude::*;
use rulemine_core::codec::FeatureSet;
use rulemine_core::error::Result;
use rulemine_core::table::FeatureTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Firing accuracy of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAccuracy {
    pub antecedent: FeatureSet,
    pub consequent: FeatureSet,
    /// Transactions where the antecedent holds.
    pub covered: usize,
    /// Covered transactions where the consequent holds too.
    pub hits: usize,
    pub accuracy: f64,
    /// Rule features absent from the validation table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_features: Vec<String>,
}

/// Per-rule accuracies plus their mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub rules: Vec<RuleAccuracy>,
    /// `None` when there were no rules to score.
    pub mean_accuracy: Option<f64>,
    /// Size of the validation table.
    pub transactions: usize,
}

impl ValidationReport {
    /// Rules whose antecedent never held.
    pub fn uncovered(&self) -> usize {
        self.rules.iter().filter(|r| r.covered == 0).count()
    }
}

#[derive(Debug, Clone)]
pub struct RuleValidator {
    parallel: bool,
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score rules on the rayon pool (default) or sequentially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self, rules: &[RuleRecord], table: &FeatureTable) -> ValidationReport {
        let scored: Vec<RuleAccuracy> = if self.parallel {
            rules.par_iter().map(|r| Self::score(r, table)).collect()
        } else {
            rules.iter().map(|r| Self::score(r, table)).collect()
        };

        let mean_accuracy = (!scored.is_empty())
            .then(|| scored.iter().map(|r| r.accuracy).sum::<f64>() / scored.len() as f64);
        let report = ValidationReport {
            rules: scored,
            mean_accuracy,
            transactions: table.num_rows(),
        };
        info!(
            rules = report.rules.len(),
            uncovered = report.uncovered(),
            mean_accuracy = ?report.mean_accuracy,
            "validation complete"
        );
        report
    }

    pub fn score(rule: &RuleRecord, table: &FeatureTable) -> RuleAccuracy {
        let schema = table.schema();
        let (antecedent, missing_ant) = rule.antecedent.resolve(schema);
        let (consequent, missing_cons) = rule.consequent.resolve(schema);
        let missing_features: Vec<String> = missing_ant
            .iter()
            .chain(&missing_cons)
            .map(|s| s.to_string())
            .collect();
        if !missing_features.is_empty() {
            warn!(
                antecedent = %rule.antecedent,
                consequent = %rule.consequent,
                missing = ?missing_features,
                "rule features missing from validation table"
            );
        }

        // A feature the table lacks never holds.
        let (covered, hits) = if !missing_ant.is_empty() {
            (0, 0)
        } else {
            let cover = table.cover(&antecedent);
            let covered = cover.count_ones();
            let hits = if missing_cons.is_empty() {
                cover.and_count(&table.cover(&consequent))
            } else {
                0
            };
            (covered, hits)
        };
        let accuracy = if covered == 0 {
            0.0
        } else {
            hits as f64 / covered as f64
        };

        RuleAccuracy {
            antecedent: rule.antecedent.clone(),
            consequent: rule.consequent.clone(),
            covered,
            hits,
            accuracy,
            missing_features,
        }
    }
}

/// CSV form: the mean sits in the last column of the first data row.
pub fn report_to_csv(report: &ValidationReport) -> String {
    let mut out = String::from("antecedents,consequents,covered,hits,accuracy,mean_accuracy\n");
    for (i, r) in report.rules.iter().enumerate() {
        let mean = match (i, report.mean_accuracy) {
            (0, Some(m)) => m.to_string(),
            _ => String::new(),
        };
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            r.antecedent.encode(),
            r.consequent.encode(),
            r.covered,
            r.hits,
            r.accuracy,
            mean
        ));
    }
    out
}

/// Write a report as JSON or CSV, by extension.
pub fn write_report(path: &Path, report: &ValidationReport) -> Result<()> {
    let text = match RuleFormat::from_path(path)? {
        RuleFormat::Json => serde_json::to_string_pretty(report)?,
        RuleFormat::Csv => report_to_csv(report),
    };
    std::fs::write(path, text)?;
    Ok(())
}

//! Summarise a persisted rule set.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rulemine::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

/// Counts and ranges over a rule set.
#[derive(Debug, Default, PartialEq)]
pub struct RuleSetStats {
    pub rules: usize,
    pub confidence_range: Option<(f64, f64)>,
    pub antecedent_features: usize,
    pub consequent_features: usize,
}

impl RuleSetStats {
    pub fn from_rules(rules: &[RuleRecord]) -> Self {
        let mut antecedents = BTreeSet::new();
        let mut consequents = BTreeSet::new();
        let mut range: Option<(f64, f64)> = None;
        for rule in rules {
            antecedents.extend(rule.antecedent.iter());
            consequents.extend(rule.consequent.iter());
            if let Some(c) = rule.confidence {
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(c), hi.max(c)),
                    None => (c, c),
                });
            }
        }
        Self {
            rules: rules.len(),
            confidence_range: range,
            antecedent_features: antecedents.len(),
            consequent_features: consequents.len(),
        }
    }
}

pub fn print_rule(i: usize, rule: &RuleRecord) {
    let confidence = rule
        .confidence
        .map(|c| format!("{:.4}", c))
        .unwrap_or_else(|| "-".into());
    let lift = rule
        .lift
        .map(|l| format!("  lift {:.3}", l))
        .unwrap_or_default();
    println!(
        "  {} {} → {}  conf {} support {}{}",
        format!("{}.", i + 1).blue(),
        rule.antecedent.encode(),
        rule.consequent.encode(),
        confidence.cyan(),
        rule.support,
        lift
    );
}

pub fn run(rules: &str, top: usize) -> Result<()> {
    let path = Path::new(rules);
    if !path.exists() {
        bail!("Path does not exist: {}", path.display());
    }
    let document = read_rule_set(path)
        .with_context(|| format!("Failed to read rule set: {}", path.display()))?;
    let stats = RuleSetStats::from_rules(&document.rules);

    println!("{}", "Rule Set".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  File:                {}", path.display());
    if let Some(params) = &document.parameters {
        println!(
            "  Parameters:          {} support ≥ {} confidence ≥ {}",
            params.mode, params.min_support, params.min_confidence
        );
    }
    if let Some(n) = document.training_transactions {
        println!("  Training rows:       {}", n);
    }
    println!("  Rules:               {}", stats.rules.to_string().cyan());
    match stats.confidence_range {
        Some((lo, hi)) => println!("  Confidence:          {:.4} – {:.4}", lo, hi),
        None => println!("  Confidence:          {}", "not computed".yellow()),
    }
    println!("  Influencer features: {}", stats.antecedent_features);
    println!("  User features:       {}", stats.consequent_features);

    if stats.rules > 0 && top > 0 {
        println!();
        println!("{}", "Top rules".white().bold());
        println!("{}", "═".repeat(40).dimmed());
        for (i, rule) in document.rules.iter().take(top).enumerate() {
            print_rule(i, rule);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(antecedent: &[&str], consequent: &[&str], confidence: Option<f64>) -> RuleRecord {
        RuleRecord {
            antecedent: FeatureSet::from_names(antecedent.iter().copied()).unwrap(),
            consequent: FeatureSet::from_names(consequent.iter().copied()).unwrap(),
            support: 3,
            confidence,
            antecedent_support: None,
            consequent_support: None,
            lift: None,
            leverage: None,
            conviction: None,
            zhangs_metric: None,
            direction: RuleDirection::InfluencerToUser,
        }
    }

    #[test]
    fn stats_count_distinct_features_and_confidence_range() {
        let rules = vec![
            record(&["inf_a"], &["usr_x"], Some(0.9)),
            record(&["inf_a", "inf_b"], &["usr_x"], Some(0.4)),
            record(&["inf_b"], &["usr_y"], Some(0.6)),
        ];
        let stats = RuleSetStats::from_rules(&rules);
        assert_eq!(stats.rules, 3);
        assert_eq!(stats.confidence_range, Some((0.4, 0.9)));
        assert_eq!(stats.antecedent_features, 2);
        assert_eq!(stats.consequent_features, 2);
    }

    #[test]
    fn support_only_rules_have_no_confidence_range() {
        let stats = RuleSetStats::from_rules(&[record(&["inf_a"], &["usr_x"], None)]);
        assert_eq!(stats.confidence_range, None);
        assert_eq!(RuleSetStats::from_rules(&[]), RuleSetStats::default());
    }
}

//! Score a persisted rule set against a held-out table.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rulemine::prelude::*;
use std::path::Path;

use crate::config::Config;

pub fn run(rules: &str, table: &str, output: Option<&str>, top: usize) -> Result<()> {
    let config = Config::load()?;
    let prefixes = config.prefixes()?;

    let rules_path = Path::new(rules);
    let table_path = Path::new(table);
    for path in [rules_path, table_path] {
        if !path.exists() {
            bail!("Path does not exist: {}", path.display());
        }
    }

    let document = read_rule_set(rules_path)
        .with_context(|| format!("Failed to read rule set: {}", rules_path.display()))?;
    let held_out = read_table_csv(table_path, &prefixes)
        .with_context(|| format!("Failed to read feature table: {}", table_path.display()))?;

    println!(
        "{} Validating {} rules on {} rows...",
        "→".blue(),
        document.rules.len().to_string().cyan(),
        held_out.num_rows().to_string().cyan()
    );

    let report = RuleValidator::new()
        .with_parallel(config.validation.parallel)
        .validate(&document.rules, &held_out);

    if let Some(output) = output {
        let path = Path::new(output);
        write_report(path, &report)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} Wrote {}", "✓".green(), path.display());
    }

    println!();
    println!("{}", "Validation".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    match report.mean_accuracy {
        Some(mean) => println!("  Mean accuracy:   {}", format!("{:.4}", mean).cyan()),
        None => println!("  Mean accuracy:   {}", "no data".yellow()),
    }
    println!("  Rules uncovered: {}", report.uncovered().to_string().yellow());

    let mut ranked: Vec<&RuleAccuracy> = report.rules.iter().collect();
    ranked.sort_by(|a, b| b.accuracy.total_cmp(&a.accuracy).then(b.covered.cmp(&a.covered)));
    for (i, r) in ranked.into_iter().take(top).enumerate() {
        println!(
            "  {} {} → {}  {} ({}/{})",
            format!("{}.", i + 1).blue(),
            r.antecedent.encode(),
            r.consequent.encode(),
            format!("{:.4}", r.accuracy).cyan(),
            r.hits,
            r.covered
        );
        if !r.missing_features.is_empty() {
            println!("     {} missing: {}", "•".yellow(), r.missing_features.join(", "));
        }
    }

    Ok(())
}

//! Mine influencer → user rules from a feature table.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rulemine::prelude::*;
use std::path::Path;

use super::inspect::print_rule;
use crate::config::{Config, MiningOverrides};

/// Report written next to the rule set after held-out validation.
pub const REPORT_FILE: &str = "validation_report.csv";

pub struct MineArgs {
    pub table: String,
    pub sample_size: Option<usize>,
    pub feature_count: Option<usize>,
    pub overrides: MiningOverrides,
    pub format: String,
    pub no_split: bool,
}

pub fn run(args: MineArgs) -> Result<()> {
    // Every parameter is checked before the table is touched.
    let config = Config::load()?;
    let prefixes = config.prefixes()?;
    let split = config.split_config()?;
    let mining = config.mining_config(&args.overrides)?;
    let format = args
        .format
        .parse::<RuleFormat>()
        .context("Invalid --format")?;
    let sink = config.run_log()?;

    let table_path = Path::new(&args.table);
    if !table_path.exists() {
        bail!("Path does not exist: {}", table_path.display());
    }

    println!("{} Loading {}...", "→".blue(), table_path.display());
    let table = read_table_csv(table_path, &prefixes)
        .with_context(|| format!("Failed to read feature table: {}", table_path.display()))?;

    let (training, validation) = if args.no_split {
        (table, None)
    } else {
        let partition = prepare(&table, args.sample_size, args.feature_count, &split)
            .context("Failed to sample and split")?;
        (partition.training, Some(partition.validation))
    };

    println!(
        "{} Mining {} transactions ({} mode, support ≥ {}, confidence ≥ {})...",
        "→".blue(),
        training.num_rows().to_string().cyan(),
        mining.mode.to_string().cyan(),
        mining.min_support,
        mining.min_confidence
    );

    let run = MiningPipeline::new(mining)
        .with_sink(sink)
        .with_sampling(args.sample_size, args.feature_count)
        .run(&training)
        .context("Mining run failed")?;

    let out_dir = config.output_dir();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let rules_path = out_dir.join(rules_file_name(mining.min_support, mining.min_confidence, format));
    write_rule_set(&rules_path, &run.document)
        .with_context(|| format!("Failed to write {}", rules_path.display()))?;

    let summary = &run.summary;
    println!(
        "  {} {} itemsets in {} ms",
        "✓".green(),
        summary.itemset_count.to_string().cyan(),
        summary.itemset_ms
    );
    println!(
        "  {} {} candidate rules in {} ms, {} discarded by direction",
        "✓".green(),
        run.candidates_considered.to_string().cyan(),
        summary.rule_ms,
        run.discarded.total().to_string().yellow()
    );
    println!(
        "  {} {} influencer → user rules → {}",
        "✓".green(),
        summary.rule_count.to_string().cyan(),
        rules_path.display()
    );

    if let Some(validation) = validation {
        let report = RuleValidator::new()
            .with_parallel(config.validation.parallel)
            .validate(&run.document.rules, &validation);
        let report_path = out_dir.join(REPORT_FILE);
        write_report(&report_path, &report)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;
        match report.mean_accuracy {
            Some(mean) => println!(
                "  {} Held-out mean accuracy {} over {} rows → {}",
                "✓".green(),
                format!("{:.4}", mean).cyan(),
                report.transactions,
                report_path.display()
            ),
            None => println!(
                "  {} No rules to validate (no data) → {}",
                "•".yellow(),
                report_path.display()
            ),
        }
    }

    if !run.document.rules.is_empty() {
        println!();
        println!("{}", "Top rules".white().bold());
        println!("{}", "═".repeat(40).dimmed());
        for (i, rule) in run.document.rules.iter().take(5).enumerate() {
            print_rule(i, rule);
        }
    }

    println!();
    println!("{} Run {}", "✓".green().bold(), summary.run_id.to_string().dimmed());

    Ok(())
}

//! Mine a grid of support × confidence thresholds concurrently.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rulemine::prelude::*;
use std::path::Path;
use std::time::Duration;

use crate::config::{Config, MiningOverrides};

pub struct SweepArgs {
    pub table: String,
    pub supports: String,
    pub confidences: String,
    pub sample_size: Option<usize>,
    pub feature_count: Option<usize>,
    pub mode: Option<String>,
    pub max_len: Option<usize>,
    pub format: String,
}

/// Parse a comma-separated list of thresholds.
fn parse_list(flag: &str, list: &str) -> Result<Vec<f64>> {
    list.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<f64>()
                .with_context(|| format!("Invalid value in --{}: {}", flag, v))
        })
        .collect()
}

pub fn run(args: SweepArgs) -> Result<()> {
    let config = Config::load()?;
    let prefixes = config.prefixes()?;
    let split = config.split_config()?;
    let base = config.mining_config(&MiningOverrides {
        mode: args.mode.clone(),
        max_len: args.max_len,
        ..MiningOverrides::default()
    })?;
    let sweep = SweepConfig {
        supports: parse_list("supports", &args.supports)?,
        confidences: parse_list("confidences", &args.confidences)?,
        mode: base.mode,
        max_len: base.max_len,
    };
    sweep.validate().context("Invalid sweep")?;
    let format = args
        .format
        .parse::<RuleFormat>()
        .context("Invalid --format")?;
    let sink = config.run_log()?;

    let table_path = Path::new(&args.table);
    if !table_path.exists() {
        bail!("Path does not exist: {}", table_path.display());
    }
    let table = read_table_csv(table_path, &prefixes)
        .with_context(|| format!("Failed to read feature table: {}", table_path.display()))?;
    let partition = prepare(&table, args.sample_size, args.feature_count, &split)
        .context("Failed to sample and split")?;

    let runs = sweep.configs().len();
    println!(
        "{} Sweeping {} runs on {} training rows...",
        "→".blue(),
        runs.to_string().cyan(),
        partition.training.num_rows().to_string().cyan()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]")?);
    pb.set_message("mining");
    pb.enable_steady_tick(Duration::from_millis(100));
    let outcomes = run_sweep(
        &partition.training,
        &sweep,
        (args.sample_size, args.feature_count),
        sink,
    )?;
    pb.finish_with_message("done");

    let out_dir = config.output_dir();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    println!();
    println!("{}", "Sweep results".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    let mut failed = 0;
    for outcome in &outcomes {
        let label = format!(
            "support {} confidence {}",
            outcome.config.min_support, outcome.config.min_confidence
        );
        match &outcome.result {
            Ok(run) => {
                let path = out_dir.join(rules_file_name(
                    outcome.config.min_support,
                    outcome.config.min_confidence,
                    format,
                ));
                write_rule_set(&path, &run.document)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "  {} {}: {} rules, {} ms",
                    "✓".green(),
                    label,
                    run.summary.rule_count.to_string().cyan(),
                    run.summary.total_ms
                );
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "✗".red(), label, e);
            }
        }
    }

    println!();
    if failed == 0 {
        println!("{} {} runs written to {}", "✓".green().bold(), runs, out_dir.display());
    } else {
        println!(
            "{} {} of {} runs failed",
            "•".yellow().bold(),
            failed.to_string().red(),
            runs
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_ignore_blanks_and_reject_garbage() {
        assert_eq!(parse_list("supports", "0.1, 0.2,,0.3").unwrap(), vec![0.1, 0.2, 0.3]);
        assert!(parse_list("supports", "0.1,high").is_err());
    }
}

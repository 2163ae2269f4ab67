//! Sample a feature table and split it into training and validation CSVs.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rulemine::prelude::*;
use std::path::Path;

use crate::config::Config;

pub const TRAINING_FILE: &str = "train.csv";
pub const VALIDATION_FILE: &str = "validation.csv";

pub fn run(table: &str, sample_size: Option<usize>, feature_count: Option<usize>) -> Result<()> {
    let config = Config::load()?;
    let prefixes = config.prefixes()?;
    let split = config.split_config()?;

    let table_path = Path::new(table);
    if !table_path.exists() {
        bail!("Path does not exist: {}", table_path.display());
    }

    let table = read_table_csv(table_path, &prefixes)
        .with_context(|| format!("Failed to read feature table: {}", table_path.display()))?;
    let partition = prepare(&table, sample_size, feature_count, &split)
        .context("Failed to sample and split")?;

    let out_dir = config.output_dir();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let training_path = out_dir.join(TRAINING_FILE);
    let validation_path = out_dir.join(VALIDATION_FILE);
    write_table_csv(&training_path, &partition.training)?;
    write_table_csv(&validation_path, &partition.validation)?;

    println!(
        "{} Split {} rows × {} features (seeds {}/{})",
        "→".blue(),
        table.num_rows().to_string().cyan(),
        partition.training.num_features().to_string().cyan(),
        split.sample_seed,
        split.split_seed
    );
    println!(
        "  {} {} training rows → {}",
        "✓".green(),
        partition.training.num_rows(),
        training_path.display()
    );
    println!(
        "  {} {} validation rows → {}",
        "✓".green(),
        partition.validation.num_rows(),
        validation_path.display()
    );

    Ok(())
}

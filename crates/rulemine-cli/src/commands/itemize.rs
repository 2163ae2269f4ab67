//! Turn a numeric CSV into a boolean feature table.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rulemine::prelude::*;
use std::path::Path;

use crate::config::Config;

pub fn run(input: &str, output: &str, force: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let prefixes = config.prefixes()?;

    let input = Path::new(input);
    if !input.exists() {
        bail!("Path does not exist: {}", input.display());
    }

    println!("{} Reading {}...", "→".blue(), input.display());
    let numeric = read_numeric_csv(input)
        .with_context(|| format!("Failed to read numeric table: {}", input.display()))?;

    let forced = force
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    let table = itemize(&numeric, &ItemizeConfig { forced }, &prefixes)
        .context("Failed to itemize table")?;

    let dropped = numeric.rows.len() - table.num_rows();
    let output = Path::new(output);
    write_table_csv(output, &table)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "  {} {} numeric columns → {} features",
        "✓".green(),
        numeric.columns.len().to_string().cyan(),
        table.num_features().to_string().cyan()
    );
    println!(
        "  {} {} rows kept, {} dropped for missing values",
        "✓".green(),
        table.num_rows().to_string().cyan(),
        dropped.to_string().yellow()
    );
    println!("  {} Wrote {}", "✓".green(), output.display());

    Ok(())
}

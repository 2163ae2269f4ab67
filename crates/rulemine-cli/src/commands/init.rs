//! Initialize a new RuleMine project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing RuleMine project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        let config = Config::default();
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    println!();
    println!("{} RuleMine project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} rulemine itemize <numeric.csv>", "1.".blue());
    println!("  {} rulemine split features.csv", "2.".blue());
    println!("  {} rulemine mine train.csv --no-split", "3.".blue());
    println!("  {} rulemine validate <rules.csv> validation.csv", "4.".blue());

    Ok(())
}

//! Configuration management for RuleMine CLI.

use anyhow::{Context, Result};
use rulemine::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "rulemine.toml";

/// RuleMine project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub namespaces: NamespaceConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub mining: MiningSection,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceConfig {
    #[serde(default = "default_influencer_prefix")]
    pub influencer_prefix: String,
    #[serde(default = "default_user_prefix")]
    pub user_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_sample_seed")]
    pub sample_seed: u64,
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningSection {
    #[serde(default = "default_min_support")]
    pub min_support: f64,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// `.jsonl` or `.db` file receiving one summary per mining run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_log: Option<String>,
}

// Default value functions
fn default_influencer_prefix() -> String { "inf_".into() }
fn default_user_prefix() -> String { "usr_".into() }
fn default_sample_seed() -> u64 { 41 }
fn default_split_seed() -> u64 { 42 }
fn default_test_fraction() -> f64 { 0.3 }
fn default_min_support() -> f64 { 0.1 }
fn default_min_confidence() -> f64 { 0.3 }
fn default_mode() -> String { "exhaustive".into() }
fn default_parallel() -> bool { true }
fn default_output_dir() -> String { ".".into() }

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            influencer_prefix: default_influencer_prefix(),
            user_prefix: default_user_prefix(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_seed: default_sample_seed(),
            split_seed: default_split_seed(),
            test_fraction: default_test_fraction(),
        }
    }
}

impl Default for MiningSection {
    fn default() -> Self {
        Self {
            min_support: default_min_support(),
            min_confidence: default_min_confidence(),
            mode: default_mode(),
            max_len: None,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            run_log: None,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct MiningOverrides {
    pub min_support: Option<f64>,
    pub min_confidence: Option<f64>,
    pub mode: Option<String>,
    pub max_len: Option<usize>,
}

impl Config {
    /// Load config from rulemine.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        if let Some(path) = find_config_file() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn prefixes(&self) -> Result<NamespacePrefixes> {
        NamespacePrefixes::new(
            self.namespaces.influencer_prefix.clone(),
            self.namespaces.user_prefix.clone(),
        )
        .context("Invalid [namespaces] section")
    }

    pub fn split_config(&self) -> Result<SplitConfig> {
        let split = SplitConfig {
            sample_seed: self.sampling.sample_seed,
            split_seed: self.sampling.split_seed,
            test_fraction: self.sampling.test_fraction,
        };
        split.validate().context("Invalid [sampling] section")?;
        Ok(split)
    }

    /// Mining parameters from `[mining]` with overrides applied, validated.
    pub fn mining_config(&self, overrides: &MiningOverrides) -> Result<MiningConfig> {
        let mode = overrides.mode.as_deref().unwrap_or(&self.mining.mode);
        let config = MiningConfig {
            min_support: overrides.min_support.unwrap_or(self.mining.min_support),
            min_confidence: overrides.min_confidence.unwrap_or(self.mining.min_confidence),
            mode: mode.parse::<MiningMode>().context("Invalid mining mode")?,
            max_len: overrides.max_len.or(self.mining.max_len),
        };
        config.validate().context("Invalid mining parameters")?;
        Ok(config)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.output.dir)
    }

    /// The configured run-log sink, or one that discards everything.
    pub fn run_log(&self) -> Result<std::sync::Arc<dyn RunLogSink>> {
        match &self.output.run_log {
            Some(path) => {
                let sink = open_run_log(Path::new(path))
                    .with_context(|| format!("Failed to open run log: {}", path))?;
                Ok(std::sync::Arc::from(sink))
            }
            None => Ok(std::sync::Arc::new(NullRunLog)),
        }
    }
}

/// Find rulemine.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.namespaces.influencer_prefix, "inf_");
        assert_eq!(config.sampling.sample_seed, 41);
        assert_eq!(config.sampling.split_seed, 42);
        let mining = config.mining_config(&MiningOverrides::default()).unwrap();
        assert_eq!(mining, MiningConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            "[mining]\nmode = \"fpmax\"\nmax_len = 3\n\n[output]\nrun_log = \"runs.jsonl\"\n",
        )
        .unwrap();
        let mining = config.mining_config(&MiningOverrides::default()).unwrap();
        assert_eq!(mining.mode, MiningMode::MaximalOnly);
        assert_eq!(mining.max_len, Some(3));
        assert_eq!(mining.min_support, 0.1);
        assert_eq!(config.output.dir, ".");
    }

    #[test]
    fn overrides_win_and_are_validated() {
        let config = Config::default();
        let overrides = MiningOverrides {
            min_support: Some(0.4),
            ..MiningOverrides::default()
        };
        assert_eq!(config.mining_config(&overrides).unwrap().min_support, 0.4);

        let bad = MiningOverrides {
            min_support: Some(2.0),
            ..MiningOverrides::default()
        };
        assert!(config.mining_config(&bad).is_err());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.mining.mode, "exhaustive");
        assert!(back.validation.parallel);
    }
}

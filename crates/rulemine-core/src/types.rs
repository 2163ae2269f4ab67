//! Shared types used across the mining, rule, and validation crates.

use crate::error::{Result, RuleMineError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of a feature (column) within a [`Schema`](crate::schema::Schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub u32);

impl FeatureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for FeatureId {
    fn from(i: usize) -> Self {
        FeatureId(i as u32)
    }
}

/// Which side of a conversation a feature describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Influencer-side traits (`origin_A`).
    Influencer,
    /// User-side reactions (`origin_B`).
    User,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Influencer => write!(f, "influencer"),
            Namespace::User => write!(f, "user"),
        }
    }
}

/// The two reserved column-name prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacePrefixes {
    pub influencer: String,
    pub user: String,
}

impl Default for NamespacePrefixes {
    fn default() -> Self {
        Self {
            influencer: "inf_".to_string(),
            user: "usr_".to_string(),
        }
    }
}

impl NamespacePrefixes {
    pub fn new(influencer: impl Into<String>, user: impl Into<String>) -> Result<Self> {
        let prefixes = Self {
            influencer: influencer.into(),
            user: user.into(),
        };
        prefixes.validate()?;
        Ok(prefixes)
    }

    /// Prefixes must be non-empty and neither may be a prefix of the other,
    /// otherwise a column could belong to both namespaces.
    pub fn validate(&self) -> Result<()> {
        if self.influencer.is_empty() {
            return Err(RuleMineError::invalid_config(
                "namespaces.influencer_prefix",
                "",
                "prefix must not be empty",
            ));
        }
        if self.user.is_empty() {
            return Err(RuleMineError::invalid_config(
                "namespaces.user_prefix",
                "",
                "prefix must not be empty",
            ));
        }
        if self.influencer.starts_with(&self.user) || self.user.starts_with(&self.influencer) {
            return Err(RuleMineError::invalid_config(
                "namespaces",
                format!("{} / {}", self.influencer, self.user),
                "prefixes overlap",
            ));
        }
        Ok(())
    }

    /// Classify a column name, or `None` when no reserved prefix matches.
    pub fn classify(&self, name: &str) -> Option<Namespace> {
        if name.starts_with(&self.influencer) {
            Some(Namespace::Influencer)
        } else if name.starts_with(&self.user) {
            Some(Namespace::User)
        } else {
            None
        }
    }
}

/// Itemset mining strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MiningMode {
    /// Level-wise Apriori enumeration of every frequent itemset.
    #[default]
    Exhaustive,
    /// FP-Max: maximal frequent itemsets only.
    MaximalOnly,
}

impl fmt::Display for MiningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiningMode::Exhaustive => write!(f, "exhaustive"),
            MiningMode::MaximalOnly => write!(f, "maximal_only"),
        }
    }
}

impl FromStr for MiningMode {
    type Err = RuleMineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "exhaustive" | "apriori" => Ok(MiningMode::Exhaustive),
            "maximal_only" | "maximal" | "fpmax" => Ok(MiningMode::MaximalOnly),
            other => Err(RuleMineError::invalid_config(
                "mode",
                other,
                "expected 'exhaustive' or 'maximal_only'",
            )),
        }
    }
}

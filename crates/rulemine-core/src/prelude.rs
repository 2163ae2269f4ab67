//! RuleMine Core Prelude - convenient imports for common usage.
//!
//! ```rust
//! use rulemine_core::prelude::*;
//! ```

// Re-export commonly used types
pub use crate::types::{FeatureId, MiningMode, Namespace, NamespacePrefixes};
pub use crate::schema::{Feature, Schema};
pub use crate::table::{BitColumn, FeatureTable};
pub use crate::itemset::{FrequentItemset, Itemset};
pub use crate::rule::{AssociationRule, Conviction, RuleDirection, RuleMetrics};
pub use crate::codec::FeatureSet;

// Re-export the ItemsetMiner trait
pub use crate::miner::{ItemsetKind, ItemsetMiner, MiningOutput};

// Re-export error types
pub use crate::error::{Result, RuleMineError};

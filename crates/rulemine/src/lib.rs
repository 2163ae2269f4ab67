//! # RuleMine
//!
//! Directional association-rule mining between two feature namespaces.
//!
//! Conversations are encoded as boolean features. Influencer-side features
//! (`inf_` prefix) describe the post that started a conversation; user-side
//! features (`usr_` prefix) describe the replies. RuleMine finds rules of
//! the form "when these influencer features hold, these user features
//! follow with confidence C" and checks them against held-out data.
//!
//! ## Quick Start
//!
//! ```rust
//! use rulemine::prelude::*;
//!
//! let table = FeatureTable::from_transactions(
//!     &["inf_a1", "inf_a2", "usr_b1"],
//!     &[
//!         vec!["inf_a1", "inf_a2", "usr_b1"],
//!         vec!["inf_a1", "usr_b1"],
//!         vec!["inf_a2", "usr_b1"],
//!         vec!["inf_a1", "inf_a2"],
//!     ],
//!     &NamespacePrefixes::default(),
//! ).unwrap();
//!
//! let config = MiningConfig { min_support: 0.5, min_confidence: 0.6, ..MiningConfig::default() };
//! let run = MiningPipeline::new(config).run(&table).unwrap();
//!
//! for rule in &run.document.rules {
//!     println!("{} → {} ({:?})", rule.antecedent, rule.consequent, rule.confidence);
//! }
//!
//! let report = RuleValidator::new().validate(&run.document.rules, &table);
//! assert!(report.mean_accuracy.is_some());
//! ```
//!
//! ## Architecture
//!
//! - [`rulemine_core`] - Schema, feature table, itemsets, rules, feature-set codec, errors
//! - [`rulemine_engine`] - Miners, rule generation, filtering, persistence, validation, run logs
//!
//! ## Mining Modes
//!
//! | Mode | Miner | Rule metrics |
//! |------|-------|--------------|
//! | `exhaustive` | Apriori, every frequent itemset | confidence, lift, leverage, conviction, Zhang's metric |
//! | `maximal_only` | FP-Max, maximal itemsets only | support only |
//!
//! ## Persistence
//!
//! ```rust,ignore
//! use rulemine::prelude::*;
//! use std::path::Path;
//!
//! let path = Path::new(&rules_file_name(0.1, 0.3, RuleFormat::Csv)).to_path_buf();
//! write_rule_set(&path, &run.document)?;
//! let rules = read_rule_set(&path)?.rules;
//! ```

// Re-export all subcrates
pub use rulemine_core as core;
pub use rulemine_engine as engine;

/// Prelude module for convenient imports.
///
/// ```rust
/// use rulemine::prelude::*;
/// ```
pub mod prelude {
    pub use rulemine_core::prelude::*;
    pub use rulemine_engine::prelude::*;
}

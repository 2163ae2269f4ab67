//! # RuleMine Core
//!
//! Core types and traits for directional association-rule mining.
//!
//! A conversation dataset is reduced to a boolean feature table whose
//! columns belong to one of two namespaces:
//!
//! - **Influencer** - traits of the post that started the conversation (`inf_` prefix)
//! - **User** - traits of the replies it drew (`usr_` prefix)
//!
//! This crate holds the shared vocabulary used by the engine:
//!
//! - [`schema`] - typed feature schema (name → namespace), built once per table
//! - [`table`] - packed bit-column feature table with support counting
//! - [`itemset`] - itemsets and their supports
//! - [`rule`] - association rules, metrics, and direction classes
//! - [`codec`] - the versioned text form of a feature-name set
//! - [`miner`] - the `ItemsetMiner` capability shared by both mining strategies
//!
//! ## Quick Start
//!
//! ```rust
//! use rulemine_core::prelude::*;
//!
//! let table = FeatureTable::from_transactions(
//!     &["inf_a1", "inf_a2", "usr_b1"],
//!     &[vec!["inf_a1", "usr_b1"], vec!["inf_a2"]],
//!     &NamespacePrefixes::default(),
//! ).unwrap();
//!
//! let a1 = table.schema().require("inf_a1").unwrap();
//! assert_eq!(table.support_count(&[a1]), 1);
//! ```

pub mod codec;
pub mod error;
pub mod itemset;
pub mod miner;
pub mod prelude;
pub mod rule;
pub mod schema;
pub mod table;
pub mod types;

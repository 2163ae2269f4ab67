//! # RuleMine Engine
//!
//! Mining, rule generation, filtering, and validation.
//!
//! A run takes a training [`FeatureTable`](rulemine_core::table::FeatureTable)
//! through the pipeline
//!
//! ```text
//! itemset miner → rule generator → direction filter → rule records
//! ```
//!
//! and appends one summary to a [`run_log::RunLogSink`]. Rule records are
//! persisted by [`rule_store`] and later replayed against a held-out table
//! by [`validation`], which needs nothing from the run but the records.

pub mod apriori;
pub mod filter;
pub mod fpmax;
pub mod itemize;
pub mod partition;
pub mod pipeline;
pub mod prelude;
pub mod rule_store;
pub mod rules;
pub mod run_log;
pub mod sqlite_run_log;
pub mod sweep;
pub mod table_io;
pub mod validation;

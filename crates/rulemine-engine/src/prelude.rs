//! RuleMine Engine Prelude - convenient imports for common usage.
//!
//! ```rust
//! use rulemine_engine::prelude::*;
//! ```

// Miners
pub use crate::apriori::AprioriMiner;
pub use crate::fpmax::FpMaxMiner;

// Rule generation and filtering
pub use crate::rules::{sort_by_confidence, GeneratedRules, RuleGenerator};
pub use crate::filter::{is_influencer_to_user, DirectedRule, DirectionFilter, DiscardCounts, FilteredRules};

// Persistence
pub use crate::rule_store::{
    read_rule_set, rules_file_name, write_rule_set,
    RuleFormat, RuleRecord, RuleSetDocument,
};
pub use crate::table_io::{read_table_csv, write_table_csv};
pub use crate::itemize::{itemize, read_numeric_csv, ItemizeConfig, NumericTable};

// Partitioning
pub use crate::partition::{prepare, Partition, SplitConfig};

// Runs
pub use crate::pipeline::{build_miner, MiningConfig, MiningPipeline, MiningRun};
pub use crate::sweep::{run_sweep, SweepConfig, SweepOutcome};
pub use crate::run_log::{
    open_run_log, read_run_log, JsonlRunLog, MemoryRunLog, NullRunLog,
    RunLogSink, RunParameters, RunStatus, RunSummary,
};

// Validation
pub use crate::validation::{write_report, RuleAccuracy, RuleValidator, ValidationReport};

// Re-export SQLite run log when feature is enabled
#[cfg(feature = "sqlite")]
pub use crate::sqlite_run_log::SqliteRunLog;

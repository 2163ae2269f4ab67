//! One mining run: mine, generate, filter, order, record.
//!
//! The pipeline owns nothing global. It is handed a run-log sink and
//! appends exactly one summary per run, completed or failed.

use crate::apriori::AprioriMiner;
use crate::filter::{DirectionFilter, DiscardCounts};
use crate::fpmax::FpMaxMiner;
use crate::rule_store::{RuleRecord, RuleSetDocument};
use crate::rules::{sort_by_confidence, RuleGenerator};
use crate::run_log::{NullRunLog, RunLogSink, RunParameters, RunStatus, RunSummary};
use rulemine_core::error::{Result, RuleMineError};
use rulemine_core::miner::ItemsetMiner;
use rulemine_core::table::FeatureTable;
use rulemine_core::types::MiningMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use uuid::Uuid;

/// Thresholds and strategy for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    pub min_support: f64,
    pub min_confidence: f64,
    pub mode: MiningMode,
    pub max_len: Option<usize>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support: 0.1,
            min_confidence: 0.3,
            mode: MiningMode::Exhaustive,
            max_len: None,
        }
    }
}

impl MiningConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(RuleMineError::out_of_range(
                "min_support",
                "(0, 1]",
                self.min_support,
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(RuleMineError::out_of_range(
                "min_confidence",
                "[0, 1]",
                self.min_confidence,
            ));
        }
        if self.max_len == Some(0) {
            return Err(RuleMineError::invalid_config(
                "max_len",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// The miner implementing `mode`.
pub fn build_miner(mode: MiningMode, max_len: Option<usize>) -> Box<dyn ItemsetMiner> {
    match mode {
        MiningMode::Exhaustive => Box::new(AprioriMiner::new().with_max_len(max_len)),
        MiningMode::MaximalOnly => Box::new(FpMaxMiner::new().with_max_len(max_len)),
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct MiningRun {
    pub summary: RunSummary,
    pub document: RuleSetDocument,
    pub candidates_considered: usize,
    pub discarded: DiscardCounts,
}

/// Phase timings and counts, filled in as the run progresses so a failed
/// run still reports how far it got.
#[derive(Debug, Default)]
struct Progress {
    itemset_ms: u64,
    itemset_count: usize,
    rule_ms: u64,
    rule_count: usize,
}

#[derive(Clone)]
pub struct MiningPipeline {
    config: MiningConfig,
    sample_size: Option<usize>,
    feature_count: Option<usize>,
    sink: Arc<dyn RunLogSink>,
}

impl MiningPipeline {
    pub fn new(config: MiningConfig) -> Self {
        Self {
            config,
            sample_size: None,
            feature_count: None,
            sink: Arc::new(NullRunLog),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RunLogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Record how the training table was sampled.
    pub fn with_sampling(mut self, sample_size: Option<usize>, feature_count: Option<usize>) -> Self {
        self.sample_size = sample_size;
        self.feature_count = feature_count;
        self
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn parameters(&self) -> RunParameters {
        RunParameters {
            sample_size: self.sample_size,
            feature_count: self.feature_count,
            min_support: self.config.min_support,
            min_confidence: self.config.min_confidence,
            mode: self.config.mode,
            max_len: self.config.max_len,
        }
    }

    /// Run on a training table and log the outcome.
    pub fn run(&self, training: &FeatureTable) -> Result<MiningRun> {
        let run_id = Uuid::new_v4();
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let started = Instant::now();
        let mut progress = Progress::default();

        let outcome = self.execute(training, &mut progress);
        let status = match &outcome {
            Ok(_) => RunStatus::Completed,
            Err(e) => RunStatus::Failed {
                reason: e.to_string(),
            },
        };
        let summary = RunSummary {
            run_id,
            started_at,
            parameters: self.parameters(),
            training_transactions: training.num_rows(),
            itemset_ms: progress.itemset_ms,
            itemset_count: progress.itemset_count,
            rule_ms: progress.rule_ms,
            rule_count: progress.rule_count,
            total_ms: started.elapsed().as_millis() as u64,
            status,
        };

        match outcome {
            Ok((records, candidates_considered, discarded)) => {
                self.sink.append(&summary)?;
                info!(
                    %run_id,
                    itemsets = summary.itemset_count,
                    rules = summary.rule_count,
                    total_ms = summary.total_ms,
                    "mining run complete"
                );
                let document = RuleSetDocument::new(records)
                    .with_run(self.parameters(), training.num_rows());
                Ok(MiningRun {
                    summary,
                    document,
                    candidates_considered,
                    discarded,
                })
            }
            Err(e) => {
                if let Err(log_err) = self.sink.append(&summary) {
                    warn!(%run_id, error = %log_err, "failed run could not be logged");
                }
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        training: &FeatureTable,
        progress: &mut Progress,
    ) -> Result<(Vec<RuleRecord>, usize, DiscardCounts)> {
        self.config.validate()?;
        let generator = RuleGenerator::new(self.config.min_confidence)?;
        let miner = build_miner(self.config.mode, self.config.max_len);

        let phase = Instant::now();
        let output = miner.mine(training, self.config.min_support)?;
        progress.itemset_ms = phase.elapsed().as_millis() as u64;
        progress.itemset_count = output.len();

        let phase = Instant::now();
        let mut generated = generator.generate(&output)?;
        // Stable sort first; filtering keeps relative order.
        sort_by_confidence(&mut generated.rules);
        let filtered = DirectionFilter.apply(generated.rules, training.schema());
        let records: Vec<RuleRecord> = filtered
            .kept
            .iter()
            .map(|r| RuleRecord::from_rule(r, training.schema()))
            .collect();
        progress.rule_ms = phase.elapsed().as_millis() as u64;
        progress.rule_count = records.len();

        Ok((records, generated.candidates_considered, filtered.discarded))
    }
}

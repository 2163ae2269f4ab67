//! Parameter sweeps over support × confidence.
//!
//! Each configuration is an independent run on the rayon pool with its own
//! itemsets and rules. Only the run-log sink is shared.

use crate::pipeline::{MiningConfig, MiningPipeline, MiningRun};
use crate::run_log::RunLogSink;
use rayon::prelude::*;
use rulemine_core::error::{Result, RuleMineError};
use rulemine_core::table::FeatureTable;
use rulemine_core::types::MiningMode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub supports: Vec<f64>,
    pub confidences: Vec<f64>,
    pub mode: MiningMode,
    pub max_len: Option<usize>,
}

impl SweepConfig {
    /// Support-major cartesian product.
    pub fn configs(&self) -> Vec<MiningConfig> {
        self.supports
            .iter()
            .flat_map(|&min_support| {
                self.confidences.iter().map(move |&min_confidence| MiningConfig {
                    min_support,
                    min_confidence,
                    mode: self.mode,
                    max_len: self.max_len,
                })
            })
            .collect()
    }

    /// Every configuration must be valid before any run starts.
    pub fn validate(&self) -> Result<()> {
        if self.supports.is_empty() {
            return Err(RuleMineError::Config(
                rulemine_core::error::ConfigError::MissingField("supports".into()),
            ));
        }
        if self.confidences.is_empty() {
            return Err(RuleMineError::Config(
                rulemine_core::error::ConfigError::MissingField("confidences".into()),
            ));
        }
        self.configs().iter().try_for_each(MiningConfig::validate)
    }
}

/// One sweep point and how its run went.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub config: MiningConfig,
    pub result: Result<MiningRun>,
}

/// Run every configuration concurrently. Outcomes come back in
/// [`SweepConfig::configs`] order.
pub fn run_sweep(
    training: &FeatureTable,
    sweep: &SweepConfig,
    sampling: (Option<usize>, Option<usize>),
    sink: Arc<dyn RunLogSink>,
) -> Result<Vec<SweepOutcome>> {
    sweep.validate()?;
    let configs = sweep.configs();
    info!(runs = configs.len(), mode = %sweep.mode, "sweep started");

    let outcomes: Vec<SweepOutcome> = configs
        .into_par_iter()
        .map(|config| {
            let result = MiningPipeline::new(config)
                .with_sink(Arc::clone(&sink))
                .with_sampling(sampling.0, sampling.1)
                .run(training);
            SweepOutcome { config, result }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(runs = outcomes.len(), failed, "sweep finished");
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_log::MemoryRunLog;
    use rulemine_core::types::NamespacePrefixes;

    fn scenario() -> FeatureTable {
        FeatureTable::from_transactions(
            &["inf_a1", "inf_a2", "usr_b1"],
            &[
                vec!["inf_a1", "inf_a2", "usr_b1"],
                vec!["inf_a1", "usr_b1"],
                vec!["inf_a2", "usr_b1"],
                vec!["inf_a1", "inf_a2"],
            ],
            &NamespacePrefixes::default(),
        )
        .unwrap()
    }

    #[test]
    fn outcomes_follow_sweep_order() {
        let sweep = SweepConfig {
            supports: vec![0.25, 0.5],
            confidences: vec![0.0, 0.6, 0.9],
            mode: MiningMode::Exhaustive,
            max_len: None,
        };
        let sink = Arc::new(MemoryRunLog::new());
        let outcomes = run_sweep(&scenario(), &sweep, (None, None), sink.clone()).unwrap();
        let order: Vec<(f64, f64)> = outcomes
            .iter()
            .map(|o| (o.config.min_support, o.config.min_confidence))
            .collect();
        assert_eq!(
            order,
            [(0.25, 0.0), (0.25, 0.6), (0.25, 0.9), (0.5, 0.0), (0.5, 0.6), (0.5, 0.9)]
        );
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert_eq!(sink.entries().unwrap().len(), 6);
    }

    #[test]
    fn invalid_point_aborts_before_any_run() {
        let sweep = SweepConfig {
            supports: vec![0.5, 1.5],
            confidences: vec![0.3],
            mode: MiningMode::MaximalOnly,
            max_len: None,
        };
        let sink = Arc::new(MemoryRunLog::new());
        let err = run_sweep(&scenario(), &sweep, (None, None), sink.clone()).unwrap_err();
        assert!(err.is_config());
        assert!(sink.entries().unwrap().is_empty());
    }
}

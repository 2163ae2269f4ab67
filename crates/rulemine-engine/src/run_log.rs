//! Run-log sinks - structured summaries of mining runs.
//!
//! The engine holds no global log state. Each mining run is handed a
//! [`RunLogSink`] and appends one [`RunSummary`] when it finishes, whether it
//! completed or failed. Sinks serialize appends internally, so one sink can
//! be shared by concurrent runs of a sweep.

use rulemine_core::error::{Result, RuleMineError};
use rulemine_core::types::MiningMode;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// Parameters of one mining invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Rows drawn from the source table, if it was sampled.
    #[serde(default)]
    pub sample_size: Option<usize>,
    /// Columns drawn from the source table, if it was sampled.
    #[serde(default)]
    pub feature_count: Option<usize>,
    pub min_support: f64,
    pub min_confidence: f64,
    pub mode: MiningMode,
    #[serde(default)]
    pub max_len: Option<usize>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed { reason: String },
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

/// One entry of the run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Seconds since the Unix epoch when the run started.
    pub started_at: u64,
    pub parameters: RunParameters,
    pub training_transactions: usize,
    pub itemset_ms: u64,
    pub itemset_count: usize,
    pub rule_ms: u64,
    /// Rules kept after the direction filter.
    pub rule_count: usize,
    pub total_ms: u64,
    #[serde(flatten)]
    pub status: RunStatus,
}

/// Append-only destination for run summaries.
pub trait RunLogSink: Send + Sync {
    fn append(&self, summary: &RunSummary) -> Result<()>;
}

/// Discards every summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRunLog;

impl RunLogSink for NullRunLog {
    fn append(&self, _summary: &RunSummary) -> Result<()> {
        Ok(())
    }
}

/// Keeps summaries in memory, in append order.
#[derive(Debug, Default)]
pub struct MemoryRunLog {
    entries: Mutex<Vec<RunSummary>>,
}

impl MemoryRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Result<Vec<RunSummary>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RuleMineError::Storage("run log lock poisoned".into()))?;
        Ok(entries.clone())
    }
}

impl RunLogSink for MemoryRunLog {
    fn append(&self, summary: &RunSummary) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| RuleMineError::Storage("run log lock poisoned".into()))?
            .push(summary.clone());
        Ok(())
    }
}

/// One JSON object per line, appended to a file.
#[derive(Debug)]
pub struct JsonlRunLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlRunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RunLogSink for JsonlRunLog {
    fn append(&self, summary: &RunSummary) -> Result<()> {
        let mut line = serde_json::to_string(summary)?;
        line.push('\n');
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RuleMineError::Storage("run log lock poisoned".into()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Read every summary from a JSONL run log. Blank lines are skipped.
pub fn read_run_log(path: &Path) -> Result<Vec<RunSummary>> {
    let text = std::fs::read_to_string(path)?;
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).map_err(RuleMineError::from))
        .collect()
}

/// Open a sink by file extension: `.jsonl`/`.json` for line-delimited
/// JSON, `.db`/`.sqlite` for SQLite (needs the `sqlite` feature).
pub fn open_run_log(path: &Path) -> Result<Box<dyn RunLogSink>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "jsonl" | "json" => Ok(Box::new(JsonlRunLog::new(path))),
        #[cfg(feature = "sqlite")]
        "db" | "sqlite" => Ok(Box::new(crate::sqlite_run_log::SqliteRunLog::open(path)?)),
        #[cfg(not(feature = "sqlite"))]
        "db" | "sqlite" => Err(RuleMineError::invalid_config(
            "output.run_log",
            path.display().to_string(),
            "SQLite run logs need the `sqlite` feature",
        )),
        _ => Err(RuleMineError::invalid_config(
            "output.run_log",
            path.display().to_string(),
            "expected a .jsonl or .db file",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(status: RunStatus) -> RunSummary {
        RunSummary {
            run_id: Uuid::new_v4(),
            started_at: 1_700_000_000,
            parameters: RunParameters {
                sample_size: Some(1000),
                feature_count: Some(40),
                min_support: 0.1,
                min_confidence: 0.3,
                mode: MiningMode::Exhaustive,
                max_len: None,
            },
            training_transactions: 700,
            itemset_ms: 12,
            itemset_count: 48,
            rule_ms: 3,
            rule_count: 9,
            total_ms: 16,
            status,
        }
    }

    #[test]
    fn jsonl_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.jsonl");
        let log = JsonlRunLog::new(&path);
        let first = summary(RunStatus::Completed);
        let second = summary(RunStatus::Failed {
            reason: "min_support out of range".into(),
        });
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let back = read_run_log(&path).unwrap();
        assert_eq!(back, vec![first, second]);
        assert!(back[0].status.is_completed());
        assert!(!back[1].status.is_completed());
    }

    #[test]
    fn status_is_flattened_into_the_record() {
        let json = serde_json::to_value(summary(RunStatus::Failed {
            reason: "boom".into(),
        }))
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
    }

    #[test]
    fn memory_log_keeps_entries() {
        let log = MemoryRunLog::new();
        log.append(&summary(RunStatus::Completed)).unwrap();
        assert_eq!(log.entries().unwrap().len(), 1);
    }

    #[test]
    fn unknown_extension_is_a_config_error() {
        let err = open_run_log(Path::new("runs.txt")).err().unwrap();
        assert!(err.is_config());
    }
}

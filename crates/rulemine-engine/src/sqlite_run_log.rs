//! SQLite-backed run log.
//!
//! One row per mining run. Parameters and status live in their own columns
//! so the log can be queried directly.

#![cfg(feature = "sqlite")]

use crate::run_log::{RunLogSink, RunParameters, RunStatus, RunSummary};
use rulemine_core::error::{Result, RuleMineError};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

fn storage(e: rusqlite::Error) -> RuleMineError {
    RuleMineError::Storage(e.to_string())
}

/// Run log stored in a SQLite database.
pub struct SqliteRunLog {
    conn: Mutex<Connection>,
}

impl SqliteRunLog {
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage)?;
        Self::init_with_connection(conn)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).map_err(storage)?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id TEXT NOT NULL UNIQUE,
                started_at INTEGER NOT NULL,
                sample_size INTEGER,
                feature_count INTEGER,
                min_support REAL NOT NULL,
                min_confidence REAL NOT NULL,
                mode TEXT NOT NULL,
                max_len INTEGER,
                training_transactions INTEGER NOT NULL,
                itemset_ms INTEGER NOT NULL,
                itemset_count INTEGER NOT NULL,
                rule_ms INTEGER NOT NULL,
                rule_count INTEGER NOT NULL,
                total_ms INTEGER NOT NULL,
                status TEXT NOT NULL,
                failure_reason TEXT
            );
            "#,
        )
        .map_err(storage)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Every logged run, in append order.
    pub fn runs(&self) -> Result<Vec<RunSummary>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RuleMineError::Storage("run log lock poisoned".into()))?;
        let mut stmt = conn
            .prepare(
                "SELECT run_id, started_at, sample_size, feature_count, min_support, \
                 min_confidence, mode, max_len, training_transactions, itemset_ms, \
                 itemset_count, rule_ms, rule_count, total_ms, status, failure_reason \
                 FROM runs ORDER BY seq",
            )
            .map_err(storage)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, Option<i64>>(7)?,
                    [
                        row.get::<_, i64>(8)?,
                        row.get::<_, i64>(9)?,
                        row.get::<_, i64>(10)?,
                        row.get::<_, i64>(11)?,
                        row.get::<_, i64>(12)?,
                        row.get::<_, i64>(13)?,
                    ],
                    row.get::<_, String>(14)?,
                    row.get::<_, Option<String>>(15)?,
                ))
            })
            .map_err(storage)?;

        let mut runs = Vec::new();
        for row in rows {
            let (id, started, sample, features, support, confidence, mode, max_len, counts, status, reason) =
                row.map_err(storage)?;
            let [training, itemset_ms, itemset_count, rule_ms, rule_count, total_ms] = counts;
            let status = match status.as_str() {
                "completed" => RunStatus::Completed,
                _ => RunStatus::Failed {
                    reason: reason.unwrap_or_default(),
                },
            };
            runs.push(RunSummary {
                run_id: uuid::Uuid::parse_str(&id)
                    .map_err(|e| RuleMineError::Storage(e.to_string()))?,
                started_at: started as u64,
                parameters: RunParameters {
                    sample_size: sample.map(|v| v as usize),
                    feature_count: features.map(|v| v as usize),
                    min_support: support,
                    min_confidence: confidence,
                    mode: mode.parse()?,
                    max_len: max_len.map(|v| v as usize),
                },
                training_transactions: training as usize,
                itemset_ms: itemset_ms as u64,
                itemset_count: itemset_count as usize,
                rule_ms: rule_ms as u64,
                rule_count: rule_count as usize,
                total_ms: total_ms as u64,
                status,
            });
        }
        Ok(runs)
    }
}

impl RunLogSink for SqliteRunLog {
    fn append(&self, summary: &RunSummary) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RuleMineError::Storage("run log lock poisoned".into()))?;
        let p = &summary.parameters;
        let (status, reason) = match &summary.status {
            RunStatus::Completed => ("completed", None),
            RunStatus::Failed { reason } => ("failed", Some(reason.as_str())),
        };
        conn.execute(
            "INSERT INTO runs (run_id, started_at, sample_size, feature_count, min_support, \
             min_confidence, mode, max_len, training_transactions, itemset_ms, itemset_count, \
             rule_ms, rule_count, total_ms, status, failure_reason) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                summary.run_id.to_string(),
                summary.started_at as i64,
                p.sample_size.map(|v| v as i64),
                p.feature_count.map(|v| v as i64),
                p.min_support,
                p.min_confidence,
                p.mode.to_string(),
                p.max_len.map(|v| v as i64),
                summary.training_transactions as i64,
                summary.itemset_ms as i64,
                summary.itemset_count as i64,
                summary.rule_ms as i64,
                summary.rule_count as i64,
                summary.total_ms as i64,
                status,
                reason,
            ],
        )
        .map_err(storage)?;
        Ok(())
    }
}

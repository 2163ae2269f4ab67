//! Numeric-to-boolean itemization.
//!
//! Binary columns pass through unchanged. Every other column `c` is split
//! at its mean into `c_low` (at or below) and `c_high` (strictly above).
//! Rows with any missing value are dropped before means are taken.

use crate::table_io::records;
use rulemine_core::error::{Result, TableError};
use rulemine_core::schema::Schema;
use rulemine_core::table::{BitColumn, FeatureTable};
use rulemine_core::types::NamespacePrefixes;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

pub const LOW_SUFFIX: &str = "_low";
pub const HIGH_SUFFIX: &str = "_high";

/// Row-major numeric table; `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizeConfig {
    /// Columns split at the mean even when they only hold 0 and 1.
    #[serde(default)]
    pub forced: Vec<String>,
}

fn parse_number(cell: &str) -> Option<Option<f64>> {
    match cell.to_ascii_lowercase().as_str() {
        "" | "na" | "nan" | "null" | "none" => Some(None),
        "true" => Some(Some(1.0)),
        "false" => Some(Some(0.0)),
        other => other.parse::<f64>().ok().filter(|v| !v.is_nan()).map(Some),
    }
}

pub fn parse_numeric_csv(text: &str) -> Result<NumericTable> {
    let mut records = records(text);
    let (_, columns) = records.next().ok_or(TableError::EmptyHeader)?;
    let mut rows = Vec::new();
    for (line, record) in records {
        if record.len() != columns.len() {
            return Err(TableError::RaggedRow {
                row: line,
                expected: columns.len(),
                found: record.len(),
            }
            .into());
        }
        let row = record
            .iter()
            .zip(&columns)
            .map(|(cell, column)| {
                parse_number(cell).ok_or_else(|| TableError::InvalidCell {
                    row: line,
                    column: column.clone(),
                    value: cell.clone(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(NumericTable { columns, rows })
}

pub fn read_numeric_csv(path: &Path) -> Result<NumericTable> {
    let text = std::fs::read_to_string(path)?;
    parse_numeric_csv(&text)
}

/// Turn a numeric table into a boolean feature table.
pub fn itemize(
    numeric: &NumericTable,
    config: &ItemizeConfig,
    prefixes: &NamespacePrefixes,
) -> Result<FeatureTable> {
    let complete: Vec<Vec<f64>> = numeric
        .rows
        .iter()
        .filter_map(|row| row.iter().copied().collect::<Option<Vec<f64>>>())
        .collect();
    let dropped = numeric.rows.len() - complete.len();
    if dropped > 0 {
        info!(dropped, kept = complete.len(), "rows with missing values dropped");
    }

    let forced: HashSet<&str> = config.forced.iter().map(String::as_str).collect();
    let mut names = Vec::new();
    let mut columns = Vec::new();
    for (col, name) in numeric.columns.iter().enumerate() {
        let values: Vec<f64> = complete.iter().map(|row| row[col]).collect();
        let binary = values.iter().all(|&v| v == 0.0 || v == 1.0);
        if binary && !forced.contains(name.as_str()) {
            let bools: Vec<bool> = values.iter().map(|&v| v == 1.0).collect();
            names.push(name.clone());
            columns.push(BitColumn::from_bools(&bools));
            continue;
        }

        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
        let high: Vec<bool> = values.iter().map(|&v| v > mean).collect();
        let low: Vec<bool> = high.iter().map(|&h| !h).collect();
        debug!(column = %name, mean, "column itemized");
        names.push(format!("{}{}", name, LOW_SUFFIX));
        columns.push(BitColumn::from_bools(&low));
        names.push(format!("{}{}", name, HIGH_SUFFIX));
        columns.push(BitColumn::from_bools(&high));
    }

    let schema = Schema::from_columns(&names, prefixes)?;
    FeatureTable::new(schema, columns, complete.len())
}

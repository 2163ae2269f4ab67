//! Boolean feature tables as CSV.
//!
//! The first line is the header of feature names; each following line is one
//! transaction. Cells are `0`/`1`, `true`/`false` or `0.0`/`1.0`. The typed
//! schema is built once from the header, so a column with neither reserved
//! prefix fails the load.

use rulemine_core::error::{Result, TableError};
use rulemine_core::schema::Schema;
use rulemine_core::table::{BitColumn, FeatureTable};
use rulemine_core::types::{Namespace, NamespacePrefixes};
use std::path::Path;
use tracing::{debug, warn};

/// Split one CSV record. Double-quoted fields may contain commas; `""`
/// inside quotes is a literal quote. Fields are trimmed.
pub(crate) fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Non-empty data lines with their 1-based line numbers, header first.
pub(crate) fn records(text: &str) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(n, l)| (n, split_record(l)))
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}

/// Parse a boolean feature table from CSV text.
pub fn parse_table_csv(text: &str, prefixes: &NamespacePrefixes) -> Result<FeatureTable> {
    let mut records = records(text);
    let (_, header) = records.next().ok_or(TableError::EmptyHeader)?;
    if header.iter().all(|h| h.is_empty()) {
        return Err(TableError::EmptyHeader.into());
    }
    let schema = Schema::from_columns(&header, prefixes)?;

    let mut cells: Vec<Vec<bool>> = vec![Vec::new(); header.len()];
    let mut rows = 0;
    for (line, record) in records {
        if record.len() != header.len() {
            return Err(TableError::RaggedRow {
                row: line,
                expected: header.len(),
                found: record.len(),
            }
            .into());
        }
        for (col, cell) in record.iter().enumerate() {
            let value = parse_bool(cell).ok_or_else(|| TableError::InvalidCell {
                row: line,
                column: header[col].clone(),
                value: cell.clone(),
            })?;
            cells[col].push(value);
        }
        rows += 1;
    }

    let columns = cells.iter().map(|c| BitColumn::from_bools(c)).collect();
    let influencer = schema.count_in(Namespace::Influencer);
    let user = schema.count_in(Namespace::User);
    if influencer == 0 || user == 0 {
        warn!(influencer, user, "table lacks one namespace; no directional rule can survive");
    }
    let table = FeatureTable::new(schema, columns, rows)?;
    debug!(
        rows = table.num_rows(),
        influencer,
        user,
        "feature table parsed"
    );
    Ok(table)
}

pub fn read_table_csv(path: &Path, prefixes: &NamespacePrefixes) -> Result<FeatureTable> {
    let text = std::fs::read_to_string(path)?;
    parse_table_csv(&text, prefixes)
}

/// Render as CSV with `0`/`1` cells.
pub fn table_to_csv(table: &FeatureTable) -> String {
    let mut out = table.schema().names().join(",");
    out.push('\n');
    for row in table.to_rows() {
        let cells: Vec<&str> = row.iter().map(|&v| if v { "1" } else { "0" }).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

pub fn write_table_csv(path: &Path, table: &FeatureTable) -> Result<()> {
    std::fs::write(path, table_to_csv(table))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::error::RuleMineError;

    #[test]
    fn parses_mixed_boolean_spellings() {
        let text = "inf_a,inf_b,usr_c\r\n1,0,true\n0.0,1.0,FALSE\n\n\"1\",1,0\n";
        let table = parse_table_csv(text, &NamespacePrefixes::default()).unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_features(), 3);
        let c = table.schema().require("usr_c").unwrap();
        assert_eq!(table.support_count(&[c]), 1);
    }

    #[test]
    fn rejects_unprefixed_columns() {
        let err = parse_table_csv("inf_a,conversation_id\n1,0\n", &NamespacePrefixes::default())
            .unwrap_err();
        assert_eq!(
            err,
            RuleMineError::Table(TableError::UnknownNamespace("conversation_id".into()))
        );
    }

    #[test]
    fn ragged_and_invalid_rows_fail() {
        let p = NamespacePrefixes::default();
        assert!(matches!(
            parse_table_csv("inf_a,usr_b\n1\n", &p).unwrap_err(),
            RuleMineError::Table(TableError::RaggedRow { row: 2, .. })
        ));
        assert!(matches!(
            parse_table_csv("inf_a,usr_b\n1,yes\n", &p).unwrap_err(),
            RuleMineError::Table(TableError::InvalidCell { .. })
        ));
        assert!(matches!(
            parse_table_csv("", &p).unwrap_err(),
            RuleMineError::Table(TableError::EmptyHeader)
        ));
    }

    #[test]
    fn written_table_reads_back() {
        let p = NamespacePrefixes::default();
        let table = parse_table_csv("inf_a,usr_b\n1,0\n1,1\n", &p).unwrap();
        assert_eq!(parse_table_csv(&table_to_csv(&table), &p).unwrap(), table);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        assert_eq!(split_record(r#"a, "b,c" ,"d""e""#), vec!["a", "b,c", "d\"e"]);
    }
}

//! The boolean feature table the engine mines and validates against.
//!
//! Stored column-major as packed bit columns: the support of an itemset is
//! the popcount of the AND of its columns, and the transactions covered by
//! a rule's antecedent are the AND of the antecedent's columns.

use crate::error::{Result, TableError};
use crate::schema::Schema;
use crate::types::{FeatureId, NamespacePrefixes};

const WORD_BITS: usize = 64;

/// A packed column of booleans, one bit per transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitColumn {
    words: Vec<u64>,
    len: usize,
}

impl BitColumn {
    /// All-false column.
    pub fn zeros(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// All-true column. Tail bits past `len` stay clear.
    pub fn ones(len: usize) -> Self {
        let mut col = Self {
            words: vec![u64::MAX; len.div_ceil(WORD_BITS)],
            len,
        };
        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = col.words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        col
    }

    pub fn from_bools(values: &[bool]) -> Self {
        let mut col = Self::zeros(values.len());
        for (i, &v) in values.iter().enumerate() {
            if v {
                col.set(i);
            }
        }
        col
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set(&mut self, i: usize) {
        debug_assert!(i < self.len);
        self.words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
    }

    pub fn get(&self, i: usize) -> bool {
        i < self.len && self.words[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn and_assign(&mut self, other: &BitColumn) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// Popcount of `self AND other` without allocating.
    pub fn and_count(&self, other: &BitColumn) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Indices of set bits, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.get(i))
    }
}

/// Boolean matrix: rows are transactions, columns are namespaced features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    schema: Schema,
    columns: Vec<BitColumn>,
    rows: usize,
}

impl FeatureTable {
    /// Assemble a table from pre-built columns. All columns must have the
    /// same length and there must be one per schema feature.
    pub fn new(schema: Schema, columns: Vec<BitColumn>, rows: usize) -> Result<Self> {
        if columns.len() != schema.len() {
            return Err(TableError::ColumnCount {
                expected: schema.len(),
                found: columns.len(),
            }
            .into());
        }
        if let Some((i, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != rows) {
            return Err(TableError::ColumnLength {
                column: schema.name(FeatureId::from(i)).to_string(),
                expected: rows,
                found: col.len(),
            }
            .into());
        }
        Ok(Self {
            schema,
            columns,
            rows,
        })
    }

    /// Build from row-major booleans.
    pub fn from_rows(schema: Schema, rows: &[Vec<bool>]) -> Result<Self> {
        let mut columns = vec![BitColumn::zeros(rows.len()); schema.len()];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(TableError::RaggedRow {
                    row: r,
                    expected: schema.len(),
                    found: row.len(),
                }
                .into());
            }
            for (c, &v) in row.iter().enumerate() {
                if v {
                    columns[c].set(r);
                }
            }
        }
        Self::new(schema, columns, rows.len())
    }

    /// Build from transactions given as the names of their true features.
    pub fn from_transactions<S: AsRef<str>>(
        columns: &[S],
        transactions: &[Vec<&str>],
        prefixes: &NamespacePrefixes,
    ) -> Result<Self> {
        let schema = Schema::from_columns(columns, prefixes)?;
        let mut bits = vec![BitColumn::zeros(transactions.len()); schema.len()];
        for (r, tx) in transactions.iter().enumerate() {
            for name in tx {
                let id = schema.require(name)?;
                bits[id.index()].set(r);
            }
        }
        Self::new(schema, bits, transactions.len())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_features(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, id: FeatureId) -> &BitColumn {
        &self.columns[id.index()]
    }

    pub fn value(&self, row: usize, id: FeatureId) -> bool {
        self.columns[id.index()].get(row)
    }

    /// Transactions in which every given feature is true. An empty feature
    /// list covers every transaction.
    pub fn cover(&self, ids: &[FeatureId]) -> BitColumn {
        let mut cover = BitColumn::ones(self.rows);
        for &id in ids {
            cover.and_assign(self.column(id));
        }
        cover
    }

    /// Absolute support: number of transactions containing every feature.
    pub fn support_count(&self, ids: &[FeatureId]) -> usize {
        match ids {
            [] => self.rows,
            [only] => self.column(*only).count_ones(),
            [first, second] => self.column(*first).and_count(self.column(*second)),
            _ => self.cover(ids).count_ones(),
        }
    }

    /// Relative support in `[0, 1]`; zero for an empty table.
    pub fn support(&self, ids: &[FeatureId]) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.support_count(ids) as f64 / self.rows as f64
    }

    /// New table holding the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|col| {
                let mut out = BitColumn::zeros(rows.len());
                for (new_row, &old_row) in rows.iter().enumerate() {
                    if col.get(old_row) {
                        out.set(new_row);
                    }
                }
                out
            })
            .collect();
        Self {
            schema: self.schema.clone(),
            columns,
            rows: rows.len(),
        }
    }

    /// New table holding the given features, in the given order.
    pub fn select_features(&self, ids: &[FeatureId]) -> Result<Self> {
        let schema = self.schema.project(ids)?;
        let columns = ids.iter().map(|&id| self.column(id).clone()).collect();
        Self::new(schema, columns, self.rows)
    }

    /// Row-major copy, mainly for writing the table back out.
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.rows)
            .map(|r| self.columns.iter().map(|c| c.get(r)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleMineError;

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
    fn bit_column_ones_masks_tail() {
        let col = BitColumn::ones(70);
        assert_eq!(col.count_ones(), 70);
        assert!(col.get(69));
        assert!(!col.get(70));
    }

    #[test]
    fn support_counts() {
        let table = scenario();
        let a1 = table.schema().require("inf_a1").unwrap();
        let a2 = table.schema().require("inf_a2").unwrap();
        let b1 = table.schema().require("usr_b1").unwrap();
        assert_eq!(table.support_count(&[a1]), 3);
        assert_eq!(table.support_count(&[a1, b1]), 2);
        assert_eq!(table.support_count(&[a1, a2, b1]), 1);
        assert!((table.support(&[a1, b1]) - 0.5).abs() < 1e-12);
        assert!((table.support(&[a1, a2, b1]) - 0.25).abs() < 1e-12);
        assert_eq!(table.support_count(&[]), 4);
    }

    #[test]
    fn select_rows_and_features() {
        let table = scenario();
        let sub = table.select_rows(&[3, 1]);
        assert_eq!(sub.num_rows(), 2);
        let b1 = sub.schema().require("usr_b1").unwrap();
        assert!(!sub.value(0, b1));
        assert!(sub.value(1, b1));

        let a2 = table.schema().require("inf_a2").unwrap();
        let narrow = table.select_features(&[a2]).unwrap();
        assert_eq!(narrow.num_features(), 1);
        assert_eq!(narrow.support_count(&[FeatureId(0)]), 3);
    }

    #[test]
    fn ragged_rows_rejected() {
        let schema =
            Schema::from_columns(&["inf_a", "usr_b"], &NamespacePrefixes::default()).unwrap();
        let err = FeatureTable::from_rows(schema, &[vec![true, false], vec![true]]).unwrap_err();
        assert!(err.to_string().contains("Row 1 has 1 cells"));
    }

    #[test]
    fn prebuilt_columns_must_match_schema() {
        let prefixes = NamespacePrefixes::default();
        let schema = Schema::from_columns(&["inf_a", "usr_b"], &prefixes).unwrap();

        let err = FeatureTable::new(schema.clone(), vec![BitColumn::zeros(3)], 3).unwrap_err();
        assert_eq!(
            err,
            RuleMineError::Table(TableError::ColumnCount { expected: 2, found: 1 })
        );

        let err = FeatureTable::new(schema, vec![BitColumn::zeros(3), BitColumn::zeros(2)], 3)
            .unwrap_err();
        assert_eq!(
            err,
            RuleMineError::Table(TableError::ColumnLength {
                column: "usr_b".into(),
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn empty_table_has_zero_support() {
        let schema = Schema::from_columns(&["inf_a"], &NamespacePrefixes::default()).unwrap();
        let table = FeatureTable::from_rows(schema, &[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.support(&[FeatureId(0)]), 0.0);
    }
}

//! Error types for rule mining operations.
//!
//! Provides structured error handling instead of panics.

use thiserror::Error;

/// Result type for rule mining operations.
pub type Result<T> = std::result::Result<T, RuleMineError>;

/// Errors that can occur during mining, persistence, or validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleMineError {
    /// Configuration errors.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// Feature table errors.
    #[error("Table error: {0}")]
    Table(#[from] TableError),
    /// Persisted feature-set errors.
    #[error("Itemset error: {0}")]
    Itemset(#[from] ItemsetParseError),
    /// Sampling or partitioning errors.
    #[error("Sampling error: {0}")]
    Sampling(String),
    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(String),
    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Run-log storage errors.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for RuleMineError {
    fn from(e: std::io::Error) -> Self {
        RuleMineError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for RuleMineError {
    fn from(e: serde_json::Error) -> Self {
        RuleMineError::Serialization(e.to_string())
    }
}

/// Configuration errors. Always fatal: raised before any mining work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid value.
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Missing required field.
    #[error("Missing required field: {0}")]
    MissingField(String),
    /// Out of range.
    #[error("{field} out of range: {value} (must be in {range})")]
    OutOfRange {
        field: String,
        range: String,
        value: f64,
    },
}

/// Feature table errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// Column name carries neither reserved namespace prefix.
    #[error("Column '{0}' has no known namespace prefix")]
    UnknownNamespace(String),
    /// Same column name appears twice.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    /// Header line is missing or empty.
    #[error("Table has no header")]
    EmptyHeader,
    /// Row has a different number of cells than the header.
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Cell could not be read as a boolean (or number, for itemization).
    #[error("Invalid cell at row {row}, column '{column}': '{value}'")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
    /// Feature referenced by name does not exist.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
    /// Pre-built columns don't match the schema width.
    #[error("Table has {found} columns, schema has {expected}")]
    ColumnCount { expected: usize, found: usize },
    /// A pre-built column has the wrong number of rows.
    #[error("Column '{column}' has {found} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Errors reconstructing a persisted feature set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemsetParseError {
    #[error("Feature set must be wrapped in braces: '{0}'")]
    MissingBraces(String),
    #[error("Dangling escape at end of feature set: '{0}'")]
    DanglingEscape(String),
    #[error("Invalid escape '\\{found}' in feature set: '{input}'")]
    InvalidEscape { found: char, input: String },
    #[error("Unescaped '{found}' inside feature set: '{input}'")]
    UnescapedDelimiter { found: char, input: String },
    #[error("Empty feature name in feature set: '{0}'")]
    EmptyElement(String),
    #[error("Duplicate feature '{name}' in feature set: '{input}'")]
    DuplicateElement { name: String, input: String },
    #[error("Feature set is empty")]
    EmptySet,
    #[error("Itemset ids must be strictly ascending: {0}")]
    UnorderedIds(String),
}

// Convenience constructors
impl RuleMineError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        RuleMineError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, range: impl Into<String>, value: f64) -> Self {
        RuleMineError::Config(ConfigError::OutOfRange {
            field: field.into(),
            range: range.into(),
            value,
        })
    }

    pub fn unknown_feature(name: impl Into<String>) -> Self {
        RuleMineError::Table(TableError::UnknownFeature(name.into()))
    }

    pub fn sampling(msg: impl Into<String>) -> Self {
        RuleMineError::Sampling(msg.into())
    }

    /// Whether this error should abort the process before any work starts.
    pub fn is_config(&self) -> bool {
        matches!(self, RuleMineError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_render_field_and_range() {
        let err = RuleMineError::out_of_range("min_support", "(0, 1]", 1.5);
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Config error: min_support out of range: 1.5 (must be in (0, 1])"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: RuleMineError = io.into();
        assert!(matches!(err, RuleMineError::Io(ref m) if m.contains("missing.csv")));
        assert!(!err.is_config());
    }
}

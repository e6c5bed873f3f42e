use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a tabular source into a [`Dataset`](crate::data::model::Dataset).
///
/// Recovered by the loader's fixture fallback unless strict mode is on.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("malformed Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("ill-formed source: {0}")]
    Malformed(String),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("column '{0}' appears more than once after normalization")]
    DuplicateColumn(String),

    #[error("row {row}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("source contains no data rows")]
    Empty,
}

/// Failure to resolve a named statistic from the derived artifacts.
///
/// Never defaulted: callers omit or flag whatever depended on the value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("'{key}' not found in {table}")]
    KeyNotFound { table: String, key: String },

    #[error("group '{group}' has no valid '{field}' values")]
    NoValue { group: String, field: String },

    #[error("correlation between '{a}' and '{b}' is undefined")]
    UndefinedCorrelation { a: String, b: String },
}

impl LookupError {
    pub(crate) fn key_not_found(table: impl Into<String>, key: impl Into<String>) -> Self {
        LookupError::KeyNotFound {
            table: table.into(),
            key: key.into(),
        }
    }
}

/// Failure to read or parse the TOML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

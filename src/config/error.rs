//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A numeric variable was set but does not parse.
    #[error("failed to parse {name}='{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// `default_n` exceeds `max_n`, or `max_n` is zero.
    #[error("default count {default_n} must be between 1 and the maximum {max_n}")]
    CountLimit { default_n: usize, max_n: usize },

    /// Duplicate-id policy is not one of `first`, `keep`, `reject`.
    #[error("invalid duplicate id policy '{value}': expected first, keep or reject")]
    InvalidDuplicatePolicy { value: String },

    /// A column-name variable was set but blank.
    #[error("column name in {name} must not be empty")]
    EmptyColumnName { name: &'static str },

    /// Identifier and label columns point at the same column.
    #[error("identifier and target column are both '{column}'")]
    ColumnClash { column: String },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

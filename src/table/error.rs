use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("data file not found: {path}")]
    DataNotFound { path: PathBuf },

    #[error("schema error: {reason}")]
    Schema { reason: String },

    #[error("table has no rows: {source_name}")]
    EmptyPool { source_name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TableError {
    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        TableError::Schema {
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_column(column: &str, source_name: &str) -> Self {
        TableError::Schema {
            reason: format!("required column '{}' not found in {}", column, source_name),
        }
    }
}

pub type TableResult<T> = Result<T, TableError>;

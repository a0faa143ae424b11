use std::path::PathBuf;
use thiserror::Error;

use crate::table::TableError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model artifact {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("failed to write model artifact {path}: {reason}")]
    Save { path: PathBuf, reason: String },

    #[error("training failed: {reason}")]
    Training { reason: String },

    #[error("model returned {got} scores for {expected} rows")]
    InvalidOutput { expected: usize, got: usize },

    #[error(transparent)]
    Table(#[from] TableError),
}

impl ModelError {
    pub(crate) fn training(reason: impl Into<String>) -> Self {
        ModelError::Training {
            reason: reason.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

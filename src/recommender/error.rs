use thiserror::Error;

use crate::model::ModelError;
use crate::sink::SinkError;
use crate::table::TableError;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl RecommendError {
    /// The table error underneath, if any, including one raised while training.
    pub fn table_error(&self) -> Option<&TableError> {
        match self {
            RecommendError::Table(e) | RecommendError::Model(ModelError::Table(e)) => Some(e),
            _ => None,
        }
    }

    /// Missing or malformed input data, or a bad user id: the caller can fix these.
    pub fn is_client_error(&self) -> bool {
        match self {
            RecommendError::Sink(SinkError::InvalidUserId { .. }) => true,
            _ => matches!(
                self.table_error(),
                Some(TableError::DataNotFound { .. } | TableError::Schema { .. } | TableError::EmptyPool { .. })
            ),
        }
    }
}

pub type RecommendResult<T> = Result<T, RecommendError>;

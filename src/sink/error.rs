use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid user id (path traversal?): {user_id:?}")]
    InvalidUserId { user_id: String },

    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize delivery: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SinkResult<T> = Result<T, SinkError>;

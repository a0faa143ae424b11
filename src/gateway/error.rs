use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cache::JOBREC_STATUS_HEADER;
use crate::model::ModelError;
use crate::recommender::RecommendError;
use crate::table::TableError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            GatewayError::Recommend(err) => recommend_status(err),
        }
    }
}

fn recommend_status(err: &RecommendError) -> (StatusCode, &'static str) {
    if err.is_client_error() {
        return match (err, err.table_error()) {
            (RecommendError::Sink(_), _) => (StatusCode::BAD_REQUEST, "invalid_request"),
            (_, Some(TableError::DataNotFound { .. })) => (StatusCode::NOT_FOUND, "data_not_found"),
            (_, Some(TableError::EmptyPool { .. })) => (StatusCode::UNPROCESSABLE_ENTITY, "empty_pool"),
            _ => (StatusCode::UNPROCESSABLE_ENTITY, "schema_error"),
        };
    }

    match err {
        _ if err.table_error().is_some() => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        RecommendError::Model(ModelError::Training { .. }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "training_error")
        }
        RecommendError::Model(_) => (StatusCode::INTERNAL_SERVER_ERROR, "model_error"),
        RecommendError::Sink(_) => (StatusCode::BAD_GATEWAY, "sink_error"),
        RecommendError::Table(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, jobrec_status) = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(JOBREC_STATUS_HEADER, HeaderValue::from_static(jobrec_status));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}

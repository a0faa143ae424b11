use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cache::{CacheTarget, JOBREC_STATUS_HEADER, JOBREC_STATUS_READY, ScoredEntity};
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::materialize::DisplayRecord;
use crate::model::ModelLoader;
use crate::recommender::{RecommendResult, Recommender};
use crate::selection::SelectionPolicy;
use crate::table::TableSource;

/// Entries returned by `/v1/ranked` without a `limit`.
pub const DEFAULT_RANKED_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyName {
    #[default]
    Top,
    Block,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationRequest {
    pub user_id: Option<String>,
    /// Signed so that zero and negative counts mean "none" instead of a parse error.
    pub n: Option<i64>,
    #[serde(default)]
    pub shown: Vec<String>,
    #[serde(default)]
    pub randomize: bool,
    #[serde(default)]
    pub policy: PolicyName,
}

impl RecommendationRequest {
    /// Requested count, with non-positive values meaning none and large ones clamped to `max_n`.
    pub fn count(&self, default_n: usize, max_n: usize) -> usize {
        let n = match self.n {
            Some(n) if n <= 0 => 0,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => default_n,
        };
        n.min(max_n)
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        match self.policy {
            PolicyName::Top => SelectionPolicy::Top {
                shown: self.shown.iter().cloned().collect::<HashSet<_>>(),
                randomize: self.randomize,
            },
            PolicyName::Block => SelectionPolicy::RandomBlock,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub records: Vec<DisplayRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub target: CacheTarget,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub target: CacheTarget,
    pub status: &'static str,
}

#[instrument(skip(state, body), fields(policy = tracing::field::Empty, n = tracing::field::Empty))]
pub async fn recommendations_handler<L, S>(
    State(state): State<HandlerState<L, S>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    L: ModelLoader + 'static,
    S: TableSource + 'static,
{
    let request: RecommendationRequest = serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let n = request.count(state.default_n, state.max_n);
    let policy = request.selection_policy();
    let span = tracing::Span::current();
    span.record("policy", policy.name());
    span.record("n", n as u64);

    let user_id = request.user_id.clone();
    let records = run_blocking(&state.recommender, move |rec| {
        let records = rec.recommend_records(n, &policy)?;
        if let Some(user_id) = user_id.as_deref() {
            rec.deliver(user_id, &records)?;
        }
        Ok(records)
    })
    .await?;

    debug!(returned = records.len(), delivered = request.user_id.is_some(), "Recommendations served");
    Ok(with_status(
        StatusCode::OK,
        JOBREC_STATUS_READY,
        Json(RecommendationResponse { records }),
    ))
}

#[instrument(skip(state))]
pub async fn ranked_handler<L, S>(
    State(state): State<HandlerState<L, S>>,
    Query(query): Query<RankedQuery>,
) -> Result<Response, GatewayError>
where
    L: ModelLoader + 'static,
    S: TableSource + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_RANKED_LIMIT);
    let entries: Vec<ScoredEntity> = run_blocking(&state.recommender, move |rec| {
        Ok(rec.ranked_scores()?.top(limit).to_vec())
    })
    .await?;

    Ok(with_status(StatusCode::OK, JOBREC_STATUS_READY, Json(entries)))
}

#[instrument(skip(state, body))]
pub async fn invalidate_handler<L, S>(
    State(state): State<HandlerState<L, S>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    L: ModelLoader + 'static,
    S: TableSource + 'static,
{
    let request: InvalidateRequest = serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid invalidate request: {}", e)))?;
    let target = request.target;

    run_blocking(&state.recommender, move |rec| rec.invalidate(target)).await?;
    info!(target = %target, "Cache invalidated via API");

    Ok(with_status(
        StatusCode::OK,
        "invalidated",
        Json(InvalidateResponse {
            target,
            status: "invalidated",
        }),
    ))
}

/// Cache loads can train a model or read a large table; keep them off the runtime threads.
async fn run_blocking<L, S, T, F>(
    recommender: &Arc<Recommender<L, S>>,
    work: F,
) -> Result<T, GatewayError>
where
    L: ModelLoader + 'static,
    S: TableSource + 'static,
    T: Send + 'static,
    F: FnOnce(&Recommender<L, S>) -> RecommendResult<T> + Send + 'static,
{
    let recommender = Arc::clone(recommender);
    tokio::task::spawn_blocking(move || work(&recommender))
        .await
        .map_err(|e| GatewayError::InternalError(format!("worker task failed: {}", e)))?
        .map_err(GatewayError::from)
}

fn with_status(status: StatusCode, jobrec_status: &'static str, body: impl IntoResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(JOBREC_STATUS_HEADER, HeaderValue::from_static(jobrec_status));
    (status, headers, body).into_response()
}

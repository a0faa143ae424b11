//! HTTP gateway (Axum) for recommendations and cache control.
//!
//! This module is primarily used by the `jobrec` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{invalidate_handler, ranked_handler, recommendations_handler};
pub use state::HandlerState;

use crate::cache::{
    JOBREC_STATUS_HEADER, JOBREC_STATUS_HEALTHY, JOBREC_STATUS_NOT_READY, JOBREC_STATUS_READY,
};
use crate::model::ModelLoader;
use crate::table::TableSource;

pub fn create_router_with_state<L, S>(state: HandlerState<L, S>) -> Router
where
    L: ModelLoader + 'static,
    S: TableSource + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<L, S>))
        .route("/v1/recommendations", post(recommendations_handler::<L, S>))
        .route("/v1/ranked", get(ranked_handler::<L, S>))
        .route("/v1/cache/invalidate", post(invalidate_handler::<L, S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub model: &'static str,
    pub pool: &'static str,
    pub ranking: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        JOBREC_STATUS_HEADER,
        HeaderValue::from_static(JOBREC_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<L, S>(State(state): State<HandlerState<L, S>>) -> Response
where
    L: ModelLoader + 'static,
    S: TableSource + 'static,
{
    let rec = &state.recommender;
    let loaded = |ready: bool| if ready { JOBREC_STATUS_READY } else { "pending" };

    let components = ComponentStatus {
        http: JOBREC_STATUS_READY,
        model: loaded(rec.model_cache().is_loaded()),
        pool: loaded(rec.pool().is_loaded()),
        ranking: loaded(rec.ranked_cache().is_loaded()),
    };

    let is_ready = rec.is_ready();
    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(
        JOBREC_STATUS_HEADER,
        HeaderValue::from_static(if is_ready {
            JOBREC_STATUS_READY
        } else {
            JOBREC_STATUS_NOT_READY
        }),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}

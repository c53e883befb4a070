//! HTTP relay that forwards survey submissions to the spreadsheet endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use shared::protocol::{health_route, submit_route, SubmitResponse};
use tracing::{error, info, warn};

pub mod config;
pub mod forward;

pub use forward::{RelayError, RelayErrorKind, SubmissionRelay};

const MAX_SUBMISSION_BYTES: usize = 64 * 1024;

#[derive(Clone)]
struct AppState {
    relay: SubmissionRelay,
}

pub fn build_router(relay: SubmissionRelay) -> Router {
    let state = Arc::new(AppState { relay });
    Router::new()
        .route(health_route(), get(healthz))
        .route(submit_route(), post(submit_survey))
        .layer(DefaultBodyLimit::max(MAX_SUBMISSION_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

/// Every failure, including an unreadable or non-JSON body, gets the same
/// 500 response. The content type is not checked.
async fn submit_survey(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<SubmitResponse>)> {
    match forward_body(&state.relay, body).await {
        Ok(()) => {
            info!("survey submission stored");
            Ok(Json(SubmitResponse::accepted()))
        }
        Err(err) => {
            log_relay_failure(&err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitResponse::failed()),
            ))
        }
    }
}

async fn forward_body(
    relay: &SubmissionRelay,
    body: Result<Bytes, BytesRejection>,
) -> Result<(), RelayError> {
    let body = body.map_err(RelayError::UnreadableBody)?;
    let payload: Value = serde_json::from_slice(&body).map_err(RelayError::InvalidPayload)?;
    relay.relay(&payload).await
}

fn log_relay_failure(err: &RelayError) {
    match err.kind() {
        RelayErrorKind::InvalidRequest => {
            warn!(error = %err, "discarding unreadable survey submission");
        }
        RelayErrorKind::Configuration => {
            error!(error = %err, "survey relay is misconfigured");
        }
        RelayErrorKind::Network => {
            error!(
                error = %err,
                upstream_body = %err.upstream_body().unwrap_or_default(),
                "could not reach spreadsheet destination"
            );
        }
        RelayErrorKind::UpstreamRejection => {
            error!(
                error = %err,
                upstream_body = %err.upstream_body().unwrap_or_default(),
                "spreadsheet destination rejected survey submission"
            );
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

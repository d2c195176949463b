use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;

use super::domain::DocumentClassification;
use super::scoring::PortfolioAnalyzer;
use super::similarity::{self, MatchThresholds};

/// Shared state behind the scoring endpoints.
pub struct ScoringState {
    pub analyzer: Arc<PortfolioAnalyzer>,
    pub thresholds: MatchThresholds,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub detected: String,
    #[serde(default)]
    pub claimed: String,
}

/// Router exposing offline scoring of pre-classified documents and label matching.
pub fn portfolio_router(analyzer: Arc<PortfolioAnalyzer>, thresholds: MatchThresholds) -> Router {
    let state = Arc::new(ScoringState {
        analyzer,
        thresholds,
    });

    Router::new()
        .route("/api/v1/portfolio/summary", post(summary_handler))
        .route("/api/v1/portfolio/match", post(match_handler))
        .with_state(state)
}

pub(crate) async fn summary_handler(
    State(state): State<Arc<ScoringState>>,
    axum::Json(documents): axum::Json<Vec<DocumentClassification>>,
) -> Response {
    let summary = state.analyzer.analyze(&documents);
    (StatusCode::OK, axum::Json(summary)).into_response()
}

pub(crate) async fn match_handler(
    State(state): State<Arc<ScoringState>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response {
    let outcome = similarity::evaluate(&request.detected, &request.claimed, state.thresholds);
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

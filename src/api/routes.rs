use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::{Result, AppError};
use crate::api::models::{SummarizeRequest, SummaryResponse};
use crate::api::response;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api", post(summarize_handler))
        .route("/api/", post(summarize_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.config.backend.model,
    }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SummaryResponse>)> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(%rejection, "Rejected request body");
        AppError::InvalidInput("Invalid JSON body".to_string())
    })?;

    let url = req
        .url
        .as_deref()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Valid URL required".to_string()))?;

    info!(%url, summarize = ?req.summarize, "Processing request");
    let summary = state.pipeline.run(url).await?;

    Ok(response::success(summary))
}

//! REST API routes

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use lapstory_core::{
    model::{Highlight, TelemetryFrame},
    narrative::{self, BroadcastCard},
};
use lapstory_stream::ConnectionState;
use serde::Serialize;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/frames", post(push_frame).delete(clear_frames))
        .route("/api/frames/latest", get(latest_frame))
        .route("/api/highlights", get(highlights))
        .route("/api/highlights/summaries", get(summaries))
        .route("/api/highlights/cards", get(cards))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Status Endpoint ===

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusInfo {
    state: ConnectionState,
    buffered_frames: usize,
    capacity: usize,
    latest_lap: Option<u32>,
    feature_flags: HashMap<String, bool>,
}

async fn status(State(state): State<AppState>) -> Json<StatusInfo> {
    let buffer = state.buffer.read().await;
    Json(StatusInfo {
        state: state.connection_state(),
        buffered_frames: buffer.len(),
        capacity: buffer.capacity(),
        latest_lap: buffer.latest().map(|f| f.lap),
        feature_flags: state.feature_flags.borrow().clone(),
    })
}

// === Frame Endpoints ===

async fn latest_frame(
    State(state): State<AppState>,
) -> Result<Json<TelemetryFrame>, (StatusCode, String)> {
    let buffer = state.buffer.read().await;
    buffer
        .latest()
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "No telemetry received yet".to_string()))
}

async fn push_frame(
    State(state): State<AppState>,
    Json(frame): Json<TelemetryFrame>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let lap = frame.lap;
    let mut buffer = state.buffer.write().await;
    let evicted = buffer
        .push(frame)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "lap": lap,
            "evictedLap": evicted.map(|f| f.lap),
        })),
    ))
}

async fn clear_frames(State(state): State<AppState>) -> StatusCode {
    state.buffer.write().await.clear();
    StatusCode::NO_CONTENT
}

// === Race Story Endpoints ===

async fn current_highlights(state: &AppState) -> Vec<Highlight> {
    state.buffer.read().await.analyze()
}

async fn highlights(State(state): State<AppState>) -> Json<Vec<Highlight>> {
    Json(current_highlights(&state).await)
}

async fn summaries(State(state): State<AppState>) -> Json<Vec<String>> {
    let highlights = current_highlights(&state).await;
    Json(narrative::to_english_summaries(&highlights))
}

async fn cards(State(state): State<AppState>) -> Json<Vec<BroadcastCard>> {
    let highlights = current_highlights(&state).await;
    Json(narrative::to_broadcast_cards(&highlights))
}

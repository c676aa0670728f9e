//! Integration tests for the lapstory-server HTTP API
//!
//! Uses tower::ServiceExt::oneshot to test routes directly without binding a port.

use axum::body::Body;
use http_body_util::BodyExt;
use hyper::Request;
use lapstory_server::{api::create_router, state::AppState};
use lapstory_stream::ConnectionState;
use std::collections::HashMap;
use tower::ServiceExt;

/// Helper: build a router with AppState returned for further manipulation
fn app_with_state() -> (axum::Router, AppState) {
    let state = AppState::new(50);
    let router = create_router(state.clone());
    (router, state)
}

/// Helper: collect response body into JSON
async fn body_json(body: Body) -> serde_json::Value {
    let collected = body.collect().await.unwrap();
    serde_json::from_slice(&collected.to_bytes()).unwrap()
}

/// Helper: collect response body into string
async fn body_string(body: Body) -> String {
    let collected = body.collect().await.unwrap();
    String::from_utf8(collected.to_bytes().to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn frame_json(lap: u32, position: u32, sectors: [f64; 3]) -> serde_json::Value {
    serde_json::json!({
        "lap": lap,
        "sectorTimes": sectors,
        "tireCondition": {"wearPercentage": 20, "wornThreshold": 70},
        "pitStatus": {"pitLap": null, "pitType": "none"},
        "paceDelta": -0.2,
        "position": position,
        "stressMetric": 45
    })
}

/// Helper: push frames through the API, asserting each is accepted
async fn push_all(state: &AppState, frames: &[serde_json::Value]) {
    for frame in frames {
        let response = create_router(state.clone())
            .oneshot(post_json("/api/frames", frame.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "frame {} rejected", frame);
    }
}

// ==================== GET /api/status ====================

#[tokio::test]
async fn test_status_on_fresh_state() {
    let (app, _state) = app_with_state();

    let response = app.oneshot(get("/api/status")).await.unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["state"], "disconnected");
    assert_eq!(body["bufferedFrames"], 0);
    assert_eq!(body["capacity"], 50);
    assert!(body["latestLap"].is_null());
    assert!(body["featureFlags"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_status_reflects_stream_state_and_flags() {
    let (app, state) = app_with_state();
    state.connection.send_replace(ConnectionState::Connected);
    state
        .feature_flags
        .send_replace(HashMap::from([("aiSummaries".to_string(), true)]));

    let response = app.oneshot(get("/api/status")).await.unwrap();

    let body = body_json(response.into_body()).await;
    assert_eq!(body["state"], "connected");
    assert_eq!(body["featureFlags"]["aiSummaries"], true);
}

// ==================== /api/frames ====================

#[tokio::test]
async fn test_latest_frame_404_when_empty() {
    let (app, _state) = app_with_state();

    let response = app.oneshot(get("/api/frames/latest")).await.unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_push_frame_then_read_latest() {
    let (_app, state) = app_with_state();
    push_all(&state, &[frame_json(1, 5, [30.0, 40.0, 30.0])]).await;

    let response = create_router(state.clone())
        .oneshot(get("/api/frames/latest"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["lap"], 1);
    assert_eq!(body["position"], 5);
    assert_eq!(body["sectorTimes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_push_invalid_frame_returns_422() {
    let (app, state) = app_with_state();
    let mut frame = frame_json(1, 5, [30.0, 40.0, 30.0]);
    frame["sectorTimes"] = serde_json::json!([90.0]);

    let response = app.oneshot(post_json("/api/frames", frame)).await.unwrap();

    assert_eq!(response.status(), 422);
    let body = body_string(response.into_body()).await;
    assert!(body.contains("sector"), "unexpected error body: {}", body);
    assert!(state.buffer.read().await.is_empty());
}

#[tokio::test]
async fn test_push_out_of_order_frame_returns_422() {
    let (_app, state) = app_with_state();
    push_all(&state, &[frame_json(3, 5, [30.0, 40.0, 30.0])]).await;

    let response = create_router(state.clone())
        .oneshot(post_json("/api/frames", frame_json(2, 5, [30.0, 40.0, 30.0])))
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_push_reports_evicted_lap() {
    let state = AppState::new(2);
    push_all(
        &state,
        &[
            frame_json(1, 5, [30.0, 40.0, 30.0]),
            frame_json(2, 5, [30.0, 40.0, 30.0]),
        ],
    )
    .await;

    let response = create_router(state.clone())
        .oneshot(post_json("/api/frames", frame_json(3, 5, [30.0, 40.0, 30.0])))
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["lap"], 3);
    assert_eq!(body["evictedLap"], 1);
}

#[tokio::test]
async fn test_clear_frames() {
    let (_app, state) = app_with_state();
    push_all(&state, &[frame_json(1, 5, [30.0, 40.0, 30.0])]).await;

    let response = create_router(state.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/frames")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
    assert!(state.buffer.read().await.is_empty());
}

// ==================== /api/highlights ====================

#[tokio::test]
async fn test_highlights_empty_without_frames() {
    let (app, _state) = app_with_state();

    let response = app.oneshot(get("/api/highlights")).await.unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_highlights_detect_overtake() {
    let (_app, state) = app_with_state();
    push_all(
        &state,
        &[
            frame_json(1, 5, [30.0, 40.0, 30.0]),
            frame_json(2, 4, [30.0, 39.5, 30.0]),
        ],
    )
    .await;

    let response = create_router(state.clone())
        .oneshot(get("/api/highlights"))
        .await
        .unwrap();

    let body = body_json(response.into_body()).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["type"], "Overtake");
    assert_eq!(list[0]["lap"], 2);
    assert_eq!(list[0]["evidence"]["sectorDelta"]["sector"], 2);
    assert_eq!(list[0]["evidence"]["sectorDelta"]["delta"], -0.5);
    assert!(list[0]["evidence"].get("pitTiming").is_none());
}

#[tokio::test]
async fn test_summaries_and_cards_match_highlights() {
    let (_app, state) = app_with_state();
    let mut pit = frame_json(2, 5, [30.0, 40.0, 30.0]);
    pit["pitStatus"] = serde_json::json!({"pitLap": 2, "pitType": "undercut"});
    push_all(&state, &[frame_json(1, 5, [30.0, 40.0, 30.0]), pit]).await;

    let summaries = create_router(state.clone())
        .oneshot(get("/api/highlights/summaries"))
        .await
        .unwrap();
    let summaries = body_json(summaries.into_body()).await;
    assert_eq!(
        summaries,
        serde_json::json!(["Lap 2: undercut pit stop shifts the strategy."])
    );

    let cards = create_router(state.clone())
        .oneshot(get("/api/highlights/cards"))
        .await
        .unwrap();
    let cards = body_json(cards.into_body()).await;
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["title"], "PitTimingShift on Lap 2");
    assert_eq!(cards[0]["evidence"]["pitTiming"]["pitType"], "undercut");
    assert!(cards[0]["mainText"].as_str().unwrap().contains("Lap 2"));
}

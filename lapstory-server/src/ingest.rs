//! Stream ingest
//!
//! This module handles:
//! - Receiving stream callbacks (messages, state changes, connect greeting)
//! - Publishing connection state and feature flags into `AppState`
//! - Moving decoded frames from the broadcast channel into the telemetry window

use crate::state::AppState;
use lapstory_core::model::TelemetryFrame;
use lapstory_stream::{ConnectionState, InboundMessage, OutboundMessage, StreamHandler};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Stream callbacks wired into the application state
pub struct IngestHandler {
    state: AppState,
}

impl IngestHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl StreamHandler for IngestHandler {
    fn on_message(&self, message: InboundMessage) {
        match message {
            InboundMessage::Telemetry(frame) => {
                // Ignore error if no receivers (the ingest loop is not running)
                let _ = self.state.telemetry_tx.send(frame);
            }
            InboundMessage::FeatureFlags { flags } => {
                info!("Received {} feature flag(s)", flags.len());
                self.state.feature_flags.send_replace(flags);
            }
            InboundMessage::Pong { timestamp } => {
                debug!("Heartbeat acknowledged ({})", timestamp);
            }
            InboundMessage::Agent { agent, .. } => {
                debug!("Ignoring output from agent {}", agent);
            }
            InboundMessage::Unknown => {
                debug!("Ignoring message of unknown type");
            }
        }
    }

    fn on_state_change(&self, state: ConnectionState) {
        info!("Stream {}", state);
        self.state.connection.send_replace(state);
    }

    fn on_open(&self) -> Vec<OutboundMessage> {
        vec![OutboundMessage::GetFeatureFlags]
    }
}

/// Main ingest loop: push every received frame into the buffer
pub async fn run(state: AppState, mut frames: broadcast::Receiver<TelemetryFrame>) {
    info!("Ingest started");

    loop {
        match frames.recv().await {
            Ok(frame) => store(&state, frame).await,
            Err(RecvError::Lagged(skipped)) => {
                warn!("Ingest lagging, skipped {} frame(s)", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }

    info!("Ingest stopped");
}

async fn store(state: &AppState, frame: TelemetryFrame) {
    let lap = frame.lap;
    let mut buffer = state.buffer.write().await;
    match buffer.push(frame) {
        Ok(Some(evicted)) => debug!("Stored lap {}, evicted lap {}", lap, evicted.lap),
        Ok(None) => debug!("Stored lap {}", lap),
        Err(e) => warn!("Rejected telemetry frame: {}", e),
    }
}

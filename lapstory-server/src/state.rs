//! Application state management

use lapstory_core::{model::TelemetryFrame, TelemetryBuffer};
use lapstory_stream::ConnectionState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Most recent laps, fed by the ingest task
    pub buffer: Arc<RwLock<TelemetryBuffer>>,

    /// Decoded frames from the stream, on their way into the buffer
    pub telemetry_tx: broadcast::Sender<TelemetryFrame>,

    /// Last reported stream connection state
    pub connection: Arc<watch::Sender<ConnectionState>>,

    /// Feature flags announced by the telemetry source
    pub feature_flags: Arc<watch::Sender<HashMap<String, bool>>>,
}

impl AppState {
    pub fn new(buffer_capacity: usize) -> Self {
        // Create broadcast channel with capacity for 100 frames
        let (telemetry_tx, _) = broadcast::channel(100);
        let (connection, _) = watch::channel(ConnectionState::Disconnected);
        let (feature_flags, _) = watch::channel(HashMap::new());

        Self {
            buffer: Arc::new(RwLock::new(TelemetryBuffer::new(buffer_capacity))),
            telemetry_tx,
            connection: Arc::new(connection),
            feature_flags: Arc::new(feature_flags),
        }
    }

    /// Subscribe to decoded telemetry frames
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryFrame> {
        self.telemetry_tx.subscribe()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(lapstory_core::buffer::DEFAULT_CAPACITY)
    }
}

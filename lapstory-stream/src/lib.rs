//! Real-time telemetry stream client for LapStory
//!
//! Keeps one logical connection to a telemetry source alive across drops,
//! with exponential backoff, a heartbeat and typed message decoding.

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod machine;
pub mod protocol;
pub mod state;
pub mod transport;

pub use client::StreamClient;
pub use config::{RetryPolicy, StreamConfig};
pub use error::{StreamError, StreamResult};
pub use handler::StreamHandler;
pub use protocol::{InboundMessage, OutboundMessage};
pub use state::ConnectionState;
pub use transport::{Connection, Transport, WebSocketTransport};

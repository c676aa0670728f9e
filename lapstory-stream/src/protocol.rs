//! Stream wire protocol
//!
//! Text frames carry JSON objects discriminated by a `type` field. Inbound
//! frames are decoded into `InboundMessage` at the boundary; anything that is
//! not valid JSON or does not match its variant's schema is a decode error.
//! Unrecognised `type` values decode to `InboundMessage::Unknown`.

use crate::error::StreamResult;
use lapstory_core::TelemetryFrame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Messages received from the telemetry source
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// One lap of telemetry; fields sit next to `type`
    Telemetry(TelemetryFrame),

    /// Reply to a heartbeat ping
    Pong { timestamp: i64 },

    /// Feature flags, usually in reply to `getFeatureFlags`
    FeatureFlags { flags: HashMap<String, bool> },

    /// Output from an analysis agent upstream
    Agent {
        agent: String,
        #[serde(default)]
        payload: serde_json::Value,
    },

    #[serde(other)]
    Unknown,
}

/// Control messages sent to the telemetry source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Heartbeat, timestamp in epoch milliseconds
    Ping { timestamp: i64 },

    GetFeatureFlags,
}

impl OutboundMessage {
    pub fn ping_now() -> Self {
        OutboundMessage::Ping {
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Decode one inbound text frame
pub fn decode(text: &str) -> StreamResult<InboundMessage> {
    Ok(serde_json::from_str(text)?)
}

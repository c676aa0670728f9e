//! Connection state reported to stream consumers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the logical stream connection
///
/// `Disconnected -> Connecting -> Connected -> Disconnected`, any state can
/// fall into `Error` on a transport failure, and a scheduled retry moves
/// `Error` (or `Disconnected`) back to `Connecting`. Only a manual close is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        f.write_str(s)
    }
}

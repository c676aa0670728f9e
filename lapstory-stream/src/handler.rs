//! Consumer callback surface
//!
//! The client reports to a single `StreamHandler`. Callbacks run on the
//! client's driver task, synchronously with the event that caused them, and
//! each one is isolated: a panicking callback is logged and the stream
//! carries on with the next message.

use crate::protocol::{InboundMessage, OutboundMessage};
use crate::state::ConnectionState;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::error;

pub trait StreamHandler: Send + Sync + 'static {
    /// Called for every successfully decoded inbound message
    fn on_message(&self, message: InboundMessage);

    /// Called on every connection state change
    fn on_state_change(&self, _state: ConnectionState) {}

    /// Called once per successful connect
    ///
    /// The returned messages are sent immediately, before anything else,
    /// e.g. a request for the current feature flags.
    fn on_open(&self) -> Vec<OutboundMessage> {
        Vec::new()
    }
}

/// Run one callback, containing a panic to this call
pub(crate) fn guarded<R>(callback: &'static str, f: impl FnOnce() -> R) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(callback, "Stream handler panicked: {}", reason);
            None
        }
    }
}

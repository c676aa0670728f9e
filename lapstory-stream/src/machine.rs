//! Connection state machine
//!
//! Pure transition logic for the stream client. It owns the connection state,
//! the backoff schedule and the retry budget, and turns each `Event` into the
//! `Action`s the driver must carry out. It never touches a socket or a timer
//! itself, so every transition can be checked without a runtime.

use crate::backoff::Backoff;
use crate::config::{RetryPolicy, StreamConfig};
use crate::state::ConnectionState;
use std::time::Duration;

/// Something that happened to the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ConnectRequested,
    HandshakeSucceeded,
    HandshakeFailed,
    SocketClosed,
    TransportError,
    ReconnectTimerFired,
    CloseRequested,
}

/// Work the driver must perform, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Notify(ConnectionState),
    StartHandshake,
    ScheduleReconnect(Duration),
    CancelReconnect,
    StartHeartbeat(Duration),
    StopHeartbeat,
    CloseTransport,
    GiveUp { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    backoff: Backoff,
    retry: RetryPolicy,
    heartbeat: Duration,
    /// Reconnects scheduled since the last successful connect
    attempts: u32,
    reconnect_pending: bool,
    manually_closed: bool,
}

impl ConnectionMachine {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            backoff: config.backoff(),
            retry: config.retry_policy(),
            heartbeat: config.heartbeat_interval(),
            attempts: 0,
            reconnect_pending: false,
            manually_closed: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.manually_closed
    }

    pub fn is_reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Delay the next reconnect would use
    pub fn current_backoff(&self) -> Duration {
        self.backoff.delay()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.manually_closed {
            return actions;
        }

        match event {
            Event::ConnectRequested => {
                if matches!(
                    self.state,
                    ConnectionState::Connected | ConnectionState::Connecting
                ) {
                    return actions;
                }
                // An explicit connect starts a fresh retry budget
                self.attempts = 0;
                if self.reconnect_pending {
                    self.reconnect_pending = false;
                    actions.push(Action::CancelReconnect);
                }
                self.transition(ConnectionState::Connecting, &mut actions);
                actions.push(Action::StartHandshake);
            }
            Event::HandshakeSucceeded => {
                if self.state != ConnectionState::Connecting {
                    return actions;
                }
                self.backoff.reset();
                self.attempts = 0;
                self.transition(ConnectionState::Connected, &mut actions);
                actions.push(Action::StartHeartbeat(self.heartbeat));
            }
            Event::HandshakeFailed => {
                if self.state != ConnectionState::Connecting {
                    return actions;
                }
                self.transition(ConnectionState::Disconnected, &mut actions);
                self.schedule_reconnect(&mut actions);
            }
            Event::SocketClosed => {
                if self.state != ConnectionState::Connected {
                    return actions;
                }
                actions.push(Action::StopHeartbeat);
                self.transition(ConnectionState::Disconnected, &mut actions);
                self.schedule_reconnect(&mut actions);
            }
            Event::TransportError => {
                if !matches!(
                    self.state,
                    ConnectionState::Connected | ConnectionState::Connecting
                ) {
                    return actions;
                }
                actions.push(Action::StopHeartbeat);
                actions.push(Action::CloseTransport);
                self.transition(ConnectionState::Error, &mut actions);
                self.schedule_reconnect(&mut actions);
            }
            Event::ReconnectTimerFired => {
                if !self.reconnect_pending {
                    return actions;
                }
                self.reconnect_pending = false;
                self.backoff.grow();
                self.transition(ConnectionState::Connecting, &mut actions);
                actions.push(Action::StartHandshake);
            }
            Event::CloseRequested => {
                self.manually_closed = true;
                self.reconnect_pending = false;
                actions.push(Action::CancelReconnect);
                actions.push(Action::StopHeartbeat);
                actions.push(Action::CloseTransport);
                self.transition(ConnectionState::Disconnected, &mut actions);
            }
        }

        actions
    }

    fn transition(&mut self, next: ConnectionState, actions: &mut Vec<Action>) {
        if self.state != next {
            self.state = next;
            actions.push(Action::Notify(next));
        }
    }

    fn schedule_reconnect(&mut self, actions: &mut Vec<Action>) {
        if !self.retry.allows(self.attempts) {
            // Out of budget: rest in Disconnected until the next explicit connect
            self.transition(ConnectionState::Disconnected, actions);
            actions.push(Action::GiveUp {
                attempts: self.attempts,
            });
            return;
        }
        self.attempts += 1;
        self.reconnect_pending = true;
        actions.push(Action::ScheduleReconnect(self.backoff.delay()));
    }
}

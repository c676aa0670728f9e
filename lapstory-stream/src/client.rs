//! Resilient stream client
//!
//! `StreamClient` is a cheap handle to a driver task. The driver owns the
//! `ConnectionMachine`, the open connection and both timers (reconnect and
//! heartbeat), and processes everything sequentially on one task, so no
//! locking is needed around connection state. Timers are plain tokio timer
//! handles; dropping one cancels it.

use crate::config::StreamConfig;
use crate::error::StreamResult;
use crate::handler::{guarded, StreamHandler};
use crate::machine::{Action, ConnectionMachine, Event};
use crate::protocol::{self, OutboundMessage};
use crate::state::ConnectionState;
use crate::transport::{Connection, Transport, WebSocketTransport};
use serde::Serialize;
use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type HandshakeFuture =
    Pin<Box<dyn Future<Output = StreamResult<Box<dyn Connection>>> + Send>>;

enum Control {
    Connect,
    Send {
        text: String,
        reply: oneshot::Sender<bool>,
    },
}

/// Handle to a running stream client
#[derive(Clone)]
pub struct StreamClient {
    control: mpsc::UnboundedSender<Control>,
    state: watch::Receiver<ConnectionState>,
    shutdown: CancellationToken,
}

impl StreamClient {
    /// Start the driver task; no connection is made until `connect()`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T, H>(config: StreamConfig, transport: T, handler: H) -> StreamResult<Self>
    where
        T: Transport,
        H: StreamHandler,
    {
        config.validate()?;

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let shutdown = CancellationToken::new();

        let driver = Driver {
            machine: ConnectionMachine::new(&config),
            transport: Arc::new(transport),
            handler: Box::new(handler),
            connection: None,
            handshake: None,
            reconnect: None,
            heartbeat: None,
            state_tx,
            control: control_rx,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(driver.run());

        Ok(Self {
            control: control_tx,
            state: state_rx,
            shutdown,
        })
    }

    /// Convenience constructor for a WebSocket source
    pub fn websocket<H: StreamHandler>(
        url: impl Into<String>,
        config: StreamConfig,
        handler: H,
    ) -> StreamResult<Self> {
        Self::spawn(config, WebSocketTransport::new(url), handler)
    }

    /// Start connecting; a no-op while connected, connecting or closed
    pub fn connect(&self) {
        let _ = self.control.send(Control::Connect);
    }

    /// Serialize and transmit a payload
    ///
    /// Returns `false` when not connected, when the payload cannot be
    /// serialized, or when the transport rejects the write. Never retries.
    pub async fn send<P: Serialize + ?Sized>(&self, payload: &P) -> bool {
        if !self.is_connected() {
            return false;
        }
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to serialize outbound payload: {}", e);
                return false;
            }
        };
        let (reply, result) = oneshot::channel();
        if self.control.send(Control::Send { text, reply }).is_err() {
            return false;
        }
        result.await.unwrap_or(false)
    }

    /// Close for good: cancels both timers and closes the transport
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Receiver for observing state changes
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }
}

struct Driver {
    machine: ConnectionMachine,
    transport: Arc<dyn Transport>,
    handler: Box<dyn StreamHandler>,
    connection: Option<Box<dyn Connection>>,
    handshake: Option<HandshakeFuture>,
    reconnect: Option<Pin<Box<Sleep>>>,
    heartbeat: Option<Interval>,
    state_tx: watch::Sender<ConnectionState>,
    control: mpsc::UnboundedReceiver<Control>,
    shutdown: CancellationToken,
}

impl Driver {
    async fn run(mut self) {
        debug!(endpoint = self.transport.endpoint(), "Stream driver started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    self.apply(Event::CloseRequested).await;
                    break;
                }

                result = finish_handshake(&mut self.handshake) => {
                    self.handshake = None;
                    self.on_handshake(result).await;
                }

                inbound = next_frame(&mut self.connection) => match inbound {
                    Some(Ok(text)) => self.dispatch(&text),
                    Some(Err(e)) => {
                        warn!("Stream transport error: {}", e);
                        self.apply(Event::TransportError).await;
                    }
                    None => {
                        info!("Stream closed by peer");
                        self.connection = None;
                        self.apply(Event::SocketClosed).await;
                    }
                },

                _ = fire(&mut self.reconnect) => {
                    self.reconnect = None;
                    self.apply(Event::ReconnectTimerFired).await;
                }

                _ = tick(&mut self.heartbeat) => {
                    self.transmit_message(&OutboundMessage::ping_now()).await;
                }

                control = self.control.recv() => match control {
                    Some(Control::Connect) => self.apply(Event::ConnectRequested).await,
                    Some(Control::Send { text, reply }) => {
                        let sent = self.transmit(text).await;
                        let _ = reply.send(sent);
                    }
                    // Every handle is gone; nobody can close us explicitly
                    None => {
                        self.apply(Event::CloseRequested).await;
                        break;
                    }
                },
            }
        }

        debug!(endpoint = self.transport.endpoint(), "Stream driver stopped");
    }

    async fn on_handshake(&mut self, result: StreamResult<Box<dyn Connection>>) {
        match result {
            Ok(connection) => {
                info!(endpoint = self.transport.endpoint(), "Stream connected");
                self.connection = Some(connection);
                self.apply(Event::HandshakeSucceeded).await;

                let greeting = guarded("on_open", || self.handler.on_open()).unwrap_or_default();
                for message in &greeting {
                    self.transmit_message(message).await;
                }
            }
            Err(e) => {
                warn!(endpoint = self.transport.endpoint(), "Stream connect failed: {}", e);
                self.apply(Event::HandshakeFailed).await;
            }
        }
    }

    async fn apply(&mut self, event: Event) {
        for action in self.machine.handle(event) {
            self.execute(action).await;
        }
    }

    async fn execute(&mut self, action: Action) {
        match action {
            Action::Notify(state) => {
                self.state_tx.send_replace(state);
                guarded("on_state_change", || self.handler.on_state_change(state));
            }
            Action::StartHandshake => {
                let transport = Arc::clone(&self.transport);
                self.handshake = Some(Box::pin(async move { transport.connect().await }));
            }
            Action::ScheduleReconnect(delay) => {
                info!("Reconnecting in {} ms", delay.as_millis());
                self.reconnect = Some(Box::pin(sleep(delay)));
            }
            Action::CancelReconnect => {
                self.reconnect = None;
            }
            Action::StartHeartbeat(period) => {
                self.heartbeat = Some(heartbeat_timer(period));
            }
            Action::StopHeartbeat => {
                self.heartbeat = None;
            }
            Action::CloseTransport => {
                self.handshake = None;
                if let Some(mut connection) = self.connection.take() {
                    connection.close().await;
                }
            }
            Action::GiveUp { attempts } => {
                warn!(
                    endpoint = self.transport.endpoint(),
                    "Giving up after {} reconnect attempt(s)", attempts
                );
            }
        }
    }

    /// Decode and hand one inbound frame to the handler
    fn dispatch(&self, text: &str) {
        match protocol::decode(text) {
            Ok(message) => {
                guarded("on_message", || self.handler.on_message(message));
            }
            Err(e) => warn!("Dropping inbound frame: {}", e),
        }
    }

    async fn transmit_message(&mut self, message: &OutboundMessage) -> bool {
        match serde_json::to_string(message) {
            Ok(text) => self.transmit(text).await,
            Err(e) => {
                warn!("Failed to serialize {:?}: {}", message, e);
                false
            }
        }
    }

    async fn transmit(&mut self, text: String) -> bool {
        if self.machine.state() != ConnectionState::Connected {
            return false;
        }
        let Some(connection) = self.connection.as_mut() else {
            return false;
        };
        match connection.send(text).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Stream send failed: {}", e);
                false
            }
        }
    }
}

fn heartbeat_timer(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

async fn finish_handshake(
    handshake: &mut Option<HandshakeFuture>,
) -> StreamResult<Box<dyn Connection>> {
    match handshake {
        Some(future) => future.await,
        None => pending().await,
    }
}

async fn next_frame(connection: &mut Option<Box<dyn Connection>>) -> Option<StreamResult<String>> {
    match connection {
        Some(connection) => connection.recv().await,
        None => pending().await,
    }
}

async fn fire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => pending().await,
    }
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("state", &self.state())
            .field("closed", &self.is_closed())
            .finish()
    }
}

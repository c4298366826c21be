//! Engine builder and poll loop.
//!
//! The [`EngineBuilder`] provides a fluent API for configuring the link and
//! registering handlers. The [`Engine`] owns everything one node needs:
//! 1. Drain the ingress ring and reassemble frames
//! 2. Validate and queue them in arrival order
//! 3. Dispatch each frame by kind: state machine, session context, handlers
//! 4. Send automatic replies (Ack, LocalReady) and periodic heartbeats
//!
//! There is no global state; two engines in one process are two nodes.
//!
//! # Example
//!
//! ```
//! use console_link::codec::ChatMessage;
//! use console_link::protocol::ingress;
//! use console_link::transport::LoopbackTransport;
//! use console_link::Engine;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), console_link::LinkError> {
//! let (console_port, console_rx) = ingress(1024);
//! let (network_port, network_rx) = ingress(1024);
//!
//! let mut console = Engine::builder()
//!     .on_chat(|chat: &ChatMessage| println!("{}: {}", chat.sender, chat.message))
//!     .build(LoopbackTransport::new(network_port), console_rx);
//! let mut network = Engine::builder().build(LoopbackTransport::new(console_port), network_rx);
//!
//! console.init();
//! network.init();
//!
//! network.send_chat(&ChatMessage::new("hello", "server", "system", 0)).await?;
//! console.poll().await;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::codec::{
    ChatMessage, CommandMessage, ConnectionMessage, GameData, StatusMessage, TileSizeValidation,
    WirePayload,
};
use crate::config::{EngineConfig, NodeRole};
use crate::control::{
    PlayerInfo, ProtocolState, Reply, SessionContext, StateMachine, StatusCode,
    TILE_SIZE_ACCEPTED,
};
use crate::diagnostics::{write_stdout_line, Stats};
use crate::error::{LinkError, PayloadError, Result};
use crate::handler::{Handler, HandlerRegistry};
use crate::protocol::{Frame, FrameAssembler, FrameQueue, IngressReader, MessageKind};
use crate::reliability::{AckSignal, HandshakeOutcome, HeartbeatTimer, NetworkErrorMonitor};
use crate::transport::Transport;
use crate::writer::FrameWriter;

/// Longest single sleep while waiting for an acknowledgement. Inbound
/// traffic is serviced between slices.
const ACK_POLL_SLICE: Duration = Duration::from_millis(10);

/// Status text sent back when a tile size check fails.
const TILE_SIZE_REJECTED: &str = "MISMATCH";

/// Builder for configuring and creating an [`Engine`].
pub struct EngineBuilder {
    config: EngineConfig,
    handlers: HandlerRegistry,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            handlers: HandlerRegistry::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn role(mut self, role: NodeRole) -> Self {
        self.config.role = role;
        self
    }

    /// Inbound frame queue depth. Default: 8
    pub fn queue_depth(mut self, depth: usize) -> Self {
        self.config.queue_depth = depth;
        self
    }

    /// Bounded transmit time for each send. Default: 1s
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.config.send_timeout = timeout;
        self
    }

    /// Startup handshake acknowledgement timeout. Default: 3s
    pub fn ack_timeout(mut self, timeout: Duration) -> Self {
        self.config.ack_timeout = timeout;
        self
    }

    /// Heartbeat period. Default: 30s
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = interval;
        self
    }

    pub fn heartbeat_enabled(mut self, enabled: bool) -> Self {
        self.config.heartbeat_enabled = enabled;
        self
    }

    /// Window in which repeated link-loss notices are suppressed. Default: 5s
    pub fn error_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.error_cooldown = cooldown;
        self
    }

    /// Tile size accepted from the peer. Default: 16
    pub fn accepted_tile_size(mut self, tile_size: u16) -> Self {
        self.config.accepted_tile_size = tile_size;
        self
    }

    pub fn on_data<H: Handler<GameData>>(mut self, handler: H) -> Self {
        self.handlers.on_data(handler);
        self
    }

    pub fn on_chat<H: Handler<ChatMessage>>(mut self, handler: H) -> Self {
        self.handlers.on_chat(handler);
        self
    }

    pub fn on_command<H: Handler<CommandMessage>>(mut self, handler: H) -> Self {
        self.handlers.on_command(handler);
        self
    }

    pub fn on_connection<H: Handler<ConnectionMessage>>(mut self, handler: H) -> Self {
        self.handlers.on_connection(handler);
        self
    }

    pub fn on_status<H: Handler<StatusMessage>>(mut self, handler: H) -> Self {
        self.handlers.on_status(handler);
        self
    }

    /// Build the engine over `transport`, consuming bytes from `ingress`.
    ///
    /// The engine starts uninitialized; call [`Engine::init`] before polling.
    pub fn build<T: Transport>(self, transport: T, ingress: IngressReader) -> Engine<T> {
        let error_cooldown = self.config.error_cooldown;
        let queue = FrameQueue::new(self.config.queue_depth);
        Engine {
            writer: FrameWriter::new(transport),
            ingress,
            assembler: FrameAssembler::new(),
            queue,
            handlers: self.handlers,
            machine: StateMachine::new(),
            session: SessionContext::new(),
            ack: AckSignal::new(),
            heartbeat: HeartbeatTimer::disabled(),
            network_error: NetworkErrorMonitor::new(error_cooldown),
            needs_ui_update: false,
            initialized: false,
            inbound: InboundCounters::default(),
            config: self.config,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters owned by the inbound path.
#[derive(Debug, Clone, Copy, Default)]
struct InboundCounters {
    bytes_received: u64,
    messages_parsed: u64,
    parse_errors: u64,
    length_mismatches: u64,
}

/// Protocol engine for one node of the link.
pub struct Engine<T> {
    config: EngineConfig,
    writer: FrameWriter<T>,
    ingress: IngressReader,
    assembler: FrameAssembler,
    queue: FrameQueue,
    handlers: HandlerRegistry,
    machine: StateMachine,
    session: SessionContext,
    ack: AckSignal,
    heartbeat: HeartbeatTimer,
    network_error: NetworkErrorMonitor,
    needs_ui_update: bool,
    initialized: bool,
    inbound: InboundCounters,
}

impl Engine<()> {
    /// Create an engine builder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }
}

impl<T: Transport> Engine<T> {
    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start processing. Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.restart_heartbeat();
        tracing::info!("[{}] link engine initialized", self.config.role);
    }

    /// Stop processing. Buffered inbound bytes and frames are discarded;
    /// state and counters are kept.
    pub fn deinit(&mut self) {
        if !self.initialized {
            return;
        }
        self.initialized = false;
        self.flush_inbound();
        self.heartbeat = HeartbeatTimer::disabled();
        tracing::info!("[{}] link engine stopped", self.config.role);
    }

    /// Return to the freshly initialized condition.
    ///
    /// Flushes the ring, the assembler and the queue, returns the state to
    /// `Init`, clears session, UI and error flags and zeroes every counter.
    pub fn reset(&mut self) {
        self.flush_inbound();
        self.machine.reset();
        self.session.clear();
        self.ack.clear();
        self.network_error.reset();
        self.needs_ui_update = false;

        self.inbound = InboundCounters::default();
        self.writer.reset_counters();
        self.ingress.reset_overflow_count();
        self.queue.reset_overflow_count();

        if self.initialized {
            self.restart_heartbeat();
        }
        tracing::info!("[{}] link engine reset", self.config.role);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn restart_heartbeat(&mut self) {
        self.heartbeat = if self.config.heartbeat_enabled {
            HeartbeatTimer::new(self.config.heartbeat_interval, Instant::now())
        } else {
            HeartbeatTimer::disabled()
        };
    }

    fn flush_inbound(&mut self) {
        self.ingress.flush();
        self.assembler.reset();
        self.queue.flush();
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(LinkError::NotInitialized)
        }
    }

    // ------------------------------------------------------------------
    // Poll loop
    // ------------------------------------------------------------------

    /// Run one iteration: drain ingress, dispatch queued frames in order,
    /// then send a heartbeat if one is due. Does nothing before `init()`.
    pub async fn poll(&mut self) {
        if !self.initialized {
            return;
        }
        self.service_inbound().await;
        self.service_heartbeat().await;
    }

    async fn service_inbound(&mut self) {
        self.drain_ingress();
        while let Some(frame) = self.queue.get() {
            self.dispatch(frame).await;
        }
    }

    /// Move every buffered byte through the assembler into the queue.
    fn drain_ingress(&mut self) {
        while let Some(byte) = self.ingress.try_recv() {
            self.inbound.bytes_received += 1;

            match self.assembler.push_byte(byte) {
                None => {}
                Some(Ok(frame)) => {
                    self.inbound.messages_parsed += 1;
                    if !self.queue.put(frame) {
                        tracing::debug!(
                            "[{}] inbound queue full, dropping {:?} frame",
                            self.config.role,
                            frame.kind()
                        );
                    }
                }
                Some(Err(e)) => {
                    self.inbound.parse_errors += 1;
                    tracing::debug!("[{}] dropping corrupt frame: {}", self.config.role, e);
                }
            }
        }
    }

    async fn service_heartbeat(&mut self) {
        let now = Instant::now();
        if !self.heartbeat.is_due(now) {
            return;
        }
        self.heartbeat.mark_sent(now);
        self.send_reply(MessageKind::Heartbeat).await;
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    async fn dispatch(&mut self, frame: Frame) {
        let kind = frame.kind();
        let expected = kind.expected_payload_len();
        if frame.payload_len() != expected {
            self.inbound.length_mismatches += 1;
            let e = PayloadError::LengthMismatch {
                kind,
                expected,
                actual: frame.payload_len(),
            };
            tracing::debug!("[{}] ignoring frame: {}", self.config.role, e);
            return;
        }

        match kind {
            MessageKind::Ack => self.ack.signal(),
            MessageKind::Nack => {
                tracing::debug!("[{}] peer sent Nack", self.config.role);
            }
            MessageKind::Heartbeat => {}
            MessageKind::Data => {
                if let Some(data) = self.decode::<GameData>(&frame) {
                    self.handlers.dispatch_data(&data);
                }
            }
            MessageKind::Chat => {
                if let Some(chat) = self.decode::<ChatMessage>(&frame) {
                    self.handlers.dispatch_chat(&chat);
                }
            }
            MessageKind::Command => {
                if let Some(command) = self.decode::<CommandMessage>(&frame) {
                    self.handlers.dispatch_command(&command);
                }
            }
            MessageKind::Connection => {
                if let Some(connection) = self.decode::<ConnectionMessage>(&frame) {
                    self.session.set_client_id(&connection.client_id);
                    self.handlers.dispatch_connection(&connection);
                }
            }
            MessageKind::TileSizeValidation => {
                if let Some(check) = self.decode::<TileSizeValidation>(&frame) {
                    self.handle_tile_size(check).await;
                }
            }
            MessageKind::Status => {
                if let Some(status) = self.decode::<StatusMessage>(&frame) {
                    self.handle_status(&status).await;
                    self.handlers.dispatch_status(&status);
                }
            }
        }

        if kind.is_auto_acked() {
            self.send_reply(MessageKind::Ack).await;
        }
    }

    fn decode<P: WirePayload>(&mut self, frame: &Frame) -> Option<P> {
        match P::decode(frame.payload()) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!("[{}] undecodable payload: {}", self.config.role, e);
                None
            }
        }
    }

    async fn handle_tile_size(&mut self, check: TileSizeValidation) {
        let accepted = self.config.accepted_tile_size;
        let verdict = if check.tile_size == accepted {
            TILE_SIZE_ACCEPTED
        } else {
            tracing::warn!(
                "[{}] peer tile size {} does not match {}",
                self.config.role,
                check.tile_size,
                accepted
            );
            self.session.session_invalid = true;
            self.needs_ui_update = true;
            TILE_SIZE_REJECTED
        };

        let response = StatusMessage::new(StatusCode::TileSizeResponse, verdict);
        self.send_status_reply(&response).await;
    }

    /// Drive the state table, then the side channels.
    async fn handle_status(&mut self, status: &StatusMessage) {
        let Some(code) = status.code() else {
            tracing::debug!(
                "[{}] unknown status code 0x{:02X}",
                self.config.role,
                status.status
            );
            return;
        };

        let state = self.machine.state();
        match self.machine.apply(code) {
            Some(transition) => {
                if transition.changed() {
                    tracing::info!(
                        "[{}] {:?} -> {:?} on {:?}",
                        self.config.role,
                        transition.from,
                        transition.to,
                        code
                    );
                    self.needs_ui_update = true;
                }
                match transition.reply {
                    Reply::None => {}
                    Reply::Ack => self.send_reply(MessageKind::Ack).await,
                    Reply::LocalReady => {
                        let ready = StatusMessage::new(StatusCode::LocalReady, "");
                        self.send_status_reply(&ready).await;
                    }
                }
            }
            None => {
                tracing::debug!("[{}] ignoring {:?} in {:?}", self.config.role, code, state);
            }
        }

        self.apply_side_channels(code, status);
    }

    fn apply_side_channels(&mut self, code: StatusCode, status: &StatusMessage) {
        if code.is_link_loss() {
            let message = if status.message.is_empty() {
                format!("{:?}", code)
            } else {
                status.message.clone()
            };
            if self.network_error.report(Instant::now(), &message) {
                tracing::warn!("[{}] network error: {}", self.config.role, message);
                self.needs_ui_update = true;
            }
        } else if code.is_connected() && self.network_error.clear() {
            tracing::info!("[{}] network error cleared by {:?}", self.config.role, code);
            self.needs_ui_update = true;
        }

        match code {
            StatusCode::LinkDisconnected | StatusCode::SessionDisconnected => {
                self.session.clear();
            }
            StatusCode::SessionActive => {
                self.session.game_over = false;
            }
            StatusCode::SessionEnded | StatusCode::SessionTimeout => {
                self.session.game_over = true;
                self.needs_ui_update = true;
            }
            StatusCode::PlayerAssignment => {
                if self.session.assign_local(&status.message) {
                    tracing::info!(
                        "[{}] assigned as {} in session {}",
                        self.config.role,
                        self.session.local.player_id,
                        self.session.local.session_id
                    );
                    self.needs_ui_update = true;
                }
            }
            StatusCode::OpponentConnected => {
                self.session.opponent_joined(&status.message);
                self.needs_ui_update = true;
            }
            StatusCode::OpponentDisconnected => {
                self.session.opponent_left();
                self.needs_ui_update = true;
            }
            StatusCode::TileSizeResponse => {
                self.session.record_tile_size_response(&status.message);
                if self.session.session_invalid {
                    self.needs_ui_update = true;
                }
            }
            _ => {}
        }
    }

    // Automatic replies never fail `poll()`; the writer logs and counts errors.
    async fn send_reply(&mut self, kind: MessageKind) {
        let _ = self.writer.send_empty(kind, self.config.send_timeout).await;
    }

    async fn send_status_reply(&mut self, status: &StatusMessage) {
        let _ = self.writer.send_payload(status, self.config.send_timeout).await;
    }

    // ------------------------------------------------------------------
    // Sends
    // ------------------------------------------------------------------

    async fn send_typed<P: WirePayload>(&mut self, payload: &P) -> Result<()> {
        self.ensure_initialized()?;
        self.writer.send_payload(payload, self.config.send_timeout).await
    }

    async fn send_bare(&mut self, kind: MessageKind) -> Result<()> {
        self.ensure_initialized()?;
        self.writer.send_empty(kind, self.config.send_timeout).await
    }

    pub async fn send_game_data(&mut self, data: &GameData) -> Result<()> {
        self.send_typed(data).await
    }

    pub async fn send_chat(&mut self, chat: &ChatMessage) -> Result<()> {
        self.send_typed(chat).await
    }

    pub async fn send_command(&mut self, command: &CommandMessage) -> Result<()> {
        self.send_typed(command).await
    }

    pub async fn send_status(&mut self, status: &StatusMessage) -> Result<()> {
        self.send_typed(status).await
    }

    pub async fn send_connection(&mut self, connection: &ConnectionMessage) -> Result<()> {
        self.send_typed(connection).await
    }

    pub async fn send_tile_size_validation(&mut self, check: &TileSizeValidation) -> Result<()> {
        self.send_typed(check).await
    }

    pub async fn send_ack(&mut self) -> Result<()> {
        self.send_bare(MessageKind::Ack).await
    }

    pub async fn send_nack(&mut self) -> Result<()> {
        self.send_bare(MessageKind::Nack).await
    }

    pub async fn send_heartbeat(&mut self) -> Result<()> {
        self.send_bare(MessageKind::Heartbeat).await
    }

    // ------------------------------------------------------------------
    // Reliability
    // ------------------------------------------------------------------

    /// Send `status` and wait up to `timeout` for the peer's `Ack`.
    ///
    /// Inbound traffic keeps being dispatched while waiting. A timeout is
    /// reported, not treated as an error.
    pub async fn send_status_awaiting_ack(
        &mut self,
        status: &StatusMessage,
        timeout: Duration,
    ) -> Result<HandshakeOutcome> {
        self.ensure_initialized()?;
        self.ack.clear();
        self.writer.send_payload(status, self.config.send_timeout).await?;

        let deadline = Instant::now() + timeout;
        loop {
            self.service_inbound().await;
            if self.ack.try_take() {
                return Ok(HandshakeOutcome::Acknowledged);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(HandshakeOutcome::TimedOut);
            }
            if self.ack.wait((deadline - now).min(ACK_POLL_SLICE)).await {
                return Ok(HandshakeOutcome::Acknowledged);
            }
        }
    }

    /// Announce this node to its peer: `PeerStarted`, then `PeerInitComplete`
    /// waiting for the acknowledgement.
    ///
    /// A missing acknowledgement is logged and startup continues. Either way
    /// the local state moves from `Init` to `PeerReady`.
    pub async fn announce_startup(&mut self) -> Result<HandshakeOutcome> {
        self.ensure_initialized()?;

        let started = StatusMessage::new(StatusCode::PeerStarted, self.config.role.as_str());
        self.send_status(&started).await?;

        let complete = StatusMessage::new(StatusCode::PeerInitComplete, self.config.role.as_str());
        let outcome = self
            .send_status_awaiting_ack(&complete, self.config.ack_timeout)
            .await?;

        if outcome == HandshakeOutcome::TimedOut {
            tracing::warn!(
                "[{}] no handshake acknowledgement after {:?}, continuing",
                self.config.role,
                self.config.ack_timeout
            );
        }

        if self.machine.enter_peer_ready() {
            tracing::info!(
                "[{}] {:?} -> {:?} after startup announcement",
                self.config.role,
                ProtocolState::Init,
                ProtocolState::PeerReady
            );
            self.needs_ui_update = true;
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    pub fn on_data<H: Handler<GameData>>(&mut self, handler: H) {
        self.handlers.on_data(handler);
    }

    pub fn on_chat<H: Handler<ChatMessage>>(&mut self, handler: H) {
        self.handlers.on_chat(handler);
    }

    pub fn on_command<H: Handler<CommandMessage>>(&mut self, handler: H) {
        self.handlers.on_command(handler);
    }

    pub fn on_connection<H: Handler<ConnectionMessage>>(&mut self, handler: H) {
        self.handlers.on_connection(handler);
    }

    pub fn on_status<H: Handler<StatusMessage>>(&mut self, handler: H) {
        self.handlers.on_status(handler);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> ProtocolState {
        self.machine.state()
    }

    pub fn is_peer_ready(&self) -> bool {
        self.state().is_peer_ready()
    }

    pub fn is_link_connected(&self) -> bool {
        self.state().is_link_connected()
    }

    pub fn is_session_connected(&self) -> bool {
        self.state().is_session_connected()
    }

    pub fn is_session_active(&self) -> bool {
        self.state().is_session_active()
    }

    /// Whether state or session data changed since the last
    /// [`clear_ui_update`](Self::clear_ui_update).
    pub fn needs_ui_update(&self) -> bool {
        self.needs_ui_update
    }

    pub fn clear_ui_update(&mut self) {
        self.needs_ui_update = false;
    }

    pub fn has_network_error(&self) -> bool {
        self.network_error.is_active()
    }

    pub fn network_error_message(&self) -> &str {
        self.network_error.message()
    }

    /// Dismiss the network error. The next loss notice surfaces again.
    pub fn clear_network_error(&mut self) {
        self.network_error.clear();
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn client_id(&self) -> Option<&str> {
        self.session.client_id.as_deref()
    }

    pub fn local_player(&self) -> &PlayerInfo {
        &self.session.local
    }

    pub fn opponent_player(&self) -> &PlayerInfo {
        &self.session.opponent
    }

    pub fn is_opponent_connected(&self) -> bool {
        self.session.opponent_connected
    }

    pub fn is_game_over(&self) -> bool {
        self.session.game_over
    }

    pub fn is_session_invalid(&self) -> bool {
        self.session.session_invalid
    }

    pub fn clear_session_invalid(&mut self) {
        self.session.session_invalid = false;
    }

    /// Snapshot of every counter.
    pub fn stats(&self) -> Stats {
        let outbound = self.writer.counters();
        Stats {
            bytes_sent: outbound.bytes_sent,
            bytes_received: self.inbound.bytes_received,
            messages_sent: outbound.messages_sent,
            messages_parsed: self.inbound.messages_parsed,
            parse_errors: self.inbound.parse_errors,
            length_mismatches: self.inbound.length_mismatches,
            send_errors: outbound.send_errors,
            buffer_overflows: u64::from(self.ingress.overflow_count()),
            queue_overflows: u64::from(self.queue.overflow_count()),
        }
    }

    /// Write the counters to stdout as one JSON line.
    pub fn print_stats(&self) -> Result<()> {
        let line = self.stats().to_json_line()?;
        tracing::info!("[{}] link stats {}", self.config.role, line);
        write_stdout_line(&line)?;
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn role(&self) -> NodeRole {
        self.config.role
    }

    pub fn transport(&self) -> &T {
        self.writer.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.writer.transport_mut()
    }
}

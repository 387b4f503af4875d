//! Gateway session lifecycle and the background reader.
//!
//! # Lifecycle
//!
//! ```text
//!            start()
//!   Idle ─────────────────► Running
//!    ▲  open/flush failed      │
//!    │  leaves it Idle         │ read error or callback panic
//!    │                         ▼
//!    └──────── stop() ──── Faulted
//!    ▲                         │
//!    └──────── stop() ─────────┘ (from Running too)
//! ```
//!
//! `start()` on a running session does nothing. `start()` on a faulted
//! session releases the old transport and opens a new one. `stop()` is
//! idempotent and also runs when the [`Gateway`] is dropped.
//!
//! # Reader
//!
//! One thread per session reads the transport with a 100ms poll, frames
//! lines, and hands each to [`handle_line`]. Malformed or invalid lines are
//! logged and skipped. A transport read error ends the thread: it clears
//! the running flag but leaves the transport open for the session to
//! release.

use crate::{
    client::GatewayClient,
    config::GatewayConfig,
    dispatch::handle_line,
    error::{GatewayError, Result},
    handler::Handler,
    signal::{ClearOnDrop, RunningFlag},
    transport::{Connector, SerialConnector, Transport, is_poll_timeout},
};
use bytes::BytesMut;
use pgstreams_core::{Error, constants::READ_POLL_TIMEOUT};
use pgstreams_protocol::{Stamp, StreamsCodec, SystemStamp};
use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio_util::codec::Decoder;
use tracing::{Span, debug, error, info, trace, warn};

/// Observable lifecycle state of a [`Gateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No transport open.
    Idle,
    /// Reader running, commands accepted.
    Running,
    /// Reader exited on its own; the transport is still held until the next
    /// `start()` or `stop()`.
    Faulted,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// A session with one Streams API gateway.
///
/// # Examples
///
/// ```no_run
/// use pgstreams_gateway::{Callbacks, Gateway, GatewayConfig};
///
/// let callbacks = Callbacks::new().with_scan(|client, event| {
///     let _ = client.send_feedback(&event.device_serial, "FEEDBACK_POSITIVE");
/// });
///
/// let mut gateway = Gateway::new(GatewayConfig::new("/dev/ttyACM0"), callbacks);
/// gateway.start()?;
/// // ... events are dispatched on the reader thread ...
/// gateway.stop();
/// # Ok::<(), pgstreams_gateway::GatewayError>(())
/// ```
pub struct Gateway {
    config: GatewayConfig,
    span: Span,
    connector: Arc<dyn Connector>,
    handler: Arc<dyn Handler>,
    client: GatewayClient,
    reader: Option<JoinHandle<()>>,
    phase: SessionState,
}

impl Gateway {
    /// Create an idle session on the serial port named in `config`.
    pub fn new(config: GatewayConfig, handler: impl Handler + 'static) -> Self {
        let span = config.resolve_span();
        let client = GatewayClient::new(&config.port, RunningFlag::new(), Arc::new(SystemStamp));

        Self {
            config,
            span,
            connector: Arc::new(SerialConnector),
            handler: Arc::new(handler),
            client,
            reader: None,
            phase: SessionState::Idle,
        }
    }

    /// Open transports through `connector` instead of the serial port.
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Arc::new(connector);
        self
    }

    /// Stamp outbound commands from `stamp`.
    ///
    /// Replaces the client, so call it before handing out clients.
    pub fn with_stamp(mut self, stamp: impl Stamp + 'static) -> Self {
        self.client = GatewayClient::new(&self.config.port, RunningFlag::new(), Arc::new(stamp));
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// A handle for issuing commands.
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            SessionState::Running if !self.client.running().is_set() => SessionState::Faulted,
            phase => phase,
        }
    }

    /// Whether the reader is running and commands are accepted.
    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Open the transport and start the reader.
    ///
    /// Returns once the reader is running. Does nothing if the session is
    /// already running.
    ///
    /// # Errors
    ///
    /// `Transport` if the device cannot be opened or flushed, `ReaderStart`
    /// if the reader thread cannot be spawned. The session stays idle and
    /// `start()` may be retried.
    pub fn start(&mut self) -> Result<()> {
        let span = self.span.clone();
        let _entered = span.enter();

        match self.state() {
            SessionState::Running => {
                debug!("gateway already running");
                return Ok(());
            }
            SessionState::Faulted => {
                warn!("reader stopped unexpectedly, reopening transport");
                self.stop();
            }
            _ => {}
        }

        info!(
            port = %self.config.port,
            baud_rate = self.config.baud_rate,
            "opening gateway"
        );

        match self.spawn_reader() {
            Ok(reader) => {
                self.reader = Some(reader);
                self.phase = SessionState::Running;
                info!("gateway started");
                Ok(())
            }
            Err(e) => {
                self.client.detach();
                self.client.running().clear();
                self.phase = SessionState::Idle;
                error!(error = %e, "failed to start gateway");
                Err(e)
            }
        }
    }

    fn spawn_reader(&self) -> Result<JoinHandle<()>> {
        let port = &self.config.port;
        let mut transport = self.connector.open(port, self.config.baud_rate)?;

        if self.config.flush_input {
            transport
                .discard_input()
                .map_err(|e| GatewayError::transport(port, e))?;
            debug!("discarded buffered input");
        }

        let read_half = transport
            .try_clone_transport()
            .map_err(|e| GatewayError::transport(port, e))?;
        self.client.attach(transport);

        let running = self.client.running().clone();
        running.clear();

        let reader = Reader {
            transport: read_half,
            handler: Arc::clone(&self.handler),
            client: self.client.clone(),
            running: running.clone(),
            span: self.span.clone(),
        };
        let handle = thread::Builder::new()
            .name("pgstreams-reader".to_string())
            .spawn(move || reader.run())
            .map_err(GatewayError::ReaderStart)?;

        // A reader that dies right away never leaves the flag set.
        while !running.wait_set(READ_POLL_TIMEOUT) && !handle.is_finished() {}

        Ok(handle)
    }

    /// Stop the reader and release the transport.
    ///
    /// Blocks until the reader thread has exited. Safe to call at any time,
    /// any number of times.
    pub fn stop(&mut self) {
        let span = self.span.clone();
        let _entered = span.enter();

        if self.reader.is_none() && !self.client.is_attached() {
            self.phase = SessionState::Idle;
            return;
        }

        self.client.running().clear();

        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                error!("reader thread panicked");
            }
        }

        if self.client.detach().is_some() {
            info!("gateway closed");
        }
        self.phase = SessionState::Idle;
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// State owned by the reader thread.
struct Reader {
    transport: Box<dyn Transport>,
    handler: Arc<dyn Handler>,
    client: GatewayClient,
    running: RunningFlag,
    span: Span,
}

impl Reader {
    fn run(mut self) {
        let span = self.span.clone();
        let _entered = span.enter();
        let _clear = ClearOnDrop(self.running.clone());

        let mut codec = StreamsCodec::new();
        let mut buffer = BytesMut::with_capacity(4096);
        let mut chunk = [0u8; 1024];

        self.running.set();
        debug!("reader started");

        while self.running.is_set() {
            match self.transport.read(&mut chunk) {
                Ok(0) => continue,
                Ok(count) => {
                    trace!(bytes = count, "received");
                    buffer.extend_from_slice(&chunk[..count]);
                    self.drain(&mut codec, &mut buffer);
                }
                Err(e) if is_poll_timeout(&e) => continue,
                Err(e) => {
                    error!(error = %e, "transport read failed, reader exiting");
                    break;
                }
            }
        }

        debug!("reader stopped");
    }

    fn drain(&self, codec: &mut StreamsCodec, buffer: &mut BytesMut) {
        loop {
            match codec.decode(buffer) {
                Ok(Some(line)) => self.handle(&line),
                Ok(None) => return,
                Err(e) => warn!(error = %e, "line discarded"),
            }
        }
    }

    fn handle(&self, line: &[u8]) {
        if line.trim_ascii().is_empty() {
            return;
        }

        match handle_line(self.handler.as_ref(), &self.client, line) {
            Ok(event_type) => trace!(%event_type, "event handled"),
            Err(Error::Validation(e)) => {
                warn!(error = %e, "invalid message skipped");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    line = %String::from_utf8_lossy(line),
                    "malformed message skipped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handler::Callbacks, mock::MockConnector};
    use pgstreams_core::{EventId, Timestamp};
    use pgstreams_protocol::FixedStamp;
    use std::time::Duration;

    fn mock_gateway() -> (Gateway, crate::mock::MockGatewayHandle) {
        let (connector, handle) = MockConnector::new();
        let gateway =
            Gateway::new(GatewayConfig::new("mock"), Callbacks::new()).with_connector(connector);
        (gateway, handle)
    }

    #[test]
    fn test_new_gateway_is_idle() {
        let (gateway, handle) = mock_gateway();
        assert_eq!(gateway.state(), SessionState::Idle);
        assert!(!gateway.is_running());
        assert_eq!(handle.open_count(), 0);
    }

    #[test]
    fn test_start_and_stop() {
        let (mut gateway, handle) = mock_gateway();

        gateway.start().unwrap();
        assert_eq!(gateway.state(), SessionState::Running);
        assert!(gateway.client().is_connected());
        assert_eq!(handle.discard_count(), 1);

        gateway.stop();
        assert_eq!(gateway.state(), SessionState::Idle);
        assert!(!gateway.client().is_connected());
    }

    #[test]
    fn test_flush_disabled() {
        let (connector, handle) = MockConnector::new();
        let mut gateway = Gateway::new(
            GatewayConfig::new("mock").with_flush_input(false),
            Callbacks::new(),
        )
        .with_connector(connector);

        gateway.start().unwrap();
        assert_eq!(handle.discard_count(), 0);
    }

    #[test]
    fn test_open_failure_leaves_session_idle() {
        let (mut gateway, handle) = mock_gateway();
        handle.fail_next_open("device busy");

        assert!(matches!(
            gateway.start(),
            Err(GatewayError::Transport { .. })
        ));
        assert_eq!(gateway.state(), SessionState::Idle);

        gateway.start().unwrap();
        assert!(gateway.is_running());
    }

    #[test]
    fn test_drop_stops_reader() {
        let (mut gateway, _handle) = mock_gateway();
        gateway.start().unwrap();
        let client = gateway.client().clone();

        drop(gateway);
        assert!(!client.is_connected());
    }

    #[test]
    fn test_with_stamp_leaves_session_untouched() {
        let (gateway, handle) = mock_gateway();
        let stamp = FixedStamp::new(
            EventId::new("c6fd7137-055a-4feb-8c32-9dbb9a117f6a").unwrap(),
            Timestamp::from_millis(1_546_300_800_000).unwrap(),
        );

        let mut gateway = gateway.with_stamp(stamp);
        assert_eq!(gateway.state(), SessionState::Idle);
        assert!(!gateway.client().is_connected());
        assert_eq!(handle.open_count(), 0);

        gateway.start().unwrap();
        gateway.client().get_gateway_state().unwrap();
        let lines = handle.wait_for_lines(1, Duration::from_secs(5));
        assert!(lines[0].contains("\"event_id\":\"c6fd7137-055a-4feb-8c32-9dbb9a117f6a\""));
        assert!(lines[0].contains("\"time_created\":1546300800000"));
    }

    #[test]
    fn test_stop_on_idle_session() {
        let (mut gateway, handle) = mock_gateway();
        gateway.stop();
        gateway.stop();
        assert_eq!(gateway.state(), SessionState::Idle);
        assert_eq!(handle.open_count(), 0);
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Running.to_string(), "running");
        assert_eq!(SessionState::Faulted.to_string(), "faulted");
    }
}

//! In-memory gateway transport for testing and development.
//!
//! [`MockConnector::new`] returns the connector together with a
//! [`MockGatewayHandle`] that plays the gateway's side of the link: it pushes
//! inbound lines, inspects what the session wrote, and injects failures.
//!
//! # Examples
//!
//! ```
//! use pgstreams_gateway::{Callbacks, Gateway, GatewayConfig, mock::MockConnector};
//!
//! let (connector, handle) = MockConnector::new();
//! let mut gateway = Gateway::new(GatewayConfig::new("mock"), Callbacks::new())
//!     .with_connector(connector);
//!
//! gateway.start()?;
//! gateway.client().get_gateway_state()?;
//!
//! let lines = handle.wait_for_lines(1, std::time::Duration::from_secs(1));
//! assert!(lines[0].contains("\"gateway_state!\""));
//!
//! gateway.stop();
//! # Ok::<(), pgstreams_gateway::GatewayError>(())
//! ```

use crate::{
    error::{GatewayError, Result},
    transport::{Connector, Transport},
};
use pgstreams_core::constants::READ_POLL_TIMEOUT;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct MockState {
    /// Bytes waiting to be read by the session
    inbound: VecDeque<u8>,

    /// Everything the session wrote
    written: Vec<u8>,

    /// Failure returned by the next read
    read_error: Option<io::ErrorKind>,

    /// Failure returned by the next open
    open_error: Option<String>,

    open_count: usize,
    discard_count: usize,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<MockState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Connector producing [`MockTransport`]s that share one simulated link.
#[derive(Debug, Clone)]
pub struct MockConnector {
    shared: Arc<Shared>,
}

impl MockConnector {
    /// Create a connector and the handle controlling its link.
    pub fn new() -> (Self, MockGatewayHandle) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockGatewayHandle { shared },
        )
    }
}

impl Connector for MockConnector {
    fn open(&self, port: &str, _baud_rate: u32) -> Result<Box<dyn Transport>> {
        let mut state = self.shared.lock();
        if let Some(message) = state.open_error.take() {
            return Err(GatewayError::transport(port, message));
        }
        state.open_count += 1;

        Ok(Box::new(MockTransport {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// One end of the simulated link.
#[derive(Debug)]
pub struct MockTransport {
    shared: Arc<Shared>,
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let state = self.shared.lock();
        let (mut state, _) = self
            .shared
            .changed
            .wait_timeout_while(state, READ_POLL_TIMEOUT, |state| {
                state.inbound.is_empty() && state.read_error.is_none()
            })
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(kind) = state.read_error.take() {
            return Err(io::Error::new(kind, "mock read failure"));
        }
        if state.inbound.is_empty() {
            return Err(io::Error::from(io::ErrorKind::TimedOut));
        }

        let count = buf.len().min(state.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(state.inbound.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.shared.lock().written.extend_from_slice(buf);
        self.shared.changed.notify_all();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn discard_input(&mut self) -> io::Result<()> {
        let mut state = self.shared.lock();
        state.inbound.clear();
        state.discard_count += 1;
        Ok(())
    }

    fn try_clone_transport(&self) -> io::Result<Box<dyn Transport>> {
        Ok(Box::new(MockTransport {
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Gateway side of a [`MockConnector`] link.
#[derive(Debug, Clone)]
pub struct MockGatewayHandle {
    shared: Arc<Shared>,
}

impl MockGatewayHandle {
    /// Queue raw bytes for the session to read.
    pub fn push_bytes(&self, bytes: &[u8]) {
        self.shared.lock().inbound.extend(bytes.iter().copied());
        self.shared.changed.notify_all();
    }

    /// Queue one line, adding the `\n` terminator.
    pub fn push_line(&self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.push(b'\n');
        self.push_bytes(&bytes);
    }

    /// Make the next read fail with `kind`, as an unplugged device would.
    pub fn fail_next_read(&self, kind: io::ErrorKind) {
        self.shared.lock().read_error = Some(kind);
        self.shared.changed.notify_all();
    }

    /// Make the next open fail with `message`.
    pub fn fail_next_open(&self, message: impl Into<String>) {
        self.shared.lock().open_error = Some(message.into());
    }

    /// Bytes queued but not yet read.
    pub fn pending_input(&self) -> usize {
        self.shared.lock().inbound.len()
    }

    /// Everything written by the session so far.
    pub fn written(&self) -> Vec<u8> {
        self.shared.lock().written.clone()
    }

    /// Complete lines written so far, without terminators.
    pub fn written_lines(&self) -> Vec<String> {
        complete_lines(&self.shared.lock().written)
    }

    /// Wait until at least `count` complete lines were written or `timeout`
    /// elapses, then return the lines written so far.
    pub fn wait_for_lines(&self, count: usize, timeout: Duration) -> Vec<String> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();

        loop {
            let lines = complete_lines(&state.written);
            let now = Instant::now();
            if lines.len() >= count || now >= deadline {
                return lines;
            }
            state = self
                .shared
                .changed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// How many transports were opened.
    pub fn open_count(&self) -> usize {
        self.shared.lock().open_count
    }

    /// How many times buffered input was discarded.
    pub fn discard_count(&self) -> usize {
        self.shared.lock().discard_count
    }
}

fn complete_lines(written: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = written
        .split(|byte| *byte == b'\n')
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect();
    // The piece after the last terminator is incomplete (or empty).
    lines.pop();
    lines
}

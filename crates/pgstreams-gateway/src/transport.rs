//! Byte transport between the host and the gateway.
//!
//! A [`Connector`] opens a [`Transport`] for a device path and baud rate.
//! The session splits the opened transport in two with
//! [`Transport::try_clone_transport`]: the reader thread owns the read half
//! and the [`GatewayClient`](crate::GatewayClient) owns the write half.
//!
//! ```text
//! Connector::open ─► Transport ─┬─► read half  (reader thread, 100ms poll)
//!                               └─► write half (commands, under a lock)
//! ```
//!
//! Reads block for at most [`READ_POLL_TIMEOUT`] and report an empty poll as
//! an [`io::ErrorKind::TimedOut`] error (or `Ok(0)`), which the reader treats
//! as "no data yet" rather than a failure.

use crate::error::{GatewayError, Result};
use pgstreams_core::constants::READ_POLL_TIMEOUT;
use serialport::{ClearBuffer, SerialPort};
use std::io::{self, Read, Write};

/// An open, bidirectional byte stream to the gateway.
pub trait Transport: Read + Write + Send {
    /// Drop any bytes already received but not yet read.
    fn discard_input(&mut self) -> io::Result<()>;

    /// Open a second handle to the same underlying device.
    fn try_clone_transport(&self) -> io::Result<Box<dyn Transport>>;
}

/// Opens transports for a session.
pub trait Connector: Send + Sync {
    /// # Errors
    ///
    /// Returns `GatewayError::Transport` if the device cannot be opened.
    fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn Transport>>;
}

/// Whether a read error only means "nothing arrived within the poll window".
pub(crate) fn is_poll_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// Serial port backend built on the `serialport` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    fn open(&self, port: &str, baud_rate: u32) -> Result<Box<dyn Transport>> {
        let serial = serialport::new(port, baud_rate)
            .timeout(READ_POLL_TIMEOUT)
            .open()
            .map_err(|e| GatewayError::transport(port, e))?;

        Ok(Box::new(SerialTransport { port: serial }))
    }
}

/// An open serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("name", &self.port.name())
            .finish()
    }
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialTransport {
    fn discard_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input).map_err(io::Error::from)
    }

    fn try_clone_transport(&self) -> io::Result<Box<dyn Transport>> {
        let port = self.port.try_clone().map_err(io::Error::from)?;
        Ok(Box::new(SerialTransport { port }))
    }
}

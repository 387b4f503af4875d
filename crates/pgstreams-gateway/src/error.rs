//! Error types for gateway sessions.
//!
//! Only failures the caller can act on are represented here: opening or
//! writing the transport, issuing a command without a live session, and
//! encoding a command. Per-line decoding and validation failures stay inside
//! the reader loop and are logged, never returned.

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by [`Gateway`](crate::Gateway) and
/// [`GatewayClient`](crate::GatewayClient).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Opening, flushing or writing the serial transport failed.
    #[error("Transport error on {port}: {message}")]
    Transport { port: String, message: String },

    /// A command was issued while no live session exists.
    #[error("Gateway not connected")]
    NotConnected,

    /// The command could not be encoded.
    #[error("Protocol error: {0}")]
    Protocol(#[from] pgstreams_core::Error),

    /// The background reader thread could not be spawned.
    #[error("Failed to spawn reader thread: {0}")]
    ReaderStart(#[source] std::io::Error),
}

impl GatewayError {
    /// Create a new transport error.
    pub fn transport(port: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            port: port.into(),
            message: message.to_string(),
        }
    }

    /// Check if this error came from the serial layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

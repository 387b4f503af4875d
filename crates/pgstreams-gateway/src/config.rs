//! Session configuration.

use pgstreams_core::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT};
use tracing::Span;

/// Configuration for a [`Gateway`](crate::Gateway) session.
///
/// # Examples
///
/// ```
/// use pgstreams_gateway::GatewayConfig;
///
/// let config = GatewayConfig::default()
///     .with_port("/dev/ttyACM1")
///     .with_flush_input(false);
///
/// assert_eq!(config.port, "/dev/ttyACM1");
/// assert_eq!(config.baud_rate, 115_200);
/// assert!(!config.flush_input);
/// ```
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Serial device path (`/dev/ttyACM0`, `COM3`, ...).
    pub port: String,

    /// Serial baud rate.
    pub baud_rate: u32,

    /// Discard bytes already buffered by the transport when starting.
    pub flush_input: bool,

    /// Span the session logs under. Defaults to `gateway{port=...}`.
    pub span: Option<Span>,
}

impl GatewayConfig {
    /// Create a configuration for `port` with default settings.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_flush_input(mut self, flush_input: bool) -> Self {
        self.flush_input = flush_input;
        self
    }

    /// Log the session's activity under `span` instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub(crate) fn resolve_span(&self) -> Span {
        self.span
            .clone()
            .unwrap_or_else(|| tracing::info_span!("gateway", port = %self.port))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            flush_input: true,
            span: None,
        }
    }
}

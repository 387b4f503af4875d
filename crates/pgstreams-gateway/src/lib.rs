//! Gateway session for the ProGlove Streams API.
//!
//! A [`Gateway`] owns the serial link to a scanner gateway. Once started, a
//! background reader thread frames incoming lines, validates them into
//! events and dispatches each one to a [`Handler`]. Commands go out through
//! a [`GatewayClient`], which is also what every callback receives.
//!
//! ```text
//!                 ┌──────────── Gateway ────────────┐
//!  serial port ──►│ reader thread                    │
//!                 │  read (100ms poll) ─► frame line │
//!                 │  ─► decode_line ─► parse_event   │──► Handler::on_*
//!                 │                                  │        │
//!  serial port ◄──│ GatewayClient::send ◄────────────┼────────┘
//!                 └──────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pgstreams_gateway::{Callbacks, Gateway, GatewayConfig};
//!
//! let callbacks = Callbacks::new()
//!     .with_scan(|client, event| {
//!         tracing::info!(scan_code = %event.scan_code, "scanned");
//!         let _ = client.send_feedback(&event.device_serial, "FEEDBACK_POSITIVE");
//!     })
//!     .with_scanner_connected(|client, _| {
//!         let _ = client.get_gateway_state();
//!     });
//!
//! let mut gateway = Gateway::new(GatewayConfig::new("/dev/ttyACM0"), callbacks);
//! gateway.start()?;
//! # gateway.stop();
//! # Ok::<(), pgstreams_gateway::GatewayError>(())
//! ```
//!
//! # Error Handling
//!
//! Only opening and writing the transport, and commands issued without a
//! live session, return errors ([`GatewayError`]). Lines that are not valid
//! JSON or not valid events are logged and skipped by the reader.
//!
//! # Logging
//!
//! Everything is logged through `tracing` under the span given in
//! [`GatewayConfig::span`], or `gateway{port=...}` by default.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod mock;
pub mod signal;
pub mod transport;

pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use dispatch::{dispatch, handle_line};
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, SessionState};
pub use handler::{Callbacks, Handler};
pub use signal::RunningFlag;
pub use transport::{Connector, SerialConnector, SerialTransport, Transport};

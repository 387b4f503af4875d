//! Protocol constants for the Streams API serial link.
//!
//! Every message exchanged with the gateway is a single JSON object terminated
//! by a newline:
//!
//! ```text
//! {"api_version":"1.0","event_type":"scan","event_id":"…","time_created":1700000000000,…}\n
//! ```
//!
//! The constants below pin the envelope rules, the per-field length bounds
//! and the transport timings shared by the protocol and gateway crates.
//!
//! # Usage
//!
//! ```
//! use pgstreams_core::constants::*;
//!
//! assert_eq!(API_VERSION, "1.0");
//! assert_eq!(LINE_TERMINATOR, b'\n');
//! assert!(MIN_TIME_CREATED < MAX_TIME_CREATED);
//! ```

use std::time::Duration;

// ============================================================================
// Envelope
// ============================================================================

/// The only API version this client speaks.
pub const API_VERSION: &str = "1.0";

/// Lower bound for `time_created`: 2019-01-01T00:00:00Z in epoch milliseconds.
pub const MIN_TIME_CREATED: i64 = 1_546_300_800_000;

/// Upper bound for `time_created` (far-future sentinel, year 5138).
pub const MAX_TIME_CREATED: i64 = 99_999_999_999_999;

// ============================================================================
// Field Bounds
// ============================================================================

/// Minimum length of serial numbers, versions and other short identifiers.
pub const MIN_IDENTIFIER_LENGTH: usize = 1;

/// Maximum length of serial numbers, versions and other short identifiers.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Minimum length of a scanned barcode payload.
pub const MIN_SCAN_CODE_LENGTH: usize = 1;

/// Maximum length of a scanned barcode payload.
pub const MAX_SCAN_CODE_LENGTH: usize = 2000;

/// Maximum number of devices reported in a single gateway state event.
pub const MAX_CONNECTED_DEVICES: usize = 50;

// ============================================================================
// Commands
// ============================================================================

/// Display refresh type used when the caller does not choose one.
pub const DEFAULT_DISPLAY_REFRESH_TYPE: &str = "DEFAULT";

// ============================================================================
// Transport
// ============================================================================

/// Message terminator on the wire.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Longest inbound line accepted before the framer discards it.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Default serial baud rate of the gateway.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// How long a single transport read may block before the reader loop
/// re-checks its stop signal.
pub const READ_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Default serial device path.
#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM1";

/// Default serial device path.
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

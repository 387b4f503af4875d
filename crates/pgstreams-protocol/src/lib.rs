//! Streams API wire protocol.
//!
//! The gateway speaks newline-delimited JSON. This crate turns inbound lines
//! into typed, validated [`InboundEvent`]s and outbound [`OutboundCommand`]s
//! into stamped wire bytes:
//!
//! ```text
//! bytes ─► StreamsCodec (line framing) ─► decode_line ─► parse_event ─► InboundEvent
//! OutboundCommand ─► encode (+ Stamp) ─► {"api_version":"1.0",…}\n
//! ```
//!
//! # Example
//!
//! ```
//! use pgstreams_protocol::{InboundEvent, decode_line, parse_event};
//!
//! let line = br#"{"api_version":"1.0","event_type":"scan","event_id":"c6fd7137-055a-4feb-8c32-9dbb9a117f6a","time_created":1700000000000,"device_serial":"123","scan_code":"DISPLAY"}"#;
//! let fields = decode_line(line).unwrap();
//!
//! match parse_event(&fields).unwrap() {
//!     InboundEvent::Scan(scan) => assert_eq!(scan.scan_code, "DISPLAY"),
//!     other => panic!("unexpected event {other:?}"),
//! }
//! ```

pub mod codec;
pub mod commands;
pub mod event_type;
pub mod events;
pub mod stamp;
pub mod validation;

pub use codec::{StreamsCodec, decode_line, encode};
pub use commands::{
    Command, DisplayField, GetGatewayState, OutboundCommand, SendFeedback, SetDisplay,
    SetTriggerBlock,
};
pub use event_type::EventType;
pub use events::{
    ButtonPressedEvent, ConnectedState, DeviceInfo, DisconnectReason, Envelope, ErrorCode,
    ErrorEvent, ErrorSeverity, GatewayStateEvent, InboundEvent, ScanEvent, ScannerStateEvent,
    TriggerGesture, parse_event,
};
pub use stamp::{FixedStamp, Stamp, SystemStamp};

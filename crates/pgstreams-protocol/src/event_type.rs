//! Event type discriminants of the Streams API.
//!
//! Every message carries an `event_type` string. Inbound events sent by the
//! gateway use plain names, outbound commands sent by the host end with `!`:
//!
//! | Direction | Discriminant      | Variant                     |
//! |-----------|-------------------|-----------------------------|
//! | inbound   | `scan`            | [`EventType::Scan`]         |
//! | inbound   | `scanner_state`   | [`EventType::ScannerState`] |
//! | inbound   | `errors`          | [`EventType::Errors`]       |
//! | inbound   | `gateway_state`   | [`EventType::GatewayState`] |
//! | inbound   | `button_pressed`  | [`EventType::ButtonPressed`]|
//! | outbound  | `gateway_state!`  | [`EventType::GetGatewayState`] |
//! | outbound  | `feedback!`       | [`EventType::Feedback`]     |
//! | outbound  | `display!`        | [`EventType::Display`]      |
//! | outbound  | `trigger_block!`  | [`EventType::TriggerBlock`] |
//!
//! ```
//! use pgstreams_protocol::EventType;
//!
//! let kind = EventType::parse("scanner_state").unwrap();
//! assert_eq!(kind, EventType::ScannerState);
//! assert_eq!(kind.as_str(), "scanner_state");
//! assert!(!kind.is_command());
//! assert!(EventType::parse("nope").is_err());
//! ```

use pgstreams_core::ValidationError;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    // Inbound events
    Scan,
    ScannerState,
    Errors,
    GatewayState,
    ButtonPressed,

    // Outbound commands
    GetGatewayState,
    Feedback,
    Display,
    TriggerBlock,
}

impl EventType {
    /// Parse a wire discriminant.
    ///
    /// # Errors
    /// Returns `ValidationError::NoMatchingVariant` for unknown strings.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "scan" => Ok(EventType::Scan),
            "scanner_state" => Ok(EventType::ScannerState),
            "errors" => Ok(EventType::Errors),
            "gateway_state" => Ok(EventType::GatewayState),
            "button_pressed" => Ok(EventType::ButtonPressed),
            "gateway_state!" => Ok(EventType::GetGatewayState),
            "feedback!" => Ok(EventType::Feedback),
            "display!" => Ok(EventType::Display),
            "trigger_block!" => Ok(EventType::TriggerBlock),
            _ => Err(ValidationError::no_match(Some(s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Scan => "scan",
            EventType::ScannerState => "scanner_state",
            EventType::Errors => "errors",
            EventType::GatewayState => "gateway_state",
            EventType::ButtonPressed => "button_pressed",
            EventType::GetGatewayState => "gateway_state!",
            EventType::Feedback => "feedback!",
            EventType::Display => "display!",
            EventType::TriggerBlock => "trigger_block!",
        }
    }

    /// Returns `true` for host-to-gateway commands.
    #[inline]
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Self::GetGatewayState | Self::Feedback | Self::Display | Self::TriggerBlock
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

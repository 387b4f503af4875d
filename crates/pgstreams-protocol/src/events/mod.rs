//! Inbound event model.
//!
//! [`parse_event`] turns the decoded JSON object of one line into exactly one
//! [`InboundEvent`] variant, or a [`ValidationError`]. Validation is all or
//! nothing: the envelope is checked first and a failure there stops parsing
//! before any variant field is looked at.
//!
//! # Variants
//!
//! | `event_type`     | Variant                          |
//! |------------------|----------------------------------|
//! | `scan`           | [`InboundEvent::Scan`]           |
//! | `scanner_state`  | [`InboundEvent::ScannerState`]   |
//! | `errors`         | [`InboundEvent::Error`]          |
//! | `gateway_state`  | [`InboundEvent::GatewayState`]   |
//! | `button_pressed` | [`InboundEvent::ButtonPressed`]  |
//!
//! Fields that a variant does not name are ignored.

mod button_pressed;
mod envelope;
mod error;
mod gateway_state;
mod scan;
mod scanner_state;

pub use button_pressed::{ButtonPressedEvent, TriggerGesture};
pub use envelope::Envelope;
pub use error::{ErrorCode, ErrorEvent, ErrorSeverity};
pub use gateway_state::{DeviceInfo, GatewayStateEvent};
pub use scan::ScanEvent;
pub use scanner_state::{ConnectedState, DisconnectReason, ScannerStateEvent};

use crate::{
    EventType,
    validation::{FieldReader, RawFields, ValidationResult, check_length, check_uuid},
};
use pgstreams_core::{
    ValidationError,
    constants::{MAX_IDENTIFIER_LENGTH, MIN_IDENTIFIER_LENGTH},
};
use serde::Serialize;

/// Declares a closed set of wire strings as a Rust enum.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl $crate::validation::WireEnum for $name {
            const VALUES: &'static [&'static str] = &[$($wire),+];

            fn from_wire(value: &str) -> Option<Self> {
                match value {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

pub(crate) use wire_enum;

/// A validated inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InboundEvent {
    Scan(ScanEvent),
    ScannerState(ScannerStateEvent),
    Error(ErrorEvent),
    GatewayState(GatewayStateEvent),
    ButtonPressed(ButtonPressedEvent),
}

impl InboundEvent {
    pub fn envelope(&self) -> &Envelope {
        match self {
            Self::Scan(event) => &event.envelope,
            Self::ScannerState(event) => &event.envelope,
            Self::Error(event) => &event.envelope,
            Self::GatewayState(event) => &event.envelope,
            Self::ButtonPressed(event) => &event.envelope,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.envelope().event_type
    }

    /// Serial of the scanner the event is about, if any.
    pub fn device_serial(&self) -> Option<&str> {
        match self {
            Self::Scan(event) => Some(&event.device_serial),
            Self::ScannerState(event) => Some(&event.device_serial),
            Self::Error(event) => event.device_serial.as_deref(),
            Self::GatewayState(_) => None,
            Self::ButtonPressed(event) => Some(&event.device_serial),
        }
    }
}

/// Parse the decoded fields of one message into a typed event.
///
/// # Errors
///
/// - `NoMatchingVariant` when `event_type` is missing, not a string, unknown,
///   or names an outbound command.
/// - Any other [`ValidationError`] for the first envelope or variant
///   constraint the message breaks.
pub fn parse_event(fields: &RawFields) -> ValidationResult<InboundEvent> {
    let event_type = match fields.get("event_type") {
        Some(serde_json::Value::String(value)) => value.as_str(),
        _ => return Err(ValidationError::no_match(None)),
    };

    let kind = EventType::parse(event_type)?;
    let reader = FieldReader::new(fields);

    match kind {
        EventType::Scan => ScanEvent::validate(&reader).map(InboundEvent::Scan),
        EventType::ScannerState => {
            ScannerStateEvent::validate(&reader).map(InboundEvent::ScannerState)
        }
        EventType::Errors => ErrorEvent::validate(&reader).map(InboundEvent::Error),
        EventType::GatewayState => {
            GatewayStateEvent::validate(&reader).map(InboundEvent::GatewayState)
        }
        EventType::ButtonPressed => {
            ButtonPressedEvent::validate(&reader).map(InboundEvent::ButtonPressed)
        }
        EventType::GetGatewayState
        | EventType::Feedback
        | EventType::Display
        | EventType::TriggerBlock => Err(ValidationError::no_match(Some(event_type))),
    }
}

/// Required serial/version-like string, 1-128 characters.
pub(crate) fn required_identifier(fields: &FieldReader<'_>, name: &str) -> ValidationResult<String> {
    let value = fields.required_str(name)?;
    check_length(name, value, MIN_IDENTIFIER_LENGTH, MAX_IDENTIFIER_LENGTH).map(str::to_owned)
}

/// Optional serial/version-like string, 1-128 characters when present.
pub(crate) fn optional_identifier(
    fields: &FieldReader<'_>,
    name: &str,
) -> ValidationResult<Option<String>> {
    fields
        .optional_str(name)?
        .map(|value| {
            check_length(name, value, MIN_IDENTIFIER_LENGTH, MAX_IDENTIFIER_LENGTH)
                .map(str::to_owned)
        })
        .transpose()
}

/// Optional reference to another message's `event_id`.
pub(crate) fn optional_uuid(
    fields: &FieldReader<'_>,
    name: &str,
) -> ValidationResult<Option<String>> {
    fields
        .optional_str(name)?
        .map(|value| check_uuid(name, value).map(str::to_owned))
        .transpose()
}

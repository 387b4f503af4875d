use super::{Envelope, required_identifier, wire_enum};
use crate::{
    EventType,
    validation::{FieldReader, ValidationResult, check_enum},
};
use serde::Serialize;

wire_enum! {
    /// Connection state reported for a scanner.
    pub enum ConnectedState {
        Connected => "STATE_CONNECTED",
        Disconnected => "STATE_DISCONNECTED",
    }
}

wire_enum! {
    /// Why a scanner disconnected.
    pub enum DisconnectReason {
        Unknown => "UNKNOWN",
    }
}

/// A scanner connected to or disconnected from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannerStateEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub device_serial: String,
    pub device_connected_state: ConnectedState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_disconnect_reason: Option<DisconnectReason>,
}

impl ScannerStateEvent {
    pub(crate) fn validate(fields: &FieldReader<'_>) -> ValidationResult<Self> {
        let envelope = Envelope::validate(fields, EventType::ScannerState)?;
        let device_serial = required_identifier(fields, "device_serial")?;
        let device_connected_state = check_enum(
            "device_connected_state",
            fields.required_str("device_connected_state")?,
        )?;
        let device_disconnect_reason = fields
            .optional_str("device_disconnect_reason")?
            .map(|reason| check_enum("device_disconnect_reason", reason))
            .transpose()?;

        Ok(Self {
            envelope,
            device_serial,
            device_connected_state,
            device_disconnect_reason,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.device_connected_state == ConnectedState::Connected
    }
}

use super::{Envelope, optional_identifier, optional_uuid, wire_enum};
use crate::{
    EventType,
    validation::{FieldReader, ValidationResult, check_enum},
};
use serde::Serialize;

wire_enum! {
    /// Error codes the gateway reports.
    pub enum ErrorCode {
        Unknown => "ERROR_UNKNOWN",
        Ok => "ERROR_OK",
        InvalidCommand => "ERROR_INVALID_COMMAND",
        Timeout => "ERROR_TIMEOUT",
        DeviceNotFound => "ERROR_DEVICE_NOT_FOUND",
    }
}

wire_enum! {
    pub enum ErrorSeverity {
        Warning => "WARNING",
        Error => "ERROR",
        Critical => "CRITICAL",
    }
}

/// The gateway reports a failure, usually of a command the host sent.
///
/// `event_reference_id` points at the `event_id` of that command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub error_code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_severity: Option<ErrorSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_serial: Option<String>,
}

impl ErrorEvent {
    pub(crate) fn validate(fields: &FieldReader<'_>) -> ValidationResult<Self> {
        let envelope = Envelope::validate(fields, EventType::Errors)?;
        let error_code = check_enum("error_code", fields.required_str("error_code")?)?;
        let event_reference_id = optional_uuid(fields, "event_reference_id")?;
        let error_severity = fields
            .optional_str("error_severity")?
            .map(|severity| check_enum("error_severity", severity))
            .transpose()?;
        let error_message = fields.optional_str("error_message")?.map(str::to_owned);
        let device_serial = optional_identifier(fields, "device_serial")?;

        Ok(Self {
            envelope,
            error_code,
            event_reference_id,
            error_severity,
            error_message,
            device_serial,
        })
    }
}

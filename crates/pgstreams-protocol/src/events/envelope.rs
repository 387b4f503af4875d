use super::optional_identifier;
use crate::{
    EventType,
    validation::{FieldReader, ValidationResult, check_equal, check_uuid},
};
use pgstreams_core::{EventId, Timestamp, ValidationError, constants::API_VERSION};
use serde::Serialize;

/// Fields common to every Streams API message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub api_version: String,
    pub event_type: EventType,
    pub event_id: EventId,
    pub time_created: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_serial: Option<String>,
}

impl Envelope {
    /// Validate the envelope of a message expected to be of kind `expected`.
    ///
    /// # Errors
    /// Returns the first envelope constraint violation.
    pub fn validate(fields: &FieldReader<'_>, expected: EventType) -> ValidationResult<Self> {
        let api_version = check_equal("api_version", fields.required_str("api_version")?, API_VERSION)?;
        check_equal("event_type", fields.required_str("event_type")?, expected.as_str())?;
        let event_id = check_uuid("event_id", fields.required_str("event_id")?)?;
        let time_created = Timestamp::from_millis(fields.required_i64("time_created")?)?;
        let gateway_serial = optional_identifier(fields, "gateway_serial")?;

        Ok(Self {
            api_version: api_version.to_string(),
            event_type: expected,
            event_id: EventId::new(event_id)?,
            time_created,
            gateway_serial,
        })
    }

    /// The gateway serial, for variants where it is mandatory.
    ///
    /// # Errors
    /// Returns `MissingField` when the envelope carries none.
    pub(crate) fn require_gateway_serial(&self) -> ValidationResult<()> {
        match self.gateway_serial {
            Some(_) => Ok(()),
            None => Err(ValidationError::missing("gateway_serial")),
        }
    }
}

use super::{Envelope, required_identifier, wire_enum};
use crate::{
    EventType,
    validation::{FieldReader, ValidationResult, check_enum},
};
use serde::Serialize;

wire_enum! {
    pub enum TriggerGesture {
        DoubleClick => "TRIGGER_DOUBLE_CLICK",
    }
}

/// A gesture on a scanner's trigger that is forwarded instead of scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonPressedEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub device_serial: String,
    pub trigger_gesture: TriggerGesture,
}

impl ButtonPressedEvent {
    pub(crate) fn validate(fields: &FieldReader<'_>) -> ValidationResult<Self> {
        let envelope = Envelope::validate(fields, EventType::ButtonPressed)?;
        envelope.require_gateway_serial()?;
        let device_serial = required_identifier(fields, "device_serial")?;
        let trigger_gesture = check_enum("trigger_gesture", fields.required_str("trigger_gesture")?)?;

        Ok(Self {
            envelope,
            device_serial,
            trigger_gesture,
        })
    }
}

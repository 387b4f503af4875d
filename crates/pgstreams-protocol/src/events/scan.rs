use super::{Envelope, required_identifier};
use crate::{
    EventType,
    validation::{FieldReader, ValidationResult, check_length},
};
use pgstreams_core::constants::{MAX_SCAN_CODE_LENGTH, MIN_SCAN_CODE_LENGTH};
use serde::Serialize;

/// A barcode was scanned by a connected device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub device_serial: String,
    pub scan_code: String,
}

impl ScanEvent {
    pub(crate) fn validate(fields: &FieldReader<'_>) -> ValidationResult<Self> {
        let envelope = Envelope::validate(fields, EventType::Scan)?;
        let device_serial = required_identifier(fields, "device_serial")?;
        let scan_code = check_length(
            "scan_code",
            fields.required_str("scan_code")?,
            MIN_SCAN_CODE_LENGTH,
            MAX_SCAN_CODE_LENGTH,
        )?;

        Ok(Self {
            envelope,
            device_serial,
            scan_code: scan_code.to_string(),
        })
    }
}

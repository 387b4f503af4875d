use super::{Envelope, optional_identifier, optional_uuid, required_identifier};
use crate::{
    EventType,
    validation::{FieldReader, ValidationResult, check_items, check_max_items},
};
use pgstreams_core::constants::MAX_CONNECTED_DEVICES;
use serde::Serialize;

/// A scanner currently connected to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub device_serial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_firmware_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_manufacturer: Option<String>,
}

impl DeviceInfo {
    fn validate(fields: FieldReader<'_>) -> ValidationResult<Self> {
        Ok(Self {
            device_serial: required_identifier(&fields, "device_serial")?,
            device_firmware_version: optional_identifier(&fields, "device_firmware_version")?,
            device_model: optional_identifier(&fields, "device_model")?,
            device_manufacturer: optional_identifier(&fields, "device_manufacturer")?,
        })
    }
}

/// Snapshot of the gateway, sent unprompted or in reply to `gateway_state!`.
///
/// When it answers a command, `event_reference_id` holds that command's
/// `event_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayStateEvent {
    #[serde(flatten)]
    pub envelope: Envelope,
    pub gateway_app_version: String,
    pub device_connected_list: Vec<DeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_reference_id: Option<String>,
}

impl GatewayStateEvent {
    pub(crate) fn validate(fields: &FieldReader<'_>) -> ValidationResult<Self> {
        let envelope = Envelope::validate(fields, EventType::GatewayState)?;
        envelope.require_gateway_serial()?;
        let event_reference_id = optional_uuid(fields, "event_reference_id")?;
        let gateway_app_version = required_identifier(fields, "gateway_app_version")?;

        let device_connected_list = match fields.optional_array("device_connected_list")? {
            Some(items) => {
                let items = check_max_items("device_connected_list", items, MAX_CONNECTED_DEVICES)?;
                check_items("device_connected_list", items, DeviceInfo::validate)?
            }
            None => Vec::new(),
        };

        Ok(Self {
            envelope,
            gateway_app_version,
            device_connected_list,
            event_reference_id,
        })
    }

    /// Serials of all connected devices, in reported order.
    pub fn device_serials(&self) -> impl Iterator<Item = &str> {
        self.device_connected_list
            .iter()
            .map(|device| device.device_serial.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{InboundEvent, fixtures::message, parse_event};
    use pgstreams_core::ValidationError;
    use serde_json::{Value, json};

    fn parse(extra: Value) -> ValidationResult<GatewayStateEvent> {
        match parse_event(&message("gateway_state", extra))? {
            InboundEvent::GatewayState(event) => Ok(event),
            other => panic!("expected gateway state, got {other:?}"),
        }
    }

    #[test]
    fn test_gateway_state_with_devices() {
        let event = parse(json!({
            "gateway_app_version": "1.2.3",
            "device_connected_list": [
                {"device_serial": "M2MR111100928"},
                {
                    "device_serial": "M2MR111100929",
                    "device_firmware_version": "2.1.0",
                    "device_model": "MARK_2",
                    "device_manufacturer": "ProGlove",
                },
            ],
        }))
        .unwrap();

        assert_eq!(event.gateway_app_version, "1.2.3");
        assert_eq!(
            event.device_serials().collect::<Vec<_>>(),
            ["M2MR111100928", "M2MR111100929"]
        );
        assert_eq!(event.device_connected_list[0].device_model, None);
        assert_eq!(
            event.device_connected_list[1].device_model.as_deref(),
            Some("MARK_2")
        );
    }

    #[test]
    fn test_device_list_defaults_to_empty() {
        let event = parse(json!({"gateway_app_version": "1.2.3"})).unwrap();
        assert!(event.device_connected_list.is_empty());
    }

    #[test]
    fn test_gateway_serial_required() {
        let mut fields = message("gateway_state", json!({"gateway_app_version": "1.2.3"}));
        fields.remove("gateway_serial");
        assert_eq!(
            parse_event(&fields),
            Err(ValidationError::missing("gateway_serial"))
        );
    }

    #[test]
    fn test_device_list_limit() {
        let devices: Vec<Value> = (0..=MAX_CONNECTED_DEVICES)
            .map(|i| json!({"device_serial": format!("M{i}")}))
            .collect();
        let result = parse(json!({"gateway_app_version": "1", "device_connected_list": devices}));
        assert!(matches!(
            result,
            Err(ValidationError::TooManyItems { actual: 51, .. })
        ));
    }

    #[test]
    fn test_invalid_device_fails_whole_event() {
        let result = parse(json!({
            "gateway_app_version": "1",
            "device_connected_list": [{"device_serial": "ok"}, {"device_model": "no serial"}],
        }));
        assert!(matches!(
            result,
            Err(ValidationError::InItem { index: 1, .. })
        ));
    }

    #[test]
    fn test_missing_app_version() {
        let result = parse(json!({}));
        assert_eq!(result, Err(ValidationError::missing("gateway_app_version")));
    }
}

//! Event model behaviour over complete wire lines.

use pgstreams_core::ValidationError;
use pgstreams_protocol::{
    ConnectedState, ErrorCode, InboundEvent, decode_line, parse_event, validation::RawFields,
};
use proptest::prelude::*;
use serde_json::{Value, json};

const SCAN_LINE: &str = r#"{"api_version":"1.0","event_type":"scan","event_id":"c6fd7137-055a-4feb-8c32-9dbb9a117f6a","time_created":1700000000000,"gateway_serial":"PGGW1","device_serial":"123","scan_code":"DISPLAY"}"#;

fn fields(value: Value) -> RawFields {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_scan_line_parses_to_scan_event() {
    let event = parse_event(&decode_line(SCAN_LINE.as_bytes()).unwrap()).unwrap();

    let InboundEvent::Scan(scan) = event else {
        panic!("expected a scan event");
    };
    assert_eq!(scan.device_serial, "123");
    assert_eq!(scan.scan_code, "DISPLAY");
    assert_eq!(scan.envelope.gateway_serial.as_deref(), Some("PGGW1"));
    assert_eq!(scan.envelope.time_created.as_millis(), 1_700_000_000_000);
}

#[test]
fn test_serialized_event_preserves_given_fields() {
    let raw = decode_line(SCAN_LINE.as_bytes()).unwrap();
    let event = parse_event(&raw).unwrap();

    assert_eq!(serde_json::to_value(&event).unwrap(), Value::Object(raw));
}

#[test]
fn test_incomplete_messages_never_parse() {
    for value in [
        json!({"foo": "bar"}),
        json!({"event_type": "foo"}),
        json!({"event_type": "button_pressed"}),
        json!({"event_type": "scan"}),
        json!({"event_type": "scanner_state"}),
        json!({"event_type": "errors", "foo": "bar"}),
        json!({"event_type": "gateway_state"}),
    ] {
        assert!(parse_event(&fields(value.clone())).is_err(), "{value} parsed");
    }
}

#[test]
fn test_unrelated_fields_are_ignored() {
    let mut raw = decode_line(SCAN_LINE.as_bytes()).unwrap();
    raw.insert("device_model".to_string(), json!("MARK_2"));

    assert!(matches!(parse_event(&raw), Ok(InboundEvent::Scan(_))));
}

fn uuid_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("uuid regex")
}

fn serial_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z0-9]{1,128}").expect("serial regex")
}

fn time_strategy() -> impl Strategy<Value = i64> {
    1_546_300_800_000_i64..=99_999_999_999_999_i64
}

fn scanner_state(event_id: &str, time_created: i64, serial: &str, state: &str) -> RawFields {
    fields(json!({
        "api_version": "1.0",
        "event_type": "scanner_state",
        "event_id": event_id,
        "time_created": time_created,
        "device_serial": serial,
        "device_connected_state": state,
    }))
}

proptest! {
    /// Any valid envelope with a valid variant body parses with its fields intact.
    #[test]
    fn prop_valid_scanner_state_parses(
        event_id in uuid_strategy(),
        time_created in time_strategy(),
        serial in serial_strategy(),
        connected in any::<bool>(),
    ) {
        let state = if connected { "STATE_CONNECTED" } else { "STATE_DISCONNECTED" };
        let event = parse_event(&scanner_state(&event_id, time_created, &serial, state)).unwrap();

        let InboundEvent::ScannerState(event) = event else {
            panic!("expected scanner state");
        };
        prop_assert_eq!(event.envelope.event_id.as_str(), event_id.as_str());
        prop_assert_eq!(event.envelope.time_created.as_millis(), time_created);
        prop_assert_eq!(event.device_serial, serial);
        prop_assert_eq!(
            event.device_connected_state,
            if connected { ConnectedState::Connected } else { ConnectedState::Disconnected }
        );
    }

    /// Timestamps before 2019 are always rejected.
    #[test]
    fn prop_old_timestamps_rejected(time_created in 0_i64..1_546_300_800_000_i64) {
        let raw = scanner_state(
            "c6fd7137-055a-4feb-8c32-9dbb9a117f6a",
            time_created,
            "1",
            "STATE_CONNECTED",
        );
        let result = parse_event(&raw);
        let is_out_of_range = matches!(result, Err(ValidationError::OutOfRange { .. }));
        prop_assert!(is_out_of_range);
    }

    /// Unknown error codes never produce an event.
    #[test]
    fn prop_unknown_error_code_rejected(code in "[A-Z_]{1,24}") {
        prop_assume!(!matches!(
            code.as_str(),
            "ERROR_UNKNOWN" | "ERROR_OK" | "ERROR_INVALID_COMMAND" | "ERROR_TIMEOUT" | "ERROR_DEVICE_NOT_FOUND"
        ));
        let raw = fields(json!({
            "api_version": "1.0",
            "event_type": "errors",
            "event_id": "c6fd7137-055a-4feb-8c32-9dbb9a117f6a",
            "time_created": 1_700_000_000_000_i64,
            "error_code": code,
        }));
        let is_not_one_of = matches!(parse_event(&raw), Err(ValidationError::NotOneOf { .. }));
        prop_assert!(is_not_one_of);
    }
}

#[test]
fn test_known_error_code() {
    let raw = fields(json!({
        "api_version": "1.0",
        "event_type": "errors",
        "event_id": "c6fd7137-055a-4feb-8c32-9dbb9a117f6a",
        "time_created": 1_700_000_000_000_i64,
        "error_code": "ERROR_DEVICE_NOT_FOUND",
    }));
    let Ok(InboundEvent::Error(event)) = parse_event(&raw) else {
        panic!("expected an error event");
    };
    assert_eq!(event.error_code, ErrorCode::DeviceNotFound);
}

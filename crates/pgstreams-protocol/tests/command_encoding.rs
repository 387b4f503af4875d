//! Wire encoding of outbound commands.
//!
//! Every command is checked byte-for-byte against the gateway's expected
//! format, and decoded back to confirm the stamped envelope and the absence
//! of `null` fields.

use pgstreams_core::{EventId, Timestamp};
use pgstreams_protocol::{
    DisplayField, FixedStamp, GetGatewayState, OutboundCommand, SendFeedback, SetDisplay,
    SetTriggerBlock, decode_line, encode,
};
use rstest::rstest;
use serde_json::{Value, json};

const EVENT_ID: &str = "c6fd7137-055a-4feb-8c32-9dbb9a117f6a";
const TIME_CREATED: i64 = 1_546_300_800_000;

fn stamp() -> FixedStamp {
    FixedStamp::new(
        EventId::new(EVENT_ID).unwrap(),
        Timestamp::from_millis(TIME_CREATED).unwrap(),
    )
}

fn encode_str(command: impl Into<OutboundCommand>) -> String {
    String::from_utf8(encode(&command.into(), &stamp()).unwrap()).unwrap()
}

#[test]
fn test_send_feedback_exact_bytes() {
    assert_eq!(
        encode_str(SendFeedback::new("12345", "FOO")),
        concat!(
            r#"{"api_version":"1.0","event_type":"feedback!","#,
            r#""event_id":"c6fd7137-055a-4feb-8c32-9dbb9a117f6a","time_created":1546300800000,"#,
            r#""device_serial":"12345","feedback_action_id":"FOO"}"#,
            "\n"
        )
    );
}

#[test]
fn test_set_display_exact_bytes() {
    let display = SetDisplay::new("12345", "FOOBAR", vec![DisplayField::new(42, "Just a test", "R15")])
        .with_refresh_type("ABCDEF")
        .with_time_validity_duration(1234);

    assert_eq!(
        encode_str(display),
        concat!(
            r#"{"api_version":"1.0","event_type":"display!","#,
            r#""event_id":"c6fd7137-055a-4feb-8c32-9dbb9a117f6a","time_created":1546300800000,"#,
            r#""device_serial":"12345","display_template_id":"FOOBAR","display_refresh_type":"ABCDEF","#,
            r#""display_fields":[{"display_field_id":42,"display_field_header":"Just a test","display_field_text":"R15"}],"#,
            r#""time_validity_duration":1234}"#,
            "\n"
        )
    );
}

#[test]
fn test_set_trigger_block_exact_bytes() {
    let block = SetTriggerBlock::new("12345", true, ["A", "B", "C"], ["D", "E", "F"]);

    assert_eq!(
        encode_str(block),
        concat!(
            r#"{"api_version":"1.0","event_type":"trigger_block!","#,
            r#""event_id":"c6fd7137-055a-4feb-8c32-9dbb9a117f6a","time_created":1546300800000,"#,
            r#""device_serial":"12345","trigger_block_gesture_list":["A","B","C"],"#,
            r#""trigger_unblock_gesture_list":["D","E","F"],"trigger_block_state":true}"#,
            "\n"
        )
    );
}

fn envelope(event_type: &str) -> Value {
    json!({
        "api_version": "1.0",
        "event_type": event_type,
        "event_id": EVENT_ID,
        "time_created": TIME_CREATED,
    })
}

fn merged(mut base: Value, extra: Value) -> Value {
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}

#[rstest]
#[case::get_gateway_state(
    OutboundCommand::from(GetGatewayState::default()),
    envelope("gateway_state!")
)]
#[case::send_feedback(
    OutboundCommand::from(SendFeedback::new("12345", "FOO")),
    merged(envelope("feedback!"), json!({"device_serial": "12345", "feedback_action_id": "FOO"}))
)]
#[case::set_display_infinite(
    OutboundCommand::from(
        SetDisplay::new("12345", "FOOBAR", vec![DisplayField::new(42, "Just a test", "R15")])
            .with_refresh_type("ABCDEF")
    ),
    merged(envelope("display!"), json!({
        "device_serial": "12345",
        "display_template_id": "FOOBAR",
        "display_refresh_type": "ABCDEF",
        "display_fields": [{"display_field_id": 42, "display_field_header": "Just a test", "display_field_text": "R15"}],
    }))
)]
#[case::set_trigger_block(
    OutboundCommand::from(
        SetTriggerBlock::new("12345", true, ["A", "B", "C"], ["D", "E", "F"]).with_time_validity_duration(1234)
    ),
    merged(envelope("trigger_block!"), json!({
        "device_serial": "12345",
        "trigger_block_gesture_list": ["A", "B", "C"],
        "trigger_unblock_gesture_list": ["D", "E", "F"],
        "trigger_block_state": true,
        "time_validity_duration": 1234,
    }))
)]
#[case::set_trigger_block_infinite(
    OutboundCommand::from(SetTriggerBlock::new("12345", false, Vec::<String>::new(), Vec::new())),
    merged(envelope("trigger_block!"), json!({
        "device_serial": "12345",
        "trigger_block_gesture_list": [],
        "trigger_unblock_gesture_list": [],
        "trigger_block_state": false,
    }))
)]
fn test_decoded_command_matches_fields(#[case] command: OutboundCommand, #[case] expected: Value) {
    let bytes = encode(&command, &stamp()).unwrap();

    assert_eq!(bytes.iter().filter(|b| **b == b'\n').count(), 1);
    assert_eq!(bytes.last(), Some(&b'\n'));
    // Compact re-serialization has the same length in any key order.
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(bytes.len(), serde_json::to_vec(&value).unwrap().len() + 1);

    let fields = decode_line(&bytes).unwrap();
    assert!(fields.values().all(|value| !value.is_null()));
    assert_eq!(Value::Object(fields), expected);
}

#[test]
fn test_system_stamp_is_fresh_per_encode() {
    let command = OutboundCommand::from(GetGatewayState::default());
    let stamp = pgstreams_protocol::SystemStamp;

    let first = decode_line(&encode(&command, &stamp).unwrap()).unwrap();
    let second = decode_line(&encode(&command, &stamp).unwrap()).unwrap();

    assert_ne!(first["event_id"], second["event_id"]);
    assert!(first["time_created"].as_i64().unwrap() >= TIME_CREATED);
}

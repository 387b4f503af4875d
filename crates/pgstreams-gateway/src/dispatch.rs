//! Routing of inbound lines to callbacks.

use crate::{client::GatewayClient, handler::Handler};
use pgstreams_core::Result;
use pgstreams_protocol::{ConnectedState, EventType, InboundEvent, decode_line, parse_event};
use tracing::trace;

/// Invoke the callback matching `event`.
///
/// Scanner state events go to exactly one of the connected or disconnected
/// callbacks.
pub fn dispatch(handler: &dyn Handler, client: &GatewayClient, event: &InboundEvent) {
    match event {
        InboundEvent::Scan(event) => handler.on_scan(client, event),
        InboundEvent::ScannerState(event) => match event.device_connected_state {
            ConnectedState::Connected => handler.on_scanner_connected(client, event),
            ConnectedState::Disconnected => handler.on_scanner_disconnected(client, event),
        },
        InboundEvent::Error(event) => handler.on_error(client, event),
        InboundEvent::GatewayState(event) => handler.on_gateway_state(client, event),
        InboundEvent::ButtonPressed(event) => handler.on_button_pressed(client, event),
    }
}

/// Decode, validate and dispatch one line.
///
/// # Errors
///
/// `Malformed` if the line is not a JSON object, `Validation` if it is not a
/// valid inbound event. No callback runs in either case.
pub fn handle_line(handler: &dyn Handler, client: &GatewayClient, line: &[u8]) -> Result<EventType> {
    let fields = decode_line(line)?;
    let event = parse_event(&fields)?;

    trace!(
        event_type = %event.event_type(),
        event_id = %event.envelope().event_id,
        device_serial = event.device_serial(),
        "dispatching event"
    );
    dispatch(handler, client, &event);

    Ok(event.event_type())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handler::Callbacks, signal::RunningFlag};
    use pgstreams_core::{Error, ValidationError};
    use pgstreams_protocol::SystemStamp;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    fn client() -> GatewayClient {
        GatewayClient::new("mock", RunningFlag::new(), Arc::new(SystemStamp))
    }

    /// Callbacks recording the name of every slot invoked.
    fn recorder() -> (Callbacks, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let record = |name: &'static str| {
            let calls = Arc::clone(&calls);
            move || calls.lock().unwrap().push(name)
        };

        let (scan, connected, disconnected) = (record("scan"), record("connected"), record("disconnected"));
        let (error, state, button) = (record("error"), record("gateway_state"), record("button"));
        let callbacks = Callbacks::new()
            .with_scan(move |_, _| scan())
            .with_scanner_connected(move |_, _| connected())
            .with_scanner_disconnected(move |_, _| disconnected())
            .with_error(move |_, _| error())
            .with_gateway_state(move |_, _| state())
            .with_button_pressed(move |_, _| button());

        (callbacks, calls)
    }

    const ENVELOPE: &str = r#""api_version":"1.0","event_id":"c6fd7137-055a-4feb-8c32-9dbb9a117f6a","time_created":1700000000000,"gateway_serial":"PGGW1""#;

    #[rstest]
    #[case(r#""event_type":"scan","device_serial":"123","scan_code":"DISPLAY""#, "scan")]
    #[case(r#""event_type":"scanner_state","device_serial":"123","device_connected_state":"STATE_CONNECTED""#, "connected")]
    #[case(r#""event_type":"scanner_state","device_serial":"123","device_connected_state":"STATE_DISCONNECTED","device_disconnect_reason":"UNKNOWN""#, "disconnected")]
    #[case(r#""event_type":"errors","error_code":"ERROR_TIMEOUT""#, "error")]
    #[case(r#""event_type":"gateway_state","gateway_app_version":"1.2.3""#, "gateway_state")]
    #[case(r#""event_type":"button_pressed","device_serial":"123","trigger_gesture":"TRIGGER_DOUBLE_CLICK""#, "button")]
    fn test_routes_to_single_callback(#[case] body: &str, #[case] expected: &str) {
        let (callbacks, calls) = recorder();
        let line = format!("{{{ENVELOPE},{body}}}");

        handle_line(&callbacks, &client(), line.as_bytes()).unwrap();

        assert_eq!(*calls.lock().unwrap(), [expected]);
    }

    #[test]
    fn test_malformed_line_runs_no_callback() {
        let (callbacks, calls) = recorder();

        let result = handle_line(&callbacks, &client(), b"{");

        assert!(matches!(result, Err(Error::Malformed(_))));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[rstest]
    #[case(r#"{"foo":"bar"}"#)]
    #[case(r#"{"event_type":"foo"}"#)]
    #[case(r#"{"event_type":"scan"}"#)]
    #[case(r#"{"event_type":"gateway_state"}"#)]
    #[case(r#"{"event_type":"feedback!","device_serial":"1","feedback_action_id":"X"}"#)]
    fn test_invalid_event_runs_no_callback(#[case] line: &str) {
        let (callbacks, calls) = recorder();

        let result = handle_line(&callbacks, &client(), line.as_bytes());

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_enum_value_runs_no_callback() {
        let (callbacks, calls) = recorder();
        let line = format!(
            r#"{{{ENVELOPE},"event_type":"scanner_state","device_serial":"1","device_connected_state":"CONNECTED"}}"#
        );

        let result = handle_line(&callbacks, &client(), line.as_bytes());

        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::NotOneOf { .. }))
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_default_handler_drops_events() {
        struct Nothing;
        impl Handler for Nothing {}

        let line = format!(r#"{{{ENVELOPE},"event_type":"scan","device_serial":"1","scan_code":"X"}}"#);
        assert_eq!(
            handle_line(&Nothing, &client(), line.as_bytes()).unwrap(),
            EventType::Scan
        );
    }
}

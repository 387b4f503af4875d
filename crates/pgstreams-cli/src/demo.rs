//! Callbacks of the demo application.

use pgstreams_gateway::{GatewayClient, Handler, Result};
use pgstreams_protocol::{
    ButtonPressedEvent, DisplayField, ErrorEvent, GatewayStateEvent, ScanEvent, ScannerStateEvent,
};
use tracing::{info, warn};

/// Action triggered by scanning one of the demo barcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    Display,
    Block,
    Unblock,
    FeedbackOk,
    FeedbackNok,
    State,
}

impl ScanAction {
    /// Match the part of `scan_code` before the first carriage return.
    pub fn parse(scan_code: &str) -> Option<Self> {
        let code = scan_code.split('\r').next().unwrap_or_default();
        match code {
            "DISPLAY" => Some(Self::Display),
            "BLOCK" => Some(Self::Block),
            "UNBLOCK" => Some(Self::Unblock),
            "FEEDBACK_OK" => Some(Self::FeedbackOk),
            "FEEDBACK_NOK" => Some(Self::FeedbackNok),
            "STATE" => Some(Self::State),
            _ => None,
        }
    }

    pub fn run(self, client: &GatewayClient, device_serial: &str) -> Result<()> {
        match self {
            Self::Display => client.set_display(
                device_serial,
                "PG3",
                vec![
                    DisplayField::new(1, "Storage Unit", "R15"),
                    DisplayField::new(2, "Item", "Engine 12"),
                    DisplayField::new(3, "Quantity", "10"),
                ],
                None,
            ),
            Self::Block => client.set_trigger_block(
                device_serial,
                true,
                &["TRIGGER_SINGLE_CLICK"],
                &[],
                Some(3000),
            ),
            Self::Unblock => client.set_trigger_block(device_serial, false, &[], &[], None),
            Self::FeedbackOk => client.send_feedback(device_serial, "FEEDBACK_POSITIVE"),
            Self::FeedbackNok => client.send_feedback(device_serial, "FEEDBACK_NEGATIVE"),
            Self::State => client.get_gateway_state(),
        }
    }
}

/// Logs every event and runs the [`ScanAction`] of scanned demo codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoHandler;

impl Handler for DemoHandler {
    fn on_scan(&self, client: &GatewayClient, event: &ScanEvent) {
        info!(
            device_serial = %event.device_serial,
            scan_code = ?event.scan_code,
            "scan received"
        );

        if let Some(action) = ScanAction::parse(&event.scan_code)
            && let Err(e) = action.run(client, &event.device_serial)
        {
            warn!(?action, error = %e, "failed to send command");
        }
    }

    fn on_scanner_connected(&self, _client: &GatewayClient, event: &ScannerStateEvent) {
        info!(device_serial = %event.device_serial, "device connected");
    }

    fn on_scanner_disconnected(&self, _client: &GatewayClient, event: &ScannerStateEvent) {
        info!(
            device_serial = %event.device_serial,
            reason = event.device_disconnect_reason.map(|reason| reason.as_str()),
            "device disconnected"
        );
    }

    fn on_error(&self, _client: &GatewayClient, event: &ErrorEvent) {
        info!(
            error_code = %event.error_code,
            message = event.error_message.as_deref(),
            "error received"
        );
    }

    fn on_gateway_state(&self, _client: &GatewayClient, event: &GatewayStateEvent) {
        info!(
            gateway_serial = event.envelope.gateway_serial.as_deref(),
            version = %event.gateway_app_version,
            connected_devices = %event.device_serials().collect::<Vec<_>>().join(","),
            "gateway state received"
        );
    }

    fn on_button_pressed(&self, _client: &GatewayClient, event: &ButtonPressedEvent) {
        info!(
            device_serial = %event.device_serial,
            trigger_gesture = %event.trigger_gesture,
            "button pressed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DISPLAY", Some(ScanAction::Display))]
    #[case("DISPLAY\r", Some(ScanAction::Display))]
    #[case("BLOCK\rextra", Some(ScanAction::Block))]
    #[case("UNBLOCK", Some(ScanAction::Unblock))]
    #[case("FEEDBACK_OK", Some(ScanAction::FeedbackOk))]
    #[case("FEEDBACK_NOK", Some(ScanAction::FeedbackNok))]
    #[case("STATE", Some(ScanAction::State))]
    #[case("display", None)]
    #[case("4006381333931", None)]
    fn test_parse_scan_action(#[case] scan_code: &str, #[case] expected: Option<ScanAction>) {
        assert_eq!(ScanAction::parse(scan_code), expected);
    }
}

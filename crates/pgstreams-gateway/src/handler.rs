//! Application callbacks for inbound events.
//!
//! Implement [`Handler`] for full control, or build a [`Callbacks`] table
//! from closures. Every method has a default that logs the event as
//! unhandled and drops it.
//!
//! Callbacks run on the reader thread, one at a time, in arrival order. The
//! next line is not read until the current callback returns, so long-running
//! work belongs on another thread. Each callback receives a
//! [`GatewayClient`] and may issue commands from within.
//!
//! A panicking callback ends the reader thread. The session then reports
//! itself as not running and commands fail with `NotConnected` until it is
//! restarted.

use crate::client::GatewayClient;
use pgstreams_protocol::{
    ButtonPressedEvent, ErrorEvent, EventType, GatewayStateEvent, ScanEvent, ScannerStateEvent,
};
use tracing::debug;

/// Receives dispatched events.
pub trait Handler: Send + Sync {
    /// A barcode was scanned.
    fn on_scan(&self, client: &GatewayClient, event: &ScanEvent) {
        let _ = client;
        unhandled(EventType::Scan, Some(&event.device_serial));
    }

    /// A scanner connected to the gateway.
    fn on_scanner_connected(&self, client: &GatewayClient, event: &ScannerStateEvent) {
        let _ = client;
        unhandled(EventType::ScannerState, Some(&event.device_serial));
    }

    /// A scanner disconnected from the gateway.
    fn on_scanner_disconnected(&self, client: &GatewayClient, event: &ScannerStateEvent) {
        let _ = client;
        unhandled(EventType::ScannerState, Some(&event.device_serial));
    }

    /// The gateway reported an error.
    fn on_error(&self, client: &GatewayClient, event: &ErrorEvent) {
        let _ = client;
        unhandled(EventType::Errors, event.device_serial.as_deref());
    }

    /// The gateway reported its state, usually in reply to
    /// [`GatewayClient::get_gateway_state`].
    fn on_gateway_state(&self, client: &GatewayClient, event: &GatewayStateEvent) {
        let _ = (client, event);
        unhandled(EventType::GatewayState, None);
    }

    /// A trigger gesture was performed on a scanner.
    fn on_button_pressed(&self, client: &GatewayClient, event: &ButtonPressedEvent) {
        let _ = client;
        unhandled(EventType::ButtonPressed, Some(&event.device_serial));
    }
}

fn unhandled(event_type: EventType, device_serial: Option<&str>) {
    debug!(%event_type, device_serial, "no callback registered, event dropped");
}

type Slot<E> = Option<Box<dyn Fn(&GatewayClient, &E) + Send + Sync>>;

/// Closure table implementing [`Handler`].
///
/// # Examples
///
/// ```
/// use pgstreams_gateway::Callbacks;
///
/// let callbacks = Callbacks::new()
///     .with_scan(|client, event| {
///         let _ = client.send_feedback(&event.device_serial, "FEEDBACK_POSITIVE");
///     })
///     .with_scanner_connected(|_, event| println!("{} connected", event.device_serial));
///
/// assert!(format!("{callbacks:?}").contains("scan: true"));
/// ```
#[derive(Default)]
pub struct Callbacks {
    scan: Slot<ScanEvent>,
    scanner_connected: Slot<ScannerStateEvent>,
    scanner_disconnected: Slot<ScannerStateEvent>,
    error: Slot<ErrorEvent>,
    gateway_state: Slot<GatewayStateEvent>,
    button_pressed: Slot<ButtonPressedEvent>,
}

impl Callbacks {
    /// Create a table with no callbacks registered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan(
        mut self,
        callback: impl Fn(&GatewayClient, &ScanEvent) + Send + Sync + 'static,
    ) -> Self {
        self.scan = Some(Box::new(callback));
        self
    }

    pub fn with_scanner_connected(
        mut self,
        callback: impl Fn(&GatewayClient, &ScannerStateEvent) + Send + Sync + 'static,
    ) -> Self {
        self.scanner_connected = Some(Box::new(callback));
        self
    }

    pub fn with_scanner_disconnected(
        mut self,
        callback: impl Fn(&GatewayClient, &ScannerStateEvent) + Send + Sync + 'static,
    ) -> Self {
        self.scanner_disconnected = Some(Box::new(callback));
        self
    }

    pub fn with_error(
        mut self,
        callback: impl Fn(&GatewayClient, &ErrorEvent) + Send + Sync + 'static,
    ) -> Self {
        self.error = Some(Box::new(callback));
        self
    }

    pub fn with_gateway_state(
        mut self,
        callback: impl Fn(&GatewayClient, &GatewayStateEvent) + Send + Sync + 'static,
    ) -> Self {
        self.gateway_state = Some(Box::new(callback));
        self
    }

    pub fn with_button_pressed(
        mut self,
        callback: impl Fn(&GatewayClient, &ButtonPressedEvent) + Send + Sync + 'static,
    ) -> Self {
        self.button_pressed = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("scan", &self.scan.is_some())
            .field("scanner_connected", &self.scanner_connected.is_some())
            .field("scanner_disconnected", &self.scanner_disconnected.is_some())
            .field("error", &self.error.is_some())
            .field("gateway_state", &self.gateway_state.is_some())
            .field("button_pressed", &self.button_pressed.is_some())
            .finish()
    }
}

impl Handler for Callbacks {
    fn on_scan(&self, client: &GatewayClient, event: &ScanEvent) {
        match &self.scan {
            Some(callback) => callback(client, event),
            None => unhandled(EventType::Scan, Some(&event.device_serial)),
        }
    }

    fn on_scanner_connected(&self, client: &GatewayClient, event: &ScannerStateEvent) {
        match &self.scanner_connected {
            Some(callback) => callback(client, event),
            None => unhandled(EventType::ScannerState, Some(&event.device_serial)),
        }
    }

    fn on_scanner_disconnected(&self, client: &GatewayClient, event: &ScannerStateEvent) {
        match &self.scanner_disconnected {
            Some(callback) => callback(client, event),
            None => unhandled(EventType::ScannerState, Some(&event.device_serial)),
        }
    }

    fn on_error(&self, client: &GatewayClient, event: &ErrorEvent) {
        match &self.error {
            Some(callback) => callback(client, event),
            None => unhandled(EventType::Errors, event.device_serial.as_deref()),
        }
    }

    fn on_gateway_state(&self, client: &GatewayClient, event: &GatewayStateEvent) {
        match &self.gateway_state {
            Some(callback) => callback(client, event),
            None => unhandled(EventType::GatewayState, None),
        }
    }

    fn on_button_pressed(&self, client: &GatewayClient, event: &ButtonPressedEvent) {
        match &self.button_pressed {
            Some(callback) => callback(client, event),
            None => unhandled(EventType::ButtonPressed, Some(&event.device_serial)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        let callbacks = Callbacks::new();
        assert_eq!(
            format!("{callbacks:?}"),
            "Callbacks { scan: false, scanner_connected: false, scanner_disconnected: false, \
             error: false, gateway_state: false, button_pressed: false }"
        );
    }

    #[test]
    fn test_registered_slots_show_in_debug() {
        let callbacks = Callbacks::new()
            .with_scan(|_, _| {})
            .with_scanner_connected(|_, _| {})
            .with_scanner_disconnected(|_, _| {})
            .with_error(|_, _| {})
            .with_gateway_state(|_, _| {})
            .with_button_pressed(|_, _| {});

        assert_eq!(
            format!("{callbacks:?}"),
            "Callbacks { scan: true, scanner_connected: true, scanner_disconnected: true, \
             error: true, gateway_state: true, button_pressed: true }"
        );
    }
}

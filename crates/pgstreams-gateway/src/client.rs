//! Command handle for a gateway session.

use crate::{
    error::{GatewayError, Result},
    signal::RunningFlag,
    transport::Transport,
};
use pgstreams_protocol::{
    DisplayField, GetGatewayState, OutboundCommand, SendFeedback, SetDisplay, SetTriggerBlock,
    Stamp, encode,
};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Issues commands to the gateway.
///
/// A client is cheap to clone and stays valid for the lifetime of the
/// [`Gateway`](crate::Gateway) it came from, across restarts. It is also
/// the handle passed to every callback.
///
/// Commands succeed only while the session is live: the transport is open
/// and the reader thread is running. Otherwise they fail with
/// [`GatewayError::NotConnected`] without touching the transport.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    port: String,
    writer: Mutex<Option<Box<dyn Transport>>>,
    running: RunningFlag,
    stamp: Arc<dyn Stamp>,
}

impl GatewayClient {
    pub(crate) fn new(port: impl Into<String>, running: RunningFlag, stamp: Arc<dyn Stamp>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                port: port.into(),
                writer: Mutex::new(None),
                running,
                stamp,
            }),
        }
    }

    /// Device path of the session.
    pub fn port(&self) -> &str {
        &self.inner.port
    }

    /// Whether commands can currently be sent.
    pub fn is_connected(&self) -> bool {
        self.lock_writer().is_some() && self.inner.running.is_set()
    }

    /// Ask the gateway for a `gateway_state` event.
    ///
    /// # Errors
    ///
    /// `NotConnected` without a live session, `Transport` if the write fails.
    pub fn get_gateway_state(&self) -> Result<()> {
        self.send(GetGatewayState::default())
    }

    /// Play the feedback sequence `feedback_action_id` (e.g.
    /// `FEEDBACK_POSITIVE`) on a scanner.
    ///
    /// # Errors
    ///
    /// `NotConnected` without a live session, `Transport` if the write fails.
    pub fn send_feedback(&self, device_serial: &str, feedback_action_id: &str) -> Result<()> {
        self.send(SendFeedback::new(device_serial, feedback_action_id))
    }

    /// Show a screen on a scanner's display.
    ///
    /// Without `time_validity_duration` (milliseconds) the screen stays
    /// until replaced.
    ///
    /// # Errors
    ///
    /// `NotConnected` without a live session, `Transport` if the write fails.
    pub fn set_display(
        &self,
        device_serial: &str,
        display_template_id: &str,
        display_fields: Vec<DisplayField>,
        time_validity_duration: Option<i64>,
    ) -> Result<()> {
        let mut command = SetDisplay::new(device_serial, display_template_id, display_fields);
        if let Some(millis) = time_validity_duration {
            command = command.with_time_validity_duration(millis);
        }
        self.send(command)
    }

    /// Block or unblock trigger gestures on a scanner.
    ///
    /// Without `time_validity_duration` (milliseconds) the setting stays
    /// until replaced.
    ///
    /// # Errors
    ///
    /// `NotConnected` without a live session, `Transport` if the write fails.
    pub fn set_trigger_block(
        &self,
        device_serial: &str,
        trigger_block_state: bool,
        block_gestures: &[&str],
        unblock_gestures: &[&str],
        time_validity_duration: Option<i64>,
    ) -> Result<()> {
        let mut command = SetTriggerBlock::new(
            device_serial,
            trigger_block_state,
            block_gestures.iter().copied(),
            unblock_gestures.iter().copied(),
        );
        if let Some(millis) = time_validity_duration {
            command = command.with_time_validity_duration(millis);
        }
        self.send(command)
    }

    /// Stamp, encode and write any command.
    ///
    /// The whole line, terminator included, is written while holding the
    /// writer lock, so concurrent commands never interleave.
    ///
    /// # Errors
    ///
    /// `NotConnected` without a live session, `Protocol` if encoding fails,
    /// `Transport` if the write fails.
    pub fn send(&self, command: impl Into<OutboundCommand>) -> Result<()> {
        let command = command.into();
        let mut writer = self.lock_writer();

        let transport = match writer.as_mut() {
            Some(transport) if self.inner.running.is_set() => transport,
            _ => return Err(GatewayError::NotConnected),
        };

        let bytes = encode(&command, self.inner.stamp.as_ref())?;
        transport
            .write_all(&bytes)
            .and_then(|()| transport.flush())
            .map_err(|e| GatewayError::transport(&self.inner.port, e))?;

        debug!(
            event_type = %command.event_type(),
            device_serial = command.device_serial(),
            bytes = bytes.len(),
            "command sent"
        );
        Ok(())
    }

    pub(crate) fn attach(&self, transport: Box<dyn Transport>) {
        *self.lock_writer() = Some(transport);
    }

    pub(crate) fn detach(&self) -> Option<Box<dyn Transport>> {
        self.lock_writer().take()
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.lock_writer().is_some()
    }

    pub(crate) fn running(&self) -> &RunningFlag {
        &self.inner.running
    }

    fn lock_writer(&self) -> MutexGuard<'_, Option<Box<dyn Transport>>> {
        self.inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("port", &self.inner.port)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mock::MockConnector, transport::Connector};
    use pgstreams_core::{EventId, Timestamp};
    use pgstreams_protocol::{FixedStamp, SystemStamp};

    fn fixed_stamp() -> Arc<dyn Stamp> {
        Arc::new(FixedStamp::new(
            EventId::new("c6fd7137-055a-4feb-8c32-9dbb9a117f6a").unwrap(),
            Timestamp::from_millis(1_546_300_800_000).unwrap(),
        ))
    }

    #[test]
    fn test_detached_client_is_not_connected() {
        let client = GatewayClient::new("mock", RunningFlag::new(), Arc::new(SystemStamp));

        assert!(!client.is_connected());
        assert!(matches!(
            client.get_gateway_state(),
            Err(GatewayError::NotConnected)
        ));
    }

    #[test]
    fn test_attached_but_not_running_is_not_connected() {
        let (connector, handle) = MockConnector::new();
        let client = GatewayClient::new("mock", RunningFlag::new(), Arc::new(SystemStamp));
        client.attach(connector.open("mock", 115_200).unwrap());

        assert!(matches!(
            client.send_feedback("1", "FEEDBACK_POSITIVE"),
            Err(GatewayError::NotConnected)
        ));
        assert!(handle.written().is_empty());
    }

    #[test]
    fn test_send_feedback_writes_one_line() {
        let (connector, handle) = MockConnector::new();
        let running = RunningFlag::new();
        running.set();
        let client = GatewayClient::new("mock", running, fixed_stamp());
        client.attach(connector.open("mock", 115_200).unwrap());

        client.send_feedback("12345", "FOO").unwrap();

        assert_eq!(
            String::from_utf8(handle.written()).unwrap(),
            "{\"api_version\":\"1.0\",\"event_type\":\"feedback!\",\
             \"event_id\":\"c6fd7137-055a-4feb-8c32-9dbb9a117f6a\",\"time_created\":1546300800000,\
             \"device_serial\":\"12345\",\"feedback_action_id\":\"FOO\"}\n"
        );
    }

    #[test]
    fn test_set_trigger_block_fields() {
        let (connector, handle) = MockConnector::new();
        let running = RunningFlag::new();
        running.set();
        let client = GatewayClient::new("mock", running, fixed_stamp());
        client.attach(connector.open("mock", 115_200).unwrap());

        client
            .set_trigger_block("12345", true, &["TRIGGER_SINGLE_CLICK"], &[], Some(3000))
            .unwrap();

        let line = &handle.written_lines()[0];
        let fields: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(fields["trigger_block_gesture_list"][0], "TRIGGER_SINGLE_CLICK");
        assert_eq!(fields["trigger_unblock_gesture_list"], serde_json::json!([]));
        assert_eq!(fields["time_validity_duration"], 3000);
    }

    #[test]
    fn test_detach_returns_transport() {
        let (connector, _handle) = MockConnector::new();
        let client = GatewayClient::new("mock", RunningFlag::new(), Arc::new(SystemStamp));
        client.attach(connector.open("mock", 115_200).unwrap());

        assert!(client.is_attached());
        assert!(client.detach().is_some());
        assert!(!client.is_attached());
    }
}

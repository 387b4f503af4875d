//! Outbound commands sent from the host to the gateway.
//!
//! Commands are plain structs. The envelope (`api_version`, `event_type`,
//! `event_id`, `time_created`) is not part of them: it is stamped when the
//! command is encoded, see [`crate::codec::encode`].
//!
//! # Wire Format
//!
//! ```text
//! {"api_version":"1.0","event_type":"feedback!","event_id":"…","time_created":1546300800000,"device_serial":"12345","feedback_action_id":"FEEDBACK_POSITIVE"}
//! ```
//!
//! Envelope fields come first, then the command fields in declaration order.
//! Unset optional fields are left out entirely, never written as `null`.
//!
//! # Examples
//!
//! ```
//! use pgstreams_protocol::{DisplayField, OutboundCommand, SetDisplay, EventType};
//!
//! let display = SetDisplay::new(
//!     "M2MR111100928",
//!     "PG3",
//!     vec![DisplayField::new(1, "Storage Unit", "R15")],
//! )
//! .with_time_validity_duration(5000);
//!
//! let command = OutboundCommand::from(display);
//! assert_eq!(command.event_type(), EventType::Display);
//! ```

use crate::{EventType, stamp::Stamp};
use pgstreams_core::{EventId, Timestamp, constants::API_VERSION};
use serde::Serialize;
use std::collections::BTreeSet;

/// A command struct with a fixed outbound discriminant.
pub trait Command: Serialize {
    const EVENT_TYPE: EventType;
}

/// Ask the gateway to report a `gateway_state` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetGatewayState {}

impl Command for GetGatewayState {
    const EVENT_TYPE: EventType = EventType::GetGatewayState;
}

/// Play a predefined feedback sequence on a scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendFeedback {
    pub device_serial: String,
    pub feedback_action_id: String,
}

impl SendFeedback {
    pub fn new(device_serial: impl Into<String>, feedback_action_id: impl Into<String>) -> Self {
        Self {
            device_serial: device_serial.into(),
            feedback_action_id: feedback_action_id.into(),
        }
    }
}

impl Command for SendFeedback {
    const EVENT_TYPE: EventType = EventType::Feedback;
}

/// One slot of a display template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayField {
    #[serde(rename = "display_field_id")]
    pub id: i64,
    #[serde(rename = "display_field_header")]
    pub header: String,
    #[serde(rename = "display_field_text")]
    pub text: String,
}

impl DisplayField {
    pub fn new(id: i64, header: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            header: header.into(),
            text: text.into(),
        }
    }
}

/// Fill a display template on a scanner with a screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetDisplay {
    pub device_serial: String,
    pub display_template_id: String,
    pub display_refresh_type: String,
    pub display_fields: Vec<DisplayField>,
    /// How long the screen stays, in milliseconds. Unset means until replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_validity_duration: Option<i64>,
}

impl SetDisplay {
    /// Create a display command with the default refresh type.
    pub fn new(
        device_serial: impl Into<String>,
        display_template_id: impl Into<String>,
        display_fields: Vec<DisplayField>,
    ) -> Self {
        Self {
            device_serial: device_serial.into(),
            display_template_id: display_template_id.into(),
            display_refresh_type: pgstreams_core::constants::DEFAULT_DISPLAY_REFRESH_TYPE
                .to_string(),
            display_fields,
            time_validity_duration: None,
        }
    }

    pub fn with_refresh_type(mut self, display_refresh_type: impl Into<String>) -> Self {
        self.display_refresh_type = display_refresh_type.into();
        self
    }

    pub fn with_time_validity_duration(mut self, millis: i64) -> Self {
        self.time_validity_duration = Some(millis);
        self
    }
}

impl Command for SetDisplay {
    const EVENT_TYPE: EventType = EventType::Display;
}

/// Block (or unblock) trigger gestures on a scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetTriggerBlock {
    pub device_serial: String,
    pub trigger_block_gesture_list: BTreeSet<String>,
    pub trigger_unblock_gesture_list: BTreeSet<String>,
    pub trigger_block_state: bool,
    /// How long the block lasts, in milliseconds. Unset means until replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_validity_duration: Option<i64>,
}

impl SetTriggerBlock {
    pub fn new<B, U, S>(
        device_serial: impl Into<String>,
        trigger_block_state: bool,
        block_gestures: B,
        unblock_gestures: U,
    ) -> Self
    where
        B: IntoIterator<Item = S>,
        U: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            device_serial: device_serial.into(),
            trigger_block_gesture_list: block_gestures.into_iter().map(Into::into).collect(),
            trigger_unblock_gesture_list: unblock_gestures.into_iter().map(Into::into).collect(),
            trigger_block_state,
            time_validity_duration: None,
        }
    }

    pub fn with_time_validity_duration(mut self, millis: i64) -> Self {
        self.time_validity_duration = Some(millis);
        self
    }
}

impl Command for SetTriggerBlock {
    const EVENT_TYPE: EventType = EventType::TriggerBlock;
}

/// Any outbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    GetGatewayState(GetGatewayState),
    SendFeedback(SendFeedback),
    SetDisplay(SetDisplay),
    SetTriggerBlock(SetTriggerBlock),
}

impl OutboundCommand {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::GetGatewayState(_) => GetGatewayState::EVENT_TYPE,
            Self::SendFeedback(_) => SendFeedback::EVENT_TYPE,
            Self::SetDisplay(_) => SetDisplay::EVENT_TYPE,
            Self::SetTriggerBlock(_) => SetTriggerBlock::EVENT_TYPE,
        }
    }

    /// Target scanner, if the command addresses one.
    pub fn device_serial(&self) -> Option<&str> {
        match self {
            Self::GetGatewayState(_) => None,
            Self::SendFeedback(command) => Some(&command.device_serial),
            Self::SetDisplay(command) => Some(&command.device_serial),
            Self::SetTriggerBlock(command) => Some(&command.device_serial),
        }
    }

    /// Serialize the stamped command as compact JSON into `out`.
    pub(crate) fn write_stamped(
        &self,
        stamp: &dyn Stamp,
        out: &mut Vec<u8>,
    ) -> serde_json::Result<()> {
        match self {
            Self::GetGatewayState(command) => write_stamped(command, stamp, out),
            Self::SendFeedback(command) => write_stamped(command, stamp, out),
            Self::SetDisplay(command) => write_stamped(command, stamp, out),
            Self::SetTriggerBlock(command) => write_stamped(command, stamp, out),
        }
    }
}

impl From<GetGatewayState> for OutboundCommand {
    fn from(command: GetGatewayState) -> Self {
        Self::GetGatewayState(command)
    }
}

impl From<SendFeedback> for OutboundCommand {
    fn from(command: SendFeedback) -> Self {
        Self::SendFeedback(command)
    }
}

impl From<SetDisplay> for OutboundCommand {
    fn from(command: SetDisplay) -> Self {
        Self::SetDisplay(command)
    }
}

impl From<SetTriggerBlock> for OutboundCommand {
    fn from(command: SetTriggerBlock) -> Self {
        Self::SetTriggerBlock(command)
    }
}

/// Envelope followed by the command's own fields.
#[derive(Serialize)]
struct Stamped<'a, C> {
    api_version: &'static str,
    event_type: EventType,
    event_id: EventId,
    time_created: Timestamp,
    #[serde(flatten)]
    command: &'a C,
}

fn write_stamped<C: Command>(
    command: &C,
    stamp: &dyn Stamp,
    out: &mut Vec<u8>,
) -> serde_json::Result<()> {
    let stamped = Stamped {
        api_version: API_VERSION,
        event_type: C::EVENT_TYPE,
        event_id: stamp.event_id(),
        time_created: stamp.time_created(),
        command,
    };
    serde_json::to_writer(out, &stamped)
}

//! Envelope stamping for outbound commands.
//!
//! Every command gets a fresh `event_id` and the current `time_created` at
//! serialization time. The source of both is injectable so tests can pin
//! them.

use pgstreams_core::{EventId, Timestamp};

/// Source of the per-message envelope values.
pub trait Stamp: Send + Sync {
    fn event_id(&self) -> EventId;

    fn time_created(&self) -> Timestamp;
}

/// Random v4 UUIDs and the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStamp;

impl Stamp for SystemStamp {
    fn event_id(&self) -> EventId {
        EventId::generate()
    }

    fn time_created(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Always stamps the same values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedStamp {
    pub event_id: EventId,
    pub time_created: Timestamp,
}

impl FixedStamp {
    pub fn new(event_id: EventId, time_created: Timestamp) -> Self {
        Self {
            event_id,
            time_created,
        }
    }
}

impl Stamp for FixedStamp {
    fn event_id(&self) -> EventId {
        self.event_id.clone()
    }

    fn time_created(&self) -> Timestamp {
        self.time_created
    }
}

use crate::{
    constants::{MAX_TIME_CREATED, MIN_TIME_CREATED},
    error::ValidationError,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of a hyphenated UUID string.
const UUID_LENGTH: usize = 36;

/// Whether `value` is a lowercase, hyphenated UUID
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`).
///
/// The version nibble is not checked; the gateway only requires the shape.
pub fn is_uuid_shape(value: &str) -> bool {
    value.len() == UUID_LENGTH
        && Uuid::try_parse(value).is_ok_and(|uuid| uuid.hyphenated().to_string() == value)
}

/// Message identifier (hyphenated lowercase UUID).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Create an event ID from an existing string.
    ///
    /// # Errors
    /// Returns `ValidationError::Format` if the value is not a hyphenated
    /// lowercase UUID.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if !is_uuid_shape(&value) {
            return Err(ValidationError::format(
                "event_id",
                format!("'{value}' is not a lowercase hyphenated UUID"),
            ));
        }
        Ok(EventId(value))
    }

    /// Generate a fresh random (v4) event ID.
    #[must_use]
    pub fn generate() -> Self {
        EventId(Uuid::new_v4().hyphenated().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EventId::new(value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl std::str::FromStr for EventId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventId::new(s)
    }
}

/// Message creation time in epoch milliseconds.
///
/// Only instants between 2019-01-01 and the protocol's far-future sentinel
/// are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from epoch milliseconds.
    ///
    /// # Errors
    /// Returns `ValidationError::OutOfRange` outside
    /// [`MIN_TIME_CREATED`]..=[`MAX_TIME_CREATED`].
    pub fn from_millis(millis: i64) -> Result<Self, ValidationError> {
        if !(MIN_TIME_CREATED..=MAX_TIME_CREATED).contains(&millis) {
            return Err(ValidationError::OutOfRange {
                field: "time_created".to_string(),
                value: millis,
                min: MIN_TIME_CREATED,
                max: MAX_TIME_CREATED,
            });
        }
        Ok(Timestamp(millis))
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp_millis())
    }

    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Convert to a UTC date-time.
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

impl TryFrom<i64> for Timestamp {
    type Error = ValidationError;

    fn try_from(millis: i64) -> Result<Self, Self::Error> {
        Timestamp::from_millis(millis)
    }
}

impl From<Timestamp> for i64 {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

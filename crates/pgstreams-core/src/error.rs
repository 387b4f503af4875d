//! Error types shared by the protocol and gateway layers.
//!
//! Per-message problems ([`Error::Malformed`], [`Error::FrameTooLarge`] and
//! [`Error::Validation`]) are recoverable: the reader loop logs them and moves
//! on to the next line. Only transport failures are fatal, and those live in
//! the gateway crate.

use thiserror::Error;

/// A single constraint violation found while validating an inbound message.
///
/// Validation stops at the first violation, so one value describes the whole
/// failure of a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field '{field}' must be {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("Field '{field}' length must be {min}-{max}, got {actual}")]
    Length {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {message}")]
    Format { field: String, message: String },

    #[error("Field '{field}' value '{value}' is not one of {allowed:?}")]
    NotOneOf {
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Field '{field}' value {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Field '{field}' must equal '{expected}', got '{actual}'")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Field '{field}' holds {actual} items, at most {max} allowed")]
    TooManyItems {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Item {index} of '{field}' is invalid: {source}")]
    InItem {
        field: String,
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("No event variant matches event_type {event_type:?}")]
    NoMatchingVariant { event_type: Option<String> },
}

impl ValidationError {
    /// Create a missing field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a wrong type error.
    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            field: field.into(),
            expected,
        }
    }

    /// Create an invalid format error.
    pub fn format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Format {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a no-matching-variant error.
    pub fn no_match(event_type: Option<&str>) -> Self {
        Self::NoMatchingVariant {
            event_type: event_type.map(str::to_owned),
        }
    }

    /// Name of the offending field, if the error is tied to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field }
            | Self::WrongType { field, .. }
            | Self::Length { field, .. }
            | Self::Format { field, .. }
            | Self::NotOneOf { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Mismatch { field, .. }
            | Self::TooManyItems { field, .. }
            | Self::InItem { field, .. } => Some(field),
            Self::NoMatchingVariant { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// The line is not a JSON object.
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// The line grew past the framing limit before a terminator arrived.
    #[error("Frame too large: {size} bytes exceeds maximum of {max_size} bytes")]
    FrameTooLarge { size: usize, max_size: usize },

    /// Structurally valid JSON that breaks an envelope or variant rule.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An outbound command could not be serialized.
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

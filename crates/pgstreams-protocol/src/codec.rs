//! Line framing and JSON coding for the Streams API.
//!
//! # Overview
//!
//! The wire format is one compact JSON object per line, terminated by `\n`.
//! This module provides:
//! - [`StreamsCodec`]: a [`Decoder`] that cuts a byte stream into lines and an
//!   [`Encoder`] that writes stamped commands, both usable on any `BytesMut`
//!   buffer without an async runtime.
//! - [`decode_line`]: parses one line into its raw JSON fields.
//! - [`encode`]: serializes one command into its wire bytes.
//!
//! ```text
//! serial bytes -> StreamsCodec::decode -> line -> decode_line -> RawFields
//! OutboundCommand -> encode -> {"api_version":"1.0",...}\n
//! ```
//!
//! # Error Handling
//!
//! Every decoding failure is scoped to one line. After a
//! [`Error::FrameTooLarge`] the codec drops bytes up to the next terminator
//! and resumes with the line after it.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{OutboundCommand, stamp::Stamp, validation::RawFields};
use pgstreams_core::{
    Error, Result,
    constants::{LINE_TERMINATOR, MAX_LINE_LENGTH},
};

/// Parse one line into its JSON fields.
///
/// Surrounding whitespace, including a trailing `\r`, is ignored.
///
/// # Errors
///
/// Returns `Error::Malformed` if the line is not valid JSON or is valid JSON
/// but not an object.
///
/// # Example
///
/// ```
/// use pgstreams_protocol::decode_line;
///
/// let fields = decode_line(b"{\"event_type\":\"scan\"}\r\n").unwrap();
/// assert_eq!(fields["event_type"], "scan");
///
/// assert!(decode_line(b"{").is_err());
/// assert!(decode_line(b"[1,2]").is_err());
/// ```
pub fn decode_line(line: &[u8]) -> Result<RawFields> {
    let value: serde_json::Value = serde_json::from_slice(line.trim_ascii())
        .map_err(|e| Error::Malformed(e.to_string()))?;

    match value {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(Error::Malformed(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Serialize a stamped command: compact JSON plus a single `\n`.
///
/// # Errors
///
/// Returns `Error::Encode` if serialization fails.
///
/// # Example
///
/// ```
/// use pgstreams_core::{EventId, Timestamp};
/// use pgstreams_protocol::{FixedStamp, OutboundCommand, SendFeedback, encode};
///
/// let stamp = FixedStamp::new(
///     EventId::new("c6fd7137-055a-4feb-8c32-9dbb9a117f6a").unwrap(),
///     Timestamp::from_millis(1546300800000).unwrap(),
/// );
/// let bytes = encode(&OutboundCommand::from(SendFeedback::new("12345", "FOO")), &stamp).unwrap();
///
/// assert!(bytes.ends_with(b"}\n"));
/// ```
pub fn encode(command: &OutboundCommand, stamp: &dyn Stamp) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(256);
    command
        .write_stamped(stamp, &mut out)
        .map_err(|e| Error::Encode(e.to_string()))?;
    out.push(LINE_TERMINATOR);
    Ok(out)
}

/// Newline framing codec for the Streams API.
///
/// Decoding yields complete lines (without the terminator); encoding writes
/// stamped [`OutboundCommand`]s.
pub struct StreamsCodec {
    /// Longest line accepted, terminator excluded.
    max_line_length: usize,

    /// Set while skipping the rest of an oversized line.
    discarding: bool,

    /// Envelope source for encoded commands.
    stamp: Box<dyn Stamp>,
}

impl StreamsCodec {
    /// Create a codec with the default line limit and system stamping.
    pub fn new() -> Self {
        Self::with_stamp(Box::new(crate::SystemStamp))
    }

    /// Create a codec that stamps commands from `stamp`.
    pub fn with_stamp(stamp: Box<dyn Stamp>) -> Self {
        Self {
            max_line_length: MAX_LINE_LENGTH,
            discarding: false,
            stamp,
        }
    }

    /// Override the maximum line length.
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

impl Default for StreamsCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StreamsCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamsCodec")
            .field("max_line_length", &self.max_line_length)
            .field("discarding", &self.discarding)
            .finish_non_exhaustive()
    }
}

impl Decoder for StreamsCodec {
    type Item = Bytes;
    type Error = Error;

    /// Extract the next complete line from `src`.
    ///
    /// - `Ok(Some(line))` - a line was cut off the front of `src`
    /// - `Ok(None)` - no terminator yet, wait for more bytes
    /// - `Err(FrameTooLarge)` - a line exceeded the limit and is being dropped
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        loop {
            let terminator = src.iter().position(|byte| *byte == LINE_TERMINATOR);

            match (self.discarding, terminator) {
                (true, Some(position)) => {
                    src.advance(position + 1);
                    self.discarding = false;
                }
                (true, None) => {
                    src.clear();
                    return Ok(None);
                }
                (false, Some(position)) if position > self.max_line_length => {
                    src.advance(position + 1);
                    return Err(Error::FrameTooLarge {
                        size: position,
                        max_size: self.max_line_length,
                    });
                }
                (false, Some(position)) => {
                    let mut line = src.split_to(position + 1);
                    line.truncate(position);
                    return Ok(Some(line.freeze()));
                }
                (false, None) if src.len() > self.max_line_length => {
                    let size = src.len();
                    src.clear();
                    self.discarding = true;
                    return Err(Error::FrameTooLarge {
                        size,
                        max_size: self.max_line_length,
                    });
                }
                (false, None) => return Ok(None),
            }
        }
    }
}

impl Encoder<&OutboundCommand> for StreamsCodec {
    type Error = Error;

    fn encode(&mut self, item: &OutboundCommand, dst: &mut BytesMut) -> Result<()> {
        let bytes = encode(item, self.stamp.as_ref())?;
        dst.extend_from_slice(&bytes);
        Ok(())
    }
}

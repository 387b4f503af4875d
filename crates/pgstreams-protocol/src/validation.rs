//! Field constraint checks for inbound messages.
//!
//! Each event variant is validated by an explicit function composed from the
//! small checks in this module: presence and JSON type through
//! [`FieldReader`], then value constraints through [`check_length`],
//! [`check_uuid`], [`check_equal`], [`check_range`], [`check_max_items`] and
//! [`check_enum`].
//!
//! Every check returns the validated value so calls chain with `?`:
//!
//! ```
//! use pgstreams_protocol::validation::{FieldReader, RawFields, check_length};
//! use serde_json::json;
//!
//! let raw: RawFields = json!({"device_serial": "M2MR111100928"})
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//! let fields = FieldReader::new(&raw);
//!
//! let serial = check_length("device_serial", fields.required_str("device_serial")?, 1, 128)?;
//! assert_eq!(serial, "M2MR111100928");
//!
//! assert!(fields.required_str("scan_code").is_err());
//! # Ok::<(), pgstreams_core::ValidationError>(())
//! ```
//!
//! # Null handling
//!
//! An explicit JSON `null` is a type error even for optional fields; optional
//! means "may be absent", not "may be null".

use pgstreams_core::{ValidationError, is_uuid_shape};
use serde_json::{Map, Value};

/// Decoded JSON object of one inbound line.
pub type RawFields = Map<String, Value>;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Typed, presence-checked access to the fields of one JSON object.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    fields: &'a RawFields,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a RawFields) -> Self {
        Self { fields }
    }

    pub fn raw(&self) -> &'a RawFields {
        self.fields
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name)
    }

    /// Get a required string field.
    ///
    /// # Errors
    /// `MissingField` when absent, `WrongType` when not a string.
    pub fn required_str(&self, name: &str) -> ValidationResult<&'a str> {
        self.optional_str(name)?
            .ok_or_else(|| ValidationError::missing(name))
    }

    /// Get an optional string field.
    ///
    /// # Errors
    /// `WrongType` when present but not a string.
    pub fn optional_str(&self, name: &str) -> ValidationResult<Option<&'a str>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(ValidationError::wrong_type(name, "a string")),
        }
    }

    /// Get a required integer field.
    ///
    /// Floats are rejected, even integral ones.
    ///
    /// # Errors
    /// `MissingField` when absent, `WrongType` when not a 64-bit integer.
    pub fn required_i64(&self, name: &str) -> ValidationResult<i64> {
        match self.get(name) {
            None => Err(ValidationError::missing(name)),
            Some(value) => value
                .as_i64()
                .ok_or_else(|| ValidationError::wrong_type(name, "an integer")),
        }
    }

    /// Get an optional array field.
    ///
    /// # Errors
    /// `WrongType` when present but not an array.
    pub fn optional_array(&self, name: &str) -> ValidationResult<Option<&'a [Value]>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items.as_slice())),
            Some(_) => Err(ValidationError::wrong_type(name, "an array")),
        }
    }
}

/// Check that a string is between `min` and `max` characters long.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
/// Returns `ValidationError::Length` outside the bounds.
pub fn check_length<'v>(
    field: &str,
    value: &'v str,
    min: usize,
    max: usize,
) -> ValidationResult<&'v str> {
    let actual = value.chars().count();
    if !(min..=max).contains(&actual) {
        return Err(ValidationError::Length {
            field: field.to_string(),
            min,
            max,
            actual,
        });
    }
    Ok(value)
}

/// Check that a string is a lowercase hyphenated UUID.
///
/// # Errors
/// Returns `ValidationError::Format` otherwise.
pub fn check_uuid<'v>(field: &str, value: &'v str) -> ValidationResult<&'v str> {
    if !is_uuid_shape(value) {
        return Err(ValidationError::format(
            field,
            format!("'{value}' is not a lowercase hyphenated UUID"),
        ));
    }
    Ok(value)
}

/// Check that a string equals an expected constant.
///
/// # Errors
/// Returns `ValidationError::Mismatch` otherwise.
pub fn check_equal<'v>(field: &str, value: &'v str, expected: &str) -> ValidationResult<&'v str> {
    if value != expected {
        return Err(ValidationError::Mismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: value.to_string(),
        });
    }
    Ok(value)
}

/// Check that an integer lies within `min..=max`.
///
/// # Errors
/// Returns `ValidationError::OutOfRange` otherwise.
pub fn check_range(field: &str, value: i64, min: i64, max: i64) -> ValidationResult<i64> {
    if !(min..=max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(value)
}

/// Check that a list holds at most `max` items.
///
/// # Errors
/// Returns `ValidationError::TooManyItems` otherwise.
pub fn check_max_items<'v, T>(field: &str, items: &'v [T], max: usize) -> ValidationResult<&'v [T]> {
    if items.len() > max {
        return Err(ValidationError::TooManyItems {
            field: field.to_string(),
            max,
            actual: items.len(),
        });
    }
    Ok(items)
}

/// A closed set of string values on the wire.
pub trait WireEnum: Sized + Copy + 'static {
    /// Every accepted wire value.
    const VALUES: &'static [&'static str];

    fn from_wire(value: &str) -> Option<Self>;

    fn as_str(&self) -> &'static str;
}

/// Check that a string is one of the values of `T` and convert it.
///
/// # Errors
/// Returns `ValidationError::NotOneOf` otherwise.
pub fn check_enum<T: WireEnum>(field: &str, value: &str) -> ValidationResult<T> {
    T::from_wire(value).ok_or_else(|| ValidationError::NotOneOf {
        field: field.to_string(),
        value: value.to_string(),
        allowed: T::VALUES,
    })
}

/// Validate each element of a list, wrapping failures with the item index.
///
/// # Errors
/// Returns `ValidationError::InItem` for the first failing element.
pub fn check_items<T>(
    field: &str,
    items: &[Value],
    mut validate: impl FnMut(FieldReader<'_>) -> ValidationResult<T>,
) -> ValidationResult<Vec<T>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let wrap = |source: ValidationError| ValidationError::InItem {
                field: field.to_string(),
                index,
                source: Box::new(source),
            };
            let object = item
                .as_object()
                .ok_or_else(|| wrap(ValidationError::wrong_type(field, "a list of objects")))?;
            validate(FieldReader::new(object)).map_err(wrap)
        })
        .collect()
}

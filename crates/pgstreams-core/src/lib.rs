//! Shared building blocks for the Streams API gateway client.
//!
//! This crate holds the pieces every other layer agrees on: protocol
//! constants, the validated envelope primitives ([`EventId`], [`Timestamp`])
//! and the error taxonomy used by the protocol and gateway crates.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result, ValidationError};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

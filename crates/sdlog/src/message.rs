// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The per-type encode/decode contract.
//!
//! The log never interprets payload bytes itself; every concrete message
//! type supplies its own codec through [`LogMessage`] and the subsystem only
//! orchestrates selection among decoders at read time.

use crate::descriptor::DefinitionGroup;
use thiserror::Error;

/// Encoding tag recorded on schemas and channels whose payloads use a
/// [`LogMessage`] codec.
pub const ENCODING: &str = "sdlog";

/// Payload decode errors, reported per record and never fatal to iteration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("payload truncated")]
    Truncated,

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Encode/decode contract for one concrete message type.
///
/// `encode` must be a pure function of the value and `decode` a pure
/// function of the bytes: same input, same output, every time.
pub trait LogMessage: Sized {
    /// Fully-qualified type name, matching the schema name the type is
    /// registered under (e.g. `demo.Student`).
    fn type_name() -> &'static str;

    /// The definition group this type belongs to, for registration with a
    /// [`crate::descriptor::TypeRegistry`].
    fn definition_group() -> DefinitionGroup;

    /// Serialize this value to payload bytes.
    fn encode(&self) -> Vec<u8>;

    /// Parse a value back from payload bytes.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the buffer is truncated or contains invalid data.
    fn decode(buf: &[u8]) -> Result<Self, ParseError>;
}

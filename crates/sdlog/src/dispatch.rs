// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-name dispatch for read-back decoding.
//!
//! The registry is a closed, explicit mapping from schema name to decode
//! function; routing is extended by registering entries, never by runtime
//! type inspection. Decoding one record is a pure function of the schema
//! name and the payload bytes, and a failure is always confined to the
//! record that caused it.

use crate::message::{LogMessage, ParseError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// A registered decode function producing the caller's tagged value type.
pub type DecodeFn<T> = fn(&[u8]) -> Result<T, ParseError>;

/// One successfully decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// Zero-based position of the record in container log order.
    pub ordinal: u64,
    /// Schema name the record was decoded under.
    pub schema: String,
    /// Topic of the channel the record arrived on.
    pub topic: String,
    /// Caller-assigned sequence number.
    pub sequence: u32,
    /// Log timestamp in nanoseconds.
    pub log_time: u64,
    /// The decoded value.
    pub value: T,
}

/// Per-record diagnostics. Non-fatal: the record is skipped and iteration
/// continues; the record itself stays in the container untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("record #{ordinal} on '{topic}': channel has no schema attached")]
    MissingSchema { ordinal: u64, topic: String },

    #[error("record #{ordinal} on '{topic}': no decoder registered for schema '{schema}'")]
    UnknownSchema {
        ordinal: u64,
        topic: String,
        schema: String,
    },

    #[error("record #{ordinal}: decoding '{schema}' payload failed: {error}")]
    ParseFailure {
        ordinal: u64,
        schema: String,
        error: ParseError,
    },
}

impl Diagnostic {
    /// Position of the affected record in container log order.
    pub fn ordinal(&self) -> u64 {
        match self {
            Self::MissingSchema { ordinal, .. }
            | Self::UnknownSchema { ordinal, .. }
            | Self::ParseFailure { ordinal, .. } => *ordinal,
        }
    }
}

/// Outcome of one dispatch scan: decoded values and skipped-record
/// diagnostics, both in container log order.
#[derive(Debug)]
pub struct DispatchReport<T> {
    pub decoded: Vec<Decoded<T>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Default for DispatchReport<T> {
    fn default() -> Self {
        Self {
            decoded: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> DispatchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successfully decoded records.
    pub fn decoded_count(&self) -> usize {
        self.decoded.len()
    }

    /// Number of records skipped with a diagnostic.
    pub fn skipped_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Total records scanned.
    pub fn record_count(&self) -> usize {
        self.decoded.len() + self.diagnostics.len()
    }
}

/// Closed mapping from schema name to decoder.
pub struct DecoderRegistry<T> {
    entries: HashMap<String, DecodeFn<T>>,
}

impl<T> Default for DecoderRegistry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> DecoderRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoder for a schema name. A later registration under the
    /// same name replaces the earlier one.
    pub fn register(&mut self, schema_name: impl Into<String>, decode: DecodeFn<T>) {
        self.entries.insert(schema_name.into(), decode);
    }

    /// Register a [`LogMessage`] type under its own type name.
    pub fn register_type<M>(&mut self)
    where
        M: LogMessage,
        T: From<M>,
    {
        self.register(M::type_name(), |buf| M::decode(buf).map(T::from));
    }

    /// Check whether a schema name has a decoder.
    pub fn contains(&self, schema_name: &str) -> bool {
        self.entries.contains_key(schema_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode one record: resolve its schema name against the registry,
    /// then parse the payload with the matching decoder.
    ///
    /// # Errors
    ///
    /// Returns a [`Diagnostic`] when the channel carries no schema, the
    /// schema name has no decoder, or the payload fails to parse. All are
    /// per-record conditions; the caller is expected to keep iterating.
    pub fn decode_record(
        &self,
        ordinal: u64,
        message: &mcap::Message<'_>,
    ) -> Result<Decoded<T>, Diagnostic> {
        let topic = message.channel.topic.clone();

        let schema = match message.channel.schema.as_ref() {
            Some(schema) => schema,
            None => {
                let diag = Diagnostic::MissingSchema { ordinal, topic };
                warn!("{}", diag);
                return Err(diag);
            }
        };

        let decode = match self.entries.get(schema.name.as_str()) {
            Some(decode) => decode,
            None => {
                let diag = Diagnostic::UnknownSchema {
                    ordinal,
                    topic,
                    schema: schema.name.clone(),
                };
                warn!("{}", diag);
                return Err(diag);
            }
        };

        match decode(&message.data) {
            Ok(value) => Ok(Decoded {
                ordinal,
                schema: schema.name.clone(),
                topic,
                sequence: message.sequence,
                log_time: message.log_time,
                value,
            }),
            Err(error) => {
                let diag = Diagnostic::ParseFailure {
                    ordinal,
                    schema: schema.name.clone(),
                    error,
                };
                warn!("{}", diag);
                Err(diag)
            }
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SDLOG - Self-Describing Data Log
//!
//! Append typed records to an MCAP container together with the type
//! definitions needed to decode them, then replay the container and route
//! every record back to a typed value by schema name:
//! - Definition closure: each schema embeds the complete, duplicate-free
//!   set of definition-groups its type depends on, so readers need no
//!   compile-time knowledge of the producer's types.
//! - Dispatch decoding: a closed schema-name -> decoder mapping with
//!   per-record failure isolation; one corrupt payload never poisons the
//!   rest of the log.
//!
//! The container itself (layout, chunking, CRCs, indexing) belongs to the
//! `mcap` engine; this crate only registers schemas/channels through it and
//! appends or iterates records.
//!
//! # Quick Start
//!
//! ```no_run
//! use sdlog::{
//!     build_closure, now_nanos, DefinitionGroup, FieldDef, FieldKind, Record, TypeDefinition,
//!     TypeRegistry, WriterSession, ENCODING,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut types = TypeRegistry::new();
//! types.register(DefinitionGroup::new("demo/student").with_type(TypeDefinition::new(
//!     "demo.Student",
//!     vec![
//!         FieldDef::new("id", FieldKind::I32),
//!         FieldDef::new("name", FieldKind::String),
//!     ],
//! )))?;
//!
//! let bundle = build_closure(&types, "demo.Student")?;
//!
//! let mut session = WriterSession::create("students.mcap")?;
//! let schema = session.add_schema("demo.Student", ENCODING, bundle);
//! let channel = session.add_channel("students", ENCODING, schema)?;
//!
//! let now = now_nanos();
//! session.write(&Record {
//!     channel_id: channel,
//!     sequence: 0,
//!     publish_time: now,
//!     log_time: now,
//!     payload: vec![0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, b'A', b'l', b'i', b'c', b'e'],
//! })?;
//! session.finish()?;
//! # Ok(())
//! # }
//! ```
//!
//! Read-back goes the other way: [`ReaderSession::open`], register
//! decoders in a [`DecoderRegistry`], and [`ReaderSession::dispatch`]
//! returns the decoded values alongside diagnostics for skipped records.

pub mod catalog;
pub mod closure;
pub mod descriptor;
pub mod dispatch;
pub mod message;
pub mod reader;
pub mod writer;

pub use catalog::{Catalog, CatalogError, Channel, ChannelId, Schema, SchemaId};
pub use closure::{build_closure, BundleError, ClosureError, DefinitionBundle};
pub use descriptor::{
    DefinitionGroup, FieldDef, FieldKind, RegistryError, TypeDefinition, TypeProvider, TypeRegistry,
};
pub use dispatch::{DecodeFn, Decoded, DecoderRegistry, Diagnostic, DispatchReport};
pub use message::{LogMessage, ParseError, ENCODING};
pub use reader::{ReadError, ReaderSession};
pub use writer::{now_nanos, Record, SessionMetadata, WriteError, WriterSession};

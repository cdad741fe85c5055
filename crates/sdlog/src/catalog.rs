// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema and channel bookkeeping for one write session.
//!
//! The catalog is a sequential in-process ledger: ids start at 1 (0 is
//! reserved as invalid), increase strictly, and are never reused within a
//! session. Entries are immutable once registered. There is no content-based
//! deduplication; registering the same definition twice yields two ids.

use thiserror::Error;

/// Schema identifier, unique within one session. 0 is reserved/invalid.
pub type SchemaId = u16;

/// Channel identifier, unique within one session. 0 is reserved/invalid.
pub type ChannelId = u16;

/// A registered schema: a type name bound to the serialized definition
/// closure that makes it decodable without the producer's sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub id: SchemaId,
    pub name: String,
    pub encoding: String,
    pub bundle: Vec<u8>,
}

/// A registered channel: a topic bound to one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub topic: String,
    pub encoding: String,
    pub schema_id: SchemaId,
}

/// Reference errors: an id that was never returned by a registration call
/// in this session. Session state is untouched; the caller may retry with a
/// valid id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("schema id {0} was not registered in this session")]
    UnknownSchema(SchemaId),

    #[error("channel id {0} was not registered in this session")]
    UnknownChannel(ChannelId),
}

/// The session ledger of schemas and channels.
#[derive(Debug, Default)]
pub struct Catalog {
    schemas: Vec<Schema>,
    channels: Vec<Channel>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema and return its id.
    pub fn register_schema(
        &mut self,
        name: impl Into<String>,
        encoding: impl Into<String>,
        bundle: Vec<u8>,
    ) -> SchemaId {
        let id = (self.schemas.len() + 1) as SchemaId;
        self.schemas.push(Schema {
            id,
            name: name.into(),
            encoding: encoding.into(),
            bundle,
        });
        id
    }

    /// Register a channel bound to an already-registered schema.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSchema`] if `schema_id` was not
    /// returned by [`Catalog::register_schema`] in this session.
    pub fn register_channel(
        &mut self,
        topic: impl Into<String>,
        encoding: impl Into<String>,
        schema_id: SchemaId,
    ) -> Result<ChannelId, CatalogError> {
        if self.schema(schema_id).is_none() {
            return Err(CatalogError::UnknownSchema(schema_id));
        }
        let id = (self.channels.len() + 1) as ChannelId;
        self.channels.push(Channel {
            id,
            topic: topic.into(),
            encoding: encoding.into(),
            schema_id,
        });
        Ok(id)
    }

    /// Look up a schema by id.
    pub fn schema(&self, id: SchemaId) -> Option<&Schema> {
        if id == 0 {
            return None;
        }
        self.schemas.get(id as usize - 1)
    }

    /// Look up a channel by id.
    pub fn channel(&self, id: ChannelId) -> Option<&Channel> {
        if id == 0 {
            return None;
        }
        self.channels.get(id as usize - 1)
    }

    /// Registered schemas in registration order.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Registered channels in registration order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}

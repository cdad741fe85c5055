// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Write sessions: schema/channel registration and record emission.
//!
//! A [`WriterSession`] owns one container handle for its whole lifetime.
//! Registration goes through the session [`Catalog`] first (which assigns
//! the ids callers see) and is then mirrored into the container engine, so
//! every channel lands on disk with its schema and definition closure
//! attached. A container engine failure poisons the session: nothing more
//! can be written and the file must be considered unusable.

use crate::catalog::{Catalog, CatalogError, ChannelId, SchemaId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Write-side errors.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container engine error: {0}")]
    Engine(#[from] mcap::McapError),

    #[error(transparent)]
    InvalidReference(#[from] CatalogError),

    #[error("metadata encoding error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("write session is unusable after a container engine failure")]
    SessionFailed,
}

/// One record to append: a channel reference, caller-assigned ordering
/// metadata, and opaque payload bytes. Nothing here is touched on the way
/// to the container.
#[derive(Debug, Clone)]
pub struct Record {
    pub channel_id: ChannelId,
    pub sequence: u32,
    /// Publication timestamp, nanoseconds.
    pub publish_time: u64,
    /// Log timestamp, nanoseconds.
    pub log_time: u64,
    pub payload: Vec<u8>,
}

/// Wall-clock time as a nanosecond timestamp.
pub fn now_nanos() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Session metadata, stored as a JSON attachment in the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Session start time (ISO 8601).
    pub start_time: String,

    /// Library version that produced the container.
    pub sdlog_version: String,

    /// Producing host name.
    pub hostname: Option<String>,

    /// Optional description.
    pub description: Option<String>,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self {
            start_time: chrono::Utc::now().to_rfc3339(),
            sdlog_version: env!("CARGO_PKG_VERSION").to_string(),
            hostname: hostname::get().ok().and_then(|h| h.into_string().ok()),
            description: None,
        }
    }
}

/// A write session over one container file.
pub struct WriterSession<'a> {
    writer: mcap::Writer<'a, BufWriter<File>>,
    catalog: Catalog,
    engine_channels: HashMap<ChannelId, u16>,
    path: PathBuf,
    failed: bool,
}

impl<'a> WriterSession<'a> {
    /// Open a container for writing, with default session metadata.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, WriteError> {
        Self::create_with_metadata(path, SessionMetadata::default())
    }

    /// Open a container for writing.
    pub fn create_with_metadata<P: AsRef<Path>>(
        path: P,
        metadata: SessionMetadata,
    ) -> Result<Self, WriteError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = mcap::Writer::new(BufWriter::new(file))?;

        let meta_json = serde_json::to_string(&metadata)?;
        writer.attach(&mcap::Attachment {
            log_time: 0,
            create_time: 0,
            name: "sdlog_session.json".to_string(),
            media_type: "application/json".to_string(),
            data: Cow::Owned(meta_json.into_bytes()),
        })?;

        info!("Opened write session at {}", path.display());

        Ok(Self {
            writer,
            catalog: Catalog::new(),
            engine_channels: HashMap::new(),
            path,
            failed: false,
        })
    }

    /// Register a schema: a type name, an encoding tag, and the serialized
    /// definition closure produced by [`crate::closure::build_closure`].
    pub fn add_schema(&mut self, name: &str, encoding: &str, bundle: Vec<u8>) -> SchemaId {
        self.catalog.register_schema(name, encoding, bundle)
    }

    /// Register a channel bound to a previously registered schema, and
    /// mirror it (schema and closure included) into the container.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidReference`] if `schema_id` is unknown to this
    /// session; engine failures poison the session.
    pub fn add_channel(
        &mut self,
        topic: &str,
        encoding: &str,
        schema_id: SchemaId,
    ) -> Result<ChannelId, WriteError> {
        if self.failed {
            return Err(WriteError::SessionFailed);
        }

        let channel_id = self.catalog.register_channel(topic, encoding, schema_id)?;
        let schema = self
            .catalog
            .schema(schema_id)
            .ok_or(CatalogError::UnknownSchema(schema_id))?;

        let engine_schema = mcap::Schema {
            name: schema.name.clone(),
            encoding: schema.encoding.clone(),
            data: Cow::Owned(schema.bundle.clone()),
        };
        let engine_channel = mcap::Channel {
            topic: topic.to_string(),
            schema: Some(engine_schema.into()),
            message_encoding: encoding.to_string(),
            metadata: Default::default(),
        };

        match self.writer.add_channel(&engine_channel) {
            Ok(engine_id) => {
                self.engine_channels.insert(channel_id, engine_id);
                Ok(channel_id)
            }
            Err(e) => {
                self.failed = true;
                Err(e.into())
            }
        }
    }

    /// Append one record to the container.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidReference`] if the record names an unregistered
    /// channel. An engine failure is fatal: the session is poisoned and
    /// every further call returns [`WriteError::SessionFailed`].
    pub fn write(&mut self, record: &Record) -> Result<(), WriteError> {
        if self.failed {
            return Err(WriteError::SessionFailed);
        }

        let engine_id = *self
            .engine_channels
            .get(&record.channel_id)
            .ok_or(CatalogError::UnknownChannel(record.channel_id))?;

        let header = mcap::records::MessageHeader {
            channel_id: engine_id,
            sequence: record.sequence,
            log_time: record.log_time,
            publish_time: record.publish_time,
        };
        match self.writer.write_to_known_channel(&header, &record.payload) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.failed = true;
                Err(e.into())
            }
        }
    }

    /// Encode a typed message and append it.
    pub fn write_message<M: crate::message::LogMessage>(
        &mut self,
        channel_id: ChannelId,
        sequence: u32,
        publish_time: u64,
        log_time: u64,
        message: &M,
    ) -> Result<(), WriteError> {
        self.write(&Record {
            channel_id,
            sequence,
            publish_time,
            log_time,
            payload: message.encode(),
        })
    }

    /// The session's registration ledger.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether an engine failure has poisoned this session.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Finalize the container.
    pub fn finish(mut self) -> Result<(), WriteError> {
        if self.failed {
            return Err(WriteError::SessionFailed);
        }
        self.writer.finish()?;
        info!(
            "Finalized container at {} ({} channel(s), {} schema(s))",
            self.path.display(),
            self.catalog.channels().len(),
            self.catalog.schemas().len()
        );
        Ok(())
    }
}

// Hostname helper (simple implementation)
mod hostname {
    pub fn get() -> std::io::Result<std::ffi::OsString> {
        #[cfg(unix)]
        {
            use std::ffi::OsString;
            use std::os::unix::ffi::OsStringExt;

            let mut buf = vec![0u8; 256];
            let ret =
                unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
            if ret == 0 {
                let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
                buf.truncate(len);
                Ok(OsString::from_vec(buf))
            } else {
                Err(std::io::Error::last_os_error())
            }
        }
        #[cfg(not(unix))]
        {
            Ok(std::ffi::OsString::from("unknown"))
        }
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read sessions: record iteration and dispatch decoding.
//!
//! A [`ReaderSession`] loads one container into memory and walks it in a
//! single forward pass. The engine resolves each record to its channel and
//! schema; [`ReaderSession::dispatch`] routes every record through a
//! [`DecoderRegistry`] and collects decoded values next to the diagnostics
//! for records that had to be skipped. Container-level framing errors are
//! fatal; payload-level failures never are.

use crate::dispatch::{DecoderRegistry, DispatchReport};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Read-side errors. Both variants are fatal to the session.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container engine error: {0}")]
    Engine(#[from] mcap::McapError),
}

/// A read session over one container file.
pub struct ReaderSession {
    path: PathBuf,
    data: Vec<u8>,
}

impl ReaderSession {
    /// Open a container for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path)?;
        info!(
            "Opened read session at {} ({} bytes)",
            path.display(),
            data.len()
        );
        Ok(Self { path, data })
    }

    /// Path this session was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The engine's record stream: one forward pass over the container,
    /// each record resolved to its channel and schema.
    pub fn records(&self) -> Result<mcap::MessageStream<'_>, ReadError> {
        Ok(mcap::MessageStream::new(&self.data)?)
    }

    /// Scan the whole container, routing every record through `decoders`.
    ///
    /// Per-record conditions (unknown schema, missing schema, payload
    /// parse failure) are collected as diagnostics and do not stop the
    /// scan.
    ///
    /// # Errors
    ///
    /// Only container-level failures: unreadable framing, truncated
    /// container structures.
    pub fn dispatch<T>(
        &self,
        decoders: &DecoderRegistry<T>,
    ) -> Result<DispatchReport<T>, ReadError> {
        let mut report = DispatchReport::new();
        let mut ordinal: u64 = 0;

        for message in self.records()? {
            let message = message?;
            match decoders.decode_record(ordinal, &message) {
                Ok(decoded) => report.decoded.push(decoded),
                Err(diagnostic) => report.diagnostics.push(diagnostic),
            }
            ordinal += 1;
        }

        info!(
            "Dispatch scan of {}: {} decoded, {} skipped",
            self.path.display(),
            report.decoded_count(),
            report.skipped_count()
        );

        Ok(report)
    }
}

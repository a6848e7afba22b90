// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Pluggable decoders for multi-record payloads.
//!
//! A decoder is registered for a `(manufacturer id, record type)` pair and
//! turns a raw multi-record payload into a named sub-tree of the navigation
//! tree. Record types below `0xC0` are IPMI-defined, so the manufacturer id
//! is ignored when matching them; OEM types (`0xC0..`) match only their
//! manufacturer. The manufacturer id is read
//! from the first three payload bytes, little-endian.
//!
//! Decoders for the three standard power records (power supply information,
//! DC output, DC load) are built in.

pub(crate) mod standard;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::{Arc, LazyLock, RwLock};

use crate::error::Error;

/// A value exposed by a decoded multi-record field.
#[derive(Debug, Clone, PartialEq)]
pub enum OemValue {
    Int(u32),
    Boolean(bool),
    Float(f64),
    Binary(Vec<u8>),
}

/// One named field of a decoded multi-record.
#[derive(Debug, Clone, PartialEq)]
pub struct OemField {
    pub name: &'static str,
    pub value: OemValue,
}

/// The decoded sub-tree of one multi-record.
///
/// `field(index)` returns [`Error::NotFound`] past the last field and
/// [`Error::NotPresent`] for a field the record marks as unspecified;
/// iteration skips the latter and stops at the former.
pub trait OemFields {
    fn field(&self, index: usize) -> Result<OemField, Error>;
}

/// Decodes raw multi-record payloads of one registered record type.
pub trait OemRecordDecoder: Send + Sync {
    /// Returns the record's display name and its decoded field tree.
    fn decode_record(
        &self,
        manufacturer_id: u32,
        record_type: u8,
        payload: &[u8],
    ) -> Result<(&'static str, Box<dyn OemFields>), Error>;
}

struct Handler {
    manufacturer_id: u32,
    record_type: u8,
    decoder: Arc<dyn OemRecordDecoder>,
}

impl Handler {
    fn matches(&self, manufacturer_id: u32, record_type: u8) -> bool {
        self.record_type == record_type
            && (record_type < 0xc0 || self.manufacturer_id == manufacturer_id)
    }
}

/// An ordered set of multi-record decoders; the first registered match
/// wins.
#[derive(Default)]
pub struct OemRegistry {
    handlers: Vec<Handler>,
}

impl OemRegistry {
    /// An empty registry.
    pub fn new() -> OemRegistry {
        OemRegistry::default()
    }

    /// A registry holding the three standard power-record decoders.
    pub fn with_builtins() -> OemRegistry {
        let mut registry = OemRegistry::new();
        for record_type in [0x00, 0x01, 0x02] {
            registry.register(0, record_type, Arc::new(standard::StandardDecoder));
        }
        registry
    }

    pub fn register(
        &mut self,
        manufacturer_id: u32,
        record_type: u8,
        decoder: Arc<dyn OemRecordDecoder>,
    ) {
        self.handlers.push(Handler {
            manufacturer_id,
            record_type,
            decoder,
        });
    }

    /// Removes the first decoder registered for the pair.
    pub fn deregister(&mut self, manufacturer_id: u32, record_type: u8) -> Result<(), Error> {
        let pos = self
            .handlers
            .iter()
            .position(|h| h.manufacturer_id == manufacturer_id && h.record_type == record_type)
            .ok_or(Error::NotFound)?;
        self.handlers.remove(pos);
        Ok(())
    }

    fn find(&self, manufacturer_id: u32, record_type: u8) -> Option<Arc<dyn OemRecordDecoder>> {
        self.handlers
            .iter()
            .find(|h| h.matches(manufacturer_id, record_type))
            .map(|h| Arc::clone(&h.decoder))
    }

    /// Decodes a multi-record payload with the registry's matching decoder.
    pub fn decode_record(
        &self,
        record_type: u8,
        payload: &[u8],
    ) -> Result<(&'static str, Box<dyn OemFields>), Error> {
        let manufacturer_id = manufacturer_id(payload)?;
        let decoder = self
            .find(manufacturer_id, record_type)
            .ok_or(Error::NotFound)?;
        decoder.decode_record(manufacturer_id, record_type, payload)
    }
}

/// The 24-bit little-endian manufacturer id at the front of a multi-record
/// payload.
fn manufacturer_id(payload: &[u8]) -> Result<u32, Error> {
    if payload.len() < 3 {
        return Err(Error::InvalidArgument);
    }
    Ok(u32::from(payload[0]) | u32::from(payload[1]) << 8 | u32::from(payload[2]) << 16)
}

#[cfg(feature = "std")]
static OEM_DECODERS: LazyLock<RwLock<OemRegistry>> =
    LazyLock::new(|| RwLock::new(OemRegistry::with_builtins()));

/// Registers a decoder with the process-wide registry.
#[cfg(feature = "std")]
pub fn register_oem_decoder(
    manufacturer_id: u32,
    record_type: u8,
    decoder: Arc<dyn OemRecordDecoder>,
) {
    OEM_DECODERS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .register(manufacturer_id, record_type, decoder);
}

/// Removes a decoder from the process-wide registry.
#[cfg(feature = "std")]
pub fn deregister_oem_decoder(manufacturer_id: u32, record_type: u8) -> Result<(), Error> {
    OEM_DECODERS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .deregister(manufacturer_id, record_type)
}

/// Decodes a multi-record payload with the process-wide registry. The
/// matched decoder runs after the registry lock is released.
#[cfg(feature = "std")]
pub(crate) fn decode_multi_record(
    record_type: u8,
    payload: &[u8],
) -> Result<(&'static str, Box<dyn OemFields>), Error> {
    let mfr = manufacturer_id(payload)?;
    let decoder = OEM_DECODERS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .find(mfr, record_type)
        .ok_or(Error::NotFound)?;
    decoder.decode_record(mfr, record_type, payload)
}

/// Without `std` there is no process-wide registry; navigation sees the
/// built-in decoders only.
#[cfg(not(feature = "std"))]
pub(crate) fn decode_multi_record(
    record_type: u8,
    payload: &[u8],
) -> Result<(&'static str, Box<dyn OemFields>), Error> {
    OemRegistry::with_builtins().decode_record(record_type, payload)
}

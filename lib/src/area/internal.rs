// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! The internal use area: a version byte followed by opaque bytes.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::area::Area;
use crate::error::Error;
use crate::update::Updates;

#[derive(Debug, Clone)]
pub(crate) struct InternalUseArea {
    pub common: Area,
    pub version: u8,
    pub data: Vec<u8>,
}

impl InternalUseArea {
    /// Decodes the area from its reserved region, which runs to the next
    /// present area. The whole region belongs to the internal use area.
    pub(crate) fn decode(offset: usize, region: &[u8]) -> Result<InternalUseArea, Error> {
        let (&version, data) = region
            .split_first()
            .ok_or(Error::BadFormat("empty internal use area"))?;
        Ok(InternalUseArea {
            common: Area::decoded(offset, region.len(), region.len()),
            version,
            data: data.to_vec(),
        })
    }

    pub(crate) fn created(offset: usize, length: usize) -> InternalUseArea {
        InternalUseArea {
            common: Area::created(offset, length, 1),
            version: 1,
            data: Vec::new(),
        }
    }

    /// Replaces the opaque payload entirely.
    pub(crate) fn set_data(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.len() + 1 > self.common.length {
            return Err(Error::TooBig);
        }
        self.data = data.to_vec();
        self.common.used_length = data.len() + 1;
        self.common.changed = true;
        Ok(())
    }

    /// Writes the area image into its reserved region and reports the
    /// changed ranges.
    pub(crate) fn encode(&self, buf: &mut [u8], updates: &mut Updates) -> Result<(), Error> {
        buf.fill(0);
        *buf.first_mut().ok_or(Error::InternalError)? = 1;
        buf.get_mut(1..1 + self.data.len())
            .ok_or(Error::InternalError)?
            .copy_from_slice(&self.data);

        let rec = &self.common;
        if rec.changed && !rec.rewrite {
            updates.push(rec.offset, rec.used_length);
            if rec.used_length < rec.orig_used_length {
                updates.push(
                    rec.offset + rec.used_length,
                    rec.orig_used_length - rec.used_length,
                );
            }
        }
        Ok(())
    }
}

// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! The multi-record area: a chain of self-delimited typed records.
//!
//! Each record is a 5-byte header `[type, version|eol, length,
//! payload_checksum, header_checksum]` followed by its payload. The last
//! record carries the end-of-list bit in its second header byte. The area
//! has no terminator of its own; its reserved region runs to the end of the
//! image.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use log::{debug, warn};

use crate::area::Area;
use crate::error::Error;
use crate::update::Updates;
use crate::utils::{checksum, zero_checksum};

/// Size of a record header on the wire.
const HEADER_LEN: usize = 5;

/// End-of-list bit in the second header byte.
const EOL: u8 = 0x80;

/// Record format version written on encode; the low nibble of the second
/// header byte.
const FORMAT_VERSION: u8 = 2;

#[derive(Debug, Clone)]
pub(crate) struct MultiRecord {
    /// Offset of the record's header within the area.
    pub offset: usize,
    pub changed: bool,
    pub record_type: u8,
    pub format_version: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) struct MultiRecordArea {
    pub common: Area,
    pub records: Vec<MultiRecord>,
}

impl MultiRecordArea {
    /// Decodes the record chain from its reserved region (which runs to the
    /// end of the image).
    pub(crate) fn decode(offset: usize, region: &[u8]) -> Result<MultiRecordArea, Error> {
        let mut records = Vec::new();
        let mut cursor = 0;

        loop {
            let left = &region[cursor..];
            if left.len() < HEADER_LEN {
                warn!("multi-record {} header is truncated", records.len());
                return Err(Error::BadFormat("multi-record header truncated"));
            }
            if checksum(&left[..HEADER_LEN]) != 0 {
                warn!("multi-record {} header checksum failed", records.len());
                return Err(Error::BadFormat("multi-record header checksum mismatch"));
            }

            let length = left[2] as usize;
            let Some(payload) = left.get(HEADER_LEN..HEADER_LEN + length) else {
                warn!("multi-record {} runs past the end of the image", records.len());
                return Err(Error::BadFormat("multi-record runs past end of area"));
            };
            if checksum(payload).wrapping_add(left[3]) != 0 {
                warn!("multi-record {} data checksum failed", records.len());
                return Err(Error::BadFormat("multi-record data checksum mismatch"));
            }

            debug!(
                "multi-record {}: type 0x{:02x}, {} data bytes",
                records.len(),
                left[0],
                length
            );
            records.push(MultiRecord {
                offset: cursor,
                changed: false,
                record_type: left[0],
                format_version: left[1] & 0x0f,
                data: payload.to_vec(),
            });

            cursor += HEADER_LEN + length;
            if left[1] & EOL != 0 {
                break;
            }
        }

        Ok(MultiRecordArea {
            common: Area::decoded(offset, region.len(), cursor),
            records,
        })
    }

    pub(crate) fn created(offset: usize, length: usize) -> MultiRecordArea {
        MultiRecordArea {
            common: Area::created(offset, length, 0),
            records: Vec::new(),
        }
    }

    /// Appends, replaces, or deletes one record.
    ///
    /// `data: None` deletes the record at `num`; `Some` replaces it, or
    /// appends when `num` equals the record count. Later records reflow and
    /// are marked changed, as is whichever record inherits or loses the
    /// end-of-list bit.
    pub(crate) fn set(
        &mut self,
        header_changed: &mut bool,
        num: usize,
        record_type: u8,
        format_version: u8,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let rec = &mut self.common;
        match data {
            Some(payload) => {
                if num > self.records.len() || payload.len() > u8::MAX as usize {
                    return Err(Error::InvalidArgument);
                }
                let appending = num == self.records.len();
                let raw_diff = if appending {
                    (HEADER_LEN + payload.len()) as isize
                } else {
                    payload.len() as isize - self.records[num].data.len() as isize
                };
                if raw_diff > 0 && rec.used_length + raw_diff as usize > rec.length {
                    return Err(Error::OutOfSpace);
                }

                if appending {
                    if self.records.is_empty() {
                        // The area becomes non-empty: its header offset byte
                        // flips from 0.
                        *header_changed = true;
                    }
                    if let Some(last) = self.records.last_mut() {
                        // The previous tail loses its end-of-list bit.
                        last.changed = true;
                    }
                    self.records.push(MultiRecord {
                        offset: rec.used_length,
                        changed: true,
                        record_type,
                        format_version: format_version & 0x0f,
                        data: payload.to_vec(),
                    });
                } else {
                    let r = &mut self.records[num];
                    r.record_type = record_type;
                    r.format_version = format_version & 0x0f;
                    r.data = payload.to_vec();
                    r.changed = true;
                    Self::shift_from(&mut self.records, num + 1, raw_diff);
                }
                rec.used_length = (rec.used_length as isize + raw_diff) as usize;
                rec.changed = true;
            }
            None => {
                if num >= self.records.len() {
                    return Err(Error::InvalidArgument);
                }
                let removed = self.records.remove(num);
                let raw_diff = -((HEADER_LEN + removed.data.len()) as isize);
                Self::shift_from(&mut self.records, num, raw_diff);
                if num == self.records.len() {
                    if let Some(last) = self.records.last_mut() {
                        // The new tail gains the end-of-list bit.
                        last.changed = true;
                    }
                }
                if self.records.is_empty() {
                    // The area's header offset byte goes back to 0.
                    *header_changed = true;
                }
                rec.used_length = (rec.used_length as isize + raw_diff) as usize;
                rec.changed = true;
            }
        }
        Ok(())
    }

    fn shift_from(records: &mut [MultiRecord], from: usize, raw_diff: isize) {
        if raw_diff == 0 {
            return;
        }
        for r in records.iter_mut().skip(from) {
            r.offset = (r.offset as isize + raw_diff) as usize;
            r.changed = true;
        }
    }

    /// Writes the record chain into its reserved region and reports a range
    /// for every changed record plus the zero fill of a shrunk tail.
    pub(crate) fn encode(&self, buf: &mut [u8], updates: &mut Updates) -> Result<(), Error> {
        buf.fill(0);

        let rec = &self.common;
        let mut offset = 0;
        let last = self.records.len().wrapping_sub(1);
        for (i, r) in self.records.iter().enumerate() {
            if offset != r.offset {
                return Err(Error::InternalError);
            }
            let header = buf
                .get_mut(offset..offset + HEADER_LEN)
                .ok_or(Error::InternalError)?;
            header[0] = r.record_type;
            header[1] = if i == last {
                FORMAT_VERSION | EOL
            } else {
                FORMAT_VERSION
            };
            header[2] = r.data.len() as u8;
            header[3] = zero_checksum(&r.data);
            header[4] = zero_checksum(&header[..4]);
            buf.get_mut(offset + HEADER_LEN..offset + HEADER_LEN + r.data.len())
                .ok_or(Error::InternalError)?
                .copy_from_slice(&r.data);

            if r.changed && !rec.rewrite {
                updates.push(rec.offset + offset, HEADER_LEN + r.data.len());
            }
            offset += HEADER_LEN + r.data.len();
        }

        if rec.changed && !rec.rewrite && rec.used_length < rec.orig_used_length {
            updates.push(
                rec.offset + rec.used_length,
                rec.orig_used_length - rec.used_length,
            );
        }
        Ok(())
    }

    pub(crate) fn write_complete(&mut self) {
        self.common.write_complete();
        for r in &mut self.records {
            r.changed = false;
        }
    }
}

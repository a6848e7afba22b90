// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! The ordered string list of an info area.
//!
//! The first entries of the list are the area's fixed fields, the remainder
//! are custom strings. Every entry tracks its wire offset within the area so
//! the encoder can emit a per-string update range, and keeps the raw bytes it
//! was decoded from until the first mutation so an untouched string always
//! re-encodes byte-exactly.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::area::Area;
use crate::error::Error;
use crate::tlv;
use crate::tlv::StrType;
use crate::update::Updates;

/// A borrowed view of one string's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrValue<'a> {
    pub ty: StrType,
    pub data: &'a [u8],
}

/// One type/length string plus its wire bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct FieldString {
    ty: StrType,
    /// Decoded payload. `None` marks a cleared field, which encodes to the
    /// single byte `0xC0`.
    data: Option<Vec<u8>>,
    /// Offset of the string within its area.
    offset: usize,
    /// Wire length including the prefix byte.
    raw_len: usize,
    /// Bytes this string was decoded from; dropped on the first mutation.
    raw: Option<Vec<u8>>,
    changed: bool,
}

impl FieldString {
    /// An empty slot for a freshly created area: encodes to `0xC0`.
    fn empty(offset: usize, changed: bool) -> FieldString {
        FieldString {
            ty: StrType::Ascii8,
            data: None,
            offset,
            raw_len: 1,
            raw: None,
            changed,
        }
    }

    pub(crate) fn value(&self) -> Result<StrValue<'_>, Error> {
        match &self.data {
            Some(data) => Ok(StrValue { ty: self.ty, data }),
            None => Err(Error::NotPresent),
        }
    }

    fn wire_bytes(&self) -> Result<Vec<u8>, Error> {
        match (&self.raw, &self.data) {
            (Some(raw), _) => Ok(raw.clone()),
            (None, Some(data)) => tlv::encode(self.ty, data),
            (None, None) => Ok(vec![tlv::EMPTY]),
        }
    }
}

/// Fixed and custom strings of one info area.
#[derive(Debug, Clone)]
pub(crate) struct FieldArray {
    strings: Vec<FieldString>,
    num_fixed: usize,
}

impl FieldArray {
    /// An array with `num_fixed` empty fixed slots packed from
    /// `field_start`, as written into a freshly created area.
    pub(crate) fn new_empty(num_fixed: usize, field_start: usize) -> FieldArray {
        let strings = (0..num_fixed)
            .map(|i| FieldString::empty(field_start + i, true))
            .collect();
        FieldArray {
            strings,
            num_fixed,
        }
    }

    /// An array being filled by an area decoder.
    pub(crate) fn decoding(num_fixed: usize) -> FieldArray {
        FieldArray {
            strings: Vec::with_capacity(num_fixed),
            num_fixed,
        }
    }

    /// Decodes the next string from `area[*cursor..limit]` and appends it.
    ///
    /// A cursor already sitting on the list terminator (or on `limit`) means
    /// the string is absent from the image; it is recorded as an empty entry
    /// occupying zero wire bytes, which is how short-but-valid areas encode
    /// their unused fixed fields.
    pub(crate) fn decode_next(
        &mut self,
        area: &[u8],
        limit: usize,
        cursor: &mut usize,
        force_unicode: bool,
    ) -> Result<(), Error> {
        if *cursor >= limit || area[*cursor] == tlv::TERMINATOR {
            self.strings.push(FieldString {
                ty: StrType::Ascii8,
                data: Some(Vec::new()),
                offset: *cursor,
                raw_len: 0,
                raw: Some(Vec::new()),
                changed: false,
            });
            return Ok(());
        }

        let decoded = tlv::decode(&area[*cursor..limit], force_unicode)?;
        self.strings.push(FieldString {
            ty: decoded.ty,
            data: Some(decoded.data),
            offset: *cursor,
            raw_len: decoded.raw_len,
            raw: Some(area[*cursor..*cursor + decoded.raw_len].to_vec()),
            changed: false,
        });
        *cursor += decoded.raw_len;
        Ok(())
    }

    /// True while the cursor points at another custom string.
    pub(crate) fn more_customs(area: &[u8], limit: usize, cursor: usize) -> bool {
        cursor < limit && area[cursor] != tlv::TERMINATOR
    }

    pub(crate) fn get(&self, num: usize) -> Result<&FieldString, Error> {
        self.strings.get(num).ok_or(Error::NotFound)
    }

    pub(crate) fn get_custom(&self, num: usize) -> Result<&FieldString, Error> {
        self.get(self.num_fixed.checked_add(num).ok_or(Error::NotFound)?)
    }

    /// Sets, clears, or deletes one string, keeping every later entry's
    /// offset and the area's used length consistent.
    ///
    /// With `is_custom`, `num` counts from the first custom slot and an
    /// index at (or past) the end appends; `data: None` deletes the entry.
    /// Without `is_custom`, `num` is a fixed slot and `data: None` clears it
    /// to the empty encoding.
    pub(crate) fn set(
        &mut self,
        rec: &mut Area,
        mut num: usize,
        ty: StrType,
        data: Option<&[u8]>,
        is_custom: bool,
    ) -> Result<(), Error> {
        if is_custom {
            // Renumber custom ordinals onto the full list, saturating any
            // past-the-end index onto "append".
            if num > self.strings.len() - self.num_fixed {
                num = self.strings.len();
            } else {
                num += self.num_fixed;
            }
        }

        let appending = num >= self.strings.len();
        if appending && data.is_none() {
            // Deleting a slot that does not exist.
            return Err(Error::InvalidArgument);
        }

        match data {
            Some(payload) => {
                let payload = &payload[..payload.len().min(tlv::MAX_PAYLOAD)];
                let wire = tlv::encode(ty, payload)?;
                let old_raw_len = if appending {
                    0
                } else {
                    self.strings[num].raw_len
                };
                let raw_diff = wire.len() as isize - old_raw_len as isize;
                if raw_diff > 0 && rec.used_length + raw_diff as usize > rec.length {
                    return Err(Error::OutOfSpace);
                }

                if appending {
                    // The new entry slides in just before the terminator.
                    self.strings
                        .push(FieldString::empty(rec.used_length - 2, false));
                }

                let s = &mut self.strings[num];
                s.ty = ty;
                s.data = Some(payload.to_vec());
                s.raw = None;
                s.raw_len = wire.len();
                s.changed = true;
                self.shift_from(num + 1, raw_diff);
                rec.used_length = (rec.used_length as isize + raw_diff) as usize;
                rec.changed = true;
            }
            None if !is_custom => {
                // A fixed field is always present; clearing it leaves the
                // one-byte empty encoding behind.
                let raw_diff = 1 - self.strings[num].raw_len as isize;
                if raw_diff > 0 && rec.used_length + raw_diff as usize > rec.length {
                    return Err(Error::OutOfSpace);
                }
                let s = &mut self.strings[num];
                s.ty = ty;
                s.data = None;
                s.raw = None;
                s.raw_len = 1;
                s.changed = true;
                self.shift_from(num + 1, raw_diff);
                rec.used_length = (rec.used_length as isize + raw_diff) as usize;
                rec.changed = true;
            }
            None => {
                // Deleting a custom entry pulls every later string forward.
                let removed = self.strings.remove(num);
                self.shift_from(num, -(removed.raw_len as isize));
                rec.used_length -= removed.raw_len;
                rec.changed = true;
            }
        }
        Ok(())
    }

    /// Slides the offsets of every entry from `from` on by `raw_diff` and
    /// marks them changed.
    fn shift_from(&mut self, from: usize, raw_diff: isize) {
        if raw_diff == 0 {
            return;
        }
        for s in self.strings.iter_mut().skip(from) {
            s.offset = (s.offset as isize + raw_diff) as usize;
            s.changed = true;
        }
    }

    /// Writes every string plus the list terminator into the area image and
    /// emits per-string update ranges.
    ///
    /// `buf` is the area's reserved region; `offset` is the first byte after
    /// the fixed area header.
    pub(crate) fn encode(
        &self,
        rec: &Area,
        buf: &mut [u8],
        mut offset: usize,
        updates: &mut Updates,
    ) -> Result<(), Error> {
        for s in &self.strings {
            if offset != s.offset {
                return Err(Error::InternalError);
            }
            let wire = s.wire_bytes()?;
            buf.get_mut(offset..offset + wire.len())
                .ok_or(Error::InternalError)?
                .copy_from_slice(&wire);
            if s.changed && !rec.rewrite {
                updates.push(rec.offset + offset, wire.len());
            }
            offset += wire.len();
        }

        *buf.get_mut(offset).ok_or(Error::InternalError)? = tlv::TERMINATOR;
        if rec.changed && !rec.rewrite {
            updates.push(rec.offset + offset, 1);
        }
        offset += 1;

        // Everything but the trailing checksum byte must now be accounted
        // for.
        if offset != rec.used_length - 1 {
            return Err(Error::InternalError);
        }
        Ok(())
    }

    pub(crate) fn clear_changed(&mut self) {
        for s in &mut self.strings {
            s.changed = false;
        }
    }
}

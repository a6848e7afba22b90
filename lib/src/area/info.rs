// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! The three string-bearing info areas: chassis, board, and product.
//!
//! All three share one layout: a fixed header, a run of type/length strings
//! (fixed fields first, then custom fields), the `0xC1` terminator, and a
//! zero-sum checksum in the area's last byte. They differ only in the header
//! scalars and in which fields are eligible for Unicode promotion under a
//! non-English language code.

use log::warn;

use crate::area::Area;
use crate::error::Error;
use crate::field::FieldArray;
use crate::tlv;
use crate::update::Updates;
use crate::utils::{fru_minutes_to_unix, unix_to_fru_minutes, zero_checksum};

/// Fixed fields of the chassis info area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChassisField {
    PartNumber,
    SerialNumber,
}

/// Fixed fields of the board info area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardField {
    Manufacturer,
    ProductName,
    SerialNumber,
    PartNumber,
    FruFileId,
}

/// Fixed fields of the product info area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    ManufacturerName,
    ProductName,
    PartModelNumber,
    Version,
    SerialNumber,
    AssetTag,
    FruFileId,
}

/// Serial numbers, part numbers, and FRU file ids always decode as plain
/// ASCII; the remaining fields follow the area's language code.
const CHASSIS_FORCE_ENGLISH: [bool; 2] = [true, true];
const BOARD_FORCE_ENGLISH: [bool; 5] = [false, false, true, true, true];
const PRODUCT_FORCE_ENGLISH: [bool; 7] = [false, false, false, false, true, false, true];

fn force_unicode(lang_code: u8, force_english: bool) -> bool {
    !force_english && lang_code != tlv::LANG_ENGLISH
}

/// Validates the two header bytes and the area checksum; returns the
/// version byte and the declared area length.
fn decode_header(region: &[u8], what: &str) -> Result<(u8, usize), Error> {
    if region.len() < 2 {
        warn!("{what} area header is truncated");
        return Err(Error::BadFormat("info area header truncated"));
    }
    let version = region[0];
    let length = region[1] as usize * 8;
    if length == 0 || length > region.len() {
        warn!("{what} area length {length} exceeds its {}-byte region", region.len());
        return Err(Error::BadFormat("info area length out of range"));
    }
    if crate::utils::checksum(&region[..length]) != 0 {
        warn!("{what} area checksum failed");
        return Err(Error::BadFormat("info area checksum mismatch"));
    }
    Ok((version, length))
}

/// Decodes the string run of an info area: the fixed fields, then custom
/// strings up to the terminator. Returns the array and the area's used
/// length.
fn decode_strings(
    region: &[u8],
    length: usize,
    field_start: usize,
    lang_code: u8,
    force_english: &[bool],
) -> Result<(FieldArray, usize), Error> {
    // Strings live between the header and the trailing checksum byte.
    let limit = length - 1;
    let mut cursor = field_start;
    let mut fields = FieldArray::decoding(force_english.len());

    for &force in force_english {
        fields.decode_next(region, limit, &mut cursor, force_unicode(lang_code, force))?;
    }
    while FieldArray::more_customs(region, limit, cursor) {
        fields.decode_next(region, limit, &mut cursor, force_unicode(lang_code, false))?;
    }

    if cursor >= limit {
        return Err(Error::BadFormat("info area string list is unterminated"));
    }
    // Terminator and checksum bytes count as used.
    Ok((fields, cursor + 2))
}

/// Writes the string run, trailing zero fill, and checksum of an info area,
/// emitting their update ranges. The fixed header bytes are already in
/// `buf`; `header_len` is their count.
fn encode_tail(
    rec: &Area,
    fields: &FieldArray,
    buf: &mut [u8],
    header_len: usize,
    updates: &mut Updates,
) -> Result<(), Error> {
    if rec.changed && !rec.rewrite {
        updates.push(rec.offset, header_len);
    }
    fields.encode(rec, buf, header_len, updates)?;
    buf[rec.length - 1] = zero_checksum(&buf[..rec.length - 1]);
    if rec.changed && !rec.rewrite {
        if rec.used_length < rec.orig_used_length {
            updates.push(
                rec.offset + rec.used_length - 1,
                rec.orig_used_length - rec.used_length,
            );
        }
        updates.push(rec.offset + rec.length - 1, 1);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub(crate) struct ChassisArea {
    pub common: Area,
    pub version: u8,
    pub chassis_type: u8,
    pub fields: FieldArray,
}

impl ChassisArea {
    const FIELD_START: usize = 3;

    pub(crate) fn decode(offset: usize, region: &[u8]) -> Result<ChassisArea, Error> {
        let (version, length) = decode_header(region, "chassis info")?;
        // The chassis area carries no language code; its strings are
        // always English.
        let (fields, used_length) = decode_strings(
            region,
            length,
            Self::FIELD_START,
            tlv::LANG_ENGLISH,
            &CHASSIS_FORCE_ENGLISH,
        )?;
        Ok(ChassisArea {
            common: Area::decoded(offset, length, used_length),
            version,
            chassis_type: region[2],
            fields,
        })
    }

    pub(crate) fn created(offset: usize, length: usize) -> ChassisArea {
        ChassisArea {
            common: Area::created(offset, length, crate::area::AreaId::ChassisInfo.empty_length()),
            version: 1,
            chassis_type: 0,
            fields: FieldArray::new_empty(CHASSIS_FORCE_ENGLISH.len(), Self::FIELD_START),
        }
    }

    pub(crate) fn set_type(&mut self, chassis_type: u8) {
        self.common.changed |= self.chassis_type != chassis_type;
        self.chassis_type = chassis_type;
    }

    pub(crate) fn encode(&self, buf: &mut [u8], updates: &mut Updates) -> Result<(), Error> {
        buf.fill(0);
        buf[0] = 1;
        buf[1] = (self.common.length / 8) as u8;
        buf[2] = self.chassis_type;
        encode_tail(&self.common, &self.fields, buf, Self::FIELD_START, updates)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BoardArea {
    pub common: Area,
    pub version: u8,
    pub lang_code: u8,
    /// Manufacturing time as Unix epoch seconds.
    pub mfg_time: i64,
    pub fields: FieldArray,
}

impl BoardArea {
    const FIELD_START: usize = 6;

    pub(crate) fn decode(offset: usize, region: &[u8]) -> Result<BoardArea, Error> {
        let (version, length) = decode_header(region, "board info")?;
        let lang_code = match region[2] {
            0 => tlv::LANG_ENGLISH,
            lang => lang,
        };
        let minutes =
            u32::from(region[3]) | u32::from(region[4]) << 8 | u32::from(region[5]) << 16;
        let (fields, used_length) = decode_strings(
            region,
            length,
            Self::FIELD_START,
            lang_code,
            &BOARD_FORCE_ENGLISH,
        )?;
        Ok(BoardArea {
            common: Area::decoded(offset, length, used_length),
            version,
            lang_code,
            mfg_time: fru_minutes_to_unix(minutes),
            fields,
        })
    }

    pub(crate) fn created(offset: usize, length: usize) -> BoardArea {
        BoardArea {
            common: Area::created(offset, length, crate::area::AreaId::BoardInfo.empty_length()),
            version: 1,
            lang_code: tlv::LANG_ENGLISH,
            mfg_time: crate::utils::FRU_EPOCH_UNIX_SECONDS,
            fields: FieldArray::new_empty(BOARD_FORCE_ENGLISH.len(), Self::FIELD_START),
        }
    }

    pub(crate) fn set_lang_code(&mut self, lang_code: u8) {
        self.common.changed |= self.lang_code != lang_code;
        self.lang_code = lang_code;
    }

    pub(crate) fn set_mfg_time(&mut self, time: i64) -> Result<(), Error> {
        // Validate the 24-bit minute range up front.
        unix_to_fru_minutes(time)?;
        self.common.changed |= self.mfg_time != time;
        self.mfg_time = time;
        Ok(())
    }

    pub(crate) fn encode(&self, buf: &mut [u8], updates: &mut Updates) -> Result<(), Error> {
        buf.fill(0);
        buf[0] = 1;
        buf[1] = (self.common.length / 8) as u8;
        buf[2] = self.lang_code;
        let minutes = unix_to_fru_minutes(self.mfg_time)?;
        buf[3] = minutes as u8;
        buf[4] = (minutes >> 8) as u8;
        buf[5] = (minutes >> 16) as u8;
        encode_tail(&self.common, &self.fields, buf, Self::FIELD_START, updates)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ProductArea {
    pub common: Area,
    pub version: u8,
    pub lang_code: u8,
    pub fields: FieldArray,
}

impl ProductArea {
    const FIELD_START: usize = 3;

    pub(crate) fn decode(offset: usize, region: &[u8]) -> Result<ProductArea, Error> {
        let (version, length) = decode_header(region, "product info")?;
        let lang_code = match region[2] {
            0 => tlv::LANG_ENGLISH,
            lang => lang,
        };
        let (fields, used_length) = decode_strings(
            region,
            length,
            Self::FIELD_START,
            lang_code,
            &PRODUCT_FORCE_ENGLISH,
        )?;
        Ok(ProductArea {
            common: Area::decoded(offset, length, used_length),
            version,
            lang_code,
            fields,
        })
    }

    pub(crate) fn created(offset: usize, length: usize) -> ProductArea {
        ProductArea {
            common: Area::created(offset, length, crate::area::AreaId::ProductInfo.empty_length()),
            version: 1,
            lang_code: tlv::LANG_ENGLISH,
            fields: FieldArray::new_empty(PRODUCT_FORCE_ENGLISH.len(), Self::FIELD_START),
        }
    }

    pub(crate) fn set_lang_code(&mut self, lang_code: u8) {
        self.common.changed |= self.lang_code != lang_code;
        self.lang_code = lang_code;
    }

    pub(crate) fn encode(&self, buf: &mut [u8], updates: &mut Updates) -> Result<(), Error> {
        buf.fill(0);
        buf[0] = 1;
        buf[1] = (self.common.length / 8) as u8;
        buf[2] = self.lang_code;
        encode_tail(&self.common, &self.fields, buf, Self::FIELD_START, updates)
    }
}

// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! The top-level FRU object: decode, edit, encode, acknowledge.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use log::warn;

use crate::area::info::{
    BoardArea, BoardField, ChassisArea, ChassisField, ProductArea, ProductField,
};
use crate::area::internal::InternalUseArea;
use crate::area::multirec::{MultiRecord, MultiRecordArea};
use crate::area::{Area, AreaId};
use crate::error::Error;
use crate::field::StrValue;
use crate::tlv::StrType;
use crate::update::{UpdateRange, Updates};
use crate::utils::{checksum, zero_checksum};

/// Area starts are stored as a byte offset divided by 8 in a single byte,
/// so no area can start past 8 * 255 = 2040.
const MAX_AREA_START: usize = 2040;

/// Length of the common header at the front of every image.
const HEADER_LEN: usize = 8;

/// A decoded FRU image plus the edit state needed to write it back with
/// minimal media traffic.
///
/// The `Fru` owns a private copy of the image. Setters mutate the in-memory
/// model and record what changed; [`Fru::write`] re-encodes the image in
/// place and returns the byte ranges a caller must push to the media, and
/// [`Fru::write_complete`] acknowledges a finished write-back.
pub struct Fru {
    pub(crate) data: Vec<u8>,
    pub(crate) internal: Option<InternalUseArea>,
    pub(crate) chassis: Option<ChassisArea>,
    pub(crate) board: Option<BoardArea>,
    pub(crate) product: Option<ProductArea>,
    pub(crate) multi: Option<MultiRecordArea>,
    pub(crate) header_changed: bool,
}

impl Fru {
    /// Decodes a FRU image.
    ///
    /// The common header is validated first (version, checksum, offset
    /// ordering), then every present area is handed to its decoder. Any
    /// failure rejects the whole image.
    pub fn from_slice(data: &[u8]) -> Result<Fru, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::BadFormat("image shorter than the common header"));
        }
        if checksum(&data[..HEADER_LEN]) != 0 {
            warn!("common header checksum failed");
            return Err(Error::BadFormat("common header checksum mismatch"));
        }
        if data[0] != 1 {
            warn!("unsupported FRU format version {}", data[0]);
            return Err(Error::BadFormat("unsupported format version"));
        }

        let mut offsets = [0usize; 5];
        for (i, slot) in offsets.iter_mut().enumerate() {
            let offset = data[i + 1] as usize * 8;
            if offset >= data.len() {
                warn!("{} offset {offset} exceeds the image", AreaId::ALL[i]);
                return Err(Error::BadFormat("area offset exceeds image length"));
            }
            *slot = offset;
        }

        // Areas must appear in their mandated order and cannot share a
        // start.
        let mut prev = 0;
        for &offset in &offsets {
            if offset == 0 {
                continue;
            }
            if offset <= prev {
                warn!("area offsets out of order");
                return Err(Error::BadFormat("areas out of order"));
            }
            prev = offset;
        }

        let mut fru = Fru {
            data: data.to_vec(),
            internal: None,
            chassis: None,
            board: None,
            product: None,
            multi: None,
            header_changed: false,
        };

        for (i, &offset) in offsets.iter().enumerate() {
            if offset == 0 {
                continue;
            }
            // Each area's reserved region runs to the next present area or
            // the end of the image.
            let next = offsets[i + 1..]
                .iter()
                .copied()
                .find(|&o| o != 0)
                .unwrap_or(data.len());
            let region = &data[offset..next];
            match AreaId::ALL[i] {
                AreaId::InternalUse => {
                    fru.internal = Some(InternalUseArea::decode(offset, region)?)
                }
                AreaId::ChassisInfo => fru.chassis = Some(ChassisArea::decode(offset, region)?),
                AreaId::BoardInfo => fru.board = Some(BoardArea::decode(offset, region)?),
                AreaId::ProductInfo => fru.product = Some(ProductArea::decode(offset, region)?),
                AreaId::MultiRecord => fru.multi = Some(MultiRecordArea::decode(offset, region)?),
            }
        }

        Ok(fru)
    }

    /// The in-memory image. Between [`Fru::write`] and
    /// [`Fru::write_complete`] this is the image the update ranges describe.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn area_common(&self, area: AreaId) -> Option<&Area> {
        match area {
            AreaId::InternalUse => self.internal.as_ref().map(|a| &a.common),
            AreaId::ChassisInfo => self.chassis.as_ref().map(|a| &a.common),
            AreaId::BoardInfo => self.board.as_ref().map(|a| &a.common),
            AreaId::ProductInfo => self.product.as_ref().map(|a| &a.common),
            AreaId::MultiRecord => self.multi.as_ref().map(|a| &a.common),
        }
    }

    fn area_common_mut(&mut self, area: AreaId) -> Option<&mut Area> {
        match area {
            AreaId::InternalUse => self.internal.as_mut().map(|a| &mut a.common),
            AreaId::ChassisInfo => self.chassis.as_mut().map(|a| &mut a.common),
            AreaId::BoardInfo => self.board.as_mut().map(|a| &mut a.common),
            AreaId::ProductInfo => self.product.as_mut().map(|a| &mut a.common),
            AreaId::MultiRecord => self.multi.as_mut().map(|a| &mut a.common),
        }
    }

    /// Validates a prospective placement for `area` against alignment, the
    /// image bounds, the protocol's start cap, and both neighbors.
    fn check_position(&self, area: AreaId, offset: usize, length: usize) -> Result<(), Error> {
        if offset == 0 || offset % 8 != 0 {
            return Err(Error::InvalidArgument);
        }
        if let Some(rec) = self.area_common(area) {
            if length < rec.used_length {
                return Err(Error::TooBig);
            }
        }
        if area != AreaId::InternalUse && area != AreaId::MultiRecord && length > MAX_AREA_START {
            // Info area lengths are stored as length / 8 in one byte.
            return Err(Error::InvalidArgument);
        }

        let max_start = (self.data.len() - HEADER_LEN).min(MAX_AREA_START);
        if offset > max_start || offset + length > self.data.len() {
            return Err(Error::InvalidArgument);
        }

        for i in (0..area.index()).rev() {
            if let Some(r) = self.area_common(AreaId::ALL[i]) {
                if offset < r.offset + r.length {
                    return Err(Error::InvalidArgument);
                }
                break;
            }
        }
        for i in area.index() + 1..AreaId::ALL.len() {
            if let Some(r) = self.area_common(AreaId::ALL[i]) {
                if offset + length > r.offset {
                    return Err(Error::InvalidArgument);
                }
                break;
            }
        }
        Ok(())
    }

    /// Adds an empty area at the given placement. The length is truncated
    /// to a multiple of 8.
    pub fn add_area(&mut self, area: AreaId, offset: usize, length: usize) -> Result<(), Error> {
        let length = length & !7;
        if self.area_common(area).is_some() {
            return Err(Error::AlreadyExists);
        }
        self.check_position(area, offset, length)?;
        if length < area.empty_length() {
            return Err(Error::TooBig);
        }

        match area {
            AreaId::InternalUse => self.internal = Some(InternalUseArea::created(offset, length)),
            AreaId::ChassisInfo => self.chassis = Some(ChassisArea::created(offset, length)),
            AreaId::BoardInfo => self.board = Some(BoardArea::created(offset, length)),
            AreaId::ProductInfo => self.product = Some(ProductArea::created(offset, length)),
            AreaId::MultiRecord => self.multi = Some(MultiRecordArea::created(offset, length)),
        }
        self.header_changed = true;
        Ok(())
    }

    /// Removes an area. Removing an absent area is a no-op.
    pub fn delete_area(&mut self, area: AreaId) -> Result<(), Error> {
        let removed = match area {
            AreaId::InternalUse => self.internal.take().is_some(),
            AreaId::ChassisInfo => self.chassis.take().is_some(),
            AreaId::BoardInfo => self.board.take().is_some(),
            AreaId::ProductInfo => self.product.take().is_some(),
            AreaId::MultiRecord => self.multi.take().is_some(),
        };
        if removed {
            self.header_changed = true;
        }
        Ok(())
    }

    pub fn area_offset(&self, area: AreaId) -> Result<usize, Error> {
        self.area_common(area).map(|r| r.offset).ok_or(Error::NotFound)
    }

    pub fn area_length(&self, area: AreaId) -> Result<usize, Error> {
        self.area_common(area).map(|r| r.length).ok_or(Error::NotFound)
    }

    pub fn area_used_length(&self, area: AreaId) -> Result<usize, Error> {
        self.area_common(area)
            .map(|r| r.used_length)
            .ok_or(Error::NotFound)
    }

    /// Moves an area. The whole area is rewritten at its new position on
    /// the next write.
    pub fn set_area_offset(&mut self, area: AreaId, offset: usize) -> Result<(), Error> {
        let rec = self.area_common(area).ok_or(Error::NotFound)?;
        if rec.offset == offset {
            return Ok(());
        }
        let length = if area == AreaId::MultiRecord {
            // The multi-record area runs to the end of the image; moving it
            // resizes it so the end stays pinned.
            (rec.offset + rec.length)
                .checked_sub(offset)
                .ok_or(Error::InvalidArgument)?
        } else {
            rec.length
        };
        self.check_position(area, offset, length)?;

        let rec = self.area_common_mut(area).ok_or(Error::NotFound)?;
        rec.offset = offset;
        rec.length = length;
        rec.changed = true;
        rec.rewrite = true;
        self.header_changed = true;
        Ok(())
    }

    /// Resizes an area. Growing forces a whole-area rewrite (the fresh tail
    /// must be zeroed on the media); shrinking below the used length fails.
    pub fn set_area_length(&mut self, area: AreaId, length: usize) -> Result<(), Error> {
        let length = length & !7;
        if length == 0 {
            return Err(Error::InvalidArgument);
        }
        let rec = self.area_common(area).ok_or(Error::NotFound)?;
        if rec.length == length {
            return Ok(());
        }
        let offset = rec.offset;
        self.check_position(area, offset, length)?;

        let rec = self.area_common_mut(area).ok_or(Error::NotFound)?;
        if length > rec.length {
            rec.rewrite = true;
        }
        rec.length = length;
        rec.changed = true;
        self.header_changed = true;
        Ok(())
    }

    pub(crate) fn internal_area(&self) -> Result<&InternalUseArea, Error> {
        self.internal.as_ref().ok_or(Error::NotPresent)
    }

    pub(crate) fn chassis_area(&self) -> Result<&ChassisArea, Error> {
        self.chassis.as_ref().ok_or(Error::NotPresent)
    }

    pub(crate) fn chassis_area_mut(&mut self) -> Result<&mut ChassisArea, Error> {
        self.chassis.as_mut().ok_or(Error::NotPresent)
    }

    pub(crate) fn board_area(&self) -> Result<&BoardArea, Error> {
        self.board.as_ref().ok_or(Error::NotPresent)
    }

    pub(crate) fn board_area_mut(&mut self) -> Result<&mut BoardArea, Error> {
        self.board.as_mut().ok_or(Error::NotPresent)
    }

    pub(crate) fn product_area(&self) -> Result<&ProductArea, Error> {
        self.product.as_ref().ok_or(Error::NotPresent)
    }

    pub(crate) fn product_area_mut(&mut self) -> Result<&mut ProductArea, Error> {
        self.product.as_mut().ok_or(Error::NotPresent)
    }

    fn multi_record(&self, num: usize) -> Result<&MultiRecord, Error> {
        self.multi
            .as_ref()
            .ok_or(Error::NotPresent)?
            .records
            .get(num)
            .ok_or(Error::NotFound)
    }

    // Internal use area.

    pub fn internal_use_version(&self) -> Result<u8, Error> {
        Ok(self.internal_area()?.version)
    }

    pub fn internal_use(&self) -> Result<&[u8], Error> {
        Ok(&self.internal_area()?.data)
    }

    /// Replaces the internal use payload entirely.
    pub fn set_internal_use(&mut self, data: &[u8]) -> Result<(), Error> {
        self.internal.as_mut().ok_or(Error::NotPresent)?.set_data(data)
    }

    // Chassis info area.

    pub fn chassis_info_version(&self) -> Result<u8, Error> {
        Ok(self.chassis_area()?.version)
    }

    pub fn chassis_info_type(&self) -> Result<u8, Error> {
        Ok(self.chassis_area()?.chassis_type)
    }

    pub fn set_chassis_info_type(&mut self, chassis_type: u8) -> Result<(), Error> {
        self.chassis_area_mut()?.set_type(chassis_type);
        Ok(())
    }

    pub fn chassis_info_string(&self, field: ChassisField) -> Result<StrValue<'_>, Error> {
        self.chassis_area()?.fields.get(field as usize)?.value()
    }

    /// Sets a fixed chassis string; `None` clears it.
    pub fn set_chassis_info_string(
        &mut self,
        field: ChassisField,
        ty: StrType,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let area = self.chassis_area_mut()?;
        area.fields.set(&mut area.common, field as usize, ty, data, false)
    }

    pub fn chassis_info_custom(&self, num: usize) -> Result<StrValue<'_>, Error> {
        self.chassis_area()?.fields.get_custom(num)?.value()
    }

    /// Sets a custom chassis string by ordinal; an ordinal at the end
    /// appends and `None` deletes.
    pub fn set_chassis_info_custom(
        &mut self,
        num: usize,
        ty: StrType,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let area = self.chassis_area_mut()?;
        area.fields.set(&mut area.common, num, ty, data, true)
    }

    // Board info area.

    pub fn board_info_version(&self) -> Result<u8, Error> {
        Ok(self.board_area()?.version)
    }

    pub fn board_info_lang_code(&self) -> Result<u8, Error> {
        Ok(self.board_area()?.lang_code)
    }

    pub fn set_board_info_lang_code(&mut self, lang_code: u8) -> Result<(), Error> {
        self.board_area_mut()?.set_lang_code(lang_code);
        Ok(())
    }

    /// Manufacturing time as Unix epoch seconds.
    pub fn board_info_mfg_time(&self) -> Result<i64, Error> {
        Ok(self.board_area()?.mfg_time)
    }

    /// Sets the manufacturing time from Unix epoch seconds; the value must
    /// fit the format's 24-bit minute count past 1996-01-01.
    pub fn set_board_info_mfg_time(&mut self, time: i64) -> Result<(), Error> {
        self.board_area_mut()?.set_mfg_time(time)
    }

    pub fn board_info_string(&self, field: BoardField) -> Result<StrValue<'_>, Error> {
        self.board_area()?.fields.get(field as usize)?.value()
    }

    pub fn set_board_info_string(
        &mut self,
        field: BoardField,
        ty: StrType,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let area = self.board_area_mut()?;
        area.fields.set(&mut area.common, field as usize, ty, data, false)
    }

    pub fn board_info_custom(&self, num: usize) -> Result<StrValue<'_>, Error> {
        self.board_area()?.fields.get_custom(num)?.value()
    }

    pub fn set_board_info_custom(
        &mut self,
        num: usize,
        ty: StrType,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let area = self.board_area_mut()?;
        area.fields.set(&mut area.common, num, ty, data, true)
    }

    // Product info area.

    pub fn product_info_version(&self) -> Result<u8, Error> {
        Ok(self.product_area()?.version)
    }

    pub fn product_info_lang_code(&self) -> Result<u8, Error> {
        Ok(self.product_area()?.lang_code)
    }

    pub fn set_product_info_lang_code(&mut self, lang_code: u8) -> Result<(), Error> {
        self.product_area_mut()?.set_lang_code(lang_code);
        Ok(())
    }

    pub fn product_info_string(&self, field: ProductField) -> Result<StrValue<'_>, Error> {
        self.product_area()?.fields.get(field as usize)?.value()
    }

    pub fn set_product_info_string(
        &mut self,
        field: ProductField,
        ty: StrType,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let area = self.product_area_mut()?;
        area.fields.set(&mut area.common, field as usize, ty, data, false)
    }

    pub fn product_info_custom(&self, num: usize) -> Result<StrValue<'_>, Error> {
        self.product_area()?.fields.get_custom(num)?.value()
    }

    pub fn set_product_info_custom(
        &mut self,
        num: usize,
        ty: StrType,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let area = self.product_area_mut()?;
        area.fields.set(&mut area.common, num, ty, data, true)
    }

    // Multi-record area.

    /// Number of records in the multi-record area; 0 when the area is
    /// absent.
    pub fn num_multi_records(&self) -> usize {
        self.multi.as_ref().map_or(0, |m| m.records.len())
    }

    pub fn multi_record_type(&self, num: usize) -> Result<u8, Error> {
        Ok(self.multi_record(num)?.record_type)
    }

    pub fn multi_record_format_version(&self, num: usize) -> Result<u8, Error> {
        Ok(self.multi_record(num)?.format_version)
    }

    pub fn multi_record_data_len(&self, num: usize) -> Result<usize, Error> {
        Ok(self.multi_record(num)?.data.len())
    }

    pub fn multi_record_data(&self, num: usize) -> Result<&[u8], Error> {
        Ok(&self.multi_record(num)?.data)
    }

    /// Appends (`num == num_multi_records`), replaces, or deletes
    /// (`data: None`) one multi-record.
    pub fn set_multi_record(
        &mut self,
        num: usize,
        record_type: u8,
        format_version: u8,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let Fru {
            multi,
            header_changed,
            ..
        } = self;
        let area = multi.as_mut().ok_or(Error::NotPresent)?;
        area.set(header_changed, num, record_type, format_version, data)
    }

    /// Re-encodes the image in place and returns the byte ranges whose
    /// on-media content must change, in increasing order.
    pub fn write(&mut self) -> Result<Vec<UpdateRange>, Error> {
        let mut updates = Updates::new();
        let Fru {
            data,
            internal,
            chassis,
            board,
            product,
            multi,
            header_changed,
        } = self;

        data[0] = 1;
        data[1] = internal.as_ref().map_or(0, |a| (a.common.offset / 8) as u8);
        data[2] = chassis.as_ref().map_or(0, |a| (a.common.offset / 8) as u8);
        data[3] = board.as_ref().map_or(0, |a| (a.common.offset / 8) as u8);
        data[4] = product.as_ref().map_or(0, |a| (a.common.offset / 8) as u8);
        // An empty multi-record area reads as absent.
        data[5] = multi
            .as_ref()
            .filter(|a| a.common.used_length > 0)
            .map_or(0, |a| (a.common.offset / 8) as u8);
        data[6] = 0;
        data[7] = zero_checksum(&data[..7]);
        if *header_changed {
            updates.push(0, HEADER_LEN);
        }

        if let Some(a) = internal {
            let rec = &a.common;
            let region = data
                .get_mut(rec.offset..rec.offset + rec.length)
                .ok_or(Error::InternalError)?;
            a.encode(region, &mut updates)?;
            if rec.rewrite {
                updates.push(rec.offset, rec.length);
            }
        }
        if let Some(a) = chassis {
            let rec = &a.common;
            let region = data
                .get_mut(rec.offset..rec.offset + rec.length)
                .ok_or(Error::InternalError)?;
            a.encode(region, &mut updates)?;
            if rec.rewrite {
                updates.push(rec.offset, rec.length);
            }
        }
        if let Some(a) = board {
            let rec = &a.common;
            let region = data
                .get_mut(rec.offset..rec.offset + rec.length)
                .ok_or(Error::InternalError)?;
            a.encode(region, &mut updates)?;
            if rec.rewrite {
                updates.push(rec.offset, rec.length);
            }
        }
        if let Some(a) = product {
            let rec = &a.common;
            let region = data
                .get_mut(rec.offset..rec.offset + rec.length)
                .ok_or(Error::InternalError)?;
            a.encode(region, &mut updates)?;
            if rec.rewrite {
                updates.push(rec.offset, rec.length);
            }
        }
        if let Some(a) = multi {
            let rec = &a.common;
            let region = data
                .get_mut(rec.offset..rec.offset + rec.length)
                .ok_or(Error::InternalError)?;
            a.encode(region, &mut updates)?;
            if rec.rewrite {
                // Only the populated part of the area needs to reach the
                // media.
                updates.push(rec.offset, rec.used_length);
            }
        }

        Ok(updates.into_ranges())
    }

    /// Acknowledges that the ranges returned by the last [`Fru::write`]
    /// reached the media; every dirty marker is cleared.
    pub fn write_complete(&mut self) {
        self.header_changed = false;
        if let Some(a) = &mut self.internal {
            a.common.write_complete();
        }
        if let Some(a) = &mut self.chassis {
            a.common.write_complete();
            a.fields.clear_changed();
        }
        if let Some(a) = &mut self.board {
            a.common.write_complete();
            a.fields.clear_changed();
        }
        if let Some(a) = &mut self.product {
            a.common.write_complete();
            a.fields.clear_changed();
        }
        if let Some(a) = &mut self.multi {
            a.write_complete();
        }
    }
}

// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Data-driven field reflection.
//!
//! Every scalar, timestamp, string, and binary field reachable through the
//! typed accessors is also described by one entry in a static descriptor
//! table, and one generic engine interprets the descriptors. The table gives
//! external callers a uniform get/set surface keyed by index or name, and
//! feeds the tree navigator.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::area::AreaId;
use crate::error::Error;
use crate::fru::Fru;
use crate::tlv::StrType;

/// Value classes a reflected field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A one-byte integer.
    Int,
    /// A timestamp in Unix epoch seconds.
    Time,
    /// A type/length string.
    Ascii,
    /// An opaque byte payload.
    Binary,
}

/// Which piece of its area a descriptor addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The area's format version byte (decode-only).
    Version,
    /// The chassis type byte.
    ChassisType,
    /// The area's language code byte.
    LangCode,
    /// The board manufacturing timestamp.
    MfgTime,
    /// The internal use payload.
    InternalUseData,
    /// The n-th fixed string of the area.
    String(usize),
    /// The custom string list, indexed by ordinal.
    Custom,
}

/// Describes one reflected field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    /// True for the custom-string lists, which take an ordinal.
    pub has_num: bool,
    pub(crate) area: AreaId,
    pub(crate) slot: Slot,
}

const fn def(name: &'static str, kind: FieldKind, area: AreaId, slot: Slot) -> FieldDef {
    FieldDef {
        name,
        kind,
        has_num: matches!(slot, Slot::Custom),
        area,
        slot,
    }
}

/// Every reflected field, in traversal order.
pub(crate) static FIELDS: [FieldDef; 26] = [
    def(
        "internal_use_version",
        FieldKind::Int,
        AreaId::InternalUse,
        Slot::Version,
    ),
    def(
        "internal_use",
        FieldKind::Binary,
        AreaId::InternalUse,
        Slot::InternalUseData,
    ),
    def(
        "chassis_info_version",
        FieldKind::Int,
        AreaId::ChassisInfo,
        Slot::Version,
    ),
    def(
        "chassis_info_type",
        FieldKind::Int,
        AreaId::ChassisInfo,
        Slot::ChassisType,
    ),
    def(
        "chassis_info_part_number",
        FieldKind::Ascii,
        AreaId::ChassisInfo,
        Slot::String(0),
    ),
    def(
        "chassis_info_serial_number",
        FieldKind::Ascii,
        AreaId::ChassisInfo,
        Slot::String(1),
    ),
    def(
        "chassis_info_custom",
        FieldKind::Ascii,
        AreaId::ChassisInfo,
        Slot::Custom,
    ),
    def(
        "board_info_version",
        FieldKind::Int,
        AreaId::BoardInfo,
        Slot::Version,
    ),
    def(
        "board_info_lang_code",
        FieldKind::Int,
        AreaId::BoardInfo,
        Slot::LangCode,
    ),
    def(
        "board_info_mfg_time",
        FieldKind::Time,
        AreaId::BoardInfo,
        Slot::MfgTime,
    ),
    def(
        "board_info_board_manufacturer",
        FieldKind::Ascii,
        AreaId::BoardInfo,
        Slot::String(0),
    ),
    def(
        "board_info_board_product_name",
        FieldKind::Ascii,
        AreaId::BoardInfo,
        Slot::String(1),
    ),
    def(
        "board_info_board_serial_number",
        FieldKind::Ascii,
        AreaId::BoardInfo,
        Slot::String(2),
    ),
    def(
        "board_info_board_part_number",
        FieldKind::Ascii,
        AreaId::BoardInfo,
        Slot::String(3),
    ),
    def(
        "board_info_fru_file_id",
        FieldKind::Ascii,
        AreaId::BoardInfo,
        Slot::String(4),
    ),
    def(
        "board_info_custom",
        FieldKind::Ascii,
        AreaId::BoardInfo,
        Slot::Custom,
    ),
    def(
        "product_info_version",
        FieldKind::Int,
        AreaId::ProductInfo,
        Slot::Version,
    ),
    def(
        "product_info_lang_code",
        FieldKind::Int,
        AreaId::ProductInfo,
        Slot::LangCode,
    ),
    def(
        "product_info_manufacturer_name",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::String(0),
    ),
    def(
        "product_info_product_name",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::String(1),
    ),
    def(
        "product_info_product_part_model_number",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::String(2),
    ),
    def(
        "product_info_product_version",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::String(3),
    ),
    def(
        "product_info_product_serial_number",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::String(4),
    ),
    def(
        "product_info_asset_tag",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::String(5),
    ),
    def(
        "product_info_fru_file_id",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::String(6),
    ),
    def(
        "product_info_custom",
        FieldKind::Ascii,
        AreaId::ProductInfo,
        Slot::Custom,
    ),
];

/// Looks a field up by its reflected name.
pub fn str_to_index(name: &str) -> Option<usize> {
    FIELDS.iter().position(|d| d.name == name)
}

/// The reflected name of a field index.
pub fn index_to_str(index: usize) -> Option<&'static str> {
    FIELDS.get(index).map(|d| d.name)
}

/// The descriptor of a field index.
pub fn field_def(index: usize) -> Option<&'static FieldDef> {
    FIELDS.get(index)
}

/// An owned value produced by the reflection engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldData {
    Int(u8),
    /// Unix epoch seconds.
    Time(i64),
    Str { ty: StrType, data: Vec<u8> },
    Binary(Vec<u8>),
}

impl Fru {
    /// Fetches the value of the reflected field `index`; `num` is the
    /// ordinal within a custom-string list and is ignored otherwise.
    pub fn field_data(&self, index: usize, num: usize) -> Result<FieldData, Error> {
        let def = FIELDS.get(index).ok_or(Error::InvalidArgument)?;
        let string = |v: crate::field::StrValue<'_>| FieldData::Str {
            ty: v.ty,
            data: v.data.to_vec(),
        };
        match (def.area, def.slot) {
            (AreaId::InternalUse, Slot::Version) => {
                Ok(FieldData::Int(self.internal_use_version()?))
            }
            (AreaId::InternalUse, Slot::InternalUseData) => {
                Ok(FieldData::Binary(self.internal_use()?.to_vec()))
            }
            (AreaId::ChassisInfo, Slot::Version) => {
                Ok(FieldData::Int(self.chassis_info_version()?))
            }
            (AreaId::ChassisInfo, Slot::ChassisType) => {
                Ok(FieldData::Int(self.chassis_info_type()?))
            }
            (AreaId::ChassisInfo, Slot::String(k)) => {
                Ok(string(self.chassis_area()?.fields.get(k)?.value()?))
            }
            (AreaId::ChassisInfo, Slot::Custom) => Ok(string(self.chassis_info_custom(num)?)),
            (AreaId::BoardInfo, Slot::Version) => Ok(FieldData::Int(self.board_info_version()?)),
            (AreaId::BoardInfo, Slot::LangCode) => {
                Ok(FieldData::Int(self.board_info_lang_code()?))
            }
            (AreaId::BoardInfo, Slot::MfgTime) => {
                Ok(FieldData::Time(self.board_info_mfg_time()?))
            }
            (AreaId::BoardInfo, Slot::String(k)) => {
                Ok(string(self.board_area()?.fields.get(k)?.value()?))
            }
            (AreaId::BoardInfo, Slot::Custom) => Ok(string(self.board_info_custom(num)?)),
            (AreaId::ProductInfo, Slot::Version) => {
                Ok(FieldData::Int(self.product_info_version()?))
            }
            (AreaId::ProductInfo, Slot::LangCode) => {
                Ok(FieldData::Int(self.product_info_lang_code()?))
            }
            (AreaId::ProductInfo, Slot::String(k)) => {
                Ok(string(self.product_area()?.fields.get(k)?.value()?))
            }
            (AreaId::ProductInfo, Slot::Custom) => Ok(string(self.product_info_custom(num)?)),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Sets a reflected integer field.
    pub fn set_field_int(&mut self, index: usize, value: u8) -> Result<(), Error> {
        let def = FIELDS.get(index).ok_or(Error::InvalidArgument)?;
        if def.kind != FieldKind::Int {
            return Err(Error::InvalidArgument);
        }
        match (def.area, def.slot) {
            (_, Slot::Version) => Err(Error::PermissionDenied),
            (AreaId::ChassisInfo, Slot::ChassisType) => self.set_chassis_info_type(value),
            (AreaId::BoardInfo, Slot::LangCode) => self.set_board_info_lang_code(value),
            (AreaId::ProductInfo, Slot::LangCode) => self.set_product_info_lang_code(value),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Sets a reflected timestamp field from Unix epoch seconds.
    pub fn set_field_time(&mut self, index: usize, value: i64) -> Result<(), Error> {
        let def = FIELDS.get(index).ok_or(Error::InvalidArgument)?;
        match (def.kind, def.slot) {
            (FieldKind::Time, Slot::MfgTime) => self.set_board_info_mfg_time(value),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Sets a reflected string or binary field; `num` is the ordinal within
    /// a custom list, and `data: None` clears or deletes.
    pub fn set_field_str(
        &mut self,
        index: usize,
        num: usize,
        ty: StrType,
        data: Option<&[u8]>,
    ) -> Result<(), Error> {
        let def = FIELDS.get(index).ok_or(Error::InvalidArgument)?;
        if def.kind != FieldKind::Ascii && def.kind != FieldKind::Binary {
            return Err(Error::InvalidArgument);
        }
        match (def.area, def.slot) {
            (AreaId::InternalUse, Slot::InternalUseData) => {
                self.set_internal_use(data.ok_or(Error::InvalidArgument)?)
            }
            (AreaId::ChassisInfo, Slot::String(k)) => {
                let area = self.chassis_area_mut()?;
                area.fields.set(&mut area.common, k, ty, data, false)
            }
            (AreaId::ChassisInfo, Slot::Custom) => self.set_chassis_info_custom(num, ty, data),
            (AreaId::BoardInfo, Slot::String(k)) => {
                let area = self.board_area_mut()?;
                area.fields.set(&mut area.common, k, ty, data, false)
            }
            (AreaId::BoardInfo, Slot::Custom) => self.set_board_info_custom(num, ty, data),
            (AreaId::ProductInfo, Slot::String(k)) => {
                let area = self.product_area_mut()?;
                area.fields.set(&mut area.common, k, ty, data, false)
            }
            (AreaId::ProductInfo, Slot::Custom) => self.set_product_info_custom(num, ty, data),
            _ => Err(Error::InvalidArgument),
        }
    }
}

// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Inline FRU image builders shared by the integration tests.

#![allow(dead_code)]

use ipmi_fru::prelude::*;
use ipmi_fru::tlv;

/// Two's complement of the byte sum: appending it zeroes the checksum.
pub fn checksum_fix(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |sum, b| sum.wrapping_add(*b))
        .wrapping_neg()
}

pub fn header_slot(area: AreaId) -> usize {
    match area {
        AreaId::InternalUse => 1,
        AreaId::ChassisInfo => 2,
        AreaId::BoardInfo => 3,
        AreaId::ProductInfo => 4,
        AreaId::MultiRecord => 5,
    }
}

pub fn fix_header_checksum(image: &mut [u8]) {
    image[7] = checksum_fix(&image[..7]);
}

/// Builds a FRU image of `total` bytes with the given areas placed at their
/// offsets and a valid common header.
pub fn build_image(total: usize, areas: &[(AreaId, usize, &[u8])]) -> Vec<u8> {
    let mut image = vec![0u8; total];
    image[0] = 1;
    for (area, offset, bytes) in areas {
        image[header_slot(*area)] = (offset / 8) as u8;
        image[*offset..*offset + bytes.len()].copy_from_slice(bytes);
    }
    fix_header_checksum(&mut image);
    image
}

/// Pads `content` to an area image of `size` bytes and writes the trailing
/// zero-sum checksum.
pub fn area_bytes(size: usize, content: &[u8]) -> Vec<u8> {
    assert!(content.len() < size, "area content must leave room for the checksum");
    let mut area = vec![0u8; size];
    area[..content.len()].copy_from_slice(content);
    area[size - 1] = checksum_fix(&area[..size - 1]);
    area
}

fn info_area(len_units: u8, header_rest: &[u8], strings: &[(StrType, &[u8])]) -> Vec<u8> {
    let mut content = vec![0x01, len_units];
    content.extend_from_slice(header_rest);
    for (ty, data) in strings {
        content.extend_from_slice(&tlv::encode(*ty, data).unwrap());
    }
    content.push(0xc1);
    area_bytes(usize::from(len_units) * 8, &content)
}

/// A chassis area with the given type byte, two fixed strings, and custom
/// strings.
pub fn chassis_area_with(
    len_units: u8,
    chassis_type: u8,
    fixed: &[(StrType, &[u8])],
    customs: &[(StrType, &[u8])],
) -> Vec<u8> {
    assert_eq!(fixed.len(), 2);
    let mut strings = fixed.to_vec();
    strings.extend_from_slice(customs);
    info_area(len_units, &[chassis_type], &strings)
}

pub fn empty_chassis_area(len_units: u8) -> Vec<u8> {
    chassis_area_with(
        len_units,
        0,
        &[(StrType::Ascii8, b""), (StrType::Ascii8, b"")],
        &[],
    )
}

/// A board area with empty fixed strings, the given language code and
/// minute count, and custom strings.
pub fn board_area_with(
    len_units: u8,
    lang_code: u8,
    minutes: u32,
    customs: &[(StrType, &[u8])],
) -> Vec<u8> {
    let header = [
        lang_code,
        minutes as u8,
        (minutes >> 8) as u8,
        (minutes >> 16) as u8,
    ];
    let mut strings = vec![(StrType::Ascii8, &b""[..]); 5];
    strings.extend_from_slice(customs);
    info_area(len_units, &header, &strings)
}

pub fn empty_board_area(len_units: u8) -> Vec<u8> {
    board_area_with(len_units, 25, 0, &[])
}

pub fn empty_product_area(len_units: u8) -> Vec<u8> {
    let strings = vec![(StrType::Ascii8, &b""[..]); 7];
    info_area(len_units, &[25], &strings)
}

/// One multi-record block: 5-byte header plus payload, checksums filled in.
pub fn mr_record(record_type: u8, eol: bool, payload: &[u8]) -> Vec<u8> {
    let version = if eol { 0x82 } else { 0x02 };
    let mut record = vec![
        record_type,
        version,
        payload.len() as u8,
        checksum_fix(payload),
        0,
    ];
    record[4] = checksum_fix(&record[..4]);
    record.extend_from_slice(payload);
    record
}

/// Applies `ranges` from `new` onto a copy of `prev`; with sound minimal
/// writes the result equals `new`.
pub fn apply_ranges(prev: &[u8], new: &[u8], ranges: &[UpdateRange]) -> Vec<u8> {
    let mut out = prev.to_vec();
    for r in ranges {
        out[r.offset..r.end()].copy_from_slice(&new[r.offset..r.end()]);
    }
    out
}

/// A 13-byte DC output payload: output number 1, nominal 12.00 V, deviations
/// ±0.50 V, ripple 0.100 V, currents 0.500 A to 9.000 A.
pub fn dc_output_payload() -> Vec<u8> {
    let mut payload = vec![0x01];
    for val in [1200i16, -50, 50, 100, 500, 9000] {
        payload.extend_from_slice(&val.to_le_bytes());
    }
    payload
}

/// A 13-byte DC load payload: output number 2, nominal 5.00 V, 4.75 V to
/// 5.25 V, ripple 0.050 V, currents 0.100 A to 2.000 A.
pub fn dc_load_payload() -> Vec<u8> {
    let mut payload = vec![0x02];
    for val in [500i16, 475, 525, 50, 100, 2000] {
        payload.extend_from_slice(&val.to_le_bytes());
    }
    payload
}

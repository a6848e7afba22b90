// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use ipmi_fru::prelude::*;

mod common;
use common::*;

fn mr_fru() -> (Vec<u8>, Fru) {
    let mut area = mr_record(0x01, false, &dc_output_payload());
    area.extend_from_slice(&mr_record(0x02, true, &dc_load_payload()));
    let image = build_image(64, &[(AreaId::MultiRecord, 8, &area)]);
    let fru = Fru::from_slice(&image).unwrap();
    (image, fru)
}

#[test]
fn decodes_record_chain() {
    let (_, fru) = mr_fru();
    assert_eq!(fru.num_multi_records(), 2);
    assert_eq!(fru.multi_record_type(0).unwrap(), 0x01);
    assert_eq!(fru.multi_record_type(1).unwrap(), 0x02);
    assert_eq!(fru.multi_record_format_version(0).unwrap(), 2);
    assert_eq!(fru.multi_record_data_len(0).unwrap(), 13);
    assert_eq!(fru.multi_record_data(0).unwrap(), &dc_output_payload()[..]);
    assert_eq!(fru.multi_record_type(2), Err(Error::NotFound));
}

#[test]
fn round_trip_is_identity() {
    let (image, mut fru) = mr_fru();
    let updates = fru.write().unwrap();
    assert!(updates.is_empty());
    assert_eq!(fru.data(), &image[..]);
}

#[test]
fn rejects_bad_header_checksum() {
    let mut area = mr_record(0x01, true, &dc_output_payload());
    area[4] = area[4].wrapping_add(1);
    let image = build_image(64, &[(AreaId::MultiRecord, 8, &area)]);
    assert!(matches!(Fru::from_slice(&image), Err(Error::BadFormat(_))));
}

#[test]
fn rejects_bad_payload_checksum() {
    let mut area = mr_record(0x01, true, &dc_output_payload());
    // Corrupt a payload byte and fix the header checksum back up.
    area[6] = area[6].wrapping_add(1);
    let image = build_image(64, &[(AreaId::MultiRecord, 8, &area)]);
    assert!(matches!(Fru::from_slice(&image), Err(Error::BadFormat(_))));
}

#[test]
fn rejects_truncated_chain() {
    // A record without the end-of-list bit, followed by nothing.
    let area = mr_record(0x01, false, &dc_output_payload());
    let image = build_image(8 + area.len() + 3, &[(AreaId::MultiRecord, 8, &area)]);
    assert!(matches!(Fru::from_slice(&image), Err(Error::BadFormat(_))));
}

#[test]
fn append_replace_delete() {
    let (image, mut fru) = mr_fru();

    // Append a small OEM record.
    fru.set_multi_record(2, 0xc0, 2, Some(&[0xaa, 0xbb, 0xcc])).unwrap();
    assert_eq!(fru.num_multi_records(), 3);
    let used = fru.area_used_length(AreaId::MultiRecord).unwrap();
    assert_eq!(used, 18 + 18 + 8);

    // Replace the middle record with a shorter payload.
    fru.set_multi_record(1, 0x02, 2, Some(&dc_load_payload()[..8])).unwrap();
    assert_eq!(
        fru.area_used_length(AreaId::MultiRecord).unwrap(),
        used - 5
    );
    assert_eq!(fru.multi_record_data_len(1).unwrap(), 8);

    // Delete the first record; the others reflow.
    fru.set_multi_record(0, 0, 0, None).unwrap();
    assert_eq!(fru.num_multi_records(), 2);
    assert_eq!(fru.multi_record_type(0).unwrap(), 0x02);
    assert_eq!(fru.multi_record_type(1).unwrap(), 0xc0);

    let updates = fru.write().unwrap();
    assert_eq!(apply_ranges(&image, fru.data(), &updates), fru.data());
}

#[test]
fn append_past_end_is_invalid() {
    let (_, mut fru) = mr_fru();
    assert_eq!(
        fru.set_multi_record(5, 0xc0, 2, Some(&[0x01, 0x02, 0x03])),
        Err(Error::InvalidArgument)
    );
    assert_eq!(fru.set_multi_record(7, 0, 0, None), Err(Error::InvalidArgument));
}

#[test]
fn delete_last_record_moves_eol_bit() {
    let (image, mut fru) = mr_fru();
    fru.set_multi_record(1, 0, 0, None).unwrap();
    assert_eq!(fru.num_multi_records(), 1);

    let updates = fru.write().unwrap();
    // The surviving record's header byte now carries the end-of-list bit.
    assert_eq!(fru.data()[8 + 1], 0x82);
    assert_eq!(apply_ranges(&image, fru.data(), &updates), fru.data());
}

#[test]
fn append_clears_previous_eol_bit() {
    let (image, mut fru) = mr_fru();
    fru.set_multi_record(2, 0xc0, 2, Some(&[0x10, 0x20, 0x30])).unwrap();

    let updates = fru.write().unwrap();
    assert_eq!(fru.data()[8 + 18 + 1], 0x02);
    assert_eq!(apply_ranges(&image, fru.data(), &updates), fru.data());
}

#[test]
fn delete_to_empty_clears_header_offset() {
    let (image, mut fru) = mr_fru();
    fru.set_multi_record(1, 0, 0, None).unwrap();
    fru.set_multi_record(0, 0, 0, None).unwrap();
    assert_eq!(fru.num_multi_records(), 0);
    assert_eq!(fru.area_used_length(AreaId::MultiRecord).unwrap(), 0);

    let updates = fru.write().unwrap();
    // The common header's multi-record offset byte reads absent now.
    assert_eq!(fru.data()[5], 0);
    assert_eq!(apply_ranges(&image, fru.data(), &updates), fru.data());
}

#[test]
fn out_of_space() {
    // 16 spare bytes after the chain.
    let mut area = mr_record(0x01, true, &dc_output_payload());
    let spare = 16;
    let total = 8 + area.len() + spare;
    area.extend_from_slice(&vec![0u8; spare]);
    let image = build_image(total, &[(AreaId::MultiRecord, 8, &area)]);
    let mut fru = Fru::from_slice(&image).unwrap();

    // A 12-byte payload needs 17 bytes with its header.
    assert_eq!(
        fru.set_multi_record(1, 0xc0, 2, Some(&[0u8; 12])),
        Err(Error::OutOfSpace)
    );
    // An 11-byte one fits exactly.
    fru.set_multi_record(1, 0xc0, 2, Some(&[0u8; 11])).unwrap();
}

#[test]
fn checksum_closure_after_write() {
    let (_, mut fru) = mr_fru();
    fru.set_multi_record(2, 0xc0, 2, Some(&[0x55, 0x66, 0x77])).unwrap();
    fru.write().unwrap();

    // Every record header and payload sums to zero with its checksum.
    let data = fru.data();
    let mut cursor = 8;
    for _ in 0..3 {
        let header = &data[cursor..cursor + 5];
        assert_eq!(header.iter().fold(0u8, |s, b| s.wrapping_add(*b)), 0);
        let len = header[2] as usize;
        let payload = &data[cursor + 5..cursor + 5 + len];
        let sum = payload.iter().fold(header[3], |s, b| s.wrapping_add(*b));
        assert_eq!(sum, 0);
        cursor += 5 + len;
    }
}

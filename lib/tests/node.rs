// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use ipmi_fru::prelude::*;

mod common;
use common::*;

fn tree_fru() -> Fru {
    let chassis = chassis_area_with(
        3,
        0x0a,
        &[(StrType::Ascii8, b"PART"), (StrType::Ascii8, b"SERIAL")],
        &[(StrType::Ascii8, b"C0"), (StrType::Ascii8, b"C1")],
    );
    let mut mr = mr_record(0x01, false, &dc_output_payload());
    mr.extend_from_slice(&mr_record(0x02, true, &dc_load_payload()));
    let image = build_image(
        96,
        &[(AreaId::ChassisInfo, 8, &chassis), (AreaId::MultiRecord, 32, &mr)],
    );
    Fru::from_slice(&image).unwrap()
}

#[test]
fn reflection_name_index_mapping() {
    assert_eq!(str_to_index("chassis_info_type"), Some(3));
    assert_eq!(index_to_str(3), Some("chassis_info_type"));
    assert_eq!(str_to_index("board_info_mfg_time"), Some(9));
    assert_eq!(str_to_index("no_such_field"), None);
    assert_eq!(index_to_str(usize::MAX), None);

    // Every name maps back to its own index.
    let mut index = 0;
    while let Some(name) = index_to_str(index) {
        assert_eq!(str_to_index(name), Some(index));
        index += 1;
    }
    assert_eq!(index, 26);
}

#[test]
fn generic_get_and_set() {
    let mut fru = tree_fru();

    let index = str_to_index("chassis_info_type").unwrap();
    assert_eq!(fru.field_data(index, 0), Ok(FieldData::Int(0x0a)));
    fru.set_field_int(index, 0x1f).unwrap();
    assert_eq!(fru.chassis_info_type().unwrap(), 0x1f);

    let part = str_to_index("chassis_info_part_number").unwrap();
    match fru.field_data(part, 0).unwrap() {
        FieldData::Str { ty, data } => {
            assert_eq!(ty, StrType::Ascii8);
            assert_eq!(data, b"PART");
        }
        other => panic!("expected a string, got {other:?}"),
    }
    fru.set_field_str(part, 0, StrType::Ascii8, Some(b"NEW")).unwrap();
    assert_eq!(
        fru.chassis_info_string(ChassisField::PartNumber).unwrap().data,
        b"NEW"
    );

    // Version bytes are decode-only.
    let version = str_to_index("chassis_info_version").unwrap();
    assert_eq!(fru.set_field_int(version, 2), Err(Error::PermissionDenied));

    // Kind mismatches are rejected.
    assert_eq!(fru.set_field_int(part, 1), Err(Error::InvalidArgument));

    // Fields of absent areas report that.
    let board = str_to_index("board_info_lang_code").unwrap();
    assert_eq!(fru.field_data(board, 0), Err(Error::NotPresent));
}

#[test]
fn generic_custom_ordinals() {
    let fru = tree_fru();
    let custom = str_to_index("chassis_info_custom").unwrap();

    assert_eq!(
        fru.field_data(custom, 0),
        Ok(FieldData::Str {
            ty: StrType::Ascii8,
            data: b"C0".to_vec()
        })
    );
    assert!(fru.field_data(custom, 1).is_ok());
    assert_eq!(fru.field_data(custom, 2), Err(Error::NotFound));
}

#[test]
fn root_children_cover_present_fields() {
    let fru = tree_fru();
    let root = fru.root_node();

    let names: Vec<&str> = root.children().filter_map(|e| e.name).collect();
    // Chassis fields and the multirecords child are present; board and
    // product fields are skipped.
    assert!(names.contains(&"chassis_info_type"));
    assert!(names.contains(&"chassis_info_custom"));
    assert!(names.contains(&"multirecords"));
    assert!(!names.contains(&"board_info_mfg_time"));
    assert!(!names.contains(&"product_info_product_name"));
}

#[test]
fn custom_array_node_iterates_lazily() {
    let fru = tree_fru();
    let root = fru.root_node();
    let custom = str_to_index("chassis_info_custom").unwrap();

    let entry = root.get_field(custom).unwrap();
    assert_eq!(entry.name, Some("chassis_info_custom"));
    let Value::Node(array) = entry.value else {
        panic!("expected an array node");
    };

    match array.get_field(0).unwrap().value {
        Value::Str { data, .. } => assert_eq!(data, b"C0"),
        _ => panic!("expected a string child"),
    }
    assert!(array.get_field(1).is_ok());
    assert!(matches!(array.get_field(2), Err(Error::NotFound)));
}

#[test]
fn multi_record_nodes_expose_raw_and_decoded_children() {
    let fru = tree_fru();
    let root = fru.root_node();
    let mr_array = root
        .children()
        .find(|e| e.name == Some("multirecords"))
        .unwrap();
    let Value::Node(array) = mr_array.value else {
        panic!("expected the multirecords node");
    };

    let Value::Node(first) = array.get_field(0).unwrap().value else {
        panic!("expected a record wrapper node");
    };

    // Child 0: the raw payload.
    let raw = first.get_field(0).unwrap();
    assert_eq!(raw.name, Some("raw-data"));
    match raw.value {
        Value::Binary(data) => assert_eq!(data, dc_output_payload()),
        _ => panic!("expected binary raw data"),
    }

    // Child 1: the decoded DC output sub-tree.
    let decoded = first.get_field(1).unwrap();
    assert_eq!(decoded.name, Some("DC Output"));
    let Value::Node(dc) = decoded.value else {
        panic!("expected a decoded sub-node");
    };

    let nominal = dc.get_field(2).unwrap();
    assert_eq!(nominal.name, Some("nominal voltage"));
    match nominal.value {
        Value::Float(volts) => assert!((volts - 12.0).abs() < 1e-9),
        _ => panic!("expected a float"),
    }

    // The second record decodes as DC load.
    let Value::Node(second) = array.get_field(1).unwrap().value else {
        panic!("expected a record wrapper node");
    };
    let decoded = second.get_field(1).unwrap();
    assert_eq!(decoded.name, Some("DC Load"));
    let Value::Node(dc) = decoded.value else {
        panic!("expected a decoded sub-node");
    };
    let nominal = dc.get_field(1).unwrap();
    match nominal.value {
        Value::Float(volts) => assert!((volts - 5.0).abs() < 1e-9),
        _ => panic!("expected a float"),
    }
}

#[test]
fn undecodable_record_has_only_raw_child() {
    let area = mr_record(0xd5, true, &[0x01, 0x02, 0x03, 0x04]);
    let image = build_image(64, &[(AreaId::MultiRecord, 8, &area)]);
    let fru = Fru::from_slice(&image).unwrap();

    let root = fru.root_node();
    let mr_array = root
        .children()
        .find(|e| e.name == Some("multirecords"))
        .unwrap();
    let Value::Node(array) = mr_array.value else {
        panic!("expected the multirecords node");
    };
    let Value::Node(record) = array.get_field(0).unwrap().value else {
        panic!("expected a record wrapper node");
    };

    assert!(record.get_field(0).is_ok());
    assert!(matches!(record.get_field(1), Err(Error::NotFound)));
}

#[test]
fn custom_oem_decoder_round_trip() {
    use std::sync::Arc;

    struct Fields(Vec<u8>);
    impl OemFields for Fields {
        fn field(&self, index: usize) -> Result<OemField, Error> {
            match index {
                0 => Ok(OemField {
                    name: "tail byte",
                    value: OemValue::Int(u32::from(*self.0.last().unwrap_or(&0))),
                }),
                _ => Err(Error::NotFound),
            }
        }
    }

    struct Decoder;
    impl OemRecordDecoder for Decoder {
        fn decode_record(
            &self,
            manufacturer_id: u32,
            _record_type: u8,
            payload: &[u8],
        ) -> Result<(&'static str, Box<dyn OemFields>), Error> {
            assert_eq!(manufacturer_id, 0x030201);
            Ok(("Test Record", Box::new(Fields(payload.to_vec()))))
        }
    }

    ipmi_fru::oem::register_oem_decoder(0x030201, 0xd7, Arc::new(Decoder));

    let area = mr_record(0xd7, true, &[0x01, 0x02, 0x03, 0x42]);
    let image = build_image(64, &[(AreaId::MultiRecord, 8, &area)]);
    let fru = Fru::from_slice(&image).unwrap();

    let root = fru.root_node();
    let Value::Node(array) = root
        .children()
        .find(|e| e.name == Some("multirecords"))
        .unwrap()
        .value
    else {
        panic!("expected the multirecords node");
    };
    let Value::Node(record) = array.get_field(0).unwrap().value else {
        panic!("expected a record wrapper node");
    };
    let decoded = record.get_field(1).unwrap();
    assert_eq!(decoded.name, Some("Test Record"));
    let Value::Node(node) = decoded.value else {
        panic!("expected the custom sub-node");
    };
    match node.get_field(0).unwrap().value {
        Value::Int(v) => assert_eq!(v, 0x42),
        _ => panic!("expected an int"),
    }

    ipmi_fru::oem::deregister_oem_decoder(0x030201, 0xd7).unwrap();
    assert_eq!(
        ipmi_fru::oem::deregister_oem_decoder(0x030201, 0xd7),
        Err(Error::NotFound)
    );
}

#[test]
fn explicit_registry_lookup_rules() {
    let registry = OemRegistry::with_builtins();

    // Standard types match regardless of the manufacturer bytes.
    let (name, _) = registry.decode_record(0x01, &dc_output_payload()).unwrap();
    assert_eq!(name, "DC Output");

    // Unknown types and short payloads are rejected.
    assert!(matches!(
        registry.decode_record(0xd9, &[0x01, 0x02, 0x03]),
        Err(Error::NotFound)
    ));
    assert!(matches!(
        registry.decode_record(0x01, &[0x01]),
        Err(Error::InvalidArgument)
    ));
}

#[test]
fn power_supply_fields_skip_unspecified_values() {
    let mut payload = vec![0u8; 24];
    payload[0] = 0xf4; // 500 W capacity (low 12 bits of 0x01f4)
    payload[1] = 0x01;
    payload[2] = 0xff; // peak VA unspecified
    payload[3] = 0xff;
    payload[4] = 0xff; // inrush current unspecified
    let registry = OemRegistry::with_builtins();
    let (name, fields) = registry.decode_record(0x00, &payload).unwrap();
    assert_eq!(name, "Power Supply Information");

    let capacity = fields.field(0).unwrap();
    assert_eq!(capacity.name, "overall capacity");
    assert_eq!(capacity.value, OemValue::Int(500));

    assert_eq!(fields.field(1).unwrap_err(), Error::NotPresent);
    assert_eq!(fields.field(2).unwrap_err(), Error::NotPresent);
    assert_eq!(fields.field(22).unwrap_err(), Error::NotFound);
}

#[cfg(feature = "serialize")]
#[test]
fn export_json() {
    let fru = tree_fru();
    let json = serde_json::to_value(fru.root_node()).unwrap();

    assert_eq!(json["chassis_info_type"], serde_json::json!(0x0a));
    assert_eq!(json["chassis_info_part_number"], serde_json::json!("PART"));
    assert_eq!(json["chassis_info_custom"]["0"], serde_json::json!("C0"));
    assert_eq!(
        json["multirecords"]["0"]["raw-data"],
        serde_json::json!(format!(
            "0x{}",
            dc_output_payload()
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<String>()
        ))
    );
    assert_eq!(
        json["multirecords"]["0"]["DC Output"]["nominal voltage"],
        serde_json::json!(12.0)
    );
}

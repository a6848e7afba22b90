// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Decoders for the IPMI-defined power records: power supply information
//! (type 0x00), DC output (0x01), and DC load (0x02).

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;

use crate::error::Error;
use crate::oem::{OemField, OemFields, OemRecordDecoder, OemValue};

/// Handles all three standard record types.
pub(crate) struct StandardDecoder;

impl OemRecordDecoder for StandardDecoder {
    fn decode_record(
        &self,
        _manufacturer_id: u32,
        record_type: u8,
        payload: &[u8],
    ) -> Result<(&'static str, Box<dyn OemFields>), Error> {
        match record_type {
            0x00 => Ok((
                "Power Supply Information",
                Box::new(PowerSupplyInfo::decode(payload)?),
            )),
            0x01 => Ok(("DC Output", Box::new(DcOutput::decode(payload)?))),
            0x02 => Ok(("DC Load", Box::new(DcLoad::decode(payload)?))),
            _ => Err(Error::InvalidArgument),
        }
    }
}

fn le16(d: &[u8], at: usize) -> u32 {
    u32::from(d[at]) | u32::from(d[at + 1]) << 8
}

fn le16_signed(d: &[u8], at: usize) -> f64 {
    f64::from((u16::from(d[at]) | u16::from(d[at + 1]) << 8) as i16)
}

fn int(name: &'static str, value: u32) -> Result<OemField, Error> {
    Ok(OemField {
        name,
        value: OemValue::Int(value),
    })
}

fn boolean(name: &'static str, value: bool) -> Result<OemField, Error> {
    Ok(OemField {
        name,
        value: OemValue::Boolean(value),
    })
}

fn float(name: &'static str, value: f64) -> Result<OemField, Error> {
    Ok(OemField {
        name,
        value: OemValue::Float(value),
    })
}

struct PowerSupplyInfo {
    data: [u8; 24],
}

impl PowerSupplyInfo {
    fn decode(payload: &[u8]) -> Result<PowerSupplyInfo, Error> {
        Ok(PowerSupplyInfo {
            data: payload
                .get(..24)
                .and_then(|d| d.try_into().ok())
                .ok_or(Error::InvalidArgument)?,
        })
    }
}

impl OemFields for PowerSupplyInfo {
    fn field(&self, index: usize) -> Result<OemField, Error> {
        let d = &self.data;
        match index {
            0 => int("overall capacity", le16(d, 0) & 0x0fff),
            1 => match le16(d, 2) {
                0xffff => Err(Error::NotPresent),
                val => int("peak VA", val),
            },
            2 => match d[4] {
                0xff => Err(Error::NotPresent),
                val => int("inrush current", u32::from(val)),
            },
            // The inrush interval is meaningless without an inrush current.
            3 => match d[4] {
                0xff => Err(Error::NotPresent),
                _ => float("inrush interval", f64::from(d[5]) / 1000.0),
            },
            4 => float("low input voltage 1", f64::from(le16(d, 6)) / 100.0),
            5 => float("high input voltage 1", f64::from(le16(d, 8)) / 100.0),
            6 => float("low input voltage 2", f64::from(le16(d, 10)) / 100.0),
            7 => float("high input voltage 2", f64::from(le16(d, 12)) / 100.0),
            8 => int("low frequency", u32::from(d[14])),
            9 => int("high frequency", u32::from(d[15])),
            10 => float("A/C dropout tolerance", f64::from(d[16]) / 1000.0),
            11 => boolean("tach pulses per rotation", d[17] & 0x10 != 0),
            12 => boolean("hot swap support", d[17] & 0x08 != 0),
            13 => boolean("autoswitch", d[17] & 0x04 != 0),
            14 => boolean("power factor correction", d[17] & 0x02 != 0),
            15 => boolean("predictive fail support", d[17] & 0x01 != 0),
            16 => int("peak capacity hold up time", u32::from(d[19] >> 4)),
            17 => int("peak capacity", le16(d, 18) & 0x0fff),
            18 => match combined_wattage_voltage(d, d[20] >> 4) {
                Some(volts) => float("combined wattage voltage 1", volts),
                None => Err(Error::NotPresent),
            },
            19 => match combined_wattage_voltage(d, d[20] & 0x0f) {
                Some(volts) => float("combined wattage voltage 2", volts),
                None => Err(Error::NotPresent),
            },
            20 => {
                if d[20] == 0 && d[21] == 0 && d[22] == 0 {
                    Err(Error::NotPresent)
                } else {
                    int("combined wattage", le16(d, 21))
                }
            }
            21 => int(
                "predictive fail tach low threshold",
                u32::from(d[23] & 0x0f),
            ),
            _ => Err(Error::NotFound),
        }
    }
}

/// Decodes one nibble of the combined-wattage voltage selector; an all-zero
/// combined-wattage block means the field is unspecified.
fn combined_wattage_voltage(d: &[u8; 24], nibble: u8) -> Option<f64> {
    if d[20] == 0 && d[21] == 0 && d[22] == 0 {
        return None;
    }
    Some(match nibble {
        0 => 12.0,
        1 => -12.0,
        2 => 5.0,
        3 => 3.3,
        _ => 0.0,
    })
}

struct DcOutput {
    data: [u8; 13],
}

impl DcOutput {
    fn decode(payload: &[u8]) -> Result<DcOutput, Error> {
        Ok(DcOutput {
            data: payload
                .get(..13)
                .and_then(|d| d.try_into().ok())
                .ok_or(Error::InvalidArgument)?,
        })
    }
}

impl OemFields for DcOutput {
    fn field(&self, index: usize) -> Result<OemField, Error> {
        let d = &self.data;
        match index {
            0 => int("output number", u32::from(d[0] & 0x0f)),
            1 => boolean("standby", d[0] & 0x80 != 0),
            2 => float("nominal voltage", le16_signed(d, 1) / 100.0),
            3 => float("max negative voltage deviation", le16_signed(d, 3) / 100.0),
            4 => float("max positive voltage deviation", le16_signed(d, 5) / 100.0),
            5 => float("ripple", le16_signed(d, 7) / 1000.0),
            6 => float("min current", le16_signed(d, 9) / 1000.0),
            7 => float("max current", le16_signed(d, 11) / 1000.0),
            _ => Err(Error::NotFound),
        }
    }
}

struct DcLoad {
    data: [u8; 13],
}

impl DcLoad {
    fn decode(payload: &[u8]) -> Result<DcLoad, Error> {
        Ok(DcLoad {
            data: payload
                .get(..13)
                .and_then(|d| d.try_into().ok())
                .ok_or(Error::InvalidArgument)?,
        })
    }
}

impl OemFields for DcLoad {
    fn field(&self, index: usize) -> Result<OemField, Error> {
        let d = &self.data;
        match index {
            0 => int("output number", u32::from(d[0] & 0x0f)),
            1 => float("nominal voltage", le16_signed(d, 1) / 100.0),
            2 => float("min voltage", le16_signed(d, 3) / 100.0),
            3 => float("max voltage", le16_signed(d, 5) / 100.0),
            4 => float("ripple", le16_signed(d, 7) / 1000.0),
            5 => float("min current", le16_signed(d, 9) / 1000.0),
            6 => float("max current", le16_signed(d, 11) / 1000.0),
            _ => Err(Error::NotFound),
        }
    }
}

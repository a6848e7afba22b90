// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Convenience re-export of common structs

pub use crate::area::info::{BoardField, ChassisField, ProductField};
pub use crate::area::AreaId;
pub use crate::error::Error;
pub use crate::field::StrValue;
pub use crate::fru::Fru;
pub use crate::node::{Entry, FruNode, Value};
pub use crate::oem::{OemField, OemFields, OemRecordDecoder, OemRegistry, OemValue};
pub use crate::reflect::{index_to_str, str_to_index, FieldData, FieldKind};
pub use crate::tlv::StrType;
pub use crate::update::UpdateRange;

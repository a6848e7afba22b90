// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Lazy tree navigation over a decoded FRU.
//!
//! The tree is rooted at the FRU itself; the root's children are the
//! reflected fields plus one synthetic `multirecords` child. Array children
//! are discovered lazily: [`FruNode::get_field`] with growing indices until
//! it returns [`Error::NotFound`]. A child that exists in the schema but not
//! in this image reports [`Error::NotPresent`] and iteration skips it.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use log::debug;

use crate::error::Error;
use crate::fru::Fru;
use crate::oem;
use crate::oem::{OemFields, OemValue};
use crate::reflect;
use crate::reflect::FieldData;
use crate::tlv::StrType;

/// A navigable position in the FRU tree. Nodes borrow their FRU, so the
/// FRU outlives every node it produced.
pub struct FruNode<'a> {
    fru: &'a Fru,
    kind: NodeKind,
}

enum NodeKind {
    Root,
    /// A custom-string list; `field` is the reflection index.
    StrArray { field: usize },
    /// The `multirecords` child of the root.
    MrArray,
    /// One multi-record: child 0 is the raw payload, child 1 the decoded
    /// sub-tree when a decoder matches.
    MrRecord { index: usize },
    /// A sub-tree produced by a multi-record decoder.
    Oem { fields: Box<dyn OemFields> },
}

/// One child of a node.
pub struct Entry<'a> {
    /// Children of array nodes are anonymous.
    pub name: Option<&'static str>,
    pub value: Value<'a>,
}

/// A child's value.
pub enum Value<'a> {
    Int(u32),
    Boolean(bool),
    Float(f64),
    /// Unix epoch seconds.
    Time(i64),
    Str { ty: StrType, data: Vec<u8> },
    Binary(Vec<u8>),
    Node(FruNode<'a>),
}

impl<'a> Value<'a> {
    fn from_field(data: FieldData) -> Value<'a> {
        match data {
            FieldData::Int(v) => Value::Int(u32::from(v)),
            FieldData::Time(v) => Value::Time(v),
            FieldData::Str { ty, data } => Value::Str { ty, data },
            FieldData::Binary(data) => Value::Binary(data),
        }
    }

    fn from_oem(value: OemValue) -> Value<'a> {
        match value {
            OemValue::Int(v) => Value::Int(v),
            OemValue::Boolean(v) => Value::Boolean(v),
            OemValue::Float(v) => Value::Float(v),
            OemValue::Binary(data) => Value::Binary(data),
        }
    }
}

impl Fru {
    /// The navigation root ("standard FRU").
    pub fn root_node(&self) -> FruNode<'_> {
        FruNode {
            fru: self,
            kind: NodeKind::Root,
        }
    }
}

impl<'a> FruNode<'a> {
    /// Fetches the `index`-th child of this node.
    ///
    /// [`Error::NotFound`] signals the end of the children;
    /// [`Error::NotPresent`] a schema child missing from this image.
    pub fn get_field(&self, index: usize) -> Result<Entry<'a>, Error> {
        match &self.kind {
            NodeKind::Root => self.root_field(index),
            NodeKind::StrArray { field } => {
                let data = self.fru.field_data(*field, index)?;
                Ok(Entry {
                    name: None,
                    value: Value::from_field(data),
                })
            }
            NodeKind::MrArray => {
                if index >= self.fru.num_multi_records() {
                    return Err(Error::NotFound);
                }
                Ok(Entry {
                    name: None,
                    value: Value::Node(FruNode {
                        fru: self.fru,
                        kind: NodeKind::MrRecord { index },
                    }),
                })
            }
            NodeKind::MrRecord { index: record } => self.mr_record_field(*record, index),
            NodeKind::Oem { fields } => {
                let field = fields.field(index)?;
                Ok(Entry {
                    name: Some(field.name),
                    value: Value::from_oem(field.value),
                })
            }
        }
    }

    /// Iterates the node's children, skipping schema entries missing from
    /// this image.
    pub fn children(&self) -> Children<'a, '_> {
        Children {
            node: self,
            index: 0,
        }
    }

    fn root_field(&self, index: usize) -> Result<Entry<'a>, Error> {
        if let Some(def) = reflect::field_def(index) {
            if def.has_num {
                // Custom-string lists surface as an array child.
                self.fru
                    .area_common(def.area)
                    .ok_or(Error::NotPresent)?;
                return Ok(Entry {
                    name: Some(def.name),
                    value: Value::Node(FruNode {
                        fru: self.fru,
                        kind: NodeKind::StrArray { field: index },
                    }),
                });
            }
            let data = self.fru.field_data(index, 0)?;
            return Ok(Entry {
                name: Some(def.name),
                value: Value::from_field(data),
            });
        }

        if index == reflect::FIELDS.len() {
            if self.fru.multi.is_none() {
                return Err(Error::NotPresent);
            }
            return Ok(Entry {
                name: Some("multirecords"),
                value: Value::Node(FruNode {
                    fru: self.fru,
                    kind: NodeKind::MrArray,
                }),
            });
        }

        Err(Error::NotFound)
    }

    fn mr_record_field(&self, record: usize, index: usize) -> Result<Entry<'a>, Error> {
        match index {
            0 => Ok(Entry {
                name: Some("raw-data"),
                value: Value::Binary(self.fru.multi_record_data(record)?.to_vec()),
            }),
            1 => {
                let record_type = self.fru.multi_record_type(record)?;
                let payload = self.fru.multi_record_data(record)?;
                let (name, fields) =
                    oem::decode_multi_record(record_type, payload).map_err(|err| {
                        debug!("multi-record {record} has no decoded form: {err}");
                        Error::NotFound
                    })?;
                Ok(Entry {
                    name: Some(name),
                    value: Value::Node(FruNode {
                        fru: self.fru,
                        kind: NodeKind::Oem { fields },
                    }),
                })
            }
            _ => Err(Error::NotFound),
        }
    }
}

/// An iterator over the children of a node.
///
/// This struct is created by the [`children`] method on a [`FruNode`].
///
/// [`children`]: FruNode::children
pub struct Children<'a, 'n> {
    node: &'n FruNode<'a>,
    index: usize,
}

impl<'a> Iterator for Children<'a, '_> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let index = self.index;
            self.index += 1;
            match self.node.get_field(index) {
                Ok(entry) => return Some(entry),
                Err(Error::NotPresent) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(feature = "serialize")]
mod ser {
    #[cfg(not(feature = "std"))]
    use alloc::{format, string::String};

    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::{FruNode, Value};
    use crate::tlv::StrType;

    fn hex(data: &[u8]) -> String {
        let mut out = String::with_capacity(2 + data.len() * 2);
        out.push_str("0x");
        for byte in data {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }

    impl Serialize for FruNode<'_> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut map = serializer.serialize_map(None)?;
            for (index, entry) in self.children().enumerate() {
                match entry.name {
                    Some(name) => map.serialize_entry(name, &entry.value)?,
                    None => map.serialize_entry(&index, &entry.value)?,
                }
            }
            map.end()
        }
    }

    impl Serialize for Value<'_> {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match self {
                Value::Int(v) => serializer.serialize_u32(*v),
                Value::Boolean(v) => serializer.serialize_bool(*v),
                Value::Float(v) => serializer.serialize_f64(*v),
                Value::Time(v) => serializer.serialize_i64(*v),
                Value::Str { ty: StrType::Binary, data } => {
                    serializer.serialize_str(&hex(data))
                }
                Value::Str { data, .. } => {
                    serializer.serialize_str(&String::from_utf8_lossy(data))
                }
                Value::Binary(data) => serializer.serialize_str(&hex(data)),
                Value::Node(node) => node.serialize(serializer),
            }
        }
    }
}

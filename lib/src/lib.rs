// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

//! Decoder, field editor, and minimal-write encoder for IPMI FRU inventory
//! images (Platform Management FRU Information Storage Definition, v1.0).
//!
//! A FRU image is a small, checksummed, area-oriented blob stored on slow,
//! write-bounded media. [`Fru::from_slice`](crate::fru::Fru::from_slice)
//! decodes an image into an editable model; setters mutate individual fields
//! while tracking exactly which bytes moved; [`Fru::write`](crate::fru::Fru::write)
//! re-encodes the image and returns the minimal list of byte ranges a caller
//! has to push back to the media.
//!
//! The crate performs no I/O: it consumes a byte buffer and emits update
//! ranges. Reading and writing the actual storage is the caller's business.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod area;
pub mod error;
pub mod field;
pub mod fru;
pub mod node;
pub mod oem;
pub mod prelude;
pub mod reflect;
pub mod tlv;
pub mod update;
mod utils;

pub use crate::error::Error;
pub use crate::fru::Fru;

// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

#[cfg(not(feature = "std"))]
use core::fmt;
#[cfg(feature = "std")]
use std::fmt;

/// Errors reported by the FRU decoding and editing functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Malformed request: misaligned or zero offset, unknown index, kind
    /// mismatch, delete at an invalid position.
    InvalidArgument,
    /// The requested area or field is not present in the decoded image.
    NotPresent,
    /// The requested ordinal is past the end of an array. Tree navigation
    /// uses this error to signal the end of a node's children.
    NotFound,
    /// The area being added already exists.
    AlreadyExists,
    /// The payload or new area length does not fit the reserved space that
    /// is already in use.
    TooBig,
    /// The mutation would push the area's used length past its reserved
    /// length.
    OutOfSpace,
    /// The field is only written by the decoder (area version bytes).
    PermissionDenied,
    /// The image violates the FRU storage definition. The payload is a short
    /// description of the violated rule.
    BadFormat(&'static str),
    /// Offset bookkeeping failed a self-check during encode.
    InternalError,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "Invalid argument"),
            Error::NotPresent => write!(f, "Area or field not present in the FRU image"),
            Error::NotFound => write!(f, "No entry at the requested index"),
            Error::AlreadyExists => write!(f, "The area already exists"),
            Error::TooBig => write!(f, "The value does not fit the space in use"),
            Error::OutOfSpace => write!(f, "No room left in the area"),
            Error::PermissionDenied => write!(f, "The field cannot be modified"),
            Error::BadFormat(what) => write!(f, "Malformed FRU image: {what}"),
            Error::InternalError => write!(f, "Internal error in the FRU library"),
        }
    }
}

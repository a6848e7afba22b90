// Copyright (C) 2025 Intel Corporation
// SPDX-License-Identifier: MIT

use crate::error::Error;

/// Arithmetic sum of `data` modulo 256.
pub(crate) fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Two's complement of [`checksum`]: appending the result to `data` makes
/// the covered region sum to zero modulo 256.
pub(crate) fn zero_checksum(data: &[u8]) -> u8 {
    checksum(data).wrapping_neg()
}

/// Seconds between 1970-01-01 00:00:00 and 1996-01-01 00:00:00 UTC, the
/// epoch of FRU timestamps.
pub(crate) const FRU_EPOCH_UNIX_SECONDS: i64 = 820_476_000;

/// Converts a FRU minute count into Unix epoch seconds.
pub(crate) fn fru_minutes_to_unix(minutes: u32) -> i64 {
    i64::from(minutes) * 60 + FRU_EPOCH_UNIX_SECONDS
}

/// Converts Unix epoch seconds into the 24-bit FRU minute count, rounding to
/// the nearest minute. Values before the FRU epoch or past the 24-bit range
/// are not representable.
pub(crate) fn unix_to_fru_minutes(time: i64) -> Result<u32, Error> {
    if time < FRU_EPOCH_UNIX_SECONDS {
        return Err(Error::InvalidArgument);
    }
    let minutes = (time - FRU_EPOCH_UNIX_SECONDS + 30) / 60;
    if minutes > 0xff_ffff {
        return Err(Error::InvalidArgument);
    }
    Ok(minutes as u32)
}

// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Fixed-width big-endian field readers.
//!
//! These perform no bounds checking of their own; the caller must ensure
//! `offset + width <= buf.len()`, which in practice means going through
//! [`crate::cursor::Cursor`] first. Out-of-range access panics rather than
//! reading out of bounds.

use std::convert::TryInto;

pub fn u16_be(buf: &[u8], offset: usize) -> u16 {
    // unwrap is safe: the slice is exactly 2 bytes
    u16::from_be_bytes(buf[offset..offset + 2].try_into().unwrap())
}

pub fn u24_be(buf: &[u8], offset: usize) -> u32 {
    u32::from(buf[offset]) << 16 | u32::from(buf[offset + 1]) << 8 | u32::from(buf[offset + 2])
}

pub fn u32_be(buf: &[u8], offset: usize) -> u32 {
    // unwrap is safe: the slice is exactly 4 bytes
    u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap())
}

pub fn u64_be(buf: &[u8], offset: usize) -> u64 {
    // unwrap is safe: the slice is exactly 8 bytes
    u64::from_be_bytes(buf[offset..offset + 8].try_into().unwrap())
}

/// 48-bit little-endian read, as used for the raw field of ATA SMART
/// attributes.
pub fn u48_le(buf: &[u8], offset: usize) -> u64 {
    let mut val = 0;
    for i in (0..6).rev() {
        val = val << 8 | u64::from(buf[offset + i]);
    }
    val
}

pub fn bit(byte: u8, n: u8) -> bool {
    byte & (1 << n) != 0
}

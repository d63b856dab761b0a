// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Decoding of MODE SENSE (6) and MODE SENSE (10) response data.
//!
//! Both variants share a shape: a fixed header, an optional block
//! descriptor, then a list of self-length-prefixed mode pages. The header
//! declares how long the block descriptor is, and the buffer may end before
//! that; in that case the header fields are still reported and everything
//! after the header surfaces as unparsed bytes.
//!
//! The MODE SENSE (10) block descriptor length is taken as a literal byte
//! count. SPC-4 says to scale it by 8 (16 with LONGLBA), but devices in the
//! field return literal counts.

use log::warn;

use crate::{
    bytes::{bit, u16_be, u24_be},
    cursor::Cursor,
    records::Records,
    ParseError,
};

pub const MODE_SENSE_6_MIN_LEN: usize = 4;
pub const MODE_SENSE_10_MIN_LEN: usize = 8;

pub const BLOCK_DESCRIPTOR_LEN: usize = 8;
pub const NUM_BLOCKS_OVERFLOW: u32 = 0xff_ffff;

/// Minimum bytes needed before a mode page header is worth looking at.
const MODE_PAGE_MIN_LEN: usize = 3;

#[derive(Debug, PartialEq, Eq)]
pub struct ModeSense<'a> {
    /// Bytes following the data-length field itself, as declared.
    pub data_length: u16,
    pub medium_type: u8,
    pub device_specific: u8,
    /// Always false for the 6-byte variant.
    pub long_lba: bool,
    pub block_descriptor_length: u16,
    pub body: ModeBody<'a>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ModeBody<'a> {
    Parsed {
        /// Present when the header declared a non-zero descriptor length.
        block_descriptor: Option<BlockDescriptor<'a>>,
        pages: ModePages<'a>,
    },
    /// The buffer ended before the declared block descriptor; everything
    /// after the header, verbatim.
    Truncated(&'a [u8]),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlockDescriptor<'a> {
    Standard {
        density_code: u8,
        num_blocks: NumBlocks,
        block_length: u32,
    },
    /// Declared descriptor length was not the standard 8 bytes.
    Unrecognized(&'a [u8]),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NumBlocks {
    Count(u32),
    /// The 0xFFFFFF sentinel: capacity unknown or too large for the field.
    Overflow,
}

/// The mode-page region. Iteration stops once fewer bytes remain than the
/// smallest possible page header, which bounds the walk by the buffer
/// length no matter what the page length fields claim.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ModePages<'a>(&'a [u8]);

impl<'a> ModePages<'a> {
    pub fn iter(&self) -> impl Iterator<Item = ModePage<'a>> {
        Records::new(self.0, MODE_PAGE_MIN_LEN, |rec| {
            if bit(rec[0], 6) {
                // subpage format: 4-byte header with a 16-bit length
                if rec.len() < 4 {
                    return None;
                }
                Some(4 + usize::from(u16_be(rec, 2)))
            } else {
                Some(2 + usize::from(rec[1]))
            }
        })
        .map(|rec| {
            let subpage_format = bit(rec[0], 6);
            ModePage {
                page_code: rec[0] & 0x3f,
                subpage_code: if subpage_format { Some(rec[1]) } else { None },
                saveable: bit(rec[0], 7),
                data: if subpage_format { &rec[4..] } else { &rec[2..] },
            }
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ModePage<'a> {
    pub page_code: u8,
    /// `Some` when the page uses the subpage format.
    pub subpage_code: Option<u8>,
    pub saveable: bool,
    pub data: &'a [u8],
}

pub fn parse_mode_sense_6(data: &[u8]) -> Result<ModeSense<'_>, ParseError> {
    let cursor = Cursor::new(data);
    if !cursor.fits(MODE_SENSE_6_MIN_LEN) {
        return Err(ParseError::TooShort {
            expected: MODE_SENSE_6_MIN_LEN,
            actual: data.len(),
        });
    }

    let data_length = u16::from(data[0]);
    let block_descriptor_length = u16::from(data[3]);
    // total bytes in the response, counting the length field itself
    let declared_total = usize::from(data_length) + 1;

    Ok(ModeSense {
        data_length,
        medium_type: data[1],
        device_specific: data[2],
        long_lba: false,
        block_descriptor_length,
        body: parse_body(
            &cursor,
            MODE_SENSE_6_MIN_LEN,
            usize::from(block_descriptor_length),
            declared_total,
        ),
    })
}

pub fn parse_mode_sense_10(data: &[u8]) -> Result<ModeSense<'_>, ParseError> {
    let cursor = Cursor::new(data);
    if !cursor.fits(MODE_SENSE_10_MIN_LEN) {
        return Err(ParseError::TooShort {
            expected: MODE_SENSE_10_MIN_LEN,
            actual: data.len(),
        });
    }

    let data_length = u16_be(data, 0);
    let block_descriptor_length = u16_be(data, 6);
    let declared_total = usize::from(data_length) + 2;

    Ok(ModeSense {
        data_length,
        medium_type: data[2],
        device_specific: data[3],
        long_lba: bit(data[4], 0),
        block_descriptor_length,
        body: parse_body(
            &cursor,
            MODE_SENSE_10_MIN_LEN,
            usize::from(block_descriptor_length),
            declared_total,
        ),
    })
}

fn parse_body<'a>(
    cursor: &Cursor<'a>,
    header_len: usize,
    descriptor_len: usize,
    declared_total: usize,
) -> ModeBody<'a> {
    // Check the expected length before touching the page region, so a
    // response cut off mid-descriptor never gets misread as page data.
    let expected = header_len + descriptor_len;
    if cursor.total_len() < expected {
        return ModeBody::Truncated(cursor.sub_region(header_len, usize::MAX));
    }

    let block_descriptor = if descriptor_len > 0 {
        let region = cursor.sub_region(header_len, descriptor_len);
        if region.len() == BLOCK_DESCRIPTOR_LEN {
            let num_blocks = u24_be(region, 1);
            Some(BlockDescriptor::Standard {
                density_code: region[0],
                num_blocks: if num_blocks == NUM_BLOCKS_OVERFLOW {
                    NumBlocks::Overflow
                } else {
                    NumBlocks::Count(num_blocks)
                },
                block_length: u24_be(region, 5),
            })
        } else {
            warn!(
                "Block descriptor of {} bytes, expected {}; leaving unparsed.",
                region.len(),
                BLOCK_DESCRIPTOR_LEN
            );
            Some(BlockDescriptor::Unrecognized(region))
        }
    } else {
        None
    };

    let page_region_len = declared_total.saturating_sub(expected);
    ModeBody::Parsed {
        block_descriptor,
        pages: ModePages(cursor.sub_region(expected, page_region_len)),
    }
}

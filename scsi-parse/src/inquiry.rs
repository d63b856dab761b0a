// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Decoding of standard INQUIRY data and EVPD (vital product data) pages.
//!
//! Standard INQUIRY data is fixed-position ASCII fields; the serial number
//! lives past the 36-byte minimum and is only reported when present. EVPD
//! pages share the 4-byte page header; ASCII information pages (codes
//! 0x01-0x7F) get their payload decoded, everything else surfaces as an
//! unparsed range.

use crate::{bytes::u16_be, cursor::Cursor, ParseError};

pub const INQUIRY_MIN_LEN: usize = 36;
pub const EVPD_MIN_LEN: usize = 4;

const INQUIRY_SERIAL_END: usize = 44;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Inquiry<'a> {
    pub peripheral_qualifier: u8,
    pub device_type: u8,
    /// T10 vendor identification, 8 bytes of space-padded ASCII.
    pub vendor: &'a [u8],
    /// Product identification, 16 bytes.
    pub model: &'a [u8],
    /// Product revision level, 4 bytes.
    pub revision: &'a [u8],
    /// Vendor-specific unit serial, 8 bytes, when the response reaches it.
    pub serial: Option<&'a [u8]>,
}

pub fn parse_inquiry(data: &[u8]) -> Result<Inquiry<'_>, ParseError> {
    if data.len() < INQUIRY_MIN_LEN {
        return Err(ParseError::TooShort {
            expected: INQUIRY_MIN_LEN,
            actual: data.len(),
        });
    }

    Ok(Inquiry {
        peripheral_qualifier: data[0] >> 5,
        device_type: data[0] & 0x1f,
        vendor: &data[8..16],
        model: &data[16..32],
        revision: &data[32..36],
        serial: if data.len() >= INQUIRY_SERIAL_END {
            Some(&data[36..INQUIRY_SERIAL_END])
        } else {
            None
        },
    })
}

/// Render a fixed-width space-padded ASCII field for display.
pub fn ascii_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field).trim().to_string()
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct EvpdPage<'a> {
    pub peripheral_qualifier: u8,
    pub device_type: u8,
    pub page_code: u8,
    /// Page length as declared; `data` is clamped to the buffer.
    pub declared_length: u16,
    pub data: &'a [u8],
}

impl<'a> EvpdPage<'a> {
    pub fn is_ascii(&self) -> bool {
        (0x01..=0x7f).contains(&self.page_code)
    }

    /// For ASCII information pages: the ASCII payload and whatever
    /// vendor-specific bytes follow it. `None` for other page types or when
    /// the page is cut off before its own length byte.
    pub fn ascii(&self) -> Option<(&'a [u8], &'a [u8])> {
        if !self.is_ascii() || self.data.is_empty() {
            return None;
        }
        let cursor = Cursor::new(self.data);
        let text = cursor.sub_region(1, usize::from(self.data[0]));
        let rest = cursor.sub_region(1 + text.len(), usize::MAX);
        Some((text, rest))
    }
}

pub fn parse_evpd_page(data: &[u8]) -> Result<EvpdPage<'_>, ParseError> {
    let cursor = Cursor::new(data);
    if !cursor.fits(EVPD_MIN_LEN) {
        return Err(ParseError::TooShort {
            expected: EVPD_MIN_LEN,
            actual: data.len(),
        });
    }

    let declared_length = u16_be(data, 2);
    Ok(EvpdPage {
        peripheral_qualifier: data[0] >> 5,
        device_type: data[0] & 0x1f,
        page_code: data[1],
        declared_length,
        data: cursor.sub_region(EVPD_MIN_LEN, usize::from(declared_length)),
    })
}

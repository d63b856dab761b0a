// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Decoding of LOG SENSE response data.
//!
//! A LOG SENSE response is a 4-byte header followed by page data. Page 0 is
//! structurally special: its data is a flat enumeration of supported page
//! codes (or (page, subpage) pairs), not a parameter list. Every other page
//! is a list of self-length-prefixed parameters, walked lazily via
//! [`Records`]. Only the informational-exceptions page (0x2F) has a
//! parameter interpreter; all other parameter payloads surface verbatim as
//! unparsed bytes.

use crate::{
    bytes::{bit, u16_be},
    cursor::Cursor,
    records::Records,
    ParseError,
};

pub const LOG_SENSE_MIN_LEN: usize = 4;

/// Informational exceptions log page.
pub const PAGE_INFORMATIONAL_EXCEPTIONS: u8 = 0x2f;

#[derive(Debug, PartialEq, Eq)]
pub struct LogSense<'a> {
    pub page_code: u8,
    pub subpage_code: u8,
    pub subpage_format: bool,
    pub data_saved: bool,
    /// Length the device claims for the data region. The regions held in
    /// `content` are already clamped to the real buffer.
    pub data_length: u16,
    pub content: LogContent<'a>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LogContent<'a> {
    /// Page 0 without subpage format: one supported page code per byte.
    SupportedPages(SupportedPages<'a>),
    /// Page 0 with subpage format: (page, subpage) pairs, two bytes each.
    SupportedSubpages(SupportedSubpages<'a>),
    /// Any other page: a parameter list.
    Parameters(LogParameters<'a>),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SupportedPages<'a>(&'a [u8]);

impl<'a> SupportedPages<'a> {
    pub fn iter(&self) -> impl Iterator<Item = u8> + 'a {
        self.0.iter().map(|b| b & 0x3f)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SupportedSubpages<'a>(&'a [u8]);

impl<'a> SupportedSubpages<'a> {
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8)> + 'a {
        self.0.chunks_exact(2).map(|pair| (pair[0] & 0x3f, pair[1]))
    }

    pub fn len(&self) -> usize {
        self.0.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The parameter region of a non-zero log page. Iteration is lazy and stops
/// at the first parameter that would overrun the region.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LogParameters<'a>(&'a [u8]);

impl<'a> LogParameters<'a> {
    pub fn iter(&self) -> impl Iterator<Item = LogParameter<'a>> {
        // parameter header: code (2 bytes), control byte, length
        Records::new(self.0, 4, |rec| Some(4 + usize::from(rec[3]))).map(|rec| LogParameter {
            code: u16_be(rec, 0),
            data: &rec[4..],
        })
    }
}

/// A single log parameter. The control byte is deliberately not exposed:
/// this layer reports current values only and has no use for counter
/// reset/accumulation semantics.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LogParameter<'a> {
    pub code: u16,
    pub data: &'a [u8],
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogParameterValue<'a> {
    /// Page 0x2F, parameter 0.
    InformationalExceptions {
        asc: u8,
        ascq: u8,
        /// Most recent temperature reading, degrees Celsius, as reported.
        temperature: u8,
        /// Anything past the three defined bytes.
        unparsed: &'a [u8],
    },
    /// No interpreter for this page/parameter combination.
    Unparsed(&'a [u8]),
}

impl<'a> LogParameter<'a> {
    pub fn interpret(&self, page_code: u8) -> LogParameterValue<'a> {
        match (page_code, self.code) {
            (PAGE_INFORMATIONAL_EXCEPTIONS, 0) if self.data.len() >= 3 => {
                LogParameterValue::InformationalExceptions {
                    asc: self.data[0],
                    ascq: self.data[1],
                    temperature: self.data[2],
                    unparsed: &self.data[3..],
                }
            }
            _ => LogParameterValue::Unparsed(self.data),
        }
    }
}

pub fn parse_log_sense(data: &[u8]) -> Result<LogSense<'_>, ParseError> {
    let cursor = Cursor::new(data);
    if !cursor.fits(LOG_SENSE_MIN_LEN) {
        return Err(ParseError::TooShort {
            expected: LOG_SENSE_MIN_LEN,
            actual: data.len(),
        });
    }

    let page_code = data[0] & 0x3f;
    let subpage_format = bit(data[0], 6);
    let data_saved = bit(data[0], 7);
    let subpage_code = data[1];
    let data_length = u16_be(data, 2);

    let region = cursor.sub_region(LOG_SENSE_MIN_LEN, usize::from(data_length));

    let content = if page_code == 0 {
        if subpage_format {
            LogContent::SupportedSubpages(SupportedSubpages(region))
        } else {
            LogContent::SupportedPages(SupportedPages(region))
        }
    } else {
        LogContent::Parameters(LogParameters(region))
    };

    Ok(LogSense {
        page_code,
        subpage_code,
        subpage_format,
        data_saved,
        data_length,
        content,
    })
}

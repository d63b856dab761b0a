// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Decoding of RECEIVE DIAGNOSTIC RESULTS pages.
//!
//! Only the supported-pages enumeration (page 0) is interpreted; SES and
//! vendor pages surface as unparsed ranges.

use crate::{bytes::u16_be, cursor::Cursor, ParseError};

pub const RECV_DIAG_MIN_LEN: usize = 4;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DiagnosticPage<'a> {
    pub page_code: u8,
    pub page_code_specific: u8,
    pub declared_length: u16,
    pub content: DiagnosticContent<'a>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DiagnosticContent<'a> {
    /// Page 0: one supported page code per byte.
    SupportedPages(&'a [u8]),
    Unparsed(&'a [u8]),
}

pub fn parse_receive_diagnostics(data: &[u8]) -> Result<DiagnosticPage<'_>, ParseError> {
    let cursor = Cursor::new(data);
    if !cursor.fits(RECV_DIAG_MIN_LEN) {
        return Err(ParseError::TooShort {
            expected: RECV_DIAG_MIN_LEN,
            actual: data.len(),
        });
    }

    let page_code = data[0];
    let declared_length = u16_be(data, 2);
    let region = cursor.sub_region(RECV_DIAG_MIN_LEN, usize::from(declared_length));

    Ok(DiagnosticPage {
        page_code,
        page_code_specific: data[1],
        declared_length,
        content: if page_code == 0 {
            DiagnosticContent::SupportedPages(region)
        } else {
            DiagnosticContent::Unparsed(region)
        },
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_supported_pages() {
        let buf = [
            0x00, // page 0
            0x00, //
            0x00, 0x03, // length: 3
            0x00, 0x02, 0x40, // supported pages
        ];
        let page = parse_receive_diagnostics(&buf).unwrap();
        assert_eq!(page.page_code, 0);
        assert_eq!(
            page.content,
            DiagnosticContent::SupportedPages(&[0x00, 0x02, 0x40])
        );
    }

    #[test]
    fn test_other_page_unparsed_and_clamped() {
        let buf = [
            0x02, // SES page
            0x01, //
            0x00, 0x10, // declares 16 bytes
            0xaa, 0xbb, // only 2 present
        ];
        let page = parse_receive_diagnostics(&buf).unwrap();
        assert_eq!(page.declared_length, 16);
        assert_eq!(page.content, DiagnosticContent::Unparsed(&[0xaa, 0xbb]));
    }

    #[test]
    fn test_too_short() {
        assert_matches!(
            parse_receive_diagnostics(&[0; 2]),
            Err(ParseError::TooShort { expected: 4, .. })
        );
    }
}

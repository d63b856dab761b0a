// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Decoding of READ DEFECT DATA (10) and (12) response data.
//!
//! The two response variants differ only in header layout; both carry the
//! same defect descriptor list. The address format field picks one of five
//! fixed-width entry layouts. Entries are decoded while a full entry width
//! remains in the length-clamped region; a trailing partial entry surfaces
//! as unparsed bytes.

use std::convert::TryFrom;

use log::warn;
use num_enum::TryFromPrimitive;

use crate::{
    bytes::{bit, u16_be, u32_be, u64_be},
    cursor::Cursor,
    ParseError,
};

pub const READ_DEFECT_DATA_10_MIN_LEN: usize = 4;
pub const READ_DEFECT_DATA_12_MIN_LEN: usize = 8;

#[derive(Debug, PartialEq, Eq, Clone, Copy, TryFromPrimitive)]
#[repr(u8)]
pub enum DefectListFormat {
    Short = 0b000,
    Long = 0b011,
    BytesFromIndex = 0b100,
    Physical = 0b101,
    Vendor = 0b110,
}

impl DefectListFormat {
    pub const fn entry_len(self) -> usize {
        match self {
            Self::Long => 8,
            Self::Short | Self::BytesFromIndex | Self::Physical | Self::Vendor => 4,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DefectList<'a> {
    pub plist_valid: bool,
    pub glist_valid: bool,
    /// Defect list length in bytes, as declared by the device. The entry
    /// region below is clamped to what the buffer actually holds.
    pub declared_length: u32,
    pub entries: DefectEntries<'a>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DefectEntries<'a> {
    Addressed(AddressedDefects<'a>),
    /// Reserved or unassigned format code; the whole entry region, verbatim.
    UnknownFormat { code: u8, data: &'a [u8] },
}

/// The defect descriptor region together with its address format.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AddressedDefects<'a> {
    pub format: DefectListFormat,
    data: &'a [u8],
}

impl<'a> AddressedDefects<'a> {
    pub fn iter(&self) -> impl Iterator<Item = DefectEntry> + 'a {
        let format = self.format;
        self.data
            .chunks_exact(format.entry_len())
            .map(move |entry| DefectEntry::decode(format, entry))
    }

    pub fn len(&self) -> usize {
        self.data.len() / self.format.entry_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes after the last full entry, never decoded.
    pub fn unparsed_trailing(&self) -> &'a [u8] {
        self.data.chunks_exact(self.format.entry_len()).remainder()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DefectEntry {
    /// Short block format: a flat 32-bit LBA.
    Lba(u32),
    /// Long block format: a 64-bit LBA.
    LongLba(u64),
    BytesFromIndex {
        cylinder: u16,
        head: u8,
        bytes_from_index: u8,
    },
    Physical {
        cylinder: u16,
        head: u8,
        sector: u8,
    },
    /// Vendor-specific format, reported as an opaque word.
    Vendor(u32),
}

impl DefectEntry {
    fn decode(format: DefectListFormat, entry: &[u8]) -> Self {
        match format {
            DefectListFormat::Short => Self::Lba(u32_be(entry, 0)),
            DefectListFormat::Long => Self::LongLba(u64_be(entry, 0)),
            DefectListFormat::BytesFromIndex => Self::BytesFromIndex {
                cylinder: u16_be(entry, 0),
                head: entry[2],
                bytes_from_index: entry[3],
            },
            DefectListFormat::Physical => Self::Physical {
                cylinder: u16_be(entry, 0),
                head: entry[2],
                sector: entry[3],
            },
            DefectListFormat::Vendor => Self::Vendor(u32_be(entry, 0)),
        }
    }
}

pub fn parse_read_defect_data_10(data: &[u8]) -> Result<DefectList<'_>, ParseError> {
    let cursor = Cursor::new(data);
    if !cursor.fits(READ_DEFECT_DATA_10_MIN_LEN) {
        return Err(ParseError::TooShort {
            expected: READ_DEFECT_DATA_10_MIN_LEN,
            actual: data.len(),
        });
    }

    let declared_length = u32::from(u16_be(data, 2));
    Ok(parse_list(
        &cursor,
        data[1],
        declared_length,
        READ_DEFECT_DATA_10_MIN_LEN,
    ))
}

pub fn parse_read_defect_data_12(data: &[u8]) -> Result<DefectList<'_>, ParseError> {
    let cursor = Cursor::new(data);
    if !cursor.fits(READ_DEFECT_DATA_12_MIN_LEN) {
        return Err(ParseError::TooShort {
            expected: READ_DEFECT_DATA_12_MIN_LEN,
            actual: data.len(),
        });
    }

    let declared_length = u32_be(data, 4);
    Ok(parse_list(
        &cursor,
        data[1],
        declared_length,
        READ_DEFECT_DATA_12_MIN_LEN,
    ))
}

fn parse_list<'a>(
    cursor: &Cursor<'a>,
    flags: u8,
    declared_length: u32,
    header_len: usize,
) -> DefectList<'a> {
    let region = cursor.sub_region(header_len, declared_length as usize);
    let format_code = flags & 0b0000_0111;

    let entries = match DefectListFormat::try_from(format_code) {
        Ok(format) => DefectEntries::Addressed(AddressedDefects {
            format,
            data: region,
        }),
        Err(_) => {
            warn!("Unknown defect list format {format_code:#05b}; leaving entries unparsed.");
            DefectEntries::UnknownFormat {
                code: format_code,
                data: region,
            }
        }
    };

    DefectList {
        plist_valid: bit(flags, 4),
        glist_valid: bit(flags, 3),
        declared_length,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_too_short_for_header() {
        assert_matches!(
            parse_read_defect_data_10(&[0; 3]),
            Err(ParseError::TooShort { expected: 4, .. })
        );
        assert_matches!(
            parse_read_defect_data_12(&[0; 7]),
            Err(ParseError::TooShort { expected: 8, .. })
        );
    }

    #[test]
    fn test_short_format_entries() {
        let buf = [
            0x00, // reserved
            0b0001_1000, // PLISTV, GLISTV, short format
            0x00, 0x08, // defect list length: 8
            0x00, 0x00, 0x10, 0x00, // LBA 4096
            0x00, 0x01, 0x00, 0x00, // LBA 65536
        ];
        let list = parse_read_defect_data_10(&buf).unwrap();
        assert!(list.plist_valid);
        assert!(list.glist_valid);
        assert_eq!(list.declared_length, 8);

        let defects = assert_matches!(list.entries, DefectEntries::Addressed(d) => d);
        assert_eq!(defects.format, DefectListFormat::Short);
        assert_eq!(
            defects.iter().collect::<Vec<_>>(),
            vec![DefectEntry::Lba(4096), DefectEntry::Lba(65536)]
        );
        assert_eq!(defects.unparsed_trailing(), &[] as &[u8]);
    }

    #[test]
    fn test_declared_length_overrun_clamps() {
        // declares 10 bytes of entries but only 6 are present: one full
        // 4-byte entry, then 2 unparsed trailing bytes
        let buf = [
            0x00, //
            0b0000_0000, // short format, no valid lists
            0x00, 0x0a, // declared length: 10
            0x00, 0x00, 0x00, 0x07, // LBA 7
            0xaa, 0xbb, // partial entry
        ];
        let list = parse_read_defect_data_10(&buf).unwrap();
        let defects = assert_matches!(list.entries, DefectEntries::Addressed(d) => d);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects.iter().collect::<Vec<_>>(), vec![DefectEntry::Lba(7)]);
        assert_eq!(defects.unparsed_trailing(), &[0xaa, 0xbb]);
    }

    #[test]
    fn test_long_format_12() {
        let buf = [
            0x00, //
            0b0001_0011, // PLISTV, long format
            0x00, 0x00, // reserved
            0x00, 0x00, 0x00, 0x08, // defect list length: 8
            0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, // one 64-bit address
        ];
        let list = parse_read_defect_data_12(&buf).unwrap();
        assert!(list.plist_valid);
        assert!(!list.glist_valid);

        let defects = assert_matches!(list.entries, DefectEntries::Addressed(d) => d);
        assert_eq!(defects.format, DefectListFormat::Long);
        assert_eq!(
            defects.iter().collect::<Vec<_>>(),
            vec![DefectEntry::LongLba(0x0000_0001_0000_0002)]
        );
    }

    #[test]
    fn test_physical_and_index_packing() {
        let entry = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            DefectEntry::decode(DefectListFormat::Physical, &entry),
            DefectEntry::Physical {
                cylinder: 0x0102,
                head: 3,
                sector: 4,
            }
        );
        assert_eq!(
            DefectEntry::decode(DefectListFormat::BytesFromIndex, &entry),
            DefectEntry::BytesFromIndex {
                cylinder: 0x0102,
                head: 3,
                bytes_from_index: 4,
            }
        );
    }

    #[test]
    fn test_unknown_format_is_one_opaque_region() {
        let buf = [
            0x00, //
            0b0000_0111, // reserved format code
            0x00, 0x04, //
            0xde, 0xad, 0xbe, 0xef,
        ];
        let list = parse_read_defect_data_10(&buf).unwrap();
        assert_eq!(
            list.entries,
            DefectEntries::UnknownFormat {
                code: 0b111,
                data: &[0xde, 0xad, 0xbe, 0xef],
            }
        );
    }
}

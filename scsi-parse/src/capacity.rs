// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Decoding of READ CAPACITY (10) and (16) response data.

use crate::{
    bytes::{bit, u32_be, u64_be},
    ParseError,
};

pub const READ_CAPACITY_10_LEN: usize = 8;
pub const READ_CAPACITY_16_LEN: usize = 32;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReadCapacity10 {
    /// Address of the last logical block, not the block count.
    pub max_lba: u32,
    pub block_size: u32,
}

pub fn parse_read_capacity_10(data: &[u8]) -> Result<ReadCapacity10, ParseError> {
    if data.len() < READ_CAPACITY_10_LEN {
        return Err(ParseError::TooShort {
            expected: READ_CAPACITY_10_LEN,
            actual: data.len(),
        });
    }
    Ok(ReadCapacity10 {
        max_lba: u32_be(data, 0),
        block_size: u32_be(data, 4),
    })
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReadCapacity16 {
    pub max_lba: u64,
    pub block_size: u32,
    pub protection_enabled: bool,
    pub protection_type: u8,
    pub p_i_exponent: u8,
    pub logical_per_physical_exponent: u8,
    pub thin_provisioning_enabled: bool,
    pub thin_provisioning_zero: bool,
    pub lowest_aligned_lba: u16,
}

pub fn parse_read_capacity_16(data: &[u8]) -> Result<ReadCapacity16, ParseError> {
    if data.len() < READ_CAPACITY_16_LEN {
        return Err(ParseError::TooShort {
            expected: READ_CAPACITY_16_LEN,
            actual: data.len(),
        });
    }
    Ok(ReadCapacity16 {
        max_lba: u64_be(data, 0),
        block_size: u32_be(data, 8),
        protection_enabled: bit(data[12], 0),
        protection_type: data[12] >> 1 & 0b111,
        p_i_exponent: data[13] >> 4,
        logical_per_physical_exponent: data[13] & 0x0f,
        thin_provisioning_enabled: bit(data[14], 7),
        thin_provisioning_zero: bit(data[14], 6),
        lowest_aligned_lba: u16::from(data[14] & 0x3f) << 8 | u16::from(data[15]),
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_read_capacity_10() {
        let buf = [
            0x00, 0x00, 0x10, 0x00, // max LBA: 4096
            0x00, 0x00, 0x02, 0x00, // block size: 512
        ];
        assert_eq!(
            parse_read_capacity_10(&buf).unwrap(),
            ReadCapacity10 {
                max_lba: 4096,
                block_size: 512,
            }
        );
        assert_matches!(
            parse_read_capacity_10(&buf[..7]),
            Err(ParseError::TooShort { expected: 8, .. })
        );
    }

    #[test]
    fn test_read_capacity_16() {
        let mut buf = [0u8; READ_CAPACITY_16_LEN];
        buf[..8].copy_from_slice(&0x1_0000_0000u64.to_be_bytes());
        buf[8..12].copy_from_slice(&4096u32.to_be_bytes());
        buf[12] = 0b0000_0011; // protection type 1, enabled
        buf[13] = 0x23; // p_i exponent 2, 8 logical per physical
        buf[14] = 0b1100_0001; // TPE, TPZ, aligned LBA high bits
        buf[15] = 0x02;

        let cap = parse_read_capacity_16(&buf).unwrap();
        assert_eq!(cap.max_lba, 0x1_0000_0000);
        assert_eq!(cap.block_size, 4096);
        assert!(cap.protection_enabled);
        assert_eq!(cap.protection_type, 1);
        assert_eq!(cap.p_i_exponent, 2);
        assert_eq!(cap.logical_per_physical_exponent, 3);
        assert!(cap.thin_provisioning_enabled);
        assert!(cap.thin_provisioning_zero);
        assert_eq!(cap.lowest_aligned_lba, 0x0102);
    }
}

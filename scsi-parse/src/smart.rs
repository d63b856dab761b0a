// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! ATA SMART attribute decoding.
//!
//! Two inputs meet here: the device's raw attribute array (decoded from the
//! 512-byte SMART READ DATA sector) and a semantic attribute table mapping
//! attribute ids to meanings. The two are matched by id only; a device may
//! omit ids or repurpose them, and a miss in either table is reported
//! distinctly so callers can tell "no such attribute kind defined" from
//! "this device doesn't populate that id".
//!
//! Temperature is the awkward one. The 48-bit raw field usually packs
//! current/min/max as three 16-bit values, but vendors are inconsistent
//! about populating them, so the unpacked values are only trusted when
//! `min <= current <= max`. When the raw field is zero entirely, the legacy
//! `offset - normalized_value` convention applies instead.

use thiserror::Error as ThisError;

use crate::{bytes::u48_le, ParseError};

/// Length of the ATA SMART READ DATA response sector.
pub const SMART_READ_DATA_LEN: usize = 512;

/// Attribute slots in the SMART READ DATA sector.
pub const SMART_ATTR_SLOTS: usize = 30;

const SMART_ATTR_SLOT_LEN: usize = 12;
const SMART_ATTR_TABLE_OFFSET: usize = 2;

/// One attribute as reported by the device.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SmartAttr {
    pub id: u8,
    pub flags: u16,
    /// Normalized health indicator, 0-255.
    pub value: u8,
    pub worst: u8,
    /// Vendor-defined 48-bit raw quantity.
    pub raw: u64,
}

/// Decode the raw attribute array out of a SMART READ DATA sector.
/// Vacant slots (id 0) are skipped.
pub fn parse_smart_read_data(data: &[u8]) -> Result<Vec<SmartAttr>, ParseError> {
    let needed = SMART_ATTR_TABLE_OFFSET + SMART_ATTR_SLOTS * SMART_ATTR_SLOT_LEN;
    if data.len() < needed {
        return Err(ParseError::TooShort {
            expected: needed,
            actual: data.len(),
        });
    }

    let mut attrs = Vec::new();
    for slot in 0..SMART_ATTR_SLOTS {
        let off = SMART_ATTR_TABLE_OFFSET + slot * SMART_ATTR_SLOT_LEN;
        if data[off] == 0 {
            continue;
        }
        attrs.push(SmartAttr {
            id: data[off],
            flags: u16::from(data[off + 1]) | u16::from(data[off + 2]) << 8,
            value: data[off + 3],
            worst: data[off + 4],
            raw: u48_le(data, off + 5),
        });
    }
    Ok(attrs)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum AttrType {
    Temperature,
    PowerOnHours,
    Reallocations,
    PendingReallocations,
    CrcErrors,
}

/// A semantic table entry: what a given attribute id means for a device
/// family.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AttrDef {
    pub id: u8,
    pub kind: AttrType,
    /// Base for the legacy `offset - value` temperature convention.
    /// Meaningful only for `AttrType::Temperature`.
    pub temp_offset: Option<u8>,
}

/// An immutable id-to-meaning table, built once per device family and
/// queried by value during decoding.
#[derive(Debug, Clone)]
pub struct SmartTable {
    entries: Vec<AttrDef>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, ThisError)]
pub enum SmartError {
    /// The semantic table defines no attribute of the requested kind.
    #[error("attribute table has no {0:?} entry")]
    TypeNotInTable(AttrType),
    /// The table names an id, but the device's attribute array lacks it.
    #[error("device does not report SMART attribute {0}")]
    NotReportedByDevice(u8),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Temperature {
    /// Degrees Celsius; `None` when no trustworthy reading exists.
    pub current: Option<i32>,
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl SmartTable {
    pub fn new(entries: Vec<AttrDef>) -> Self {
        Self { entries }
    }

    /// A table covering the attribute ids essentially every ATA disk uses.
    pub fn ata_default() -> Self {
        Self::new(vec![
            AttrDef {
                id: 5,
                kind: AttrType::Reallocations,
                temp_offset: None,
            },
            AttrDef {
                id: 9,
                kind: AttrType::PowerOnHours,
                temp_offset: None,
            },
            AttrDef {
                id: 194,
                kind: AttrType::Temperature,
                temp_offset: Some(150),
            },
            AttrDef {
                id: 197,
                kind: AttrType::PendingReallocations,
                temp_offset: None,
            },
            AttrDef {
                id: 199,
                kind: AttrType::CrcErrors,
                temp_offset: None,
            },
        ])
    }

    pub fn for_type(&self, kind: AttrType) -> Option<&AttrDef> {
        self.entries.iter().find(|def| def.kind == kind)
    }

    /// The table entry for `kind` paired with the matching device
    /// attribute, with the two miss cases kept apart.
    fn lookup<'a>(
        &self,
        attrs: &'a [SmartAttr],
        kind: AttrType,
    ) -> Result<(&AttrDef, &'a SmartAttr), SmartError> {
        let def = self
            .for_type(kind)
            .ok_or(SmartError::TypeNotInTable(kind))?;
        let attr = attrs
            .iter()
            .find(|attr| attr.id == def.id)
            .ok_or(SmartError::NotReportedByDevice(def.id))?;
        Ok((def, attr))
    }

    /// Current (and, when trustworthy, min/max) drive temperature.
    pub fn temperature(&self, attrs: &[SmartAttr]) -> Result<Temperature, SmartError> {
        let (def, attr) = self.lookup(attrs, AttrType::Temperature)?;

        if attr.raw == 0 {
            // legacy convention: normalized value counts down from an offset
            return Ok(Temperature {
                current: def
                    .temp_offset
                    .map(|offset| i32::from(offset) - i32::from(attr.value)),
                min: None,
                max: None,
            });
        }

        let current = (attr.raw & 0xffff) as i32;
        let min = (attr.raw >> 16 & 0xffff) as i32;
        let max = (attr.raw >> 32 & 0xffff) as i32;

        if min <= current && current <= max {
            Ok(Temperature {
                current: Some(current),
                min: Some(min),
                max: Some(max),
            })
        } else {
            // structurally present but inconsistent; a garbage raw field
            // must not surface as a real reading
            Ok(Temperature {
                current: None,
                min: None,
                max: None,
            })
        }
    }

    /// Power-on time, raw field verbatim. The unit (hours or minutes) is
    /// whatever the device reports; no normalization happens here.
    pub fn power_on_hours(&self, attrs: &[SmartAttr]) -> Result<u64, SmartError> {
        let (_, attr) = self.lookup(attrs, AttrType::PowerOnHours)?;
        Ok(attr.raw)
    }
}

// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Decoders for the response data of SCSI diagnostic and configuration
//! commands (LOG SENSE, MODE SENSE, READ DEFECT DATA, INQUIRY, READ
//! CAPACITY, RECEIVE DIAGNOSTIC RESULTS) and for ATA SMART attribute
//! tables.
//!
//! Everything operates on an already-framed, in-memory byte buffer; issuing
//! the commands and shuttling the bytes is someone else's job. Device
//! output is routinely truncated or self-inconsistent, so the decoders are
//! built around one policy: decode what is verifiably present, never read
//! past the buffer, and surface every byte range that could not be
//! interpreted verbatim rather than dropping it. Only a buffer too short
//! for the fixed minimum header of a structure is a hard error.
//!
//! Decoding is synchronous and stateless; results borrow the input buffer
//! and decoding the same buffer twice yields identical output.

use thiserror::Error as ThisError;

pub mod bytes;
pub mod capacity;
pub mod cursor;
pub mod defect;
pub mod diagnostics;
pub mod inquiry;
pub mod log_sense;
pub mod mode_sense;
pub mod records;
pub mod smart;

/// The one hard decode failure: the buffer cannot hold even the fixed
/// minimum header of the structure, so nothing can be extracted. Declared
/// lengths that overrun the buffer are not errors; those regions are
/// clamped and the remainder reported unparsed.
#[derive(Debug, PartialEq, Eq, Clone, Copy, ThisError)]
pub enum ParseError {
    #[error("buffer of {actual} bytes is shorter than the {expected}-byte minimum header")]
    TooShort { expected: usize, actual: usize },
}

// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Generic walk over a list of variable-length, self-length-prefixed
//! records inside a bounded region.
//!
//! LOG SENSE parameters and MODE SENSE pages both have this shape: a small
//! fixed header containing a length field, followed by that many bytes of
//! body, followed immediately by the next record. The iterator yields a
//! record only when both its header and its declared body fit entirely in
//! the remaining region; the first candidate that would overrun ends
//! iteration silently. Truncated device output therefore produces a short
//! list, never an over-read.

pub struct Records<'a, F> {
    rest: &'a [u8],
    header_len: usize,
    record_len: F,
}

impl<'a, F> Records<'a, F>
where
    F: Fn(&'a [u8]) -> Option<usize>,
{
    /// `header_len` is the minimum prefix needed before `record_len` may be
    /// called; `record_len` returns the total record length (header
    /// included) declared by that prefix, or `None` if the header itself is
    /// malformed.
    pub fn new(region: &'a [u8], header_len: usize, record_len: F) -> Self {
        Self {
            rest: region,
            header_len,
            record_len,
        }
    }
}

impl<'a, F> Iterator for Records<'a, F>
where
    F: Fn(&'a [u8]) -> Option<usize>,
{
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.rest.len() < self.header_len {
            return None;
        }
        let total = match (self.record_len)(self.rest) {
            Some(total) if total > 0 && total <= self.rest.len() => total,
            // malformed length or declared body overruns the region
            _ => {
                self.rest = &[];
                return None;
            }
        };
        let (record, rest) = self.rest.split_at(total);
        self.rest = rest;
        Some(record)
    }
}

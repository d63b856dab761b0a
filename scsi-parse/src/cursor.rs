// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! A length-aware view over a response buffer.
//!
//! Every decoder in this crate reads declared lengths out of the buffer it
//! is decoding (page lengths, parameter lengths, defect list lengths), and
//! none of those declarations can be trusted: device firmware truncates,
//! pads, and occasionally lies. The cursor is the one place where a declared
//! length is reconciled against the real buffer length. Requests for a
//! sub-region are clamped to what is actually present, so callers decode as
//! much as verifiably exists and report the remainder as unparsed instead
//! of over-reading or aborting.

/// A `(buffer, offset)` pair. The offset never exceeds the buffer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Total length of the underlying buffer, independent of the offset.
    pub fn total_len(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Whether `width` more bytes fit at the current offset.
    pub fn fits(&self, width: usize) -> bool {
        width <= self.remaining()
    }

    /// A cursor positioned `offset` bytes past this one, or `None` if that
    /// would leave the buffer.
    pub fn at(&self, offset: usize) -> Option<Cursor<'a>> {
        let new_offset = self.offset.checked_add(offset)?;
        if new_offset > self.buf.len() {
            return None;
        }
        Some(Cursor {
            buf: self.buf,
            offset: new_offset,
        })
    }

    /// The sub-region starting `offset` bytes past the current position with
    /// a *declared* length of `len` bytes, clamped to the bytes actually
    /// present. A region starting past the end of the buffer is empty.
    pub fn sub_region(&self, offset: usize, len: usize) -> &'a [u8] {
        let start = usize::min(self.offset.saturating_add(offset), self.buf.len());
        let end = usize::min(start.saturating_add(len), self.buf.len());
        &self.buf[start..end]
    }

    /// Everything from the current offset to the end of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.offset..]
    }
}

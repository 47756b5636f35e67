/***************************************************************************************************
 * Copyright (c) 2021-2024 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * streamcodec input adapter
 *
 * A cursor over a byte source, generalizing `tps_minicbor::decode::SequenceBuffer` /
 * `within()` / `read_extent()` with the padded multi-byte reads the CBOR and JSON parsers both
 * need for branchless hot loops, and a bounded unread operation for the JSON number lexer's
 * one-byte look-back.
 **************************************************************************************************/
use crate::error::{CodecError, Result};
use crate::position::Position;

/// The maximum distance `unread` can step the cursor back, matching the JSON lexer's need for a
/// single byte of look-back when a number's end is not yet visible.
pub const MAX_UNREAD: usize = 255;

/// A cursor over an in-memory byte source.
///
/// `Input` never seeks backwards except through [`Input::unread`], and never holds more than the
/// borrowed slice it was constructed from: there is no internal buffering.
#[derive(Debug, Copy, Clone)]
pub struct Input<'buf> {
    bytes: &'buf [u8],
    cursor: usize,
}

impl<'buf> Input<'buf> {
    /// Construct an `Input` positioned at the start of `bytes`.
    #[must_use]
    pub fn new(bytes: &'buf [u8]) -> Self {
        Input { bytes, cursor: 0 }
    }

    /// The current cursor offset from the start of the source.
    #[must_use]
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The current cursor as a diagnostic [`Position`].
    #[must_use]
    #[inline]
    pub fn position(&self) -> Position {
        Position::at(self.cursor)
    }

    /// The number of bytes remaining between the cursor and the end of the source.
    #[must_use]
    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    /// `true` once the cursor has reached the end of the source.
    #[must_use]
    #[inline]
    pub fn at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    /// Move the cursor directly to `pos`, used when a caller has located the next token boundary
    /// by scanning the underlying slice itself (see the JSON string fast path) rather than reading
    /// byte-by-byte.
    ///
    /// # Panics
    /// Panics if `pos` exceeds the length of the source.
    pub fn seek(&mut self, pos: usize) {
        assert!(pos <= self.bytes.len(), "seek target past end of input");
        self.cursor = pos;
    }

    /// Read one byte and advance the cursor, or fail with `UnexpectedEndOfInput`.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self
            .bytes
            .get(self.cursor)
            .ok_or_else(|| CodecError::UnexpectedEndOfInput(self.position()))?;
        self.cursor += 1;
        Ok(b)
    }

    /// Peek at the byte under the cursor without advancing.
    #[must_use]
    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    /// Read a big-endian `u16` and advance the cursor, or fail with `UnexpectedEndOfInput`.
    pub fn read_be_u16(&mut self) -> Result<u16> {
        let bytes = self.read_extent(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Read a big-endian `u32` and advance the cursor, or fail with `UnexpectedEndOfInput`.
    pub fn read_be_u32(&mut self) -> Result<u32> {
        let bytes = self.read_extent(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Read a big-endian `u64` and advance the cursor, or fail with `UnexpectedEndOfInput`.
    pub fn read_be_u64(&mut self) -> Result<u64> {
        let bytes = self.read_extent(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Read exactly `len` bytes and advance the cursor, or fail with `UnexpectedEndOfInput`.
    pub fn read_slice(&mut self, len: usize) -> Result<&'buf [u8]> {
        self.read_extent(len)
    }

    fn read_extent(&mut self, len: usize) -> Result<&'buf [u8]> {
        if self.cursor + len > self.bytes.len() {
            return Err(CodecError::UnexpectedEndOfInput(self.position()));
        }
        let slice = &self.bytes[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    /// Read a fixed-size word, padding with `0xFF` bytes when the input runs out before `N` bytes
    /// are available. The cursor advances only past the bytes that genuinely existed.
    ///
    /// Returns `([u8; N], available)` where `available` is how many of the `N` bytes were read
    /// from the real input (the rest are `0xFF` padding). Callers that need a hard failure on
    /// short input should compare `available` against `N` themselves; this lets hot loops fetch a
    /// full machine word unconditionally and branch only once, rather than bounds-checking every
    /// byte of the word as it is produced.
    pub fn read_padded<const N: usize>(&mut self) -> ([u8; N], usize) {
        let mut word = [0xFFu8; N];
        let available = core::cmp::min(N, self.remaining());
        word[..available].copy_from_slice(&self.bytes[self.cursor..self.cursor + available]);
        self.cursor += available;
        (word, available)
    }

    /// Step the cursor back by `n` bytes (`n <= `[`MAX_UNREAD`]`). Used by the JSON number lexer
    /// when it has read one byte past the end of a numeric literal to discover that the literal
    /// ended.
    ///
    /// # Panics
    /// Panics if `n` exceeds [`MAX_UNREAD`] or would move the cursor before the start of input;
    /// both indicate a parser bug rather than malformed input.
    pub fn unread(&mut self, n: usize) {
        assert!(n <= MAX_UNREAD, "unread distance exceeds MAX_UNREAD");
        assert!(n <= self.cursor, "unread would move cursor before start of input");
        self.cursor -= n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_cursor() {
        let mut input = Input::new(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(input.read_u8().unwrap(), 0x01);
        assert_eq!(input.cursor(), 1);
        assert_eq!(input.read_be_u16().unwrap(), 0x0203);
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn short_input_is_end_of_input() {
        let mut input = Input::new(&[0x01]);
        assert!(matches!(
            input.read_be_u16(),
            Err(CodecError::UnexpectedEndOfInput(_))
        ));
        // A failed multi-byte read must not partially advance the cursor.
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn padded_read_reports_available_and_pads_with_0xff() {
        let mut input = Input::new(&[0xAA, 0xBB]);
        let (word, available) = input.read_padded::<8>();
        assert_eq!(available, 2);
        assert_eq!(&word[..2], &[0xAA, 0xBB]);
        assert_eq!(&word[2..], &[0xFF; 6]);
        assert!(input.at_end());
    }

    #[test]
    fn unread_rewinds_cursor() {
        let mut input = Input::new(&[1, 2, 3]);
        input.read_u8().unwrap();
        input.read_u8().unwrap();
        input.unread(1);
        assert_eq!(input.cursor(), 1);
        assert_eq!(input.read_u8().unwrap(), 2);
    }

    #[test]
    #[should_panic]
    fn unread_past_start_panics() {
        let mut input = Input::new(&[1, 2, 3]);
        input.unread(1);
    }
}

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
 * streamcodec output adapter
 *
 * An append-only byte sink, the renderer-side mirror of `Input`. `Output` is a trait so that the
 * renderers can write into a grow-on-demand `Vec<u8>`, a fixed-capacity caller buffer, or any
 * other caller-provided sink without the renderer code needing to know which.
 **************************************************************************************************/
use crate::error::{CodecError, Result};
use crate::position::Position;

/// Append-only byte sink consumed by both renderers.
///
/// Implementations must be append-only: once written, bytes are never revisited (the renderers
/// never need to patch a length prefix after the fact, since `ArrayHeader`/`MapHeader` carry a
/// known count up front).
pub trait Output {
    /// Append a single byte.
    fn write_u8(&mut self, byte: u8) -> Result<()>;

    /// Append a big-endian `u16`.
    fn write_be_u16(&mut self, v: u16) -> Result<()> {
        self.write_slice(&v.to_be_bytes())
    }

    /// Append a big-endian `u32`.
    fn write_be_u32(&mut self, v: u32) -> Result<()> {
        self.write_slice(&v.to_be_bytes())
    }

    /// Append a big-endian `u64`.
    fn write_be_u64(&mut self, v: u64) -> Result<()> {
        self.write_slice(&v.to_be_bytes())
    }

    /// Append a byte slice.
    fn write_slice(&mut self, bytes: &[u8]) -> Result<()>;

    /// Append a string as raw ASCII bytes.
    ///
    /// # Precondition
    /// Every code unit of `s` must be `<= 0x7F`. Callers (the JSON renderer, after escaping) are
    /// responsible for upholding this; violating it does not corrupt the sink but does corrupt
    /// the resulting document, so debug builds assert it.
    fn write_ascii(&mut self, s: &str) -> Result<()> {
        debug_assert!(s.bytes().all(|b| b <= 0x7F), "write_ascii given non-ASCII text");
        self.write_slice(s.as_bytes())
    }

    /// The number of bytes written so far, used only for diagnostics.
    fn position(&self) -> Position;
}

/// A grow-on-demand byte sink backed by a `Vec<u8>`. The default sink for encoding into an owned
/// buffer.
#[derive(Debug, Default, Clone)]
pub struct VecOutput {
    buf: alloc::vec::Vec<u8>,
}

impl VecOutput {
    /// Construct an empty sink with the given initial capacity (see the `bufferSize` encoding
    /// option).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        VecOutput {
            buf: alloc::vec::Vec::with_capacity(capacity),
        }
    }

    /// Wrap an existing buffer (e.g. one reclaimed from the encoding buffer cache) as a sink,
    /// appending after whatever it already contains.
    #[must_use]
    pub fn from_vec(buf: alloc::vec::Vec<u8>) -> Self {
        VecOutput { buf }
    }

    /// Consume the sink, returning the accumulated bytes.
    #[must_use]
    pub fn into_vec(self) -> alloc::vec::Vec<u8> {
        self.buf
    }

    /// Borrow the accumulated bytes without consuming the sink.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Output for VecOutput {
    fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.buf.push(byte);
        Ok(())
    }

    fn write_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn position(&self) -> Position {
        Position::at(self.buf.len())
    }
}

/// A fixed-capacity sink over a caller-provided `&mut [u8]`, for callers (typically embedded or
/// `no_std` users) who want to encode without an allocator. Writing past the end of the buffer
/// fails with `Overflow` rather than growing.
#[derive(Debug)]
pub struct SliceOutput<'buf> {
    buf: &'buf mut [u8],
    len: usize,
}

impl<'buf> SliceOutput<'buf> {
    /// Wrap `buf` as an initially-empty sink.
    #[must_use]
    pub fn new(buf: &'buf mut [u8]) -> Self {
        SliceOutput { buf, len: 0 }
    }

    /// The bytes written so far.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<'buf> Output for SliceOutput<'buf> {
    fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.write_slice(&[byte])
    }

    fn write_slice(&mut self, bytes: &[u8]) -> Result<()> {
        if self.len + bytes.len() > self.buf.len() {
            return Err(CodecError::Overflow(
                Position::at(self.len),
                "output buffer capacity exceeded",
            ));
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    fn position(&self) -> Position {
        Position::at(self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_output_accumulates_bytes() {
        let mut out = VecOutput::default();
        out.write_u8(0x01).unwrap();
        out.write_be_u16(0x0203).unwrap();
        out.write_slice(&[0xAA, 0xBB]).unwrap();
        assert_eq!(out.into_vec(), vec![0x01, 0x02, 0x03, 0xAA, 0xBB]);
    }

    #[test]
    fn slice_output_rejects_overflow() {
        let mut buf = [0u8; 2];
        let mut out = SliceOutput::new(&mut buf);
        out.write_u8(1).unwrap();
        out.write_u8(2).unwrap();
        assert!(matches!(out.write_u8(3), Err(CodecError::Overflow(_, _))));
    }
}

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
//! Byte-accurate CBOR (RFC 7049 / RFC 8949) parser and renderer.

pub mod parser;
pub mod renderer;

pub use parser::CborParser;
pub use renderer::CborRenderer;

/// Bit layout constants for a CBOR initial byte (major type in the top 3 bits, additional
/// information in the bottom 5). Named the way `tps_minicbor`'s `constants` module is referenced
/// from `decode.rs` (`AI_MASK`, `PAYLOAD_*`), generalized to cover every major type rather than
/// just unsigned integers.
pub(crate) mod constants {
    pub const MAJOR_SHIFT: u8 = 5;
    pub const AI_MASK: u8 = 0x1F;

    pub const MT_UNSIGNED: u8 = 0;
    pub const MT_NEGATIVE: u8 = 1;
    pub const MT_BYTES: u8 = 2;
    pub const MT_TEXT: u8 = 3;
    pub const MT_ARRAY: u8 = 4;
    pub const MT_MAP: u8 = 5;
    pub const MT_TAG: u8 = 6;
    pub const MT_SPECIAL: u8 = 7;

    /// AI values `0..=23` carry their own value inline.
    pub const PAYLOAD_AI_BITS: u8 = 23;
    pub const PAYLOAD_ONE_BYTE: u8 = 24;
    pub const PAYLOAD_TWO_BYTES: u8 = 25;
    pub const PAYLOAD_FOUR_BYTES: u8 = 26;
    pub const PAYLOAD_EIGHT_BYTES: u8 = 27;
    /// AI values `28..=30` are reserved in every major type.
    pub const AI_RESERVED_LOW: u8 = 28;
    pub const AI_RESERVED_HIGH: u8 = 30;
    /// AI value `31` means "indefinite length" for major types 2-5, and "break" for major type 7.
    pub const AI_INDEFINITE: u8 = 31;

    pub const SIMPLE_FALSE: u8 = 20;
    pub const SIMPLE_TRUE: u8 = 21;
    pub const SIMPLE_NULL: u8 = 22;
    pub const SIMPLE_UNDEFINED: u8 = 23;

    pub const FLOAT16: u8 = 25;
    pub const FLOAT32: u8 = 26;
    pub const FLOAT64: u8 = 27;
}

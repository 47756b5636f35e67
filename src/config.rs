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
 * streamcodec configuration surface
 *
 * Every tunable the reader/writer facade or either codec exposes. Grouped the way §6 of the
 * design groups them: shared vs. per-format, encode vs. decode.
 **************************************************************************************************/

/// Options shared by both renderers when encoding.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EncodingOptions {
    /// Initial capacity reserved in the output buffer, in bytes. Must be at least 8.
    pub buffer_size: usize,
    /// Whether a released output buffer may be returned to the process-wide buffer cache (see
    /// [`crate::writer::Writer`]) for reuse by a later `Writer`.
    pub allow_buffer_caching: bool,
    /// The largest buffer the cache will retain; larger buffers are dropped instead of cached.
    pub max_buffer_size: usize,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        EncodingOptions {
            buffer_size: 256,
            allow_buffer_caching: true,
            max_buffer_size: 1 << 20,
        }
    }
}

/// CBOR-only encoding options.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CborEncodingOptions {
    /// When `true` (the default), `Double` values that round-trip losslessly through a smaller
    /// IEEE-754 width are written in that smaller width (see §4.3's float compression policy).
    pub compress_floating_point_values: bool,
    /// Reject encoding an array header whose declared length exceeds this value.
    pub max_array_length: usize,
    /// Reject encoding a map header whose declared length exceeds this value.
    pub max_map_length: usize,
    /// Reject encoding past this many nested container levels.
    pub max_nesting_levels: usize,
}

impl Default for CborEncodingOptions {
    fn default() -> Self {
        CborEncodingOptions {
            compress_floating_point_values: true,
            max_array_length: usize::MAX,
            max_map_length: usize::MAX,
            max_nesting_levels: 1000,
        }
    }
}

/// JSON-only encoding options.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct JsonEncodingOptions {
    /// Number of spaces to indent each nesting level with; `0` (the default) disables
    /// indentation and all other insignificant whitespace.
    pub indent: usize,
}

/// Options shared by both parsers when decoding.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct DecodingOptions {
    /// Let [`crate::reader::Reader::read_long`]-style wide-integer reads also accept `Int`/`Long`
    /// in place of a floating-point kind.
    pub read_integers_also_as_floating_point: bool,
    /// Let [`crate::reader::Reader::read_float`] accept `Double` (narrowing) as well as
    /// `Float16`/`Float`/`NumberString`.
    pub read_double_also_as_float: bool,
}

/// CBOR-only decoding options.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CborDecodingOptions {
    /// Reject a text string whose byte length exceeds this value.
    pub max_text_string_length: usize,
    /// Reject a byte string whose length exceeds this value.
    pub max_byte_string_length: usize,
    /// Reject an array header declaring more than this many elements.
    pub max_array_length: usize,
    /// Reject a map header declaring more than this many pairs.
    pub max_map_length: usize,
    /// Reject input nested more than this many levels deep.
    pub max_nesting_levels: usize,
}

impl Default for CborDecodingOptions {
    fn default() -> Self {
        CborDecodingOptions {
            max_text_string_length: usize::MAX,
            max_byte_string_length: usize::MAX,
            max_array_length: usize::MAX,
            max_map_length: usize::MAX,
            max_nesting_levels: 1000,
        }
    }
}

/// JSON-only decoding options.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct JsonDecodingOptions {
    /// Reject a number literal whose decimal exponent magnitude exceeds this value.
    pub max_number_abs_exponent: i32,
    /// Reject a string literal longer than this many bytes.
    pub max_string_length: usize,
    /// Reject a number literal with more than this many significant mantissa digits.
    pub max_number_mantissa_digits: u32,
    /// Initial capacity of the reusable char buffer used while decoding escaped strings.
    pub initial_charbuffer_size: usize,
    /// When `true`, every number with a fractional part or exponent is delivered as
    /// `NumberString` rather than attempting a `Double`/`Float` conversion.
    pub read_decimal_numbers_only_as_number_strings: bool,
}

impl Default for JsonDecodingOptions {
    fn default() -> Self {
        JsonDecodingOptions {
            max_number_abs_exponent: 64,
            max_string_length: usize::MAX,
            max_number_mantissa_digits: 34,
            initial_charbuffer_size: 32,
            read_decimal_numbers_only_as_number_strings: false,
        }
    }
}

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
 * streamcodec CBOR parser
 *
 * A flat, single-item-at-a-time pull parser. Where `tps_minicbor::decode::parse_item` recurses
 * into arrays/maps/tags and hands back a fully-formed `CBOR<'buf>` tree, this parser never
 * recurses: an indefinite-length container's member items are just the next items in the byte
 * stream, so emitting `ArrayStart`/`MapStart`/`TextStart`/`BytesStart` and leaving nesting to the
 * caller (normally [`crate::validator::Validator`]) is sufficient. A definite-length header
 * (`ArrayHeader(n)`/`MapHeader(n)`) is likewise just the count; the `n` items that follow are
 * ordinary subsequent calls to [`CborParser::next`].
 **************************************************************************************************/
use alloc::borrow::Cow;
use core::str;

use super::constants::*;
use crate::config::CborDecodingOptions;
use crate::error::{CodecError, Result};
use crate::event::Event;
use crate::input::Input;
use crate::position::Position;
use crate::tag::Tag;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Pulls one [`Event`] at a time out of a CBOR-encoded byte slice.
pub struct CborParser<'buf> {
    input: Input<'buf>,
    options: CborDecodingOptions,
}

/// The additional-information payload of an initial byte, generalized across every major type
/// that uses the `0..=27` / `31` encoding (everything except major type 7, whose additional
/// information has its own meaning per value).
enum Argument {
    Value(u64),
    Indefinite,
}

impl<'buf> CborParser<'buf> {
    /// Construct a parser over `bytes` using `options` to bound string/array/map sizes.
    #[must_use]
    pub fn new(bytes: &'buf [u8], options: CborDecodingOptions) -> Self {
        CborParser {
            input: Input::new(bytes),
            options,
        }
    }

    /// The parser's current byte offset, for diagnostics.
    #[must_use]
    pub fn position(&self) -> Position {
        self.input.position()
    }

    /// `true` once every byte of the input has been consumed.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.input.at_end()
    }

    /// Parse and return the next data item, or [`Event::EndOfInput`] if the input is exhausted.
    #[cfg_attr(feature = "trace", trace)]
    pub fn next(&mut self) -> Result<Event<'buf>> {
        if self.input.at_end() {
            return Ok(Event::EndOfInput);
        }
        let initial = self.input.read_u8()?;
        let major = initial >> MAJOR_SHIFT;
        let ai = initial & AI_MASK;

        match major {
            MT_UNSIGNED => self.parse_uint(ai, false),
            MT_NEGATIVE => self.parse_uint(ai, true),
            MT_BYTES => self.parse_byte_string(ai),
            MT_TEXT => self.parse_text_string(ai),
            MT_ARRAY => self.parse_array_header(ai),
            MT_MAP => self.parse_map_header(ai),
            MT_TAG => self.parse_tag(ai),
            MT_SPECIAL => self.parse_special(ai),
            _ => unreachable!("major type is masked to 3 bits"),
        }
    }

    /// Read the additional-information argument following an initial byte whose major type uses
    /// the standard `0..=23` inline / `24..=27` extended-width / `28..=30` reserved / `31`
    /// indefinite encoding.
    fn read_argument(&mut self, ai: u8) -> Result<Argument> {
        match ai {
            0..=PAYLOAD_AI_BITS => Ok(Argument::Value(ai as u64)),
            PAYLOAD_ONE_BYTE => Ok(Argument::Value(self.input.read_u8()? as u64)),
            PAYLOAD_TWO_BYTES => Ok(Argument::Value(self.input.read_be_u16()? as u64)),
            PAYLOAD_FOUR_BYTES => Ok(Argument::Value(self.input.read_be_u32()? as u64)),
            PAYLOAD_EIGHT_BYTES => Ok(Argument::Value(self.input.read_be_u64()?)),
            AI_RESERVED_LOW..=AI_RESERVED_HIGH => Err(CodecError::InvalidInputData(
                self.input.position(),
                "reserved additional information value",
            )),
            AI_INDEFINITE => Ok(Argument::Indefinite),
            _ => unreachable!("additional information is masked to 5 bits"),
        }
    }

    fn parse_uint(&mut self, ai: u8, negative: bool) -> Result<Event<'buf>> {
        let value = match self.read_argument(ai)? {
            Argument::Value(v) => v,
            Argument::Indefinite => {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "indefinite length is not valid for an integer",
                ))
            }
        };
        Ok(classify_integer(value, negative))
    }

    fn parse_byte_string(&mut self, ai: u8) -> Result<Event<'buf>> {
        match self.read_argument(ai)? {
            Argument::Indefinite => Ok(Event::BytesStart),
            Argument::Value(len) => {
                let len = self.checked_len(len, self.options.max_byte_string_length)?;
                let bytes = self.input.read_slice(len)?;
                Ok(Event::Bytes(Cow::Borrowed(bytes)))
            }
        }
    }

    fn parse_text_string(&mut self, ai: u8) -> Result<Event<'buf>> {
        match self.read_argument(ai)? {
            Argument::Indefinite => Ok(Event::TextStart),
            Argument::Value(len) => {
                let len = self.checked_len(len, self.options.max_text_string_length)?;
                let start = self.input.position();
                let bytes = self.input.read_slice(len)?;
                let text = str::from_utf8(bytes)
                    .map_err(|_| CodecError::InvalidInputData(start, "text string is not valid UTF-8"))?;
                Ok(Event::String(Cow::Borrowed(text)))
            }
        }
    }

    fn parse_array_header(&mut self, ai: u8) -> Result<Event<'buf>> {
        match self.read_argument(ai)? {
            Argument::Indefinite => Ok(Event::ArrayStart),
            Argument::Value(n) => {
                let n = self.checked_len(n, self.options.max_array_length)?;
                Ok(Event::ArrayHeader(n as u64))
            }
        }
    }

    fn parse_map_header(&mut self, ai: u8) -> Result<Event<'buf>> {
        match self.read_argument(ai)? {
            Argument::Indefinite => Ok(Event::MapStart),
            Argument::Value(n) => {
                let n = self.checked_len(n, self.options.max_map_length)?;
                Ok(Event::MapHeader(n as u64))
            }
        }
    }

    fn parse_tag(&mut self, ai: u8) -> Result<Event<'buf>> {
        let value = match self.read_argument(ai)? {
            Argument::Value(v) => v,
            Argument::Indefinite => {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "indefinite length is not valid for a tag",
                ))
            }
        };
        Ok(Event::Tag(Tag::from_value(value)))
    }

    fn parse_special(&mut self, ai: u8) -> Result<Event<'buf>> {
        match ai {
            0..=19 => Ok(Event::SimpleValue(ai)),
            SIMPLE_FALSE => Ok(Event::Boolean(false)),
            SIMPLE_TRUE => Ok(Event::Boolean(true)),
            SIMPLE_NULL => Ok(Event::Null),
            SIMPLE_UNDEFINED => Ok(Event::Undefined),
            PAYLOAD_ONE_BYTE => {
                let v = self.input.read_u8()?;
                if v < 32 {
                    return Err(CodecError::InvalidInputData(
                        self.input.position(),
                        "simple value 0-31 must use the inline form",
                    ));
                }
                Ok(Event::SimpleValue(v))
            }
            FLOAT16 => {
                let bits = self.input.read_be_u16()?;
                Ok(Event::Float16(half::f16::from_bits(bits).to_f32()))
            }
            FLOAT32 => {
                let bits = self.input.read_be_u32()?;
                Ok(Event::Float(f32::from_bits(bits)))
            }
            FLOAT64 => {
                let bits = self.input.read_be_u64()?;
                Ok(Event::Double(f64::from_bits(bits)))
            }
            AI_RESERVED_LOW..=AI_RESERVED_HIGH => Err(CodecError::InvalidInputData(
                self.input.position(),
                "reserved additional information value",
            )),
            AI_INDEFINITE => Ok(Event::Break),
            _ => unreachable!("additional information is masked to 5 bits"),
        }
    }

    fn checked_len(&self, len: u64, max: usize) -> Result<usize> {
        let len = usize::try_from(len).map_err(|_| {
            CodecError::Overflow(self.input.position(), "declared length exceeds platform usize")
        })?;
        if len > max {
            return Err(CodecError::Overflow(
                self.input.position(),
                "declared length exceeds configured maximum",
            ));
        }
        Ok(len)
    }
}

/// An unsigned major-type-0/1 argument resolves to `Int` when it fits in `i32`, `Long` when it
/// fits in `i64`, and `OverLong` otherwise (mirroring `tps_minicbor::decode::AnyUnsigned`, but
/// widened one more step since `Event` has no 32-bit-unsigned variant of its own).
fn classify_integer(value: u64, negative: bool) -> Event<'static> {
    // The represented value of a negative (major type 1) item is `-1 - value`; this can underflow
    // i64 well before `value` overflows u64, so OverLong's own negative magnitude form is used
    // whenever the represented value would not fit in i64.
    if negative {
        if value <= i64::MAX as u64 {
            let represented = -1i64 - value as i64;
            if let Ok(v) = i32::try_from(represented) {
                return Event::Int(v);
            }
            return Event::Long(represented);
        }
        return Event::OverLong { value, negative: true };
    }
    if let Ok(v) = i32::try_from(value) {
        return Event::Int(v);
    }
    if let Ok(v) = i64::try_from(value) {
        return Event::Long(v);
    }
    Event::OverLong { value, negative: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(bytes: &[u8]) -> CborParser<'_> {
        CborParser::new(bytes, CborDecodingOptions::default())
    }

    #[test]
    fn small_unsigned_integer() {
        let mut p = parser(&[0x17]);
        assert_eq!(p.next().unwrap(), Event::Int(23));
        assert_eq!(p.next().unwrap(), Event::EndOfInput);
    }

    #[test]
    fn one_byte_unsigned_integer() {
        let mut p = parser(&[0x18, 0xFF]);
        assert_eq!(p.next().unwrap(), Event::Int(255));
    }

    #[test]
    fn negative_integer() {
        let mut p = parser(&[0x20]);
        assert_eq!(p.next().unwrap(), Event::Int(-1));
    }

    #[test]
    fn overlong_positive_integer() {
        let mut p = parser(&[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(
            p.next().unwrap(),
            Event::OverLong { value: u64::MAX, negative: false }
        );
    }

    #[test]
    fn overlong_negative_integer() {
        // -18446744073709551616, i.e. -1 - u64::MAX, does not fit in any signed width streamcodec
        // carries, so it must surface as OverLong even though its magnitude argument is u64::MAX.
        let mut p = parser(&[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(
            p.next().unwrap(),
            Event::OverLong { value: u64::MAX, negative: true }
        );
    }

    #[test]
    fn definite_text_string() {
        let mut p = parser(&[0x63, b'a', b'b', b'c']);
        assert_eq!(p.next().unwrap(), Event::String(Cow::Borrowed("abc")));
    }

    #[test]
    fn indefinite_byte_string_round_trips_as_start_then_chunks_then_break() {
        let mut p = parser(&[0x5f, 0x42, 0xAA, 0xBB, 0xff]);
        assert_eq!(p.next().unwrap(), Event::BytesStart);
        assert_eq!(p.next().unwrap(), Event::Bytes(Cow::Borrowed(&[0xAA, 0xBB][..])));
        assert_eq!(p.next().unwrap(), Event::Break);
    }

    #[test]
    fn definite_array_header_then_elements() {
        let mut p = parser(&[0x82, 0x01, 0x02]);
        assert_eq!(p.next().unwrap(), Event::ArrayHeader(2));
        assert_eq!(p.next().unwrap(), Event::Int(1));
        assert_eq!(p.next().unwrap(), Event::Int(2));
    }

    #[test]
    fn indefinite_map_start_and_break() {
        let mut p = parser(&[0xbf, 0xff]);
        assert_eq!(p.next().unwrap(), Event::MapStart);
        assert_eq!(p.next().unwrap(), Event::Break);
    }

    #[test]
    fn tag_wraps_next_item() {
        let mut p = parser(&[0xc1, 0x1a, 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(p.next().unwrap(), Event::Tag(Tag::EpochDateTime));
        assert_eq!(p.next().unwrap(), Event::Int(1));
    }

    #[test]
    fn float_widths() {
        assert_eq!(parser(&[0xf9, 0x3c, 0x00]).next().unwrap(), Event::Float16(1.0));
        assert_eq!(parser(&[0xfa, 0x3f, 0x80, 0x00, 0x00]).next().unwrap(), Event::Float(1.0));
        assert_eq!(
            parser(&[0xfb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]).next().unwrap(),
            Event::Double(1.0)
        );
    }

    #[test]
    fn simple_value_one_byte_form_rejects_reserved_range() {
        let mut p = parser(&[0xf8, 0x05]);
        assert!(matches!(p.next(), Err(CodecError::InvalidInputData(_, _))));
    }

    #[test]
    fn reserved_additional_information_is_fatal() {
        let mut p = parser(&[0x1c]);
        assert!(matches!(p.next(), Err(CodecError::InvalidInputData(_, _))));
    }

    #[test]
    fn byte_string_over_configured_limit_is_rejected() {
        let mut options = CborDecodingOptions::default();
        options.max_byte_string_length = 1;
        let mut p = CborParser::new(&[0x42, 0xAA, 0xBB], options);
        assert!(matches!(p.next(), Err(CodecError::Overflow(_, _))));
    }
}

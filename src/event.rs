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
 * streamcodec data-item event
 *
 * `Event` is the universal intermediate representation produced by both parsers and consumed by
 * both renderers. It generalizes `tps_minicbor`'s `ast::CBOR` enum (itself a tagged union over
 * CBOR's major types) to the 24-member vocabulary required to also carry JSON's streaming
 * lexer output: indefinite-length start/break markers, a lossless `NumberString` fallback, and a
 * zero-copy `Chars` slice for streaming string fragments.
 **************************************************************************************************/
use alloc::borrow::Cow;

use crate::kind::Kind;
use crate::tag::Tag;

/// One atomic unit emitted by a parser or consumed by a renderer.
///
/// `Event` borrows from the underlying input buffer wherever the format allows: CBOR byte and
/// text strings borrow directly, while JSON strings borrow only when no escape sequence forced a
/// copy. Where a payload had to be decoded into owned storage the `Cow` is `Owned`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'buf> {
    /// The JSON/CBOR `null` value.
    Null,
    /// The CBOR `undefined` simple value; never produced by the JSON parser.
    Undefined,
    /// A `true`/`false` value.
    Boolean(bool),
    /// An integer in signed 32-bit range.
    Int(i32),
    /// An integer outside `i32` range but within signed 64-bit range.
    Long(i64),
    /// An integer outside signed 64-bit range, in 2's complement magnitude form.
    ///
    /// `negative` mirrors CBOR major type 1's encoding: the represented value is `-1 - value` when
    /// `negative` is set, and `value` otherwise.
    OverLong { value: u64, negative: bool },
    /// A half-precision float, lifted to `f32` on output from any parser; the kind alone records
    /// that the wire form was 16-bit.
    Float16(f32),
    /// A single-precision float.
    Float(f32),
    /// A double-precision float.
    Double(f64),
    /// A JSON numeric literal preserved verbatim because committing to a binary representation
    /// would lose precision (see [`crate::json::numbers`]).
    NumberString(Cow<'buf, str>),
    /// A complete text value, held as a UTF-16-safe Rust `str`.
    String(Cow<'buf, str>),
    /// A zero-copy slice of a `String`'s content, used while streaming an indefinite-length text
    /// item without requiring the caller to materialize the whole string.
    Chars(Cow<'buf, str>),
    /// A complete UTF-8 text value, addressed at the byte level (used when a decoder wants the
    /// raw bytes rather than a validated `str`, e.g. while buffering).
    Text(Cow<'buf, [u8]>),
    /// Begins an indefinite-length text stream; member events are `String | Chars | Text |
    /// TextStart | Break` until the matching `Break`.
    TextStart,
    /// A complete byte string.
    Bytes(Cow<'buf, [u8]>),
    /// Begins an indefinite-length byte stream; member events are `Bytes | BytesStart | Break`
    /// until the matching `Break`.
    BytesStart,
    /// A definite-length array header: exactly `n` further elements follow at this level.
    ArrayHeader(u64),
    /// Begins an indefinite-length array; elements follow until the matching `Break`.
    ArrayStart,
    /// A definite-length map header: exactly `2*n` further elements (alternating key/value)
    /// follow at this level.
    MapHeader(u64),
    /// Begins an indefinite-length map; key/value pairs follow until the matching `Break`.
    MapStart,
    /// Terminates the innermost indefinite-length container.
    Break,
    /// A CBOR semantic tag; always followed by exactly one data item.
    Tag(Tag),
    /// A CBOR simple value in `0..=255`, excluding those with dedicated kinds (`Boolean`, `Null`,
    /// `Undefined`) and the reserved range `24..=31`.
    SimpleValue(u8),
    /// Sentinel event returned once the input is fully consumed.
    EndOfInput,
}

impl<'buf> Event<'buf> {
    /// The [`Kind`] discriminant of this event, independent of its payload.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Event::Null => Kind::Null,
            Event::Undefined => Kind::Undefined,
            Event::Boolean(_) => Kind::Boolean,
            Event::Int(_) => Kind::Int,
            Event::Long(_) => Kind::Long,
            Event::OverLong { .. } => Kind::OverLong,
            Event::Float16(_) => Kind::Float16,
            Event::Float(_) => Kind::Float,
            Event::Double(_) => Kind::Double,
            Event::NumberString(_) => Kind::NumberString,
            Event::String(_) => Kind::String,
            Event::Chars(_) => Kind::Chars,
            Event::Text(_) => Kind::Text,
            Event::TextStart => Kind::TextStart,
            Event::Bytes(_) => Kind::Bytes,
            Event::BytesStart => Kind::BytesStart,
            Event::ArrayHeader(_) => Kind::ArrayHeader,
            Event::ArrayStart => Kind::ArrayStart,
            Event::MapHeader(_) => Kind::MapHeader,
            Event::MapStart => Kind::MapStart,
            Event::Break => Kind::Break,
            Event::Tag(_) => Kind::Tag,
            Event::SimpleValue(_) => Kind::SimpleValue,
            Event::EndOfInput => Kind::EndOfInput,
        }
    }

    /// Does this event begin an indefinite-length container (array, map, text or byte stream)?
    #[must_use]
    pub fn starts_unbounded(&self) -> bool {
        matches!(
            self,
            Event::ArrayStart | Event::MapStart | Event::TextStart | Event::BytesStart
        )
    }

    /// Converts any borrowed payload into an owned one, detaching `self` from the input buffer's
    /// lifetime. Used by [`crate::reader::Reader::buffer_unsized_bytes`] and friends when a
    /// decoder needs to retain an event past the life of the current parse buffer.
    #[must_use]
    pub fn into_owned(self) -> Event<'static> {
        match self {
            Event::Null => Event::Null,
            Event::Undefined => Event::Undefined,
            Event::Boolean(b) => Event::Boolean(b),
            Event::Int(v) => Event::Int(v),
            Event::Long(v) => Event::Long(v),
            Event::OverLong { value, negative } => Event::OverLong { value, negative },
            Event::Float16(v) => Event::Float16(v),
            Event::Float(v) => Event::Float(v),
            Event::Double(v) => Event::Double(v),
            Event::NumberString(s) => Event::NumberString(Cow::Owned(s.into_owned())),
            Event::String(s) => Event::String(Cow::Owned(s.into_owned())),
            Event::Chars(s) => Event::Chars(Cow::Owned(s.into_owned())),
            Event::Text(b) => Event::Text(Cow::Owned(b.into_owned())),
            Event::TextStart => Event::TextStart,
            Event::Bytes(b) => Event::Bytes(Cow::Owned(b.into_owned())),
            Event::BytesStart => Event::BytesStart,
            Event::ArrayHeader(n) => Event::ArrayHeader(n),
            Event::ArrayStart => Event::ArrayStart,
            Event::MapHeader(n) => Event::MapHeader(n),
            Event::MapStart => Event::MapStart,
            Event::Break => Event::Break,
            Event::Tag(t) => Event::Tag(t),
            Event::SimpleValue(v) => Event::SimpleValue(v),
            Event::EndOfInput => Event::EndOfInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Event::Null.kind(), Kind::Null);
        assert_eq!(Event::Int(23).kind(), Kind::Int);
        assert_eq!(Event::Tag(Tag::EpochDateTime).kind(), Kind::Tag);
        assert_eq!(
            Event::OverLong { value: 1, negative: true }.kind(),
            Kind::OverLong
        );
    }

    #[test]
    fn starts_unbounded_is_precise() {
        assert!(Event::ArrayStart.starts_unbounded());
        assert!(Event::TextStart.starts_unbounded());
        assert!(!Event::ArrayHeader(0).starts_unbounded());
        assert!(!Event::Break.starts_unbounded());
    }
}

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
 * streamcodec pull facade
 *
 * `Reader` wraps a format-specific parser, a [`Validator`], a one-event lookahead ("the
 * receptacle") and a small stash deque, presenting the uniform `hasX`/`readX`/`tryReadX` surface
 * described by the design notes. The generic `has`/`read`/`tryRead` family for every scalar
 * [`Kind`] is generated by the `scalar_reader!`/`unit_reader!` macros below rather than written out
 * by hand twenty-odd times; this mirrors how `tps_minicbor::decode_combinators` builds its `is_*`
 * family from a handful of shared shapes (`is_uint`, `is_bstr`, `is_tag_with_value`, ...) rather
 * than one bespoke function per CBOR major type.
 *
 * Every event freshly pulled from the parser passes through the validator before it is handed to
 * the caller, so a caller driving the reader directly gets the same structural guarantees as one
 * driving it through higher-level decode machinery. A stashed event was already validated the
 * first time it was read out, so replaying it from the stash bypasses the validator a second
 * time rather than advancing its level stack twice for the same logical stream position.
 **************************************************************************************************/
use alloc::borrow::Cow;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::cbor::parser::CborParser;
use crate::config::{CborDecodingOptions, DecodingOptions, JsonDecodingOptions};
use crate::error::{CodecError, Result};
use crate::event::Event;
use crate::json::parser::JsonParser;
use crate::kind::Kind;
use crate::position::Position;
use crate::tag::Tag;
use crate::validator::{Validator, ValidatorOptions};
use crate::Format;

/// The bound on `skipElement`'s nesting recursion (§8's "Skip correctness" property).
const SKIP_ELEMENT_MAX_DEPTH: usize = 100;

/// Generates `hasX`/`readX`/`tryReadX` for an [`Event`] variant that carries exactly one payload
/// value.
macro_rules! scalar_reader {
    ($has:ident, $read:ident, $try_read:ident, $variant:ident, $ty:ty, $name:literal) => {
        #[doc = concat!("`true` iff the current event is `", $name, "`.")]
        pub fn $has(&mut self) -> Result<bool> {
            Ok(matches!(self.data_item()?, Kind::$variant))
        }

        #[doc = concat!("Require `", $name, "` and return its payload, advancing the reader.")]
        pub fn $read(&mut self) -> Result<$ty> {
            self.fill()?;
            match self.pending.take() {
                Some(Event::$variant(v)) => Ok(v),
                Some(other) => self.mismatch(other, $name),
                None => unreachable!("fill() always populates pending"),
            }
        }

        #[doc = concat!("Conditionally advance past a `", $name, "` event.")]
        pub fn $try_read(&mut self) -> Result<Option<$ty>> {
            if self.$has()? {
                Ok(Some(self.$read()?))
            } else {
                Ok(None)
            }
        }
    };
}

/// Generates `hasX`/`readX`/`tryReadX` for an [`Event`] variant with no payload.
macro_rules! unit_reader {
    ($has:ident, $read:ident, $try_read:ident, $variant:ident, $name:literal) => {
        #[doc = concat!("`true` iff the current event is `", $name, "`.")]
        pub fn $has(&mut self) -> Result<bool> {
            Ok(matches!(self.data_item()?, Kind::$variant))
        }

        #[doc = concat!("Require `", $name, "`, advancing the reader.")]
        pub fn $read(&mut self) -> Result<()> {
            self.fill()?;
            match self.pending.take() {
                Some(Event::$variant) => Ok(()),
                Some(other) => self.mismatch(other, $name),
                None => unreachable!("fill() always populates pending"),
            }
        }

        #[doc = concat!("Conditionally advance past a `", $name, "` event.")]
        pub fn $try_read(&mut self) -> Result<bool> {
            if self.$has()? {
                self.pending.take();
                Ok(true)
            } else {
                Ok(false)
            }
        }
    };
}

enum Backend<'buf> {
    Cbor(CborParser<'buf>),
    Json(JsonParser<'buf>),
}

impl<'buf> Backend<'buf> {
    fn next(&mut self) -> Result<Event<'buf>> {
        match self {
            Backend::Cbor(p) => p.next(),
            Backend::Json(p) => p.next(),
        }
    }

    fn position(&self) -> Position {
        match self {
            Backend::Cbor(p) => p.position(),
            Backend::Json(p) => p.position(),
        }
    }
}

/// A pull-style cursor over a CBOR or JSON byte source, yielding validated [`Event`]s.
pub struct Reader<'buf> {
    backend: Backend<'buf>,
    format: Format,
    decoding: DecodingOptions,
    validator: Validator,
    pending: Option<Event<'buf>>,
    stash: VecDeque<Event<'buf>>,
}

impl<'buf> Reader<'buf> {
    /// Construct a `Reader` bound to CBOR.
    #[must_use]
    pub fn new_cbor(bytes: &'buf [u8], decoding: DecodingOptions, cbor: CborDecodingOptions) -> Self {
        Reader {
            backend: Backend::Cbor(CborParser::new(bytes, cbor)),
            format: Format::Cbor,
            decoding,
            validator: Validator::new(ValidatorOptions::from(cbor), false),
            pending: None,
            stash: VecDeque::new(),
        }
    }

    /// Construct a `Reader` bound to JSON.
    #[must_use]
    pub fn new_json(bytes: &'buf [u8], decoding: DecodingOptions, json: JsonDecodingOptions) -> Self {
        Reader {
            backend: Backend::Json(JsonParser::new(bytes, json)),
            format: Format::Json,
            decoding,
            validator: Validator::new(ValidatorOptions::default(), true),
            pending: None,
            stash: VecDeque::new(),
        }
    }

    /// The wire format this reader was constructed for.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// The reader's current byte offset, for diagnostics.
    #[must_use]
    pub fn position(&self) -> Position {
        self.backend.position()
    }

    /// Prepend `event` to the reader's event source, so the next pull returns it before any
    /// further parser output. Used to replay events a higher-level strategy read and buffered
    /// while probing for a type discriminant; to restore several events in their original order,
    /// call this once per event in reverse of the order they were originally consumed.
    pub fn stash(&mut self, event: Event<'buf>) {
        self.stash.push_front(event);
    }

    fn pull_raw(&mut self) -> Result<Event<'buf>> {
        // A stashed event was already validated the first time it was pulled and read out;
        // replaying it through `accept` again would advance the validator's level stack a
        // second time for the same logical stream position. Only events freshly pulled from the
        // parser are new to the validator.
        if let Some(event) = self.stash.pop_front() {
            return Ok(event);
        }
        let event = self.backend.next()?;
        let pos = self.position();
        self.validator.accept(&event, pos)?;
        Ok(event)
    }

    fn fill(&mut self) -> Result<()> {
        if self.pending.is_none() {
            self.pending = Some(self.pull_raw()?);
        }
        Ok(())
    }

    /// The [`Kind`] of the current event, fetching one from the parser if none is pending.
    pub fn data_item(&mut self) -> Result<Kind> {
        self.fill()?;
        Ok(self.pending.as_ref().expect("fill() always populates pending").kind())
    }

    /// Advance past the current event without inspecting it. Does not descend into a container:
    /// an `ArrayHeader`/`ArrayStart`/`MapHeader`/`MapStart`/`Tag` is itself the one event consumed,
    /// leaving its members for the next call.
    pub fn skip_data_item(&mut self) -> Result<()> {
        self.fill()?;
        self.pending.take();
        Ok(())
    }

    /// Advance past one whole element, including every nested descendant, bounded by a nesting
    /// depth guard of [`SKIP_ELEMENT_MAX_DEPTH`].
    pub fn skip_element(&mut self) -> Result<()> {
        let mut remaining: Vec<i64> = Vec::new();
        loop {
            self.fill()?;
            let event = self.pending.take().expect("fill() always populates pending");
            match event {
                Event::Tag(_) => remaining.push(1),
                Event::ArrayHeader(n) => {
                    if n == 0 {
                        close_one(&mut remaining);
                    } else {
                        remaining.push(n as i64);
                    }
                }
                Event::MapHeader(n) => {
                    if n == 0 {
                        close_one(&mut remaining);
                    } else {
                        remaining.push((n as i64) * 2);
                    }
                }
                Event::ArrayStart | Event::MapStart | Event::TextStart | Event::BytesStart => {
                    remaining.push(-1);
                }
                Event::Break => {
                    match remaining.pop() {
                        Some(r) if r < 0 => {}
                        _ => {
                            return Err(CodecError::ValidationFailure(
                                self.position(),
                                "unexpected Break while skipping an element",
                            ))
                        }
                    }
                    close_one(&mut remaining);
                }
                _ => close_one(&mut remaining),
            }

            if remaining.len() > SKIP_ELEMENT_MAX_DEPTH {
                return Err(CodecError::Overflow(
                    self.position(),
                    "skipElement nesting exceeds the configured depth guard",
                ));
            }
            if remaining.is_empty() {
                return Ok(());
            }
        }
    }

    /// An integer in `Int` or `Long` form, widened to `i64`.
    pub fn read_long(&mut self) -> Result<i64> {
        self.fill()?;
        match self.pending.take() {
            Some(Event::Int(v)) => Ok(v as i64),
            Some(Event::Long(v)) => Ok(v),
            Some(other) => self.mismatch(other, "an Int or Long"),
            None => unreachable!("fill() always populates pending"),
        }
    }

    /// A floating-point value, accepting `Float16`/`Float`/`NumberString` always, `Double` when
    /// `readDoubleAlsoAsFloat` is set, and `Int`/`Long` when `readIntegersAlsoAsFloatingPoint` is
    /// set.
    pub fn read_float(&mut self) -> Result<f32> {
        self.fill()?;
        match self.pending.take() {
            Some(Event::Float16(v) | Event::Float(v)) => Ok(v),
            Some(Event::Double(v)) if self.decoding.read_double_also_as_float => Ok(v as f32),
            Some(Event::NumberString(s)) => parse_number_string(&s, self.position()).map(|v| v as f32),
            Some(Event::Int(v)) if self.decoding.read_integers_also_as_floating_point => Ok(v as f32),
            Some(Event::Long(v)) if self.decoding.read_integers_also_as_floating_point => Ok(v as f32),
            Some(other) => self.mismatch(other, "a floating-point value"),
            None => unreachable!("fill() always populates pending"),
        }
    }

    /// A floating-point value widened to `f64`, accepting the same kinds as [`Reader::read_float`]
    /// plus `Double` unconditionally.
    pub fn read_double(&mut self) -> Result<f64> {
        self.fill()?;
        match self.pending.take() {
            Some(Event::Double(v)) => Ok(v),
            Some(Event::Float16(v) | Event::Float(v)) => Ok(v as f64),
            Some(Event::NumberString(s)) => parse_number_string(&s, self.position()),
            Some(Event::Int(v)) if self.decoding.read_integers_also_as_floating_point => Ok(v as f64),
            Some(Event::Long(v)) if self.decoding.read_integers_also_as_floating_point => Ok(v as f64),
            Some(other) => self.mismatch(other, "a floating-point value"),
            None => unreachable!("fill() always populates pending"),
        }
    }

    /// A narrow integer read with a range check against `i8`.
    pub fn read_byte(&mut self) -> Result<i8> {
        let v = self.read_long()?;
        i8::try_from(v).map_err(|_| CodecError::ValidationFailure(self.position(), "integer out of i8 range"))
    }

    /// A narrow integer read with a range check against `i16`.
    pub fn read_short(&mut self) -> Result<i16> {
        let v = self.read_long()?;
        i16::try_from(v).map_err(|_| CodecError::ValidationFailure(self.position(), "integer out of i16 range"))
    }

    /// A narrow integer read with a range check against a UTF-16 code unit (`u16`).
    pub fn read_char(&mut self) -> Result<u16> {
        let v = self.read_long()?;
        u16::try_from(v).map_err(|_| CodecError::ValidationFailure(self.position(), "integer out of char range"))
    }

    /// Materialize a `Bytes` event, or the fully-concatenated content of a `BytesStart` chunk
    /// stream up to its matching `Break`. A no-op (beyond returning the payload) when the current
    /// event is already a sized `Bytes`.
    pub fn buffer_unsized_bytes(&mut self) -> Result<Cow<'buf, [u8]>> {
        self.fill()?;
        match self.pending.take() {
            Some(Event::Bytes(b)) => Ok(b),
            Some(Event::BytesStart) => {
                let mut buf = Vec::new();
                loop {
                    match self.pull_raw()? {
                        Event::Bytes(chunk) => buf.extend_from_slice(&chunk),
                        Event::Break => break,
                        _ => {
                            return Err(CodecError::ValidationFailure(
                                self.position(),
                                "a Bytes chunk or Break",
                            ))
                        }
                    }
                }
                Ok(Cow::Owned(buf))
            }
            Some(other) => self.mismatch(other, "Bytes or BytesStart"),
            None => unreachable!("fill() always populates pending"),
        }
    }

    /// Materialize a `String`/`Chars`/`Text` event, or the fully-concatenated content of a
    /// `TextStart` chunk stream up to its matching `Break`. A no-op (beyond returning the payload)
    /// when the current event is already a sized text kind.
    pub fn buffer_unsized_text_bytes(&mut self) -> Result<Cow<'buf, str>> {
        self.fill()?;
        match self.pending.take() {
            Some(Event::String(s) | Event::Chars(s)) => Ok(s),
            Some(Event::Text(b)) => core::str::from_utf8(&b)
                .map(|s| Cow::Owned(alloc::string::String::from(s)))
                .map_err(|_| CodecError::InvalidInputData(self.position(), "Text is not valid UTF-8")),
            Some(Event::TextStart) => {
                let mut buf = alloc::string::String::new();
                loop {
                    match self.pull_raw()? {
                        Event::String(s) | Event::Chars(s) => buf.push_str(&s),
                        Event::Text(b) => {
                            let s = core::str::from_utf8(&b).map_err(|_| {
                                CodecError::InvalidInputData(self.position(), "Text chunk is not valid UTF-8")
                            })?;
                            buf.push_str(s);
                        }
                        Event::Break => break,
                        _ => {
                            return Err(CodecError::ValidationFailure(
                                self.position(),
                                "a text chunk or Break",
                            ))
                        }
                    }
                }
                Ok(Cow::Owned(buf))
            }
            Some(other) => self.mismatch(other, "a text value"),
            None => unreachable!("fill() always populates pending"),
        }
    }

    /// Force whatever text representation is current (sized or indefinite-length) into a single
    /// owned value, same as [`Reader::buffer_unsized_text_bytes`]: text has only one in-memory
    /// representation in this crate, so there is no further normalization to perform.
    pub fn decode_text_bytes(&mut self) -> Result<Cow<'buf, str>> {
        self.buffer_unsized_text_bytes()
    }

    /// Three-way compare the current string-like event against `s`, without materializing an
    /// owned copy of either side. Does not advance the reader.
    pub fn string_compare(&mut self, s: &str) -> Result<Ordering> {
        self.fill()?;
        match &self.pending {
            Some(Event::String(cur) | Event::Chars(cur)) => Ok(cur.as_ref().cmp(s)),
            Some(_) => Err(CodecError::ValidationFailure(
                self.position(),
                "a string-like event",
            )),
            None => unreachable!("fill() always populates pending"),
        }
    }

    /// Three-way compare the current string-like event against the characters in `chars`, without
    /// materializing an owned copy of either side. Does not advance the reader.
    pub fn chars_compare(&mut self, chars: &[char]) -> Result<Ordering> {
        self.fill()?;
        match &self.pending {
            Some(Event::String(cur) | Event::Chars(cur)) => {
                let mut left = cur.chars();
                let mut right = chars.iter().copied();
                loop {
                    return match (left.next(), right.next()) {
                        (Some(a), Some(b)) if a == b => continue,
                        (Some(a), Some(b)) => Ok(a.cmp(&b)),
                        (Some(_), None) => Ok(Ordering::Greater),
                        (None, Some(_)) => Ok(Ordering::Less),
                        (None, None) => Ok(Ordering::Equal),
                    };
                }
            }
            Some(_) => Err(CodecError::ValidationFailure(
                self.position(),
                "a string-like event",
            )),
            None => unreachable!("fill() always populates pending"),
        }
    }

    fn mismatch<T>(&mut self, unexpected: Event<'buf>, expected: &'static str) -> Result<T> {
        let pos = self.position();
        self.pending = Some(unexpected);
        Err(CodecError::ValidationFailure(pos, expected))
    }

    scalar_reader!(has_boolean, read_boolean, try_read_boolean, Boolean, bool, "Boolean");
    scalar_reader!(has_int, read_int, try_read_int, Int, i32, "Int");
    scalar_reader!(has_long_item, read_long_item, try_read_long_item, Long, i64, "Long");
    scalar_reader!(has_float_item, read_float_item, try_read_float_item, Float, f32, "Float");
    scalar_reader!(has_float16, read_float16, try_read_float16, Float16, f32, "Float16");
    scalar_reader!(has_double_item, read_double_item, try_read_double_item, Double, f64, "Double");
    scalar_reader!(has_array_header, read_array_header, try_read_array_header, ArrayHeader, u64, "ArrayHeader");
    scalar_reader!(has_map_header, read_map_header, try_read_map_header, MapHeader, u64, "MapHeader");
    scalar_reader!(has_tag, read_tag, try_read_tag, Tag, Tag, "Tag");
    scalar_reader!(has_simple_value, read_simple_value, try_read_simple_value, SimpleValue, u8, "SimpleValue");
    scalar_reader!(has_string, read_string, try_read_string, String, Cow<'buf, str>, "String");
    scalar_reader!(has_chars, read_chars, try_read_chars, Chars, Cow<'buf, str>, "Chars");
    scalar_reader!(has_text, read_text, try_read_text, Text, Cow<'buf, [u8]>, "Text");
    scalar_reader!(has_bytes, read_bytes, try_read_bytes, Bytes, Cow<'buf, [u8]>, "Bytes");
    scalar_reader!(
        has_number_string,
        read_number_string,
        try_read_number_string,
        NumberString,
        Cow<'buf, str>,
        "NumberString"
    );

    unit_reader!(has_null, read_null, try_read_null, Null, "Null");
    unit_reader!(has_undefined, read_undefined, try_read_undefined, Undefined, "Undefined");
    unit_reader!(has_break, read_break, try_read_break, Break, "Break");
    unit_reader!(has_array_start, read_array_start, try_read_array_start, ArrayStart, "ArrayStart");
    unit_reader!(has_map_start, read_map_start, try_read_map_start, MapStart, "MapStart");
    unit_reader!(has_text_start, read_text_start, try_read_text_start, TextStart, "TextStart");
    unit_reader!(has_bytes_start, read_bytes_start, try_read_bytes_start, BytesStart, "BytesStart");

    /// `true` iff the current event is `OverLong`.
    pub fn has_over_long(&mut self) -> Result<bool> {
        Ok(matches!(self.data_item()?, Kind::OverLong))
    }

    /// Require `OverLong` and return its `(value, negative)` magnitude pair.
    pub fn read_over_long(&mut self) -> Result<(u64, bool)> {
        self.fill()?;
        match self.pending.take() {
            Some(Event::OverLong { value, negative }) => Ok((value, negative)),
            Some(other) => self.mismatch(other, "OverLong"),
            None => unreachable!("fill() always populates pending"),
        }
    }

    /// Conditionally advance past an `OverLong` event.
    pub fn try_read_over_long(&mut self) -> Result<Option<(u64, bool)>> {
        if self.has_over_long()? {
            Ok(Some(self.read_over_long()?))
        } else {
            Ok(None)
        }
    }

    /// `true` iff the current event is `Int` with value exactly `v`.
    pub fn has_int_value(&mut self, v: i32) -> Result<bool> {
        self.fill()?;
        Ok(matches!(self.pending, Some(Event::Int(x)) if x == v))
    }

    /// Require `Int` with value exactly `v`, and advance.
    pub fn read_int_value(&mut self, v: i32) -> Result<()> {
        if self.has_int_value(v)? {
            self.pending.take();
            Ok(())
        } else {
            Err(CodecError::ValidationFailure(self.position(), "expected Int with a specific value"))
        }
    }

    /// Conditionally advance past an `Int` event equal to `v`.
    pub fn try_read_int_value(&mut self, v: i32) -> Result<bool> {
        if self.has_int_value(v)? {
            self.pending.take();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// `true` iff the current event is `Boolean` with value exactly `v`.
    pub fn has_boolean_value(&mut self, v: bool) -> Result<bool> {
        self.fill()?;
        Ok(matches!(self.pending, Some(Event::Boolean(x)) if x == v))
    }

    /// Conditionally advance past a `Boolean` event equal to `v`.
    pub fn try_read_boolean_value(&mut self, v: bool) -> Result<bool> {
        if self.has_boolean_value(v)? {
            self.pending.take();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// `true` iff the current event is `String`/`Chars` equal to `v`.
    pub fn has_string_value(&mut self, v: &str) -> Result<bool> {
        self.fill()?;
        Ok(matches!(&self.pending, Some(Event::String(s) | Event::Chars(s)) if s.as_ref() == v))
    }

    /// Conditionally advance past a `String`/`Chars` event equal to `v`.
    pub fn try_read_string_value(&mut self, v: &str) -> Result<bool> {
        if self.has_string_value(v)? {
            self.pending.take();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// `true` iff the current event is `Tag` with value exactly `v`.
    pub fn has_tag_value(&mut self, v: Tag) -> Result<bool> {
        self.fill()?;
        Ok(matches!(self.pending, Some(Event::Tag(t)) if t == v))
    }

    /// Require `Tag` with value exactly `v`, and advance.
    pub fn read_tag_value(&mut self, v: Tag) -> Result<()> {
        if self.has_tag_value(v)? {
            self.pending.take();
            Ok(())
        } else {
            Err(CodecError::ValidationFailure(self.position(), "expected a specific Tag value"))
        }
    }

    /// Conditionally advance past a `Tag` event equal to `v`.
    pub fn try_read_tag_value(&mut self, v: Tag) -> Result<bool> {
        if self.has_tag_value(v)? {
            self.pending.take();
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn close_one(remaining: &mut Vec<i64>) {
    loop {
        match remaining.last_mut() {
            None => return,
            Some(r) if *r < 0 => return,
            Some(r) => {
                *r -= 1;
                if *r == 0 {
                    remaining.pop();
                    continue;
                }
                return;
            }
        }
    }
}

fn parse_number_string(s: &str, pos: Position) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|_| CodecError::InvalidInputData(pos, "NumberString is not a valid floating-point literal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cbor_reader(bytes: &[u8]) -> Reader<'_> {
        Reader::new_cbor(bytes, DecodingOptions::default(), CborDecodingOptions::default())
    }

    fn json_reader(text: &str) -> Reader<'_> {
        Reader::new_json(text.as_bytes(), DecodingOptions::default(), JsonDecodingOptions::default())
    }

    #[test]
    fn reads_scalar_and_advances() {
        let mut r = cbor_reader(&[0x17]);
        assert!(r.has_int().unwrap());
        assert_eq!(r.read_int().unwrap(), 23);
        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }

    #[test]
    fn read_mismatch_leaves_error_but_does_not_panic() {
        let mut r = cbor_reader(&[0x17]);
        assert!(r.read_boolean().is_err());
    }

    #[test]
    fn read_long_accepts_int_and_long() {
        let mut r = cbor_reader(&[0x17]);
        assert_eq!(r.read_long().unwrap(), 23);

        let mut r2 = cbor_reader(&[0x1b, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(r2.read_long().unwrap(), 0x1_0000_0000);
    }

    #[test]
    fn read_float_widens_float16() {
        let mut r = cbor_reader(&[0xf9, 0x3c, 0x00]);
        assert_eq!(r.read_float().unwrap(), 1.0);
    }

    #[test]
    fn read_double_accepts_narrower_widths() {
        let mut r = cbor_reader(&[0xf9, 0x3c, 0x00]);
        assert_eq!(r.read_double().unwrap(), 1.0);
    }

    #[test]
    fn skip_data_item_does_not_descend() {
        let mut r = cbor_reader(&[0x82, 0x01, 0x02]);
        r.skip_data_item().unwrap();
        assert_eq!(r.read_int().unwrap(), 1);
        assert_eq!(r.read_int().unwrap(), 2);
    }

    #[test]
    fn skip_element_descends_through_nested_containers() {
        let mut r = json_reader(r#"[{"a": [1, 2]}, 3]"#);
        r.read_array_start().unwrap();
        r.skip_element().unwrap(); // the whole {"a": [1, 2]} object
        assert_eq!(r.read_int().unwrap(), 3);
        r.read_break().unwrap();
    }

    #[test]
    fn skip_element_over_a_tag_skips_its_single_child() {
        let mut r = cbor_reader(&[0x82, 0xc1, 0x01, 0x02]);
        r.read_array_header().unwrap();
        r.skip_element().unwrap(); // Tag(EpochDateTime) + Int(1)
        assert_eq!(r.read_int().unwrap(), 2);
    }

    #[test]
    fn buffer_unsized_bytes_concatenates_chunks() {
        let mut r = cbor_reader(&[0x5f, 0x42, 0xAA, 0xBB, 0x41, 0xCC, 0xff]);
        let bytes = r.buffer_unsized_bytes().unwrap();
        assert_eq!(bytes.as_ref(), &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn buffer_unsized_bytes_is_a_no_op_on_sized_input() {
        let mut r = cbor_reader(&[0x42, 0xAA, 0xBB]);
        let bytes = r.buffer_unsized_bytes().unwrap();
        assert_eq!(bytes.as_ref(), &[0xAA, 0xBB]);
    }

    #[test]
    fn string_compare_does_not_advance() {
        let mut r = json_reader(r#""hello""#);
        assert_eq!(r.string_compare("hello").unwrap(), Ordering::Equal);
        assert_eq!(r.string_compare("abc").unwrap(), Ordering::Greater);
        // still not advanced:
        assert_eq!(r.read_string().unwrap().as_ref(), "hello");
    }

    #[test]
    fn stash_replays_events_before_the_parser() {
        let mut r = cbor_reader(&[0x01]);
        r.stash(Event::Int(99));
        assert_eq!(r.read_int().unwrap(), 99);
        assert_eq!(r.read_int().unwrap(), 1);
    }

    #[test]
    fn probe_and_restore_via_stash_does_not_double_validate() {
        // array(2)[1, 2]
        let mut r = cbor_reader(&[0x82, 0x01, 0x02]);
        let n = r.read_array_header().unwrap();
        assert_eq!(n, 2);
        // Restore the header so a higher-level strategy can re-decode it, as §4.8 describes.
        r.stash(Event::ArrayHeader(n));
        assert_eq!(r.read_array_header().unwrap(), 2);
        assert_eq!(r.read_int().unwrap(), 1);
        assert_eq!(r.read_int().unwrap(), 2);
        assert_eq!(r.data_item().unwrap(), Kind::EndOfInput);
    }

    #[test]
    fn has_int_value_checks_payload_equality() {
        let mut r = cbor_reader(&[0x17]);
        assert!(!r.has_int_value(1).unwrap());
        assert!(r.has_int_value(23).unwrap());
        r.read_int_value(23).unwrap();
    }
}

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
 * streamcodec JSON lexer
 *
 * Unlike the CBOR parser, JSON's grammar requires the lexer itself to track container context: a
 * comma or colon carries no event of its own, but deciding whether one is required (and where)
 * depends on whether we are mid-object, mid-array, awaiting a key or awaiting a value. This is a
 * small amount of state entirely private to tokenization; it is distinct from (and simpler than)
 * `crate::validator::Validator`'s job, which re-derives and enforces the same nesting rules purely
 * from the `Event` stream, independent of which parser produced it.
 *
 * Both `{` and `[` are modeled as their CBOR indefinite-length counterparts: `MapStart`/
 * `ArrayStart`, member events, then `Break` on the matching closing bracket.
 *
 * String scanning borrows the SWAR word-at-a-time technique used by `other_examples`'s
 * `json_escape_SWAR.rs`: eight bytes are tested at once for quote, backslash or control-character
 * bytes, so a plain (unescaped) string body is located and borrowed with no per-byte branch.
 **************************************************************************************************/
use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::str;

use crate::config::JsonDecodingOptions;
use crate::error::{CodecError, Result};
use crate::event::Event;
use crate::input::Input;
use crate::position::Position;

use super::numbers;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

#[derive(Debug, Copy, Clone)]
struct Frame {
    is_object: bool,
    first: bool,
    /// Only meaningful when `is_object`: `true` once a key has been emitted and a value is due.
    awaiting_value: bool,
}

/// Pulls one [`Event`] at a time out of a JSON-encoded UTF-8 byte slice.
pub struct JsonParser<'buf> {
    bytes: &'buf [u8],
    input: Input<'buf>,
    options: JsonDecodingOptions,
    stack: Vec<Frame>,
    root_read: bool,
}

impl<'buf> JsonParser<'buf> {
    /// Construct a parser over `bytes` using `options` to bound string/number sizes.
    #[must_use]
    pub fn new(bytes: &'buf [u8], options: JsonDecodingOptions) -> Self {
        JsonParser {
            bytes,
            input: Input::new(bytes),
            options,
            stack: Vec::new(),
            root_read: false,
        }
    }

    /// The parser's current byte offset, for diagnostics.
    #[must_use]
    pub fn position(&self) -> Position {
        self.input.position()
    }

    /// Parse and return the next data item, or [`Event::EndOfInput`] once the document (and any
    /// trailing whitespace) has been fully consumed.
    #[cfg_attr(feature = "trace", trace)]
    pub fn next(&mut self) -> Result<Event<'buf>> {
        if self.stack.is_empty() {
            if self.root_read {
                self.skip_whitespace();
                return if self.input.at_end() {
                    Ok(Event::EndOfInput)
                } else {
                    Err(CodecError::InvalidInputData(
                        self.input.position(),
                        "unexpected trailing data after JSON document",
                    ))
                };
            }
            self.root_read = true;
            return self.read_value();
        }
        self.step_in_container()
    }

    /// Handle one lexing step while `self.stack` is non-empty: consumes any required comma,
    /// decides whether a key or a value is next, and reads it.
    fn step_in_container(&mut self) -> Result<Event<'buf>> {
        let idx = self.stack.len() - 1;
        let frame = self.stack[idx];
        let closer = if frame.is_object { b'}' } else { b']' };

        self.skip_whitespace();
        let mut b = self.peek_byte()?;

        if b == closer {
            if frame.is_object && frame.awaiting_value {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "object key is missing its value",
                ));
            }
            self.input.read_u8()?;
            self.stack.pop();
            return Ok(Event::Break);
        }

        if !frame.first {
            if b != b',' {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "expected ',' or a closing bracket",
                ));
            }
            self.input.read_u8()?;
            self.skip_whitespace();
            b = self.peek_byte()?;
            if b == closer {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "trailing comma before closing bracket",
                ));
            }
        }

        if frame.is_object && !frame.awaiting_value {
            if b != b'"' {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "object key must be a string",
                ));
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            let colon = self.input.read_u8()?;
            if colon != b':' {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "expected ':' after object key",
                ));
            }
            self.stack[idx].awaiting_value = true;
            self.stack[idx].first = false;
            return Ok(Event::String(key));
        }

        // `read_value` may push further frames (for a nested container) but never touches `idx`.
        let value = self.read_value()?;
        self.stack[idx].awaiting_value = false;
        self.stack[idx].first = false;
        Ok(value)
    }

    fn read_value(&mut self) -> Result<Event<'buf>> {
        self.skip_whitespace();
        let b = self.peek_byte()?;
        match b {
            b'{' => {
                self.input.read_u8()?;
                self.stack.push(Frame { is_object: true, first: true, awaiting_value: false });
                Ok(Event::MapStart)
            }
            b'[' => {
                self.input.read_u8()?;
                self.stack.push(Frame { is_object: false, first: true, awaiting_value: false });
                Ok(Event::ArrayStart)
            }
            b'"' => Ok(Event::String(self.parse_string()?)),
            b't' => self.expect_literal(b"true", Event::Boolean(true)),
            b'f' => self.expect_literal(b"false", Event::Boolean(false)),
            b'n' => self.expect_literal(b"null", Event::Null),
            b'-' | b'0'..=b'9' => self.parse_number(),
            _ => Err(CodecError::InvalidInputData(self.input.position(), "unexpected character")),
        }
    }

    fn expect_literal(&mut self, literal: &'static [u8], event: Event<'static>) -> Result<Event<'buf>> {
        let start = self.input.position();
        let bytes = self.input.read_slice(literal.len())?;
        if bytes != literal {
            return Err(CodecError::InvalidInputData(start, "invalid literal"));
        }
        Ok(event)
    }

    fn parse_number(&mut self) -> Result<Event<'buf>> {
        let start = self.input.cursor();
        if self.input.peek_u8() == Some(b'-') {
            self.input.read_u8()?;
        }
        let int_start = self.input.cursor();
        match self.input.peek_u8() {
            Some(b'0') => {
                self.input.read_u8()?;
            }
            Some(b'1'..=b'9') => {
                while matches!(self.input.peek_u8(), Some(b'0'..=b'9')) {
                    self.input.read_u8()?;
                }
            }
            _ => return Err(CodecError::InvalidInputData(self.input.position(), "expected a digit")),
        }
        if self.input.cursor() == int_start {
            return Err(CodecError::InvalidInputData(self.input.position(), "expected a digit"));
        }
        if self.input.peek_u8() == Some(b'.') {
            self.input.read_u8()?;
            let frac_start = self.input.cursor();
            while matches!(self.input.peek_u8(), Some(b'0'..=b'9')) {
                self.input.read_u8()?;
            }
            if self.input.cursor() == frac_start {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "expected a digit after decimal point",
                ));
            }
        }
        if matches!(self.input.peek_u8(), Some(b'e' | b'E')) {
            self.input.read_u8()?;
            if matches!(self.input.peek_u8(), Some(b'+' | b'-')) {
                self.input.read_u8()?;
            }
            let exp_start = self.input.cursor();
            while matches!(self.input.peek_u8(), Some(b'0'..=b'9')) {
                self.input.read_u8()?;
            }
            if self.input.cursor() == exp_start {
                return Err(CodecError::InvalidInputData(
                    self.input.position(),
                    "expected a digit in exponent",
                ));
            }
        }

        let end = self.input.cursor();
        // Safety of the unwrap: every byte accepted above is one of `-0123456789.eE+`, all ASCII.
        let text = str::from_utf8(&self.bytes[start..end]).expect("number token is pure ASCII");
        Ok(numbers::classify(text, &self.options))
    }

    fn peek_byte(&self) -> Result<u8> {
        self.input
            .peek_u8()
            .ok_or_else(|| CodecError::UnexpectedEndOfInput(self.input.position()))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.input.peek_u8(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            let _ = self.input.read_u8();
        }
    }

    fn parse_string(&mut self) -> Result<Cow<'buf, str>> {
        let quote = self.input.read_u8()?;
        debug_assert_eq!(quote, b'"');
        let content_start = self.input.cursor();

        if let Some(end) = scan_plain_run(self.bytes, content_start) {
            let bytes = &self.bytes[content_start..end];
            let text = str::from_utf8(bytes)
                .map_err(|_| CodecError::InvalidInputData(self.input.position(), "string is not valid UTF-8"))?;
            if text.len() > self.options.max_string_length {
                return Err(CodecError::Overflow(self.input.position(), "string exceeds configured length limit"));
            }
            self.input.seek(end + 1); // past the closing quote
            return Ok(Cow::Borrowed(text));
        }

        self.parse_escaped_string(content_start)
    }

    /// Slow path: decode byte-by-byte once an escape (or a bare control character) rules out the
    /// borrowed fast path.
    fn parse_escaped_string(&mut self, content_start: usize) -> Result<Cow<'buf, str>> {
        self.input.seek(content_start);
        let mut out = String::with_capacity(self.options.initial_charbuffer_size);
        loop {
            let b = self.input.read_u8()?;
            match b {
                b'"' => break,
                b'\\' => {
                    let esc = self.input.read_u8()?;
                    match esc {
                        b'"' => out.push('"'),
                        b'\\' => out.push('\\'),
                        b'/' => out.push('/'),
                        b'b' => out.push('\u{0008}'),
                        b'f' => out.push('\u{000C}'),
                        b'n' => out.push('\n'),
                        b'r' => out.push('\r'),
                        b't' => out.push('\t'),
                        b'u' => out.push(self.read_escaped_codepoint()?),
                        _ => {
                            return Err(CodecError::InvalidInputData(
                                self.input.position(),
                                "invalid escape sequence",
                            ))
                        }
                    }
                }
                0x00..=0x1F => {
                    return Err(CodecError::InvalidInputData(
                        self.input.position(),
                        "unescaped control character in string",
                    ))
                }
                _ => {
                    let extra = utf8_continuation_len(b, self.input.position())?;
                    let mut buf = [0u8; 4];
                    buf[0] = b;
                    for slot in buf.iter_mut().skip(1).take(extra) {
                        *slot = self.input.read_u8()?;
                    }
                    let s = str::from_utf8(&buf[..=extra]).map_err(|_| {
                        CodecError::InvalidInputData(self.input.position(), "invalid UTF-8 sequence")
                    })?;
                    out.push_str(s);
                }
            }
            if out.len() > self.options.max_string_length {
                return Err(CodecError::Overflow(self.input.position(), "string exceeds configured length limit"));
            }
        }
        Ok(Cow::Owned(out))
    }

    fn read_escaped_codepoint(&mut self) -> Result<char> {
        let cp = self.read_hex4()?;
        if (0xD800..=0xDBFF).contains(&cp) {
            let backslash = self.input.read_u8()?;
            let u = self.input.read_u8()?;
            if backslash != b'\\' || u != b'u' {
                return Err(CodecError::InvalidInputData(self.input.position(), "unpaired UTF-16 surrogate"));
            }
            let lo = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&lo) {
                return Err(CodecError::InvalidInputData(self.input.position(), "invalid low surrogate"));
            }
            let c = 0x10000 + ((cp - 0xD800) << 10) + (lo - 0xDC00);
            char::from_u32(c).ok_or_else(|| CodecError::InvalidInputData(self.input.position(), "invalid surrogate pair"))
        } else if (0xDC00..=0xDFFF).contains(&cp) {
            Err(CodecError::InvalidInputData(self.input.position(), "unpaired UTF-16 surrogate"))
        } else {
            char::from_u32(cp).ok_or_else(|| CodecError::InvalidInputData(self.input.position(), "invalid escape"))
        }
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let digits = self.input.read_slice(4)?;
        let mut value = 0u32;
        for &d in digits {
            let nibble = match d {
                b'0'..=b'9' => d - b'0',
                b'a'..=b'f' => d - b'a' + 10,
                b'A'..=b'F' => d - b'A' + 10,
                _ => return Err(CodecError::InvalidInputData(self.input.position(), "invalid \\u escape")),
            };
            value = (value << 4) | nibble as u32;
        }
        Ok(value)
    }
}

/// Scan `bytes[start..]` for the first unescaped `"`, eight bytes at a time. Returns the offset of
/// that quote, or `None` the moment a backslash or bare control character is seen (ruling out the
/// borrowed fast path) or the input ends first.
fn scan_plain_run(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    loop {
        let remaining = bytes.len() - i;
        if remaining == 0 {
            return None;
        }
        let take = remaining.min(8);
        let mut word = [0xFFu8; 8];
        word[..take].copy_from_slice(&bytes[i..i + take]);
        if let Some(offset) = first_special_byte(word) {
            let pos = i + offset;
            return if bytes[pos] == b'"' { Some(pos) } else { None };
        }
        if take < 8 {
            return None;
        }
        i += 8;
    }
}

/// Locate the first byte in `word` that is a quote (`"`), backslash (`\`) or ASCII control
/// character (`< 0x20`), using the same branchless bit-trick as `other_examples`'s
/// `has_json_escapable_byte_swar`: build a "this lane matches" mask with the classic SIMD-within-
/// a-register zero-byte test, then take the lowest set lane.
fn first_special_byte(word: [u8; 8]) -> Option<usize> {
    let x = u64::from_ne_bytes(word);
    const LO: u64 = 0x0101010101010101;
    const HI: u64 = 0x8080808080808080;

    // Per-lane "does this byte equal `needle`" test: xor every lane with `needle`, then apply the
    // standard has-zero-byte trick (`v.wrapping_sub(LO) & !v & HI`) to the result.
    let has_byte = |needle: u8| -> u64 {
        let y = x ^ (LO * needle as u64);
        y.wrapping_sub(LO) & !y & HI
    };

    let quote = has_byte(b'"');
    let backslash = has_byte(b'\\');
    // Subtraction-based range test, not addition: adding per-lane carries into the next lane
    // once a byte is >= 0xA0, corrupting that neighbour's result. Mirrors the reference's
    // `lt32 = x.wrapping_sub(0x2020...)` plus an `is_ascii` guard, since subtracting 0x20
    // underflows (sets the lane's high bit) both for genuine control bytes *and* for non-ASCII
    // bytes >= 0xA0 - the `is_ascii` mask throws out the latter.
    let is_ascii = !x & HI;
    let control = x.wrapping_sub(LO * 0x20) & HI & is_ascii;

    let hits = quote | backslash | control;
    if hits == 0 {
        None
    } else {
        Some((hits.trailing_zeros() / 8) as usize)
    }
}

fn utf8_continuation_len(lead: u8, at: Position) -> Result<usize> {
    match lead {
        0x00..=0x7F => Ok(0),
        0xC2..=0xDF => Ok(1),
        0xE0..=0xEF => Ok(2),
        0xF0..=0xF4 => Ok(3),
        _ => Err(CodecError::InvalidInputData(at, "invalid UTF-8 lead byte")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(text: &str) -> JsonParser<'_> {
        JsonParser::new(text.as_bytes(), JsonDecodingOptions::default())
    }

    #[test]
    fn scalar_literals() {
        assert_eq!(parser("true").next().unwrap(), Event::Boolean(true));
        assert_eq!(parser("false").next().unwrap(), Event::Boolean(false));
        assert_eq!(parser("null").next().unwrap(), Event::Null);
    }

    #[test]
    fn plain_string_borrows_from_input() {
        let mut p = parser("\"hello\"");
        assert_eq!(p.next().unwrap(), Event::String(Cow::Borrowed("hello")));
    }

    #[test]
    fn escaped_string_is_owned() {
        let mut p = parser(r#""a\nb""#);
        assert_eq!(p.next().unwrap(), Event::String(Cow::Owned("a\nb".into())));
    }

    #[test]
    fn surrogate_pair_escape_decodes_to_one_char() {
        let mut p = parser(r#""😀""#);
        assert_eq!(p.next().unwrap(), Event::String(Cow::Owned("\u{1F600}".into())));
    }

    #[test]
    fn empty_array_round_trips_start_and_break() {
        let mut p = parser("[]");
        assert_eq!(p.next().unwrap(), Event::ArrayStart);
        assert_eq!(p.next().unwrap(), Event::Break);
        assert_eq!(p.next().unwrap(), Event::EndOfInput);
    }

    #[test]
    fn array_with_elements() {
        let mut p = parser("[1, 2, 3]");
        assert_eq!(p.next().unwrap(), Event::ArrayStart);
        assert_eq!(p.next().unwrap(), Event::Int(1));
        assert_eq!(p.next().unwrap(), Event::Int(2));
        assert_eq!(p.next().unwrap(), Event::Int(3));
        assert_eq!(p.next().unwrap(), Event::Break);
    }

    #[test]
    fn object_with_members() {
        let mut p = parser(r#"{"a": 1, "b": true}"#);
        assert_eq!(p.next().unwrap(), Event::MapStart);
        assert_eq!(p.next().unwrap(), Event::String(Cow::Borrowed("a")));
        assert_eq!(p.next().unwrap(), Event::Int(1));
        assert_eq!(p.next().unwrap(), Event::String(Cow::Borrowed("b")));
        assert_eq!(p.next().unwrap(), Event::Boolean(true));
        assert_eq!(p.next().unwrap(), Event::Break);
    }

    #[test]
    fn nested_containers() {
        let mut p = parser(r#"{"a": [1, {"b": 2}]}"#);
        assert_eq!(p.next().unwrap(), Event::MapStart);
        assert_eq!(p.next().unwrap(), Event::String(Cow::Borrowed("a")));
        assert_eq!(p.next().unwrap(), Event::ArrayStart);
        assert_eq!(p.next().unwrap(), Event::Int(1));
        assert_eq!(p.next().unwrap(), Event::MapStart);
        assert_eq!(p.next().unwrap(), Event::String(Cow::Borrowed("b")));
        assert_eq!(p.next().unwrap(), Event::Int(2));
        assert_eq!(p.next().unwrap(), Event::Break); // inner object
        assert_eq!(p.next().unwrap(), Event::Break); // array
        assert_eq!(p.next().unwrap(), Event::Break); // outer object
        assert_eq!(p.next().unwrap(), Event::EndOfInput);
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let mut p = parser("[1,]");
        p.next().unwrap();
        p.next().unwrap();
        assert!(matches!(p.next(), Err(CodecError::InvalidInputData(_, _))));
    }

    #[test]
    fn array_with_trailing_comma_before_close_brace_reports_position_of_brace() {
        let mut p = parser("[1,2,}");
        assert_eq!(p.next().unwrap(), Event::ArrayStart);
        assert_eq!(p.next().unwrap(), Event::Int(1));
        assert_eq!(p.next().unwrap(), Event::Int(2));
        let err = p.next().unwrap_err();
        assert!(matches!(err, CodecError::InvalidInputData(_, _)));
        assert_eq!(err.position(), Position::at(5));
    }

    #[test]
    fn object_key_must_be_string() {
        let mut p = parser("{1: 2}");
        p.next().unwrap();
        assert!(matches!(p.next(), Err(CodecError::InvalidInputData(_, _))));
    }

    #[test]
    fn trailing_data_after_document_is_rejected() {
        let mut p = parser("1 2");
        p.next().unwrap();
        assert!(matches!(p.next(), Err(CodecError::InvalidInputData(_, _))));
    }

    #[test]
    fn malformed_top_level_reports_position() {
        // A lone closing brace is invalid wherever it appears at value position.
        let mut p = parser("}");
        let err = p.next().unwrap_err();
        assert_eq!(err.position(), Position::at(0));
    }

    #[test]
    fn control_character_following_high_byte_is_rejected_on_fast_path() {
        // `"` + [0xC2, 0xA0 (valid UTF-8 for U+00A0 NBSP), 0x1F (raw control char)] + `"`. Every
        // byte up to the closing quote is plain UTF-8, so `scan_plain_run` takes the borrowing
        // fast path; `first_special_byte` must still flag the 0x1F lane even though it follows a
        // byte >= 0xA0 in the same 8-byte word.
        let bytes: &[u8] = &[b'"', 0xC2, 0xA0, 0x1F, b'"'];
        let mut p = JsonParser::new(bytes, JsonDecodingOptions::default());
        assert!(matches!(p.next(), Err(CodecError::InvalidInputData(_, _))));
    }
}

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
 * streamcodec JSON renderer
 *
 * A push sink for the JSON-representable subset of `Event`. Nesting state is packed the same way
 * `crate::validator::Validator` packs its level stack: a `u64` bitmap of container kinds (one bit
 * per depth, `0` = array / `1` = map) and a second `u64` bitmap of per-level parity (for a map,
 * whether the next member at that depth is a key or a value). A single `sep_required` flag tracks
 * whether the *current* (innermost) level has already emitted a member, since pushing a level
 * always starts it empty and popping a level always returns to a parent that, by construction,
 * already holds at least the child container just closed.
 *
 * The two bitmaps bound nesting at 64 levels; deeper input is rejected with `Overflow` rather than
 * silently wrapping, since there is no further bit to record it in.
 **************************************************************************************************/
use alloc::string::String;

use crate::config::JsonEncodingOptions;
use crate::error::{CodecError, Result};
use crate::event::Event;
use crate::kind::Kind;
use crate::output::Output;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// The deepest nesting the bit-packed level state can represent.
const MAX_DEPTH: u8 = 64;

/// Renders a sequence of [`Event`]s as JSON text into an [`Output`] sink.
pub struct JsonRenderer {
    options: JsonEncodingOptions,
    level_is_map: u64,
    level_awaiting_value: u64,
    depth: u8,
    sep_required: bool,
}

impl JsonRenderer {
    /// Construct a renderer governed by `options`.
    #[must_use]
    pub fn new(options: JsonEncodingOptions) -> Self {
        JsonRenderer {
            options,
            level_is_map: 0,
            level_awaiting_value: 0,
            depth: 0,
            sep_required: false,
        }
    }

    fn bit(depth: u8) -> u64 {
        1u64 << (depth - 1)
    }

    fn in_map(&self) -> bool {
        self.depth > 0 && self.level_is_map & Self::bit(self.depth) != 0
    }

    fn awaiting_value(&self) -> bool {
        self.depth > 0 && self.level_awaiting_value & Self::bit(self.depth) != 0
    }

    fn set_awaiting_value(&mut self, v: bool) {
        if self.depth == 0 {
            return;
        }
        let bit = Self::bit(self.depth);
        if v {
            self.level_awaiting_value |= bit;
        } else {
            self.level_awaiting_value &= !bit;
        }
    }

    /// Encode one event, appending its bytes to `out`.
    ///
    /// # Errors
    /// Returns `Unsupported` for any kind the JSON grammar cannot represent (undefined, byte
    /// strings, tags, simple values, `Float16`, definite-length headers, `NaN`/`Infinity`).
    #[cfg_attr(feature = "trace", trace)]
    pub fn render<O: Output>(&mut self, event: &Event<'_>, out: &mut O) -> Result<()> {
        if matches!(event, Event::Break) {
            return self.render_break(out);
        }

        let is_map_key = self.in_map() && !self.awaiting_value();
        if is_map_key && !matches!(event.kind(), Kind::String | Kind::Chars) {
            return Err(CodecError::ValidationFailure(
                out.position(),
                "a JSON map key must be String or Chars",
            ));
        }

        self.write_separator(out, is_map_key)?;

        match event {
            Event::Null => out.write_slice(b"null")?,
            Event::Boolean(true) => out.write_slice(b"true")?,
            Event::Boolean(false) => out.write_slice(b"false")?,
            Event::Int(v) => self.write_ascii_number(alloc::format!("{v}"), out)?,
            Event::Long(v) => self.write_ascii_number(alloc::format!("{v}"), out)?,
            Event::OverLong { value, negative } => {
                let text = if *negative {
                    alloc::format!("-{}", u128::from(*value) + 1)
                } else {
                    alloc::format!("{value}")
                };
                self.write_ascii_number(text, out)?;
            }
            Event::Float(v) => self.write_float(f64::from(*v), out)?,
            Event::Double(v) => self.write_float(*v, out)?,
            Event::NumberString(s) => self.write_ascii_number(String::from(s.as_ref()), out)?,
            Event::String(s) | Event::Chars(s) => self.write_string(s, out)?,
            Event::ArrayStart => self.push(false, out)?,
            Event::MapStart => self.push(true, out)?,
            Event::Undefined => {
                return Err(CodecError::Unsupported(out.position(), "JSON has no `undefined` value"))
            }
            Event::Bytes(_) | Event::BytesStart => {
                return Err(CodecError::Unsupported(
                    out.position(),
                    "JSON cannot represent a byte string; convert to text first",
                ))
            }
            Event::Text(_) | Event::TextStart => {
                return Err(CodecError::Unsupported(
                    out.position(),
                    "Text/TextStart are CBOR-level byte views; use String/Chars for JSON",
                ))
            }
            Event::ArrayHeader(_) | Event::MapHeader(_) => {
                return Err(CodecError::Unsupported(
                    out.position(),
                    "JSON has no definite-length container; use ArrayStart/MapStart",
                ))
            }
            Event::Tag(_) => {
                return Err(CodecError::Unsupported(out.position(), "JSON has no tag mechanism"))
            }
            Event::SimpleValue(_) => {
                return Err(CodecError::Unsupported(out.position(), "JSON has no simple value mechanism"))
            }
            Event::Float16(_) => {
                return Err(CodecError::Unsupported(
                    out.position(),
                    "Float16 has no JSON representation; widen to Float or Double first",
                ))
            }
            Event::Break => unreachable!("handled above"),
            Event::EndOfInput => {}
        }

        if self.depth > 0 {
            if self.in_map() {
                let next_is_value = !self.awaiting_value();
                self.set_awaiting_value(next_is_value);
                // sep_required only matters between siblings, i.e. once a value has been written.
                self.sep_required = !next_is_value;
            } else {
                self.sep_required = true;
            }
        }
        Ok(())
    }

    fn push<O: Output>(&mut self, is_map: bool, out: &mut O) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(CodecError::Overflow(out.position(), "JSON nesting exceeds 64 levels"));
        }
        out.write_u8(if is_map { b'{' } else { b'[' })?;
        self.depth += 1;
        let bit = Self::bit(self.depth);
        if is_map {
            self.level_is_map |= bit;
        } else {
            self.level_is_map &= !bit;
        }
        self.level_awaiting_value &= !bit;
        self.sep_required = false;
        Ok(())
    }

    fn render_break<O: Output>(&mut self, out: &mut O) -> Result<()> {
        if self.depth == 0 {
            return Err(CodecError::ValidationFailure(out.position(), "Break with no open container"));
        }
        let is_map = self.in_map();
        let had_members = self.sep_required;
        self.depth -= 1;
        if had_members && self.options.indent > 0 {
            self.write_newline_indent(out)?;
        }
        out.write_u8(if is_map { b'}' } else { b']' })?;
        if self.depth > 0 {
            self.sep_required = true;
            if self.in_map() {
                self.set_awaiting_value(false);
            }
        }
        Ok(())
    }

    fn write_separator<O: Output>(&mut self, out: &mut O, is_map_key: bool) -> Result<()> {
        if self.depth == 0 {
            return Ok(());
        }
        if self.in_map() && self.awaiting_value() {
            out.write_u8(b':')?;
            if self.options.indent > 0 {
                out.write_u8(b' ')?;
            }
            return Ok(());
        }
        if self.sep_required {
            out.write_u8(b',')?;
        }
        if is_map_key || !self.in_map() {
            if self.options.indent > 0 {
                self.write_newline_indent(out)?;
            }
        }
        Ok(())
    }

    fn write_newline_indent<O: Output>(&self, out: &mut O) -> Result<()> {
        out.write_u8(b'\n')?;
        for _ in 0..(self.options.indent * self.depth as usize) {
            out.write_u8(b' ')?;
        }
        Ok(())
    }

    fn write_ascii_number<O: Output>(&self, text: String, out: &mut O) -> Result<()> {
        out.write_ascii(&text)
    }

    fn write_float<O: Output>(&self, v: f64, out: &mut O) -> Result<()> {
        if v.is_nan() || v.is_infinite() {
            return Err(CodecError::Unsupported(
                out.position(),
                "JSON cannot represent NaN or an infinite float",
            ));
        }
        // `{:?}` always prints a decimal point or exponent, matching JSON's number grammar (which
        // disallows bare integers like `1` for what came in as a float, e.g. `1.0`).
        let text = alloc::format!("{v:?}");
        out.write_ascii(&text)
    }

    fn write_string<O: Output>(&self, s: &str, out: &mut O) -> Result<()> {
        out.write_u8(b'"')?;
        let mut last = 0usize;
        for (i, c) in s.char_indices() {
            let escape: Option<&str> = match c {
                '"' => Some("\\\""),
                '\\' => Some("\\\\"),
                '\u{0008}' => Some("\\b"),
                '\u{000C}' => Some("\\f"),
                '\n' => Some("\\n"),
                '\r' => Some("\\r"),
                '\t' => Some("\\t"),
                c if (c as u32) < 0x20 => None,
                _ => continue,
            };
            if i > last {
                out.write_slice(s[last..i].as_bytes())?;
            }
            match escape {
                Some(seq) => out.write_ascii(seq)?,
                None => out.write_ascii(&alloc::format!("\\u{:04x}", c as u32))?,
            }
            last = i + c.len_utf8();
        }
        if last < s.len() {
            out.write_slice(s[last..].as_bytes())?;
        }
        out.write_u8(b'"')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::VecOutput;

    fn render_all(events: &[Event<'_>], options: JsonEncodingOptions) -> alloc::string::String {
        let mut renderer = JsonRenderer::new(options);
        let mut out = VecOutput::default();
        for e in events {
            renderer.render(e, &mut out).unwrap();
        }
        alloc::string::String::from_utf8(out.into_vec()).unwrap()
    }

    #[test]
    fn scalar_literals() {
        assert_eq!(render_all(&[Event::Null], JsonEncodingOptions::default()), "null");
        assert_eq!(render_all(&[Event::Boolean(true)], JsonEncodingOptions::default()), "true");
        assert_eq!(render_all(&[Event::Int(23)], JsonEncodingOptions::default()), "23");
    }

    #[test]
    fn empty_array_round_trips() {
        let events = [Event::ArrayStart, Event::Break];
        assert_eq!(render_all(&events, JsonEncodingOptions::default()), "[]");
    }

    #[test]
    fn array_with_elements_uses_commas() {
        let events = [Event::ArrayStart, Event::Int(1), Event::Int(2), Event::Int(3), Event::Break];
        assert_eq!(render_all(&events, JsonEncodingOptions::default()), "[1,2,3]");
    }

    #[test]
    fn object_alternates_key_and_value() {
        let events = [
            Event::MapStart,
            Event::String(alloc::borrow::Cow::Borrowed("a")),
            Event::Int(1),
            Event::String(alloc::borrow::Cow::Borrowed("b")),
            Event::Boolean(true),
            Event::Break,
        ];
        assert_eq!(render_all(&events, JsonEncodingOptions::default()), r#"{"a":1,"b":true}"#);
    }

    #[test]
    fn nested_containers_close_correctly() {
        let events = [
            Event::MapStart,
            Event::String(alloc::borrow::Cow::Borrowed("a")),
            Event::ArrayStart,
            Event::Int(1),
            Event::Break,
            Event::Break,
        ];
        assert_eq!(render_all(&events, JsonEncodingOptions::default()), r#"{"a":[1]}"#);
    }

    #[test]
    fn non_string_map_key_is_rejected() {
        let mut renderer = JsonRenderer::new(JsonEncodingOptions::default());
        let mut out = VecOutput::default();
        renderer.render(&Event::MapStart, &mut out).unwrap();
        let err = renderer.render(&Event::Int(1), &mut out).unwrap_err();
        assert!(matches!(err, CodecError::ValidationFailure(_, _)));
    }

    #[test]
    fn undefined_is_unsupported() {
        let mut renderer = JsonRenderer::new(JsonEncodingOptions::default());
        let mut out = VecOutput::default();
        assert!(matches!(
            renderer.render(&Event::Undefined, &mut out),
            Err(CodecError::Unsupported(_, _))
        ));
    }

    #[test]
    fn nan_float_is_unsupported() {
        let mut renderer = JsonRenderer::new(JsonEncodingOptions::default());
        let mut out = VecOutput::default();
        assert!(matches!(
            renderer.render(&Event::Double(f64::NAN), &mut out),
            Err(CodecError::Unsupported(_, _))
        ));
    }

    #[test]
    fn control_characters_escape_as_u00xx() {
        let events = [Event::String(alloc::borrow::Cow::Borrowed("a\u{0001}b"))];
        assert_eq!(render_all(&events, JsonEncodingOptions::default()), r#""a\u0001b""#);
    }

    #[test]
    fn indentation_adds_newlines_and_spaces() {
        let mut options = JsonEncodingOptions::default();
        options.indent = 2;
        let events = [
            Event::ArrayStart,
            Event::Int(1),
            Event::Int(2),
            Event::Break,
        ];
        assert_eq!(render_all(&events, options), "[\n  1,\n  2\n]");
    }
}

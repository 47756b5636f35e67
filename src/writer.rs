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
 * streamcodec push facade
 *
 * `Writer` is the mirror image of [`crate::reader::Reader`]: every `writeX` routes its `Event`
 * through a [`Validator`] (so a malformed call sequence fails the same way a malformed parse
 * would) and then to whichever renderer (CBOR or JSON) was bound at construction. The renderer is
 * chosen once and is never switched mid-stream, matching how a `Reader` is bound to one parser for
 * its whole lifetime.
 *
 * The higher-level combinators (`write_to_array`, `write_iterator`, `write_indexed_seq`,
 * `write_linear_seq`, `write_map`) take a caller-supplied closure instead of a variadic argument
 * list or callback object, which is the idiomatic Rust rendering of "write N values to an array"
 * style helpers.
 **************************************************************************************************/
use alloc::borrow::Cow;

use crate::buffer_cache;
use crate::cbor::renderer::CborRenderer;
use crate::config::{CborEncodingOptions, EncodingOptions, JsonEncodingOptions};
use crate::error::{CodecError, Result};
use crate::event::Event;
use crate::json::renderer::JsonRenderer;
use crate::output::{Output, SliceOutput, VecOutput};
use crate::tag::Tag;
use crate::validator::{Validator, ValidatorOptions};
use crate::Format;

enum RendererImpl {
    Cbor(CborRenderer),
    Json(JsonRenderer),
}

impl RendererImpl {
    fn render<O: Output>(&mut self, event: &Event<'_>, out: &mut O) -> Result<()> {
        match self {
            RendererImpl::Cbor(r) => r.render(event, out),
            RendererImpl::Json(r) => r.render(event, out),
        }
    }
}

/// A push-style cursor that renders a sequence of [`Event`]s as CBOR or JSON bytes into a
/// self-owned [`VecOutput`] buffer.
pub struct Writer {
    renderer: RendererImpl,
    format: Format,
    validator: Option<Validator>,
    encoding: EncodingOptions,
    out: VecOutput,
}

impl Writer {
    /// Construct a `Writer` bound to CBOR, rendering into a freshly-acquired (or cached) buffer.
    #[must_use]
    pub fn new_cbor(encoding: EncodingOptions, cbor: CborEncodingOptions) -> Self {
        Writer {
            renderer: RendererImpl::Cbor(CborRenderer::new(cbor)),
            format: Format::Cbor,
            validator: Some(Validator::new(ValidatorOptions::from(cbor), false)),
            out: Self::acquire_buffer(&encoding),
            encoding,
        }
    }

    /// Construct a `Writer` bound to JSON, rendering into a freshly-acquired (or cached) buffer.
    #[must_use]
    pub fn new_json(encoding: EncodingOptions, json: JsonEncodingOptions) -> Self {
        Writer {
            renderer: RendererImpl::Json(JsonRenderer::new(json)),
            format: Format::Json,
            validator: Some(Validator::new(ValidatorOptions::default(), true)),
            out: Self::acquire_buffer(&encoding),
            encoding,
        }
    }

    /// Disable structural validation for this writer. Useful when replaying already-validated
    /// events (e.g. from a [`crate::reader::Reader`]) where re-checking would be pure overhead.
    #[must_use]
    pub fn without_validation(mut self) -> Self {
        self.validator = None;
        self
    }

    fn acquire_buffer(encoding: &EncodingOptions) -> VecOutput {
        if encoding.allow_buffer_caching {
            VecOutput::from_vec(buffer_cache::acquire(encoding.buffer_size))
        } else {
            VecOutput::with_capacity(encoding.buffer_size)
        }
    }

    /// The wire format this writer was constructed for.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// `true` iff every opened container has been closed and the writer could legally stop now.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.validator.as_ref().map_or(true, Validator::is_complete)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        if let Some(validator) = &mut self.validator {
            let pos = self.out.position();
            validator.accept(&event, pos)?;
        }
        self.renderer.render(&event, &mut self.out)
    }

    /// Signal that no further events will be written. Releases the writer's internal buffer to
    /// the process-wide cache (if enabled) and returns its final rendered bytes.
    ///
    /// # Errors
    /// Fails with `ValidationFailure` if a container opened with `writeArrayStart`/`writeMapHeader`
    /// (etc.) was never closed.
    pub fn write_end_of_input(mut self) -> Result<alloc::vec::Vec<u8>> {
        if let Some(validator) = &self.validator {
            if !validator.is_complete() {
                return Err(CodecError::ValidationFailure(
                    self.out.position(),
                    "writeEndOfInput with an open container",
                ));
            }
        }
        let bytes = self.out.as_slice().to_vec();
        if self.encoding.allow_buffer_caching {
            let mut spare = self.out.into_vec();
            spare.clear();
            buffer_cache::release(spare, self.encoding.max_buffer_size);
        }
        Ok(bytes)
    }

    pub fn write_null(&mut self) -> Result<()> {
        self.emit(Event::Null)
    }

    pub fn write_undefined(&mut self) -> Result<()> {
        self.emit(Event::Undefined)
    }

    pub fn write_boolean(&mut self, v: bool) -> Result<()> {
        self.emit(Event::Boolean(v))
    }

    pub fn write_int(&mut self, v: i32) -> Result<()> {
        self.emit(Event::Int(v))
    }

    pub fn write_long(&mut self, v: i64) -> Result<()> {
        self.emit(Event::Long(v))
    }

    pub fn write_over_long(&mut self, value: u64, negative: bool) -> Result<()> {
        self.emit(Event::OverLong { value, negative })
    }

    pub fn write_float16(&mut self, v: f32) -> Result<()> {
        self.emit(Event::Float16(v))
    }

    pub fn write_float(&mut self, v: f32) -> Result<()> {
        self.emit(Event::Float(v))
    }

    pub fn write_double(&mut self, v: f64) -> Result<()> {
        self.emit(Event::Double(v))
    }

    pub fn write_number_string(&mut self, v: &str) -> Result<()> {
        self.emit(Event::NumberString(Cow::Borrowed(v)))
    }

    pub fn write_string(&mut self, v: &str) -> Result<()> {
        self.emit(Event::String(Cow::Borrowed(v)))
    }

    pub fn write_chars(&mut self, v: &str) -> Result<()> {
        self.emit(Event::Chars(Cow::Borrowed(v)))
    }

    pub fn write_text(&mut self, v: &[u8]) -> Result<()> {
        self.emit(Event::Text(Cow::Borrowed(v)))
    }

    pub fn write_text_start(&mut self) -> Result<()> {
        self.emit(Event::TextStart)
    }

    pub fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.emit(Event::Bytes(Cow::Borrowed(v)))
    }

    pub fn write_bytes_start(&mut self) -> Result<()> {
        self.emit(Event::BytesStart)
    }

    pub fn write_array_header(&mut self, n: u64) -> Result<()> {
        self.emit(Event::ArrayHeader(n))
    }

    pub fn write_array_start(&mut self) -> Result<()> {
        self.emit(Event::ArrayStart)
    }

    pub fn write_map_header(&mut self, n: u64) -> Result<()> {
        self.emit(Event::MapHeader(n))
    }

    pub fn write_map_start(&mut self) -> Result<()> {
        self.emit(Event::MapStart)
    }

    pub fn write_break(&mut self) -> Result<()> {
        self.emit(Event::Break)
    }

    pub fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.emit(Event::Tag(tag))
    }

    pub fn write_simple_value(&mut self, v: u8) -> Result<()> {
        self.emit(Event::SimpleValue(v))
    }

    /// Write an empty array (`writeArrayHeader(0)` in CBOR, `[]` in JSON).
    pub fn write_empty_array(&mut self) -> Result<()> {
        match self.format {
            Format::Cbor => self.write_array_header(0),
            Format::Json => {
                self.write_array_start()?;
                self.write_break()
            }
        }
    }

    /// Write an empty map (`writeMapHeader(0)` in CBOR, `{}` in JSON).
    pub fn write_empty_map(&mut self) -> Result<()> {
        match self.format {
            Format::Cbor => self.write_map_header(0),
            Format::Json => {
                self.write_map_start()?;
                self.write_break()
            }
        }
    }

    /// Write a `len`-element array, delegating the element bodies to `body`: a sized header in
    /// CBOR, an `ArrayStart`/`Break` pair in JSON.
    pub fn write_to_array<F>(&mut self, len: u64, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        match self.format {
            Format::Cbor => {
                self.write_array_header(len)?;
                body(self)
            }
            Format::Json => {
                self.write_array_start()?;
                body(self)?;
                self.write_break()
            }
        }
    }

    /// Write a `len`-pair map, delegating the pair bodies to `body`: a sized header in CBOR, a
    /// `MapStart`/`Break` pair in JSON.
    pub fn write_to_map<F>(&mut self, len: u64, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        match self.format {
            Format::Cbor => {
                self.write_map_header(len)?;
                body(self)
            }
            Format::Json => {
                self.write_map_start()?;
                body(self)?;
                self.write_break()
            }
        }
    }

    /// Write every item of an [`ExactSizeIterator`] as one array, using a definite-length header
    /// since the element count is known ahead of time.
    pub fn write_indexed_seq<I, F>(&mut self, iter: I, mut each: F) -> Result<()>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        F: FnMut(&mut Self, I::Item) -> Result<()>,
    {
        let iter = iter.into_iter();
        let len = iter.len() as u64;
        self.write_to_array(len, move |w| {
            for item in iter {
                each(w, item)?;
            }
            Ok(())
        })
    }

    /// Write every item of a plain [`Iterator`] as one array. Since the element count is not known
    /// ahead of time, this always uses the indefinite-length form (`ArrayStart`/`Break` in both
    /// CBOR and JSON) regardless of format.
    pub fn write_linear_seq<I, F>(&mut self, iter: I, mut each: F) -> Result<()>
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item) -> Result<()>,
    {
        self.write_array_start()?;
        for item in iter {
            each(self, item)?;
        }
        self.write_break()
    }

    /// Write every item of an [`ExactSizeIterator`] of `(key, value)` pairs as one map, using a
    /// definite-length header since the pair count is known ahead of time.
    pub fn write_map<I, F>(&mut self, iter: I, mut each: F) -> Result<()>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        F: FnMut(&mut Self, I::Item) -> Result<()>,
    {
        let iter = iter.into_iter();
        let len = iter.len() as u64;
        self.write_to_map(len, move |w| {
            for item in iter {
                each(w, item)?;
            }
            Ok(())
        })
    }

    /// Render directly into a caller-provided fixed-capacity buffer instead of the writer's own
    /// growable one. Used by callers who already own a suitably-sized output region and want to
    /// avoid the extra copy `write_end_of_input` would otherwise incur.
    pub fn render_one_into(&mut self, event: &Event<'_>, out: &mut SliceOutput<'_>) -> Result<()> {
        if let Some(validator) = &mut self.validator {
            validator.accept(event, out.position())?;
        }
        self.renderer.render(event, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cbor_writer() -> Writer {
        Writer::new_cbor(EncodingOptions::default(), CborEncodingOptions::default())
    }

    fn json_writer() -> Writer {
        Writer::new_json(EncodingOptions::default(), JsonEncodingOptions::default())
    }

    #[test]
    fn writes_a_scalar_and_completes() {
        let mut w = cbor_writer();
        w.write_int(23).unwrap();
        assert!(w.is_complete());
        assert_eq!(w.write_end_of_input().unwrap(), vec![0x17]);
    }

    #[test]
    fn write_end_of_input_rejects_an_open_container() {
        let mut w = cbor_writer();
        w.write_array_start().unwrap();
        assert!(!w.is_complete());
        assert!(w.write_end_of_input().is_err());
    }

    #[test]
    fn write_to_array_uses_definite_header_in_cbor_and_start_break_in_json() {
        let mut w = cbor_writer();
        w.write_to_array(2, |w| {
            w.write_int(1)?;
            w.write_int(2)
        })
        .unwrap();
        assert_eq!(w.write_end_of_input().unwrap(), vec![0x82, 0x01, 0x02]);

        let mut w = json_writer();
        w.write_to_array(2, |w| {
            w.write_int(1)?;
            w.write_int(2)
        })
        .unwrap();
        assert_eq!(w.write_end_of_input().unwrap(), b"[1,2]".to_vec());
    }

    #[test]
    fn write_empty_array_and_map() {
        let mut w = cbor_writer();
        w.write_empty_array().unwrap();
        w.write_empty_map().unwrap();
        assert_eq!(w.write_end_of_input().unwrap(), vec![0x80, 0xa0]);
    }

    #[test]
    fn write_indexed_seq_matches_element_count() {
        let mut w = cbor_writer();
        w.write_indexed_seq([1, 2, 3], |w, v| w.write_int(v)).unwrap();
        assert_eq!(w.write_end_of_input().unwrap(), vec![0x83, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn write_linear_seq_always_uses_indefinite_form() {
        let mut w = cbor_writer();
        w.write_linear_seq([1, 2], |w, v| w.write_int(v)).unwrap();
        assert_eq!(w.write_end_of_input().unwrap(), vec![0x9f, 0x01, 0x02, 0xff]);
    }

    #[test]
    fn write_map_writes_alternating_key_value_pairs() {
        let mut w = cbor_writer();
        w.write_map([("a", 1), ("b", 2)], |w, (k, v)| {
            w.write_string(k)?;
            w.write_int(v)
        })
        .unwrap();
        let bytes = w.write_end_of_input().unwrap();
        assert_eq!(bytes[0], 0xa2);
    }

    #[test]
    fn json_map_key_must_be_string_like() {
        let mut w = json_writer();
        w.write_map_start().unwrap();
        assert!(w.write_int(1).is_err());
    }

    #[test]
    fn without_validation_skips_structural_checks() {
        let mut w = cbor_writer().without_validation();
        w.write_break().unwrap();
        assert_eq!(w.write_end_of_input().unwrap(), vec![0xff]);
    }
}

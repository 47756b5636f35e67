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
 * streamcodec CBOR renderer
 *
 * Turns `Event`s into RFC 8949 bytes. Picks the shortest major-type/additional-information
 * encoding for every integer argument (mirroring the width selection `tps_minicbor`'s missing
 * `encode.rs` is referenced performing from `tag.rs`/`array.rs`), and applies the float compression
 * ladder described in the design's §4.3 when `compress_floating_point_values` is enabled.
 **************************************************************************************************/
use crate::config::CborEncodingOptions;
use crate::error::{CodecError, Result};
use crate::event::Event;
use crate::output::Output;
use crate::tag::Tag;

use super::constants::*;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Renders a sequence of [`Event`]s as CBOR bytes into an [`Output`] sink.
pub struct CborRenderer {
    options: CborEncodingOptions,
}

impl CborRenderer {
    /// Construct a renderer governed by `options`.
    #[must_use]
    pub fn new(options: CborEncodingOptions) -> Self {
        CborRenderer { options }
    }

    /// Encode one event, appending its bytes to `out`.
    #[cfg_attr(feature = "trace", trace)]
    pub fn render<O: Output>(&self, event: &Event<'_>, out: &mut O) -> Result<()> {
        match event {
            Event::Null => out.write_u8(0xE0 | SIMPLE_NULL),
            Event::Undefined => out.write_u8(0xE0 | SIMPLE_UNDEFINED),
            Event::Boolean(false) => out.write_u8(0xE0 | SIMPLE_FALSE),
            Event::Boolean(true) => out.write_u8(0xE0 | SIMPLE_TRUE),
            Event::Int(v) => self.write_integer(*v as i64, out),
            Event::Long(v) => self.write_integer(*v, out),
            Event::OverLong { value, negative } => self.write_head(
                if *negative { MT_NEGATIVE } else { MT_UNSIGNED },
                *value,
                out,
            ),
            Event::Float16(v) => self.write_float(*v as f64, FloatWidth::Sixteen, out),
            Event::Float(v) => self.write_float(*v as f64, FloatWidth::ThirtyTwo, out),
            Event::Double(v) => self.write_float(*v, FloatWidth::SixtyFour, out),
            Event::NumberString(_) => Err(CodecError::Unsupported(
                out.position(),
                "NumberString has no canonical CBOR encoding; convert to a numeric kind first",
            )),
            Event::String(s) => self.write_text(s.as_bytes(), out),
            Event::Chars(s) => self.write_text(s.as_bytes(), out),
            Event::Text(b) => self.write_text(b, out),
            Event::TextStart => out.write_u8((MT_TEXT << MAJOR_SHIFT) | AI_INDEFINITE),
            Event::Bytes(b) => self.write_bytes(b, out),
            Event::BytesStart => out.write_u8((MT_BYTES << MAJOR_SHIFT) | AI_INDEFINITE),
            Event::ArrayHeader(n) => {
                self.check_length(*n as usize, self.options.max_array_length, out)?;
                self.write_head(MT_ARRAY, *n, out)
            }
            Event::ArrayStart => out.write_u8((MT_ARRAY << MAJOR_SHIFT) | AI_INDEFINITE),
            Event::MapHeader(n) => {
                self.check_length(*n as usize, self.options.max_map_length, out)?;
                self.write_head(MT_MAP, *n, out)
            }
            Event::MapStart => out.write_u8((MT_MAP << MAJOR_SHIFT) | AI_INDEFINITE),
            Event::Break => out.write_u8(0xFF),
            Event::Tag(tag) => self.write_head(MT_TAG, tag.value(), out),
            Event::SimpleValue(v) => self.write_simple_value(*v, out),
            Event::EndOfInput => Ok(()),
        }
    }

    fn write_integer<O: Output>(&self, v: i64, out: &mut O) -> Result<()> {
        if v >= 0 {
            self.write_head(MT_UNSIGNED, v as u64, out)
        } else {
            // CBOR major type 1 encodes `-1 - v`; this is exact for every i64 except i64::MIN,
            // where `-1 - v` would overflow i64 but fits u64 via wrapping arithmetic.
            let magnitude = (-1i64).wrapping_sub(v) as u64;
            self.write_head(MT_NEGATIVE, magnitude, out)
        }
    }

    /// Write a major-type/additional-information head for a value in `0..=u64::MAX`, choosing the
    /// narrowest encoding (inline, 1, 2, 4 or 8 bytes) that round-trips `value` exactly.
    fn write_head<O: Output>(&self, major: u8, value: u64, out: &mut O) -> Result<()> {
        let major_bits = major << MAJOR_SHIFT;
        if value <= PAYLOAD_AI_BITS as u64 {
            out.write_u8(major_bits | value as u8)
        } else if value <= u8::MAX as u64 {
            out.write_u8(major_bits | PAYLOAD_ONE_BYTE)?;
            out.write_u8(value as u8)
        } else if value <= u16::MAX as u64 {
            out.write_u8(major_bits | PAYLOAD_TWO_BYTES)?;
            out.write_be_u16(value as u16)
        } else if value <= u32::MAX as u64 {
            out.write_u8(major_bits | PAYLOAD_FOUR_BYTES)?;
            out.write_be_u32(value as u32)
        } else {
            out.write_u8(major_bits | PAYLOAD_EIGHT_BYTES)?;
            out.write_be_u64(value)
        }
    }

    fn write_bytes<O: Output>(&self, bytes: &[u8], out: &mut O) -> Result<()> {
        self.write_head(MT_BYTES, bytes.len() as u64, out)?;
        out.write_slice(bytes)
    }

    fn write_text<O: Output>(&self, bytes: &[u8], out: &mut O) -> Result<()> {
        self.write_head(MT_TEXT, bytes.len() as u64, out)?;
        out.write_slice(bytes)
    }

    fn write_simple_value<O: Output>(&self, v: u8, out: &mut O) -> Result<()> {
        if v < 32 {
            out.write_u8((MT_SPECIAL << MAJOR_SHIFT) | v)
        } else {
            out.write_u8((MT_SPECIAL << MAJOR_SHIFT) | PAYLOAD_ONE_BYTE)?;
            out.write_u8(v)
        }
    }

    /// Apply the float compression ladder: `Double` collapses to `Float` or `Float16` when doing
    /// so loses no precision and `compress_floating_point_values` is enabled; otherwise the
    /// original width (or the width named by the event kind) is kept.
    fn write_float<O: Output>(&self, v: f64, from: FloatWidth, out: &mut O) -> Result<()> {
        let width = if self.options.compress_floating_point_values {
            narrowest_lossless_width(v, from)
        } else {
            from
        };
        match width {
            FloatWidth::Sixteen => {
                let bits = half::f16::from_f64(v).to_bits();
                out.write_u8((MT_SPECIAL << MAJOR_SHIFT) | FLOAT16)?;
                out.write_be_u16(bits)
            }
            FloatWidth::ThirtyTwo => {
                out.write_u8((MT_SPECIAL << MAJOR_SHIFT) | FLOAT32)?;
                out.write_be_u32((v as f32).to_bits())
            }
            FloatWidth::SixtyFour => {
                out.write_u8((MT_SPECIAL << MAJOR_SHIFT) | FLOAT64)?;
                out.write_be_u64(v.to_bits())
            }
        }
    }

    fn check_length<O: Output>(&self, n: usize, max: usize, out: &O) -> Result<()> {
        if n > max {
            return Err(CodecError::Overflow(
                out.position(),
                "declared length exceeds configured maximum",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum FloatWidth {
    Sixteen,
    ThirtyTwo,
    SixtyFour,
}

/// The narrowest width in `Sixteen..=from` that represents `v` without loss, per the float
/// compression policy: `NaN` and the two infinities always compress to `Float16` (the narrowest
/// width can represent them exactly), and any other value is tried at `Float16`, then `Float`,
/// falling back to `from` only if both narrower round-trips lose precision.
fn narrowest_lossless_width(v: f64, from: FloatWidth) -> FloatWidth {
    #[cfg(feature = "float")]
    {
        if v.is_nan() || v.is_infinite() {
            return FloatWidth::Sixteen;
        }
        if from >= FloatWidth::Sixteen {
            let as_f16 = half::f16::from_f64(v);
            if as_f16.to_f64() == v {
                return FloatWidth::Sixteen;
            }
        }
    }
    if from >= FloatWidth::ThirtyTwo {
        let as_f32 = v as f32;
        if f64::from(as_f32) == v {
            return FloatWidth::ThirtyTwo;
        }
    }
    from
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::VecOutput;

    fn render(event: Event<'_>, options: CborEncodingOptions) -> alloc::vec::Vec<u8> {
        let renderer = CborRenderer::new(options);
        let mut out = VecOutput::default();
        renderer.render(&event, &mut out).unwrap();
        out.into_vec()
    }

    #[test]
    fn small_positive_int_is_inline() {
        assert_eq!(render(Event::Int(23), CborEncodingOptions::default()), vec![0x17]);
    }

    #[test]
    fn negative_int_uses_major_type_one() {
        assert_eq!(render(Event::Int(-1), CborEncodingOptions::default()), vec![0x20]);
    }

    #[test]
    fn overlong_preserves_raw_magnitude() {
        let bytes = render(
            Event::OverLong { value: u64::MAX, negative: false },
            CborEncodingOptions::default(),
        );
        assert_eq!(bytes, vec![0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn double_collapses_to_float16_when_lossless() {
        let bytes = render(Event::Double(1.0), CborEncodingOptions::default());
        assert_eq!(bytes, vec![0xf9, 0x3c, 0x00]);
    }

    #[test]
    fn double_stays_wide_when_compression_disabled() {
        let mut options = CborEncodingOptions::default();
        options.compress_floating_point_values = false;
        let bytes = render(Event::Double(1.0), options);
        assert_eq!(bytes[0], 0xfb);
        assert_eq!(bytes.len(), 9);
    }

    #[test]
    fn double_requiring_full_precision_is_not_compressed() {
        let v = 0.1f64;
        let bytes = render(Event::Double(v), CborEncodingOptions::default());
        assert_eq!(bytes[0], 0xfb);
    }

    #[test]
    fn indefinite_array_round_trips_start_and_break() {
        assert_eq!(render(Event::ArrayStart, CborEncodingOptions::default()), vec![0x9f]);
        assert_eq!(render(Event::Break, CborEncodingOptions::default()), vec![0xff]);
    }

    #[test]
    fn tag_writes_its_numeric_value() {
        assert_eq!(
            render(Event::Tag(Tag::EpochDateTime), CborEncodingOptions::default()),
            vec![0xc1]
        );
    }

    #[test]
    fn number_string_is_unsupported_in_cbor() {
        let renderer = CborRenderer::new(CborEncodingOptions::default());
        let mut out = VecOutput::default();
        let err = renderer
            .render(&Event::NumberString(alloc::borrow::Cow::Borrowed("1.5")), &mut out)
            .unwrap_err();
        assert!(matches!(err, CodecError::Unsupported(_, _)));
    }

    #[test]
    fn array_header_over_limit_is_rejected() {
        let mut options = CborEncodingOptions::default();
        options.max_array_length = 1;
        let renderer = CborRenderer::new(options);
        let mut out = VecOutput::default();
        assert!(matches!(
            renderer.render(&Event::ArrayHeader(2), &mut out),
            Err(CodecError::Overflow(_, _))
        ));
    }
}

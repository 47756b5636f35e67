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
 * streamcodec structural validator
 *
 * A transparent interposer between a parser and [`crate::reader::Reader`]'s receptacle (decode
 * direction), or between [`crate::writer::Writer`] and a renderer (encode direction). It carries no
 * knowledge of either wire format's byte-level grammar; it only re-derives and enforces the
 * invariants that both formats' event streams must satisfy (§3 of the design notes): correct
 * nesting, correct `Break` placement, map arity, and (in JSON mode) string-only map keys.
 *
 * Every open container is one [`Level`] on a stack. A level's `remaining` field is the classic
 * "how many more items at this depth" counter generalized with a `-1` sentinel for indefinite
 * containers (which close on `Break` rather than a count reaching zero). `Tag` is modeled as a
 * bounded level of size one: pushing it defers the parent's decrement until the tagged item itself
 * is fully consumed, which is exactly what makes a chain of tags collapse correctly (`Tag(Tag(x))`
 * pops twice, cascading the single decrement up through both tag levels before reaching the actual
 * parent).
 **************************************************************************************************/
use alloc::vec::Vec;

use crate::error::{CodecError, Result};
use crate::event::Event;
use crate::kind::{self, Kind, KindMask};
use crate::position::Position;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Caps the validator enforces independent of which format's own parser/renderer options produced
/// or will consume the event stream.
///
/// CBOR carries `maxArrayLength`/`maxMapLength`/`maxNestingLevels` as part of its own encoding and
/// decoding options (they double as the header size a CBOR parser refuses to allocate for); JSON
/// has no equivalent field since an object or array header never declares its length up front. A
/// `ValidatorOptions` is constructed from the active format's config when one exists, or from
/// [`ValidatorOptions::default`] for JSON, so the same structural caps apply uniformly either way.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ValidatorOptions {
    /// Reject an `ArrayHeader`/`ArrayStart` whose declared or actual element count exceeds this.
    pub max_array_length: usize,
    /// Reject a `MapHeader`/`MapStart` whose declared or actual pair count exceeds this.
    pub max_map_length: usize,
    /// Reject input/output nested more than this many container levels deep.
    pub max_nesting_levels: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions {
            max_array_length: usize::MAX,
            max_map_length: usize::MAX,
            max_nesting_levels: 1000,
        }
    }
}

impl From<crate::config::CborDecodingOptions> for ValidatorOptions {
    fn from(o: crate::config::CborDecodingOptions) -> Self {
        ValidatorOptions {
            max_array_length: o.max_array_length,
            max_map_length: o.max_map_length,
            max_nesting_levels: o.max_nesting_levels,
        }
    }
}

impl From<crate::config::CborEncodingOptions> for ValidatorOptions {
    fn from(o: crate::config::CborEncodingOptions) -> Self {
        ValidatorOptions {
            max_array_length: o.max_array_length,
            max_map_length: o.max_map_length,
            max_nesting_levels: o.max_nesting_levels,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Level {
    /// `-1` for an indefinite-length (unbounded) container; otherwise the number of further items
    /// still expected at this depth.
    remaining: i64,
    is_map: bool,
    /// Only meaningful when `is_map`: `true` once a key has been emitted and a value is due.
    awaiting_value: bool,
    /// The [`KindMask`] the next event at this depth must satisfy (excluding `Break`, which is
    /// checked separately against `remaining`/`is_map`/`awaiting_value` instead of this mask).
    mask: KindMask,
}

impl Level {
    fn bounded(remaining: i64, mask: KindMask, is_map: bool) -> Self {
        Level { remaining, is_map, awaiting_value: false, mask }
    }

    fn unbounded(mask: KindMask, is_map: bool) -> Self {
        Level { remaining: -1, is_map, awaiting_value: false, mask }
    }

    fn is_unbounded(&self) -> bool {
        self.remaining < 0
    }
}

/// Mask of the member kinds valid inside an indefinite-length text stream (§3: `String | Chars |
/// Text | TextStart | Break`, minus `Break` which every level checks separately).
fn text_member_mask() -> KindMask {
    kind::STRING_LIKE | Kind::Text.mask() | Kind::TextStart.mask()
}

/// Mask of the member kinds valid inside an indefinite-length byte stream (§3: `Bytes | BytesStart
/// | Break`, minus `Break`).
fn bytes_member_mask() -> KindMask {
    Kind::Bytes.mask() | Kind::BytesStart.mask()
}

/// Enforces the structural invariants of §3/§4.7 on an [`Event`] stream, independent of direction.
pub struct Validator {
    options: ValidatorOptions,
    json_mode: bool,
    stack: Vec<Level>,
}

impl Validator {
    /// Construct a validator. `json_mode` additionally restricts map keys to `String | Chars` and
    /// is otherwise permissive about which kind of value may serve as a CBOR map key.
    #[must_use]
    pub fn new(options: ValidatorOptions, json_mode: bool) -> Self {
        Validator { options, json_mode, stack: Vec::new() }
    }

    /// `true` once every opened container has been closed; checked at end-of-input.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stack.is_empty()
    }

    /// The number of container levels currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn key_mask(&self) -> KindMask {
        if self.json_mode {
            kind::STRING_LIKE
        } else {
            kind::ALL_BUT_BREAK
        }
    }

    fn current_mask(&self) -> KindMask {
        match self.stack.last() {
            None => kind::ALL_BUT_BREAK,
            Some(level) => level.mask,
        }
    }

    /// Validate one event at position `pos` (the parser's or renderer's current offset, used only
    /// to annotate any error raised). Must be called for every event in stream order, including
    /// [`Event::EndOfInput`].
    #[cfg_attr(feature = "trace", trace)]
    pub fn accept(&mut self, event: &Event<'_>, pos: Position) -> Result<()> {
        if matches!(event, Event::EndOfInput) {
            return if self.stack.is_empty() {
                Ok(())
            } else {
                Err(CodecError::ValidationFailure(pos, "end of input with containers still open"))
            };
        }

        if matches!(event, Event::Break) {
            return self.accept_break(pos);
        }

        if !self.current_mask().contains(event.kind()) {
            return Err(CodecError::ValidationFailure(pos, "event kind not allowed at this position"));
        }

        match event {
            Event::Tag(tag) => self.push_level(Level::bounded(1, tag.content_mask(), false), pos)?,
            Event::ArrayHeader(n) => {
                self.check_length(*n as usize, self.options.max_array_length, pos)?;
                if *n == 0 {
                    self.consume(pos)?;
                } else {
                    self.push_level(Level::bounded(*n as i64, kind::ALL_BUT_BREAK, false), pos)?;
                }
            }
            Event::MapHeader(n) => {
                self.check_length(*n as usize, self.options.max_map_length, pos)?;
                if *n == 0 {
                    self.consume(pos)?;
                } else {
                    let mask = self.key_mask();
                    self.push_level(Level::bounded((*n as i64) * 2, mask, true), pos)?;
                }
            }
            Event::ArrayStart => self.push_level(Level::unbounded(kind::ALL_BUT_BREAK, false), pos)?,
            Event::MapStart => {
                let mask = self.key_mask();
                self.push_level(Level::unbounded(mask, true), pos)?;
            }
            Event::TextStart => self.push_level(Level::unbounded(text_member_mask(), false), pos)?,
            Event::BytesStart => self.push_level(Level::unbounded(bytes_member_mask(), false), pos)?,
            _ => self.consume(pos)?,
        }
        Ok(())
    }

    fn push_level(&mut self, level: Level, pos: Position) -> Result<()> {
        if self.stack.len() >= self.options.max_nesting_levels {
            return Err(CodecError::Overflow(pos, "nesting depth exceeds configured maximum"));
        }
        self.stack.push(level);
        Ok(())
    }

    fn check_length(&self, n: usize, max: usize, pos: Position) -> Result<()> {
        if n > max {
            return Err(CodecError::Overflow(pos, "declared length exceeds configured maximum"));
        }
        Ok(())
    }

    fn accept_break(&mut self, pos: Position) -> Result<()> {
        let level = self
            .stack
            .last()
            .ok_or(CodecError::ValidationFailure(pos, "Break with no open container"))?;
        if !level.is_unbounded() {
            return Err(CodecError::ValidationFailure(
                pos,
                "Break is only valid inside an indefinite-length container",
            ));
        }
        if level.is_map && level.awaiting_value {
            return Err(CodecError::ValidationFailure(pos, "Break in the middle of a map pair"));
        }
        self.stack.pop();
        self.consume(pos)
    }

    /// Record that one item was fully consumed at the current (innermost) level, cascading the
    /// consumption into the parent level whenever a bounded level's count reaches zero (the
    /// mechanism that correctly ends a `Tag`'s single-child scope, possibly chained).
    fn consume(&mut self, pos: Position) -> Result<()> {
        loop {
            let Some(level) = self.stack.last_mut() else {
                return Ok(());
            };
            if level.is_unbounded() {
                Self::advance_map_parity(level, self.json_mode);
                return Ok(());
            }
            level.remaining -= 1;
            if level.remaining > 0 {
                Self::advance_map_parity(level, self.json_mode);
                return Ok(());
            }
            if level.remaining < 0 {
                return Err(CodecError::ValidationFailure(pos, "map/array received more items than declared"));
            }
            self.stack.pop();
            // Loop again: popping this level is itself one consumed item of its parent.
        }
    }

    fn advance_map_parity(level: &mut Level, json_mode: bool) {
        if !level.is_map {
            return;
        }
        level.awaiting_value = !level.awaiting_value;
        if json_mode {
            level.mask = if level.awaiting_value { kind::ALL_BUT_BREAK } else { kind::STRING_LIKE };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;

    fn accept_all(v: &mut Validator, events: &[Event<'_>]) -> Result<()> {
        for e in events {
            v.accept(e, Position::at(0))?;
        }
        Ok(())
    }

    #[test]
    fn definite_array_of_scalars_is_complete() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        accept_all(&mut v, &[Event::ArrayHeader(2), Event::Int(1), Event::Int(2)]).unwrap();
        assert!(v.is_complete());
    }

    #[test]
    fn indefinite_array_needs_explicit_break() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        accept_all(&mut v, &[Event::ArrayStart, Event::Int(1)]).unwrap();
        assert!(!v.is_complete());
        v.accept(&Event::Break, Position::at(0)).unwrap();
        assert!(v.is_complete());
    }

    #[test]
    fn break_outside_any_container_is_rejected() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        assert!(matches!(
            v.accept(&Event::Break, Position::at(0)),
            Err(CodecError::ValidationFailure(_, _))
        ));
    }

    #[test]
    fn break_inside_definite_container_is_rejected() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        v.accept(&Event::ArrayHeader(1), Position::at(0)).unwrap();
        assert!(matches!(
            v.accept(&Event::Break, Position::at(0)),
            Err(CodecError::ValidationFailure(_, _))
        ));
    }

    #[test]
    fn zero_length_header_does_not_push() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        v.accept(&Event::ArrayHeader(0), Position::at(0)).unwrap();
        assert!(v.is_complete());
    }

    #[test]
    fn map_header_expects_twice_n_items() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        accept_all(
            &mut v,
            &[
                Event::MapHeader(1),
                Event::String(alloc::borrow::Cow::Borrowed("k")),
                Event::Int(1),
            ],
        )
        .unwrap();
        assert!(v.is_complete());
    }

    #[test]
    fn json_mode_rejects_non_string_map_key() {
        let mut v = Validator::new(ValidatorOptions::default(), true);
        v.accept(&Event::MapStart, Position::at(0)).unwrap();
        assert!(matches!(
            v.accept(&Event::Int(1), Position::at(0)),
            Err(CodecError::ValidationFailure(_, _))
        ));
    }

    #[test]
    fn cbor_mode_allows_non_string_map_key() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        v.accept(&Event::MapStart, Position::at(0)).unwrap();
        v.accept(&Event::Int(1), Position::at(0)).unwrap();
        v.accept(&Event::Int(2), Position::at(0)).unwrap();
        v.accept(&Event::Break, Position::at(0)).unwrap();
        assert!(v.is_complete());
    }

    #[test]
    fn map_break_mid_pair_is_rejected() {
        let mut v = Validator::new(ValidatorOptions::default(), true);
        v.accept(&Event::MapStart, Position::at(0)).unwrap();
        v.accept(&Event::String(alloc::borrow::Cow::Borrowed("k")), Position::at(0)).unwrap();
        assert!(matches!(
            v.accept(&Event::Break, Position::at(0)),
            Err(CodecError::ValidationFailure(_, _))
        ));
    }

    #[test]
    fn tag_chain_cascades_a_single_consumption() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        accept_all(
            &mut v,
            &[Event::ArrayHeader(1), Event::Tag(Tag::EpochDateTime), Event::Int(1)],
        )
        .unwrap();
        assert!(v.is_complete());
    }

    #[test]
    fn tag_content_mask_rejects_mismatched_kind() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        v.accept(&Event::Tag(Tag::PositiveBigNum), Position::at(0)).unwrap();
        assert!(matches!(
            v.accept(&Event::Int(1), Position::at(0)),
            Err(CodecError::ValidationFailure(_, _))
        ));
    }

    #[test]
    fn end_of_input_with_open_container_is_rejected() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        v.accept(&Event::ArrayStart, Position::at(0)).unwrap();
        assert!(matches!(
            v.accept(&Event::EndOfInput, Position::at(0)),
            Err(CodecError::ValidationFailure(_, _))
        ));
    }

    #[test]
    fn nesting_beyond_configured_maximum_overflows() {
        let mut options = ValidatorOptions::default();
        options.max_nesting_levels = 1;
        let mut v = Validator::new(options, false);
        v.accept(&Event::ArrayStart, Position::at(0)).unwrap();
        assert!(matches!(
            v.accept(&Event::ArrayStart, Position::at(0)),
            Err(CodecError::Overflow(_, _))
        ));
    }

    #[test]
    fn array_length_over_configured_maximum_overflows() {
        let mut options = ValidatorOptions::default();
        options.max_array_length = 1;
        let mut v = Validator::new(options, false);
        assert!(matches!(
            v.accept(&Event::ArrayHeader(2), Position::at(0)),
            Err(CodecError::Overflow(_, _))
        ));
    }

    #[test]
    fn text_stream_rejects_non_string_like_member() {
        let mut v = Validator::new(ValidatorOptions::default(), false);
        v.accept(&Event::TextStart, Position::at(0)).unwrap();
        assert!(matches!(
            v.accept(&Event::Int(1), Position::at(0)),
            Err(CodecError::ValidationFailure(_, _))
        ));
    }
}

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
 * streamcodec data-item taxonomy
 *
 * Enumerates every event kind the pipeline can carry and gives each one a bit position so that a
 * set of "expected" or "allowed" kinds can be represented as a single `u32` mask. This is the same
 * pattern `tps_minicbor` uses for its `Allowable` combinator mask, generalized from eight CBOR
 * families to the full 24-member event vocabulary shared by CBOR and JSON.
 **************************************************************************************************/

/// A bitmask over [`Kind`] values. Bit `n` is set iff `Kind` with discriminant `n` is a member.
///
/// Masks compose with ordinary bitwise operators: `Kind::Int.mask() | Kind::Long.mask()` describes
/// "either an `Int` or a `Long`".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct KindMask(pub u32);

impl KindMask {
    /// The empty mask: no kind is a member.
    pub const NONE: KindMask = KindMask(0);

    /// Returns `true` if `kind` is a member of this mask.
    #[must_use]
    #[inline]
    pub fn contains(self, kind: Kind) -> bool {
        self.0 & kind.mask().0 != 0
    }

    /// Returns `true` if this mask has no members.
    #[must_use]
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for KindMask {
    type Output = KindMask;
    #[inline]
    fn bitor(self, rhs: KindMask) -> KindMask {
        KindMask(self.0 | rhs.0)
    }
}

impl core::ops::BitAnd for KindMask {
    type Output = KindMask;
    #[inline]
    fn bitand(self, rhs: KindMask) -> KindMask {
        KindMask(self.0 & rhs.0)
    }
}

impl core::ops::Not for KindMask {
    type Output = KindMask;
    #[inline]
    fn not(self) -> KindMask {
        KindMask(!self.0 & ALL.0)
    }
}

/// The discriminant of a data-item event, independent of its payload. Each variant owns exactly
/// one bit position in `0..24` of a [`KindMask`]; the crate never needs more than a `u32`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    Null = 0,
    Undefined = 1,
    Boolean = 2,
    Int = 3,
    Long = 4,
    OverLong = 5,
    Float16 = 6,
    Float = 7,
    Double = 8,
    NumberString = 9,
    String = 10,
    Chars = 11,
    Text = 12,
    TextStart = 13,
    Bytes = 14,
    BytesStart = 15,
    ArrayHeader = 16,
    ArrayStart = 17,
    MapHeader = 18,
    MapStart = 19,
    Break = 20,
    Tag = 21,
    SimpleValue = 22,
    EndOfInput = 23,
}

impl Kind {
    /// The singleton [`KindMask`] containing only this kind.
    #[must_use]
    #[inline]
    pub fn mask(self) -> KindMask {
        KindMask(1u32 << (self as u8))
    }

    /// A human-readable name, used in `ExpectedType`-style validation and reader errors.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "Null",
            Kind::Undefined => "Undefined",
            Kind::Boolean => "Boolean",
            Kind::Int => "Int",
            Kind::Long => "Long",
            Kind::OverLong => "OverLong",
            Kind::Float16 => "Float16",
            Kind::Float => "Float",
            Kind::Double => "Double",
            Kind::NumberString => "NumberString",
            Kind::String => "String",
            Kind::Chars => "Chars",
            Kind::Text => "Text",
            Kind::TextStart => "TextStart",
            Kind::Bytes => "Bytes",
            Kind::BytesStart => "BytesStart",
            Kind::ArrayHeader => "ArrayHeader",
            Kind::ArrayStart => "ArrayStart",
            Kind::MapHeader => "MapHeader",
            Kind::MapStart => "MapStart",
            Kind::Break => "Break",
            Kind::Tag => "Tag",
            Kind::SimpleValue => "SimpleValue",
            Kind::EndOfInput => "EndOfInput",
        }
    }
}

/// Mask containing every [`Kind`] in `0..24`.
pub const ALL: KindMask = KindMask((1u32 << 24) - 1);

/// `AllButBreak` = every kind except [`Kind::Break`]. This is the default "what can start a new
/// element" mask used by the validator at the top level and inside definite-length containers.
pub const ALL_BUT_BREAK: KindMask = KindMask(ALL.0 & !Kind::Break.mask().0);

/// `StringLike` = `String | Chars`. Used wherever a CBOR map key or well-known text tag content is
/// constrained to the in-memory string representations (as opposed to the wire-level `Text`).
pub const STRING_LIKE: KindMask = KindMask(Kind::String.mask().0 | Kind::Chars.mask().0);

/// Any of the kinds that carry an integral value usable as a map key or array index, union of the
/// bounded and unbounded integer representations the CBOR parser can emit.
pub const ANY_INTEGER: KindMask =
    KindMask(Kind::Int.mask().0 | Kind::Long.mask().0 | Kind::OverLong.mask().0);

/// Any of the kinds that carry a floating-point or numeric-text value.
pub const ANY_FLOAT: KindMask = KindMask(
    Kind::Float16.mask().0 | Kind::Float.mask().0 | Kind::Double.mask().0 | Kind::NumberString.mask().0,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_masks_are_disjoint() {
        let kinds = [
            Kind::Null, Kind::Undefined, Kind::Boolean, Kind::Int, Kind::Long, Kind::OverLong,
            Kind::Float16, Kind::Float, Kind::Double, Kind::NumberString, Kind::String,
            Kind::Chars, Kind::Text, Kind::TextStart, Kind::Bytes, Kind::BytesStart,
            Kind::ArrayHeader, Kind::ArrayStart, Kind::MapHeader, Kind::MapStart, Kind::Break,
            Kind::Tag, Kind::SimpleValue, Kind::EndOfInput,
        ];
        let mut seen = KindMask::NONE;
        for k in kinds {
            assert!(!seen.contains(k), "{:?} bit reused", k);
            seen = seen | k.mask();
        }
        assert_eq!(seen, ALL);
    }

    #[test]
    fn all_but_break_excludes_only_break() {
        assert!(!ALL_BUT_BREAK.contains(Kind::Break));
        assert!(ALL_BUT_BREAK.contains(Kind::Null));
        assert!(ALL_BUT_BREAK.contains(Kind::Tag));
    }

    #[test]
    fn string_like_is_string_or_chars() {
        assert!(STRING_LIKE.contains(Kind::String));
        assert!(STRING_LIKE.contains(Kind::Chars));
        assert!(!STRING_LIKE.contains(Kind::Text));
    }
}

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
 * streamcodec CBOR tag catalogue
 *
 * A distinguished set of well-known tag numbers (RFC 8949 §3.4) plus an `Other(u64)` fallback.
 * Well-known tags constrain the `KindMask` of the data item that immediately follows them; see
 * `Tag::content_mask` and the validator's handling of `Kind::Tag`.
 **************************************************************************************************/
use crate::kind::{self, Kind, KindMask};

/// A CBOR semantic tag (RFC 8949 §3.4). `Tag` always precedes exactly one data item, which may
/// itself be another `Tag` (tags chain).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Tag 0: a text string conforming to RFC 3339 date-time.
    DateTimeString,
    /// Tag 1: a number giving seconds since the Unix epoch.
    EpochDateTime,
    /// Tag 2: a byte string holding an unsigned big number, big-endian.
    PositiveBigNum,
    /// Tag 3: a byte string holding a one's-complement-encoded negative big number.
    NegativeBigNum,
    /// Tag 4: a two-element array `[exponent, mantissa]` giving a decimal fraction.
    DecimalFraction,
    /// Tag 5: a two-element array `[exponent, mantissa]` giving a big float.
    BigFloat,
    /// Tag 21: content should be base64url-encoded if converted to text (hint only).
    ExpectedBase64Url,
    /// Tag 22: content should be base64-encoded if converted to text (hint only).
    ExpectedBase64,
    /// Tag 23: content should be base16-encoded if converted to text (hint only).
    ExpectedBase16,
    /// Tag 24: a byte string holding an embedded, unparsed CBOR data item.
    EncodedCbor,
    /// Tag 32: a text string holding a URI (RFC 3986).
    Uri,
    /// Tag 33: a text string holding base64url text (already encoded, not binary).
    Base64UrlText,
    /// Tag 34: a text string holding base64 text (already encoded, not binary).
    Base64Text,
    /// Tag 35: a text string holding a regular expression (PCRE / ECMA 262 compatible).
    Regex,
    /// Tag 36: a text string holding a MIME message (RFC 2045).
    Mime,
    /// Tag 55799: the CBOR "magic header" self-describe tag.
    SelfDescribeCbor,
    /// Any tag number not otherwise named above.
    Other(u64),
}

impl Tag {
    /// The raw CBOR tag number for this tag.
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            Tag::DateTimeString => 0,
            Tag::EpochDateTime => 1,
            Tag::PositiveBigNum => 2,
            Tag::NegativeBigNum => 3,
            Tag::DecimalFraction => 4,
            Tag::BigFloat => 5,
            Tag::ExpectedBase64Url => 21,
            Tag::ExpectedBase64 => 22,
            Tag::ExpectedBase16 => 23,
            Tag::EncodedCbor => 24,
            Tag::Uri => 32,
            Tag::Base64UrlText => 33,
            Tag::Base64Text => 34,
            Tag::Regex => 35,
            Tag::Mime => 36,
            Tag::SelfDescribeCbor => 55799,
            Tag::Other(v) => v,
        }
    }

    /// Classify a raw tag number into a [`Tag`], falling back to [`Tag::Other`].
    #[must_use]
    pub fn from_value(v: u64) -> Tag {
        match v {
            0 => Tag::DateTimeString,
            1 => Tag::EpochDateTime,
            2 => Tag::PositiveBigNum,
            3 => Tag::NegativeBigNum,
            4 => Tag::DecimalFraction,
            5 => Tag::BigFloat,
            21 => Tag::ExpectedBase64Url,
            22 => Tag::ExpectedBase64,
            23 => Tag::ExpectedBase16,
            24 => Tag::EncodedCbor,
            32 => Tag::Uri,
            33 => Tag::Base64UrlText,
            34 => Tag::Base64Text,
            35 => Tag::Regex,
            36 => Tag::Mime,
            55799 => Tag::SelfDescribeCbor,
            other => Tag::Other(other),
        }
    }

    /// The [`KindMask`] that the data item immediately following this tag must satisfy.
    ///
    /// Unrecognised tags (`Tag::Other`) place no constraint beyond the ordinary "anything but
    /// `Break`" rule, since their content schema is unknown to this library.
    ///
    /// The mask for `DecimalFraction`/`BigFloat` only requires `ArrayHeader`: the source RFC
    /// permits indefinite-length arrays here too, but, matching minicbor's own decoder, this
    /// implementation does not fully verify compliance of the subsequent array content and an
    /// `ArrayStart` is accepted as well so that the validator does not reject an otherwise
    /// well-formed indefinite-length encoding.
    #[must_use]
    pub fn content_mask(self) -> KindMask {
        match self {
            Tag::EpochDateTime => kind::ANY_INTEGER | kind::ANY_FLOAT,
            Tag::PositiveBigNum | Tag::NegativeBigNum => {
                Kind::Bytes.mask() | Kind::BytesStart.mask()
            }
            Tag::DecimalFraction | Tag::BigFloat => {
                Kind::ArrayHeader.mask() | Kind::ArrayStart.mask()
            }
            Tag::DateTimeString | Tag::Uri | Tag::Regex | Tag::Mime => kind::STRING_LIKE | Kind::Text.mask() | Kind::TextStart.mask(),
            Tag::Base64UrlText | Tag::Base64Text => {
                kind::STRING_LIKE | Kind::Text.mask() | Kind::TextStart.mask()
            }
            Tag::ExpectedBase64Url | Tag::ExpectedBase64 | Tag::ExpectedBase16 => {
                Kind::Bytes.mask() | Kind::BytesStart.mask()
            }
            Tag::EncodedCbor => Kind::Bytes.mask() | Kind::BytesStart.mask(),
            Tag::SelfDescribeCbor | Tag::Other(_) => kind::ALL_BUT_BREAK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_well_known_values() {
        for v in [0u64, 1, 2, 3, 4, 5, 21, 22, 23, 24, 32, 33, 34, 35, 36, 55799] {
            assert_eq!(Tag::from_value(v).value(), v);
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_other() {
        assert_eq!(Tag::from_value(999), Tag::Other(999));
        assert_eq!(Tag::Other(999).value(), 999);
    }

    #[test]
    fn epoch_date_time_accepts_numeric_kinds() {
        let mask = Tag::EpochDateTime.content_mask();
        assert!(mask.contains(Kind::Int));
        assert!(mask.contains(Kind::Double));
        assert!(!mask.contains(Kind::Bytes));
    }

    #[test]
    fn big_num_requires_bytes() {
        let mask = Tag::PositiveBigNum.content_mask();
        assert!(mask.contains(Kind::Bytes));
        assert!(mask.contains(Kind::BytesStart));
        assert!(!mask.contains(Kind::Int));
    }
}

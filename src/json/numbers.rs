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
 * streamcodec JSON number classification
 *
 * A JSON number literal is first handed here as a complete, grammar-valid token (the lexer in
 * `json::parser` has already confirmed it matches RFC 8259's `number` production). Classification
 * runs in up to three stages, each one a progressively more expensive fallback of the last:
 *
 *   1. Integer magnitude: a token with no '.' and no exponent is parsed directly into a signed
 *      64-bit value; this covers the overwhelming majority of real-world JSON numbers at the cost
 *      of a single pass with no floating point involved. JSON has no wire-level unsigned-64-bit
 *      primitive to promote to (unlike CBOR's `OverLong`), so magnitudes outside `i64` range fall
 *      straight through to stage 3.
 *   2. Decimal fraction: a token with a fractional part and/or exponent is converted to `f64`
 *      using Clinger's fast-path construction (mantissa and power-of-ten both exactly
 *      representable in `f64`, so the single IEEE multiply/divide is already correctly rounded),
 *      then narrowed to `Float` when that value round-trips losslessly through single precision.
 *   3. NumberString fallback: anything the first two stages can't represent losslessly (too many
 *      mantissa digits, exponent out of range, or the fast path's preconditions don't hold) is
 *      preserved verbatim so the caller never silently loses precision.
 **************************************************************************************************/
use alloc::borrow::Cow;

use crate::config::JsonDecodingOptions;
use crate::event::Event;

/// Exact powers of ten representable in `f64` without rounding (`10^0` through `10^22`; `f64`
/// has 52 mantissa bits, and `5^22` is the largest power of five that still fits, so `10^22` is
/// the largest power of ten with an exact `f64` value).
const POWERS_OF_TEN: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// The largest mantissa magnitude (in decimal digits) for which every value is exactly
/// representable in `f64` (`2^53 - 1` has 16 digits; any 15-digit decimal integer fits comfortably
/// under `2^53`).
const MAX_EXACT_MANTISSA_DIGITS: u32 = 15;

/// Classify a complete, grammar-valid JSON number literal.
#[must_use]
pub fn classify(text: &str, options: &JsonDecodingOptions) -> Event<'static> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let has_fraction_or_exponent = unsigned.bytes().any(|b| matches!(b, b'.' | b'e' | b'E'));

    if !has_fraction_or_exponent {
        return classify_integer(negative, unsigned);
    }

    if options.read_decimal_numbers_only_as_number_strings {
        return Event::NumberString(Cow::Owned(text.into()));
    }

    match classify_decimal(negative, unsigned, options) {
        Some(event) => event,
        None => Event::NumberString(Cow::Owned(text.into())),
    }
}

/// Stage 1: parse a pure-integer token (no `.`, `e`/`E`) into the narrowest integral `Event`.
fn classify_integer(negative: bool, digits: &str) -> Event<'static> {
    let mut magnitude: u64 = 0;
    for b in digits.bytes() {
        let digit = (b - b'0') as u64;
        magnitude = match magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(digit))
        {
            Some(m) => m,
            // More digits than fit in u64: preserve the literal exactly rather than truncate.
            None => return Event::NumberString(Cow::Owned(format_signed(negative, digits))),
        };
    }

    if negative {
        if magnitude == 0 {
            return Event::Int(0);
        }
        if magnitude <= i64::MIN.unsigned_abs() {
            let represented = (magnitude as i64).wrapping_neg();
            // i64::MIN itself overflows the negate above; handle it directly.
            let represented = if magnitude == i64::MIN.unsigned_abs() {
                i64::MIN
            } else {
                represented
            };
            return narrow_signed(represented);
        }
        // Magnitude exceeds what a signed 64-bit value can hold: JSON has no wire-level
        // unsigned-64-bit primitive to promote to, so preserve the literal verbatim.
        return Event::NumberString(Cow::Owned(format_signed(negative, digits)));
    }

    if let Ok(v) = i32::try_from(magnitude) {
        return Event::Int(v);
    }
    if let Ok(v) = i64::try_from(magnitude) {
        return Event::Long(v);
    }
    Event::NumberString(Cow::Owned(format_signed(negative, digits)))
}

fn narrow_signed(v: i64) -> Event<'static> {
    if let Ok(v) = i32::try_from(v) {
        Event::Int(v)
    } else {
        Event::Long(v)
    }
}

fn format_signed(negative: bool, digits: &str) -> alloc::string::String {
    if negative {
        alloc::format!("-{digits}")
    } else {
        alloc::string::String::from(digits)
    }
}

/// Stage 2: attempt Clinger's fast path for a token with a fractional part and/or exponent.
/// Returns `None` when the literal's digit count or exponent magnitude falls outside what the
/// fast path (or the configured limits) can represent exactly.
fn classify_decimal(negative: bool, unsigned: &str, options: &JsonDecodingOptions) -> Option<Event<'static>> {
    let (mantissa_part, exp_part) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], &unsigned[idx + 1..]),
        None => (unsigned, ""),
    };
    let (int_part, frac_part) = match mantissa_part.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa_part, ""),
    };

    apply_exponent_str(negative, int_part, frac_part, exp_part, options)
}

fn apply_exponent_str(
    negative: bool,
    int_part: &str,
    frac_part: &str,
    exp_part: &str,
    options: &JsonDecodingOptions,
) -> Option<Event<'static>> {
    let mantissa_digits = int_part.len() as u32 + frac_part.len() as u32;
    if mantissa_digits > options.max_number_mantissa_digits || mantissa_digits > MAX_EXACT_MANTISSA_DIGITS {
        return None;
    }

    let mut mantissa: u64 = 0;
    for b in int_part.bytes().chain(frac_part.bytes()) {
        mantissa = mantissa.checked_mul(10)?.checked_add((b - b'0') as u64)?;
    }

    let explicit_exponent: i32 = if exp_part.is_empty() {
        0
    } else {
        exp_part.parse().ok()?
    };
    // Each fractional digit shifts the decimal point one place left relative to the mantissa we
    // just built as a plain integer.
    let exponent = explicit_exponent - frac_part.len() as i32;

    if exponent.unsigned_abs() as i32 > options.max_number_abs_exponent {
        return None;
    }
    if exponent.unsigned_abs() as usize >= POWERS_OF_TEN.len() {
        return None;
    }

    let magnitude = mantissa as f64;
    let value = if exponent >= 0 {
        magnitude * POWERS_OF_TEN[exponent as usize]
    } else {
        magnitude / POWERS_OF_TEN[(-exponent) as usize]
    };
    if !value.is_finite() {
        return None;
    }

    let value = if negative { -value } else { value };

    // Narrow to `Float` when the value round-trips losslessly through single precision, matching
    // the CBOR renderer's own compression ladder (`cbor::renderer::narrowest_lossless_width`).
    let narrowed = value as f32;
    if f64::from(narrowed) == value {
        Some(Event::Float(narrowed))
    } else {
        Some(Event::Double(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> JsonDecodingOptions {
        JsonDecodingOptions::default()
    }

    #[test]
    fn small_integer_classifies_as_int() {
        assert_eq!(classify("42", &opts()), Event::Int(42));
        assert_eq!(classify("-42", &opts()), Event::Int(-42));
    }

    #[test]
    fn negative_zero_integer_is_int_zero() {
        assert_eq!(classify("-0", &opts()), Event::Int(0));
    }

    #[test]
    fn integer_past_i64_falls_back_to_number_string() {
        let text = "18446744073709551615"; // u64::MAX, but past i64::MAX
        assert_eq!(classify(text, &opts()), Event::NumberString(Cow::Owned(text.into())));
    }

    #[test]
    fn integer_past_i64_min_falls_back_to_number_string() {
        let text = "-18446744073709551615";
        assert_eq!(classify(text, &opts()), Event::NumberString(Cow::Owned(text.into())));
    }

    #[test]
    fn huge_integer_falls_back_to_number_string() {
        let text = "12345678901234567890";
        assert_eq!(classify(text, &opts()), Event::NumberString(Cow::Owned(text.into())));

        let text = "123456789012345678901234567890";
        assert_eq!(classify(text, &opts()), Event::NumberString(Cow::Owned(text.into())));
    }

    #[test]
    fn simple_decimal_fast_path() {
        // Both round-trip losslessly through single precision, so they narrow to `Float`.
        assert_eq!(classify("1.5", &opts()), Event::Float(1.5));
        assert_eq!(classify("-2.25", &opts()), Event::Float(-2.25));
    }

    #[test]
    fn exponent_form_fast_path() {
        assert_eq!(classify("1.5e2", &opts()), Event::Float(150.0));
        assert_eq!(classify("2E3", &opts()), Event::Float(2000.0));
    }

    #[test]
    fn decimal_not_representable_in_f32_stays_double() {
        // 0.1 is inexact in both f32 and f64, and the two roundings disagree, so this must not
        // narrow to `Float`.
        assert_eq!(classify("0.1", &opts()), Event::Double(0.1));
    }

    #[test]
    fn excess_mantissa_digits_fall_back_to_number_string() {
        let text = "1.234567890123456789";
        assert!(matches!(classify(text, &opts()), Event::NumberString(_)));
    }

    #[test]
    fn exponent_outside_configured_bound_falls_back() {
        let mut options = opts();
        options.max_number_abs_exponent = 2;
        assert!(matches!(classify("1.5e10", &options), Event::NumberString(_)));
    }

    #[test]
    fn decimal_only_as_number_string_option_forces_fallback() {
        let mut options = opts();
        options.read_decimal_numbers_only_as_number_strings = true;
        assert!(matches!(classify("1.5", &options), Event::NumberString(_)));
        assert_eq!(classify("7", &options), Event::Int(7));
    }
}

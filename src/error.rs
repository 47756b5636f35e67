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
 * streamcodec error API
 *
 * A closed error taxonomy shared by both codecs and by the validator, reader and writer facades.
 * Every variant carries the input or output position at which it was detected, so that a caller
 * can report a useful diagnostic without the library needing to retain the whole input.
 **************************************************************************************************/
use core::fmt;
use core::result;

#[cfg(feature = "std")]
use thiserror::Error;

use crate::position::Position;

/// An alias for `Result<T, CodecError>` used throughout this crate.
pub type Result<T> = result::Result<T, CodecError>;

/// `CodecError` classifies every way a parse, render or validation step can fail. Every variant
/// carries the [`Position`] at which the problem was detected.
#[cfg_attr(feature = "std", derive(Error, Debug))]
#[cfg_attr(not(feature = "std"), derive(Debug))]
#[derive(Clone, PartialEq)]
pub enum CodecError {
    /// The parser needed more bytes than the input source had available.
    #[cfg_attr(feature = "std", error("unexpected end of input at {0}"))]
    UnexpectedEndOfInput(Position),

    /// The parser or renderer rejected the bytes or event because the wire format was violated.
    #[cfg_attr(feature = "std", error("invalid input data at {0}: {1}"))]
    InvalidInputData(Position, &'static str),

    /// A structural invariant enforced by the validator was violated (bad BREAK placement, a
    /// non-string JSON map key, mismatched array/map arity, and so on).
    #[cfg_attr(feature = "std", error("validation failure at {0}: {1}"))]
    ValidationFailure(Position, &'static str),

    /// The requested feature is not supported by the active wire format (e.g. a CBOR tag written
    /// to a JSON renderer, or a `NaN`/`Infinity` float written to JSON).
    #[cfg_attr(feature = "std", error("unsupported in this format at {0}: {1}"))]
    Unsupported(Position, &'static str),

    /// A configured limit was exceeded (string length, nesting depth, array or map size, number
    /// mantissa digits or exponent magnitude).
    #[cfg_attr(feature = "std", error("limit exceeded at {0}: {1}"))]
    Overflow(Position, &'static str),

    /// Any other failure, typically wrapping a user codec error via [`crate::reader::Reader`] or
    /// [`crate::writer::Writer`].
    #[cfg_attr(feature = "std", error("{1} at {0}"))]
    General(Position, &'static str),
}

#[cfg(not(feature = "std"))]
impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnexpectedEndOfInput(p) => write!(f, "unexpected end of input at {p}"),
            CodecError::InvalidInputData(p, m) => write!(f, "invalid input data at {p}: {m}"),
            CodecError::ValidationFailure(p, m) => write!(f, "validation failure at {p}: {m}"),
            CodecError::Unsupported(p, m) => write!(f, "unsupported in this format at {p}: {m}"),
            CodecError::Overflow(p, m) => write!(f, "limit exceeded at {p}: {m}"),
            CodecError::General(p, m) => write!(f, "{m} at {p}"),
        }
    }
}

impl CodecError {
    /// Returns the [`Position`] at which this error was detected, regardless of variant.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            CodecError::UnexpectedEndOfInput(p)
            | CodecError::InvalidInputData(p, _)
            | CodecError::ValidationFailure(p, _)
            | CodecError::Unsupported(p, _)
            | CodecError::Overflow(p, _)
            | CodecError::General(p, _) => *p,
        }
    }
}

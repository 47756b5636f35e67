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
//! `streamcodec` is a unified streaming pipeline for CBOR (RFC 8949) and JSON (RFC 8259).
//!
//! Both formats are parsed into, and rendered from, the same [`Event`] vocabulary. A
//! [`validator::Validator`] interposer enforces the structural rules common to both (correct
//! nesting, correct `Break` placement, string-only map keys in JSON mode) independent of which
//! wire format produced or will consume the events. Applications drive the pipeline through the
//! pull-style [`reader::Reader`] or the push-style [`writer::Writer`] facade; the two codec
//! modules and the validator are implementation detail most callers never touch directly.
//!
//! # Feature flags
//! - `alloc` (default): enables the `alloc`-dependent owned containers (`Vec`, `String`, `Cow`)
//!   used throughout the event and buffer types. Always required in practice; `std` implies it.
//! - `std` (default): links `std` instead of bare `core`+`alloc`, and enables [`thiserror`]-derived
//!   `Display`/`Error` impls on [`error::CodecError`] in place of the hand-written `core::fmt`
//!   impl used in `no_std` builds.
//! - `trace`: instruments the parser/renderer/validator entry points with [`func_trace`] spans.
//! - `float`: enables `f16` (half-precision) support via the [`half`] crate; without it, CBOR
//!   input using major-type-7 additional-information 25 is still decoded (lifted to `f32`) but the
//!   renderer's float compression ladder never selects the 16-bit width.
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate core as std;

#[macro_use]
extern crate alloc;

pub mod cbor;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod json;
pub mod kind;
pub mod output;
pub mod position;
pub mod reader;
pub mod tag;
pub mod validator;
pub mod writer;

mod buffer_cache;

pub use config::{
    CborDecodingOptions, CborEncodingOptions, DecodingOptions, EncodingOptions,
    JsonDecodingOptions, JsonEncodingOptions,
};
pub use error::{CodecError, Result};
pub use event::Event;
pub use kind::{Kind, KindMask};
pub use position::Position;
pub use reader::Reader;
pub use tag::Tag;
pub use writer::Writer;

/// Which wire format a [`reader::Reader`] or [`writer::Writer`] is bound to. Chosen at
/// construction and fixed for the life of the facade; see §2 of the design notes for why the
/// facades are generic over format rather than the formats being generic over facade.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    Cbor,
    Json,
}

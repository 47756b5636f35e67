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
 * streamcodec encoding buffer cache
 *
 * A process-wide pool of spare `Vec<u8>` allocations a [`crate::writer::Writer`] can draw on at
 * construction instead of starting from an empty allocation, and return to on
 * `writeEndOfInput`. Bounded to a small fixed slot count since the crate's config surface exposes
 * only a per-buffer size ceiling (`EncodingOptions::max_buffer_size`), not a slot count.
 *
 * Only meaningful with an allocator and a place to put a process-wide static, so the real pool is
 * `std`-only; under plain `alloc` (no_std + alloc) `acquire`/`release` degrade to a no-op that
 * always allocates fresh and never retains anything, which is sound, just not cached.
 **************************************************************************************************/

/// The number of spare buffers the pool retains at once.
const MAX_SLOTS: usize = 8;

#[cfg(feature = "std")]
mod pool {
    use std::sync::{Mutex, OnceLock};

    use super::MAX_SLOTS;

    static SLOTS: OnceLock<Mutex<alloc::vec::Vec<alloc::vec::Vec<u8>>>> = OnceLock::new();

    fn slots() -> &'static Mutex<alloc::vec::Vec<alloc::vec::Vec<u8>>> {
        SLOTS.get_or_init(|| Mutex::new(alloc::vec::Vec::new()))
    }

    pub(crate) fn acquire(min_capacity: usize) -> alloc::vec::Vec<u8> {
        let mut guard = slots().lock().unwrap_or_else(|poison| poison.into_inner());
        if let Some(pos) = guard.iter().position(|b| b.capacity() >= min_capacity) {
            let mut buf = guard.swap_remove(pos);
            buf.clear();
            return buf;
        }
        alloc::vec::Vec::with_capacity(min_capacity)
    }

    pub(crate) fn release(buf: alloc::vec::Vec<u8>, max_buffer_size: usize) {
        if buf.capacity() > max_buffer_size {
            return;
        }
        let mut guard = slots().lock().unwrap_or_else(|poison| poison.into_inner());
        if guard.len() < MAX_SLOTS {
            guard.push(buf);
        }
    }
}

#[cfg(feature = "std")]
pub(crate) use pool::{acquire, release};

#[cfg(not(feature = "std"))]
pub(crate) fn acquire(min_capacity: usize) -> alloc::vec::Vec<u8> {
    alloc::vec::Vec::with_capacity(min_capacity)
}

#[cfg(not(feature = "std"))]
pub(crate) fn release(_buf: alloc::vec::Vec<u8>, _max_buffer_size: usize) {}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    // These tests share a process-wide static pool, so they assert only properties that hold
    // regardless of interleaving with other tests in the same binary, not exact identity of a
    // particular buffer.

    #[test]
    fn acquire_after_release_is_usable_and_empty() {
        let buf = acquire(256);
        assert!(buf.capacity() >= 256);
        release(buf, 1 << 20);

        let reused = acquire(256);
        assert!(reused.capacity() >= 256);
        assert!(reused.is_empty());
    }

    #[test]
    fn release_drops_buffers_larger_than_the_configured_maximum() {
        let marker = 3 * 1024 * 1024;
        let buf = acquire(marker);
        assert!(buf.capacity() >= marker);
        release(buf, 16);

        let fresh = acquire(16);
        assert!(fresh.capacity() < marker);
    }
}

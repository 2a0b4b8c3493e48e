#![forbid(unsafe_code)]

//! Owned, growable patch buffer with stack-like encode/decode helpers.
//!
//! [`PatchBuf`] treats its bytes as a LIFO region: values are pushed at the
//! tail and popped from the tail in reverse order. Pops do not release
//! memory; they move the logical length back and hand out a borrow of the
//! now-excluded tail, which stays readable until the next push overwrites
//! it. The borrow checker enforces that window: a popped slice borrows the
//! buffer, so no push can happen while it is alive.
//!
//! # Invariants
//! - `len <= data.len()` at all times; `data[len..]` is popped tail.
//! - Growth is amortized geometric (`Vec` doubling); pushes never shrink
//!   capacity, [`reset`](PatchBuf::reset) keeps it for reuse.
//! - Any pop exceeding the current length is a caller bug and panics.
//!
//! # Usage
//!
//! ```
//! use rewind_patch::PatchBuf;
//!
//! let mut patch = PatchBuf::new();
//! patch.push_f64(1.5);
//! patch.push_u32(7);
//!
//! assert_eq!(patch.pop_u32(), 7);
//! assert_eq!(patch.pop_f64(), 1.5);
//! assert!(patch.is_empty());
//! ```

use std::fmt;

use crate::view::PatchView;

/// Owned patch byte buffer with LIFO push/pop helpers.
///
/// Scalars are encoded fixed-width native-endian. Arrays are encoded as
/// `[payload][u32 count]` with the count trailing the payload, so decoding
/// pops the count first.
#[derive(Clone, Default)]
pub struct PatchBuf {
    /// Backing storage; bytes past `len` are popped tail kept for borrows.
    data: Vec<u8>,
    /// Logical size in bytes.
    len: usize,
}

impl PatchBuf {
    /// Create an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            len: 0,
        }
    }

    /// Create an empty buffer with pre-reserved capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            len: 0,
        }
    }

    /// Create a buffer of `len` zeroed bytes.
    ///
    /// Used as a destination for whole-buffer operations like
    /// [`xor_bytes`] and [`copy_from`](Self::copy_from).
    #[must_use]
    pub fn alloc_zeroed(len: usize) -> Self {
        Self {
            data: vec![0; len],
            len,
        }
    }

    /// Create a buffer holding a copy of `src`.
    #[must_use]
    pub fn from_bytes(src: &[u8]) -> Self {
        Self {
            data: src.to_vec(),
            len: src.len(),
        }
    }

    /// Logical size in bytes.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the logical size is zero.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The live bytes, oldest push first.
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Borrowed pop cursor over the live bytes.
    #[must_use]
    #[inline]
    pub fn view(&self) -> PatchView<'_> {
        PatchView::new(self.as_bytes())
    }

    /// Reset the logical size to zero, keeping capacity for reuse.
    #[inline]
    pub fn reset(&mut self) {
        self.len = 0;
    }

    // ========================================================================
    // Push helpers
    // ========================================================================

    /// Append raw bytes, returning the appended region.
    ///
    /// The returned slice is valid until the next push; the borrow checker
    /// enforces that window.
    pub fn push_bytes(&mut self, src: &[u8]) -> &mut [u8] {
        self.data.truncate(self.len);
        let start = self.len;
        self.data.extend_from_slice(src);
        self.len = self.data.len();
        &mut self.data[start..]
    }

    /// Append a `u32`, native-endian.
    pub fn push_u32(&mut self, value: u32) {
        self.push_bytes(&value.to_ne_bytes());
    }

    /// Append an `i32`, native-endian.
    pub fn push_i32(&mut self, value: i32) {
        self.push_bytes(&value.to_ne_bytes());
    }

    /// Append an `f64`, native-endian.
    pub fn push_f64(&mut self, value: f64) {
        self.push_bytes(&value.to_ne_bytes());
    }

    /// Append an array as `[payload][u32 count]`.
    ///
    /// `payload` holds `count` elements of `elem_size` bytes each; a zero
    /// count stores only the count field. The count is pushed last so it is
    /// the first thing popped during decode.
    ///
    /// # Panics
    ///
    /// Panics if `elem_size` is zero or `payload` is not a whole number of
    /// elements.
    pub fn push_array(&mut self, elem_size: usize, payload: &[u8]) {
        assert!(elem_size > 0, "push_array with zero element size");
        assert!(
            payload.len() % elem_size == 0,
            "push_array payload of {} bytes is not a multiple of element size {}",
            payload.len(),
            elem_size
        );
        let count = (payload.len() / elem_size) as u32;
        if count > 0 {
            self.push_bytes(payload);
        }
        self.push_u32(count);
    }

    // ========================================================================
    // Pop helpers
    // ========================================================================

    /// Pop `n` bytes from the tail, returning a borrow of the excluded
    /// region.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `n` bytes remain; popping past the end is a
    /// caller bug, not a runtime condition.
    pub fn pop_bytes(&mut self, n: usize) -> &[u8] {
        assert!(
            self.len >= n,
            "pop of {n} bytes exceeds buffer size {}",
            self.len
        );
        self.len -= n;
        &self.data[self.len..self.len + n]
    }

    /// Pop a native-endian `u32` from the tail.
    pub fn pop_u32(&mut self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.pop_bytes(4));
        u32::from_ne_bytes(raw)
    }

    /// Pop a native-endian `i32` from the tail.
    pub fn pop_i32(&mut self) -> i32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.pop_bytes(4));
        i32::from_ne_bytes(raw)
    }

    /// Pop a native-endian `f64` from the tail.
    pub fn pop_f64(&mut self) -> f64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(self.pop_bytes(8));
        f64::from_ne_bytes(raw)
    }

    /// Pop an array encoded by [`push_array`](Self::push_array).
    ///
    /// Reads the trailing count, then the payload; returns the payload
    /// bytes (empty for a zero count).
    pub fn pop_array(&mut self, elem_size: usize) -> &[u8] {
        assert!(elem_size > 0, "pop_array with zero element size");
        let count = self.pop_u32() as usize;
        if count == 0 {
            return &[];
        }
        self.pop_bytes(count * elem_size)
    }

    // ========================================================================
    // Whole-buffer operations
    // ========================================================================

    /// Overwrite the live bytes with `src`.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn copy_from(&mut self, src: &[u8]) {
        assert!(
            self.len == src.len(),
            "copy_from length mismatch: dst {} vs src {}",
            self.len,
            src.len()
        );
        self.data[..self.len].copy_from_slice(src);
    }
}

impl fmt::Debug for PatchBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchBuf")
            .field("len", &self.len)
            .field("capacity", &self.data.capacity())
            .finish()
    }
}

/// Byte-wise XOR of two equal-length sources into an equal-length
/// destination.
///
/// XOR is self-inverse, which is what makes it the canonical combine for
/// symmetric patches: applying the same delta twice restores the original.
///
/// # Panics
///
/// Panics if the three lengths are not identical.
pub fn xor_bytes(a: &[u8], b: &[u8], dst: &mut [u8]) {
    assert!(
        a.len() == b.len() && a.len() == dst.len(),
        "xor_bytes length mismatch: a {} b {} dst {}",
        a.len(),
        b.len(),
        dst.len()
    );
    for ((d, x), y) in dst.iter_mut().zip(a).zip(b) {
        *d = x ^ y;
    }
}

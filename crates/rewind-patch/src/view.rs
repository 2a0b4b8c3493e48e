#![forbid(unsafe_code)]

//! Borrowed pop cursor over patch bytes.
//!
//! A [`PatchView`] never owns its bytes. Stack pops and [`PatchBuf::view`]
//! hand one out; its lifetime ties it to the producer, so the view cannot
//! outlive, or observe mutation of, the memory it reads. Pops shrink the
//! view from the tail and return subslices that keep the full producer
//! lifetime, so decoded spans stay usable after the cursor moves on.
//!
//! [`PatchBuf::view`]: crate::buf::PatchBuf::view

use std::fmt;

/// Borrowed, copyable cursor over an encoded patch.
///
/// The view is passed by value across the apply callbacks: a callee pops
/// from its own copy and the caller's cursor is unaffected, exactly like
/// handing out a slice.
#[derive(Clone, Copy)]
pub struct PatchView<'a> {
    bytes: &'a [u8],
}

impl<'a> PatchView<'a> {
    /// Wrap a byte slice.
    #[must_use]
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The zero-length patch.
    #[must_use]
    #[inline]
    pub const fn empty() -> Self {
        Self { bytes: &[] }
    }

    /// Remaining bytes under the cursor.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if no bytes remain.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Remaining bytes as a slice with the producer's lifetime.
    #[must_use]
    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Pop `n` bytes from the tail.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `n` bytes remain.
    pub fn pop_bytes(&mut self, n: usize) -> &'a [u8] {
        assert!(
            self.bytes.len() >= n,
            "pop of {n} bytes exceeds view size {}",
            self.bytes.len()
        );
        let (rest, tail) = self.bytes.split_at(self.bytes.len() - n);
        self.bytes = rest;
        tail
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

    /// Pop an array encoded as `[payload][u32 count]`.
    ///
    /// Returns the payload bytes; empty for a zero count.
    pub fn pop_array(&mut self, elem_size: usize) -> &'a [u8] {
        assert!(elem_size > 0, "pop_array with zero element size");
        let count = self.pop_u32() as usize;
        if count == 0 {
            return &[];
        }
        self.pop_bytes(count * elem_size)
    }
}

impl fmt::Debug for PatchView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchView")
            .field("len", &self.bytes.len())
            .finish()
    }
}

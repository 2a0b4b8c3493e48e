#![forbid(unsafe_code)]

//! Ring of fixed-size pages holding length-prefixed LIFO blocks.
//!
//! # Layout
//!
//! Each page packs blocks contiguously from offset 0 upward. A stored
//! block occupies its payload rounded up to a 4-byte boundary, followed by
//! an unpadded `u32` length trailer:
//!
//! ```text
//! page.bytes:  | payload₀ pad | len₀ | payload₁ pad | len₁ | ...
//!                                                          ^ head
//! ```
//!
//! `head` always points just past the newest block's trailer, so a pop
//! reads the trailing length, rewinds `head`, and hands out a view of the
//! unpadded payload.
//!
//! # Rotation
//!
//! Pushing into a full page rotates the ring forward: the next slot's old
//! contents are discarded (its block count leaves the global total) and
//! the slot is reused. Popping the last block of a page rotates backward
//! onto the previous slot, which must still hold blocks unless the whole
//! ring is empty.
//!
//! # Invariants
//! - `head <= page_size` per page; `blocks == 0 ⇔ head == 0`.
//! - The current page holds at least one block whenever the ring is
//!   non-empty.
//! - Pages are allocated lazily, once per slot, and never freed until the
//!   ring is dropped; [`clear`](PageRing::clear) reuses capacity.

use rewind_patch::PatchView;

/// Bytes in the per-block length trailer.
const TRAILER: usize = 4;

/// Round `n` up to a 4-byte boundary.
#[inline]
const fn align_up(n: usize) -> usize {
    (n + 3) & !3
}

/// One fixed-capacity page.
struct Page {
    /// Offset just past the newest block's trailer.
    head: usize,
    /// Blocks currently stored in this page.
    blocks: usize,
    bytes: Box<[u8]>,
}

impl Page {
    fn new(page_size: usize) -> Self {
        Self {
            head: 0,
            blocks: 0,
            bytes: vec![0; page_size].into_boxed_slice(),
        }
    }
}

/// A ring of fixed-size pages storing variable-size blocks in LIFO order.
///
/// Total memory is bounded by `num_pages * page_size`; once the ring
/// wraps, pushes silently evict the oldest page's entire contents.
/// Capacity planning must ensure the oldest reachable history tolerates
/// this.
pub struct PageRing {
    /// Ring slots; `None` until first use.
    pages: Vec<Option<Page>>,
    /// Index of the page holding the newest block.
    cur: usize,
    /// Usable bytes per page.
    page_size: usize,
    /// Blocks stored across all pages.
    blocks: usize,
}

impl PageRing {
    /// Create a ring of `num_pages` slots of `page_size` bytes each.
    ///
    /// Pages are allocated lazily as slots are first written.
    ///
    /// # Panics
    ///
    /// Panics if `num_pages < 2` or `page_size == 0`.
    #[must_use]
    pub fn new(num_pages: usize, page_size: usize) -> Self {
        assert!(num_pages > 1, "PageRing needs at least two pages");
        assert!(page_size > 0, "PageRing page size must be nonzero");
        Self {
            pages: (0..num_pages).map(|_| None).collect(),
            cur: 0,
            page_size,
            blocks: 0,
        }
    }

    /// Blocks currently stored across all pages.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.blocks
    }

    /// True if no blocks are stored.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    /// Number of ring slots.
    #[must_use]
    #[inline]
    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// Usable bytes per page.
    #[must_use]
    #[inline]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Push a single block.
    pub fn push(&mut self, block: &[u8]) {
        self.push_merged(block, &[]);
    }

    /// Push the concatenation of `meta` and `payload` as one block.
    ///
    /// Storing metadata ahead of a payload this way spares the caller an
    /// intermediate copy. Rotates the ring forward first when the block
    /// plus trailer would overflow the current page, evicting whatever the
    /// next slot held.
    ///
    /// # Panics
    ///
    /// Panics if the block cannot fit in an empty page at all.
    pub fn push_merged(&mut self, meta: &[u8], payload: &[u8]) {
        let total = meta.len() + payload.len();
        let chunk = align_up(total);
        assert!(
            chunk + TRAILER <= self.page_size,
            "block of {total} bytes cannot fit a {}-byte page",
            self.page_size
        );
        let head = self.pages[self.cur].as_ref().map_or(0, |p| p.head);
        if head + chunk + TRAILER > self.page_size {
            self.rotate_forward();
        }

        let page_size = self.page_size;
        let page = self.pages[self.cur].get_or_insert_with(|| Page::new(page_size));
        let head = page.head;
        page.bytes[head..head + meta.len()].copy_from_slice(meta);
        page.bytes[head + meta.len()..head + total].copy_from_slice(payload);
        page.bytes[head + chunk..head + chunk + TRAILER]
            .copy_from_slice(&(total as u32).to_ne_bytes());
        page.head = head + chunk + TRAILER;
        page.blocks += 1;
        self.blocks += 1;
    }

    /// Pop the newest block.
    ///
    /// Returns the empty view when the ring is empty. The returned view
    /// aliases page memory and is invalidated by the next push; the borrow
    /// checker enforces this.
    pub fn pop(&mut self) -> PatchView<'_> {
        if self.blocks == 0 {
            return PatchView::empty();
        }
        let cur = self.cur;
        let (start, len) = {
            let page = self.page_mut(cur);
            let len = read_trailer(&page.bytes, page.head);
            let chunk = align_up(len);
            assert!(
                page.head >= chunk + TRAILER,
                "block trailer reaches past the start of the page"
            );
            page.head -= chunk + TRAILER;
            page.blocks -= 1;
            (page.head, len)
        };
        self.blocks -= 1;

        if self.page(cur).blocks == 0 {
            assert!(self.page(cur).head == 0, "empty page with nonzero head");
            if self.blocks > 0 {
                self.cur = (cur + self.pages.len() - 1) % self.pages.len();
                let prev = self.page(self.cur);
                assert!(
                    prev.blocks > 0 && prev.blocks <= self.blocks && prev.head > 0,
                    "ring rotated back onto an empty page"
                );
            }
        }
        PatchView::new(&self.page(cur).bytes[start..start + len])
    }

    /// Read the newest block without removing it.
    ///
    /// Returns the empty view when the ring is empty.
    #[must_use]
    pub fn peek(&self) -> PatchView<'_> {
        if self.blocks == 0 {
            return PatchView::empty();
        }
        let page = self.page(self.cur);
        let len = read_trailer(&page.bytes, page.head);
        let start = page.head - TRAILER - align_up(len);
        PatchView::new(&page.bytes[start..start + len])
    }

    /// Drop all blocks, keeping page allocations for reuse.
    pub fn clear(&mut self) {
        self.blocks = 0;
        self.cur = 0;
        for page in self.pages.iter_mut().flatten() {
            page.head = 0;
            page.blocks = 0;
        }
    }

    /// Advance to the next ring slot, recycling whatever it held.
    fn rotate_forward(&mut self) {
        self.cur = (self.cur + 1) % self.pages.len();
        let page_size = self.page_size;
        let page = self.pages[self.cur].get_or_insert_with(|| Page::new(page_size));
        let evicted = page.blocks;
        page.head = 0;
        page.blocks = 0;
        self.blocks -= evicted;
        #[cfg(feature = "tracing")]
        if evicted > 0 {
            tracing::trace!(
                evicted,
                page = self.cur,
                "ring rotation evicted oldest history"
            );
        }
    }

    fn page(&self, idx: usize) -> &Page {
        self.pages[idx]
            .as_ref()
            .expect("ring slot in use must be allocated")
    }

    fn page_mut(&mut self, idx: usize) -> &mut Page {
        self.pages[idx]
            .as_mut()
            .expect("ring slot in use must be allocated")
    }
}

/// Read the unpadded block length stored just behind `head`.
fn read_trailer(bytes: &[u8], head: usize) -> usize {
    assert!(head >= TRAILER, "page head inside a block trailer");
    let mut raw = [0u8; TRAILER];
    raw.copy_from_slice(&bytes[head - TRAILER..head]);
    u32::from_ne_bytes(raw) as usize
}

impl std::fmt::Debug for PageRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRing")
            .field("blocks", &self.blocks)
            .field("cur", &self.cur)
            .field("num_pages", &self.pages.len())
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn roundtrip_restores_bytes_and_count() {
        let mut ring = PageRing::new(4, 256);
        let block: Vec<u8> = (0..37).collect();
        ring.push(&block);
        assert_eq!(ring.len(), 1);
        let popped = ring.pop();
        assert_eq!(popped.as_bytes(), block.as_slice());
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn blocks_pop_lifo() {
        let mut ring = PageRing::new(4, 256);
        ring.push(b"first");
        ring.push(b"second");
        ring.push(b"third");
        assert_eq!(ring.pop().as_bytes(), b"third");
        assert_eq!(ring.pop().as_bytes(), b"second");
        assert_eq!(ring.pop().as_bytes(), b"first");
        assert!(ring.is_empty());
    }

    #[test]
    fn merged_push_stores_concatenation() {
        let mut ring = PageRing::new(2, 64);
        ring.push_merged(&[0xAB, 0xCD], b"payload");
        let block = ring.pop();
        assert_eq!(block.as_bytes(), b"\xAB\xCDpayload");
    }

    #[test]
    fn pop_on_empty_returns_empty_view() {
        let mut ring = PageRing::new(2, 64);
        assert!(ring.pop().is_empty());
        assert!(ring.peek().is_empty());
    }

    #[test]
    fn peek_is_non_destructive() {
        let mut ring = PageRing::new(2, 64);
        ring.push(b"top");
        assert_eq!(ring.peek().as_bytes(), b"top");
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.pop().as_bytes(), b"top");
    }

    #[test]
    fn zero_length_blocks_are_storable() {
        let mut ring = PageRing::new(2, 64);
        ring.push(&[]);
        ring.push(b"x");
        assert_eq!(ring.pop().as_bytes(), b"x");
        let empty = ring.pop();
        assert!(empty.is_empty());
        assert!(ring.is_empty());
    }

    #[test]
    fn pops_rotate_backward_across_pages() {
        // 16-byte pages fit exactly one 8-byte block (8 + 4 trailer).
        let mut ring = PageRing::new(4, 16);
        ring.push(&[1u8; 8]);
        ring.push(&[2u8; 8]);
        ring.push(&[3u8; 8]);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.pop().as_bytes(), &[3u8; 8]);
        assert_eq!(ring.pop().as_bytes(), &[2u8; 8]);
        assert_eq!(ring.pop().as_bytes(), &[1u8; 8]);
        assert!(ring.is_empty());
    }

    #[test]
    fn wraparound_evicts_oldest_page() {
        // Two one-block pages: the third push wraps onto the first slot.
        let mut ring = PageRing::new(2, 16);
        ring.push(&[1u8; 8]);
        ring.push(&[2u8; 8]);
        ring.push(&[3u8; 8]);
        assert_eq!(ring.len(), 2, "eviction must drop the recycled page's block");
        assert_eq!(ring.pop().as_bytes(), &[3u8; 8]);
        assert_eq!(ring.pop().as_bytes(), &[2u8; 8]);
        // Pre-wrap data is unrecoverable, not an error.
        assert!(ring.pop().is_empty());
    }

    #[test]
    fn retained_blocks_never_exceed_the_memory_bound() {
        let num_pages = 3;
        let page_size = 32;
        let block = [0u8; 8]; // 12 bytes stored per block
        let per_page = page_size / (block.len() + 4);
        let mut ring = PageRing::new(num_pages, page_size);
        for _ in 0..100 {
            ring.push(&block);
            assert!(ring.len() <= per_page * num_pages);
        }
    }

    #[test]
    fn clear_keeps_pages_reusable() {
        let mut ring = PageRing::new(2, 64);
        ring.push(b"abc");
        ring.push(b"def");
        ring.clear();
        assert!(ring.is_empty());
        ring.push(b"again");
        assert_eq!(ring.pop().as_bytes(), b"again");
    }

    #[test]
    #[should_panic(expected = "cannot fit")]
    fn oversized_block_panics() {
        let mut ring = PageRing::new(2, 16);
        ring.push(&[0u8; 32]);
    }

    #[test]
    #[should_panic(expected = "at least two pages")]
    fn single_page_ring_is_rejected() {
        let _ = PageRing::new(1, 64);
    }

    #[test]
    fn unaligned_lengths_roundtrip_exactly() {
        let mut ring = PageRing::new(2, 128);
        for len in [1usize, 2, 3, 5, 7, 11, 13] {
            let block: Vec<u8> = (0..len as u8).collect();
            ring.push(&block);
            assert_eq!(ring.pop().as_bytes(), block.as_slice());
        }
    }

    proptest! {
        // Sized so the ring can never wrap: the model and the ring must
        // agree exactly on every pop.
        #[test]
        fn matches_vec_model_below_the_eviction_bound(
            ops in prop::collection::vec(
                prop_oneof![
                    prop::collection::vec(any::<u8>(), 0..24).prop_map(Some),
                    Just(None),
                ],
                1..64,
            )
        ) {
            let mut ring = PageRing::new(16, 256);
            let mut model: Vec<Vec<u8>> = Vec::new();
            for op in ops {
                match op {
                    Some(block) => {
                        ring.push(&block);
                        model.push(block);
                    }
                    None => {
                        let expected = model.pop();
                        let got = ring.pop();
                        match expected {
                            Some(block) => prop_assert_eq!(got.as_bytes(), block.as_slice()),
                            None => prop_assert!(got.is_empty()),
                        }
                    }
                }
                prop_assert_eq!(ring.len(), model.len());
            }
        }
    }
}

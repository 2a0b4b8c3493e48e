#![forbid(unsafe_code)]

//! XOR delta series: the canonical reversible patch producer.
//!
//! [`DeltaSeries`] is a circular array of `f64` samples driven by
//! self-inverse deltas: a forward step XORs a delta into the slot under
//! the head and advances; a backward step retreats and XORs the same slot
//! with the same delta, restoring it bit-exactly. Because XOR is its own
//! inverse, one delta value serves as both the forward and the backward
//! patch, which is the contract every [`Reversible`] producer must satisfy.
//!
//! [`SeriesRecorder`] wraps a series into a full [`Reversible`]
//! implementation: samples are staged per tick, `diff` encodes the delta
//! against the value currently under the head (the baseline the patch will
//! overwrite), and idle ticks produce the zero-length patch that storage
//! elides.

use std::fmt;

use rewind_patch::{PatchBuf, PatchView};

use crate::timeline::Reversible;

/// XOR on the raw bit patterns. NaN payloads and signed zeros survive.
#[inline]
fn xor_f64(a: f64, b: f64) -> f64 {
    f64::from_bits(a.to_bits() ^ b.to_bits())
}

/// Circular array of scalar samples with self-inverse delta steps.
pub struct DeltaSeries {
    values: Vec<f64>,
    /// Slot the next forward step writes. Always `< values.len()`.
    head: usize,
}

// A series always has at least one slot, so there is no `is_empty`.
#[allow(clippy::len_without_is_empty)]
impl DeltaSeries {
    /// Create a series of `len` zeroed slots.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`.
    #[must_use]
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "DeltaSeries needs at least one slot");
        Self {
            values: vec![0.0; len],
            head: 0,
        }
    }

    /// Number of slots.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Slot index the next forward step writes.
    #[must_use]
    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// All slot values, in storage order.
    #[must_use]
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The most recently written value.
    #[must_use]
    pub fn top(&self) -> f64 {
        self.values[(self.head + self.values.len() - 1) % self.values.len()]
    }

    /// XOR `delta` into the slot under the head, then advance.
    pub fn forward(&mut self, delta: f64) {
        let h = self.head;
        self.values[h] = xor_f64(self.values[h], delta);
        self.head = (h + 1) % self.values.len();
    }

    /// Retreat the head, then XOR `delta` into that slot.
    ///
    /// Applying the same delta as a prior [`forward`](Self::forward)
    /// restores the slot and head exactly.
    pub fn backward(&mut self, delta: f64) {
        let h = (self.head + self.values.len() - 1) % self.values.len();
        self.head = h;
        self.values[h] = xor_f64(self.values[h], delta);
    }

    /// The delta that, applied forward, sets the head slot to `new_value`.
    #[must_use]
    pub fn make_patch(&self, new_value: f64) -> f64 {
        xor_f64(new_value, self.values[self.head])
    }

    /// Pop one delta from `patch` and apply it forward.
    pub fn apply_forward(&mut self, patch: &mut PatchView<'_>) {
        let delta = patch.pop_f64();
        self.forward(delta);
    }

    /// Pop one delta from `patch` and apply it backward.
    pub fn apply_backward(&mut self, patch: &mut PatchView<'_>) {
        let delta = patch.pop_f64();
        self.backward(delta);
    }
}

impl fmt::Debug for DeltaSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaSeries")
            .field("len", &self.values.len())
            .field("head", &self.head)
            .finish()
    }
}

/// Errors from driving a [`SeriesRecorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderError {
    /// `diff` was asked for a transition with no sample staged.
    NothingStaged,
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingStaged => write!(f, "no sample staged for the next transition"),
        }
    }
}

impl std::error::Error for RecorderError {}

/// What the next transition writes.
#[derive(Debug, Clone, Copy)]
enum Staged {
    Sample(f64),
    Idle,
}

/// A [`DeltaSeries`] driven through the [`Reversible`] contract.
///
/// Stage a sample (or an idle tick) before each fresh step; replayed
/// steps need no staging because the stored patch carries everything.
pub struct SeriesRecorder {
    series: DeltaSeries,
    staged: Option<Staged>,
}

impl SeriesRecorder {
    /// Create a recorder over a series of `len` zeroed slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            series: DeltaSeries::new(len),
            staged: None,
        }
    }

    /// Stage the sample the next fresh transition records.
    pub fn stage(&mut self, value: f64) {
        self.staged = Some(Staged::Sample(value));
    }

    /// Stage a no-op transition: the next fresh diff is zero-length.
    pub fn stage_idle(&mut self) {
        self.staged = Some(Staged::Idle);
    }

    /// The underlying series.
    #[must_use]
    pub fn series(&self) -> &DeltaSeries {
        &self.series
    }
}

impl Reversible for SeriesRecorder {
    type Error = RecorderError;

    fn diff(&mut self) -> Result<PatchBuf, RecorderError> {
        match self.staged.take() {
            None => Err(RecorderError::NothingStaged),
            Some(Staged::Idle) => Ok(PatchBuf::new()),
            Some(Staged::Sample(value)) => {
                let mut patch = PatchBuf::new();
                patch.push_f64(self.series.make_patch(value));
                Ok(patch)
            }
        }
    }

    fn forward(&mut self, mut patch: PatchView<'_>) -> Result<(), RecorderError> {
        if !patch.is_empty() {
            self.series.apply_forward(&mut patch);
        }
        Ok(())
    }

    fn backward(&mut self, mut patch: PatchView<'_>) -> Result<(), RecorderError> {
        if !patch.is_empty() {
            self.series.apply_backward(&mut patch);
        }
        Ok(())
    }
}

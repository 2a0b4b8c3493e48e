#![forbid(unsafe_code)]

//! Undo/redo controller over paged patch storage.
//!
//! A [`Timeline`] owns two [`PatchStack`]s and drives a simulation through
//! the [`Reversible`] contract:
//!
//! ```text
//! step()
//! ┌─────────────────────────────────────────────────────────┐
//! │ Undo Stack: [p1, p2, p3]          Redo Stack: []        │
//! └─────────────────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌─────────────────────────────────────────────────────────┐
//! │ Undo Stack: [p1]                  Redo Stack: [p3, p2]  │
//! └─────────────────────────────────────────────────────────┘
//!
//! step()   — replays p2 verbatim; diff() is NOT invoked
//! ┌─────────────────────────────────────────────────────────┐
//! │ Undo Stack: [p1, p2]              Redo Stack: [p3]      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. A patch pushed onto undo was applied forward exactly once, and a
//!    patch pushed onto redo was applied backward exactly once.
//! 2. The controller never interprets patch bytes; only the simulation's
//!    `forward`/`backward` do.
//! 3. Redo entries are only valid for the timeline they were recorded on:
//!    any externally-driven mutation taken while redo entries exist MUST be
//!    preceded by [`clear_forward_history`](Timeline::clear_forward_history).
//!    The engine cannot detect divergence itself (see invariant 2), so this
//!    precondition is the caller's responsibility.
//!
//! # Memory
//!
//! Both stacks are ring-backed: total history memory never exceeds
//! `2 * num_pages * page_size`, and the oldest undo entries silently fall
//! off when the ring wraps. A single patch larger than `max_patch_size`
//! collapses both stacks instead of being recorded — a deliberate, lossy
//! safety valve that bounds memory without losing live state.

use rewind_patch::{PatchBuf, PatchView};
use rewind_store::PatchStack;

/// A simulation that can be driven forward and backward through binary
/// patches.
///
/// The contract: `diff` produces a patch such that applying it `forward`
/// and then `backward` (or vice versa) on the same state is a true inverse
/// pair. Patch views are passed by value: the callee pops from its own
/// cursor copy and the caller's bytes are unaffected.
pub trait Reversible {
    /// Error produced by the simulation's callbacks. A failed `diff` or
    /// `forward` aborts the step without recording any history.
    type Error;

    /// Produce an owned patch describing the next forward transition.
    ///
    /// Ownership of the returned buffer transfers to the timeline's
    /// storage.
    fn diff(&mut self) -> Result<PatchBuf, Self::Error>;

    /// Mutate state forward using `patch`. Called exactly once per patch
    /// instance.
    fn forward(&mut self, patch: PatchView<'_>) -> Result<(), Self::Error>;

    /// Mutate state backward using the identical patch bytes previously
    /// consumed by [`forward`](Self::forward).
    fn backward(&mut self, patch: PatchView<'_>) -> Result<(), Self::Error>;
}

/// Initialization-time sizing for a [`Timeline`]. No runtime
/// renegotiation.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Ring slots per stack.
    pub num_pages: usize,
    /// Bytes per page.
    pub page_size: usize,
    /// Patches larger than this collapse all history instead of being
    /// recorded.
    pub max_patch_size: usize,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            num_pages: 8,
            page_size: 32 * 1024 * 1024,
            max_patch_size: 16 * 1024 * 1024,
        }
    }
}

impl TimelineConfig {
    /// Create a configuration with explicit sizing.
    #[must_use]
    pub fn new(num_pages: usize, page_size: usize, max_patch_size: usize) -> Self {
        Self {
            num_pages,
            page_size,
            max_patch_size,
        }
    }

    /// Small sizing for tests and examples.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            num_pages: 4,
            page_size: 4 * 1024,
            max_patch_size: 256,
        }
    }
}

/// Undo/redo controller: records forward transitions as patches and
/// replays them on demand.
///
/// The simulation is never owned; every driving operation borrows it for
/// the call, and its lifetime is the caller's concern.
pub struct Timeline {
    undo: PatchStack,
    redo: PatchStack,
    max_patch_size: usize,
}

impl Timeline {
    /// Create a timeline with two ring-backed stacks sized by `config`.
    ///
    /// # Panics
    ///
    /// Panics if the page sizing is invalid or `max_patch_size` leaves no
    /// room for block framing within one page.
    #[must_use]
    pub fn new(config: TimelineConfig) -> Self {
        // Largest recordable patch plus its run counter and trailer,
        // padded, must fit a single page.
        assert!(
            config.max_patch_size + 12 <= config.page_size,
            "max_patch_size {} leaves no room for block framing in a {}-byte page",
            config.max_patch_size,
            config.page_size
        );
        Self {
            undo: PatchStack::new(config.num_pages, config.page_size),
            redo: PatchStack::new(config.num_pages, config.page_size),
            max_patch_size: config.max_patch_size,
        }
    }

    /// True if at least one backward transition is recorded.
    #[must_use]
    pub fn has_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// True if undone transitions are available for replay.
    #[must_use]
    pub fn has_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Advance the simulation one transition.
    ///
    /// With redo history present, the stored patch is replayed verbatim
    /// and [`Reversible::diff`] is not invoked; otherwise a fresh patch is
    /// obtained from `diff`. Either way the patch is applied via
    /// [`Reversible::forward`] and then recorded on the undo stack,
    /// unless it exceeds `max_patch_size`, in which case both stacks are
    /// collapsed and only the live state survives.
    ///
    /// Callers taking a transition that diverges from recorded redo
    /// history must call [`clear_forward_history`](Self::clear_forward_history)
    /// first; `step` itself never does.
    ///
    /// # Errors
    ///
    /// Propagates `diff`/`forward` failures; nothing is recorded on
    /// failure.
    pub fn step<S: Reversible>(&mut self, sim: &mut S) -> Result<(), S::Error> {
        let fresh;
        let reused = !self.redo.is_empty();
        let view = if reused {
            self.redo.pop()
        } else {
            fresh = sim.diff()?;
            fresh.view()
        };
        let len = view.len();
        sim.forward(view)?;
        tracing::trace!(len, reused, "forward step applied");
        if len > self.max_patch_size {
            tracing::debug!(
                len,
                max = self.max_patch_size,
                "patch exceeds ceiling; collapsing history"
            );
            self.undo.clear();
            self.redo.clear();
        } else {
            self.undo.push(view.as_bytes());
        }
        Ok(())
    }

    /// Take the simulation one transition backward.
    ///
    /// Pops the most recent undo patch, records it for redo, and applies
    /// it via [`Reversible::backward`].
    ///
    /// # Panics
    ///
    /// Panics if [`has_undo`](Self::has_undo) is false; undoing with no
    /// history is a caller bug.
    ///
    /// # Errors
    ///
    /// Propagates `backward` failures.
    pub fn undo<S: Reversible>(&mut self, sim: &mut S) -> Result<(), S::Error> {
        assert!(self.has_undo(), "undo requested with no recorded history");
        let view = self.undo.pop();
        self.redo.push(view.as_bytes());
        tracing::trace!(len = view.len(), "backward step applied");
        sim.backward(view)
    }

    /// Discard redo history.
    ///
    /// Must be called whenever the owning simulation takes an action
    /// outside the step/undo protocol while redo entries exist: a fresh
    /// edit after having undone creates a new branch, and the stored
    /// forward patches no longer apply.
    pub fn clear_forward_history(&mut self) {
        tracing::trace!("forward history cleared");
        self.redo.clear();
    }

    /// Discard all history, both undo and redo. Live state is untouched.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("undo", &self.undo)
            .field("redo", &self.redo)
            .field("max_patch_size", &self.max_patch_size)
            .finish()
    }
}

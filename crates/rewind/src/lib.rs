#![forbid(unsafe_code)]

//! Memory-bounded undo/redo engine for tick-based simulations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Timeline                             │
//! │   step() ──► diff/forward       undo() ──► backward          │
//! │  ┌────────────────────┐        ┌────────────────────┐        │
//! │  │  undo: PatchStack  │ ◄────► │  redo: PatchStack  │        │
//! │  │  (empty-run elided)│        │  (empty-run elided)│        │
//! │  └─────────┬──────────┘        └─────────┬──────────┘        │
//! │            ▼                             ▼                   │
//! │       PageRing                      PageRing                 │
//! │  (bounded, evicting)           (bounded, evicting)           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The simulation implements [`Reversible`]: `diff` produces a binary
//! patch for the next transition, `forward`/`backward` apply it in either
//! direction. [`Timeline::step`] records each forward patch; undone
//! patches move to the redo stack and are replayed verbatim — `diff` is
//! never re-invoked for a replay. History memory is bounded by the page
//! rings; the oldest entries silently fall off when a ring wraps, and a
//! single patch above the configured ceiling collapses history entirely
//! rather than growing it.
//!
//! [`DeltaSeries`] is the canonical producer: an XOR-combined circular
//! series where one delta value is simultaneously the forward and the
//! backward patch.
//!
//! # Quick start
//!
//! ```
//! use rewind::{SeriesRecorder, Timeline, TimelineConfig};
//!
//! let mut timeline = Timeline::new(TimelineConfig::compact());
//! let mut recorder = SeriesRecorder::new(16);
//!
//! recorder.stage(3.5);
//! timeline.step(&mut recorder)?;
//! assert_eq!(recorder.series().top(), 3.5);
//!
//! timeline.undo(&mut recorder)?;
//! assert_eq!(recorder.series().top(), 0.0);
//!
//! // Replays the stored patch; nothing to stage.
//! timeline.step(&mut recorder)?;
//! assert_eq!(recorder.series().top(), 3.5);
//! # Ok::<(), rewind::RecorderError>(())
//! ```

pub mod series;
pub mod timeline;

pub use series::{DeltaSeries, RecorderError, SeriesRecorder};
pub use timeline::{Reversible, Timeline, TimelineConfig};

pub use rewind_patch::{PatchBuf, PatchView, xor_bytes};
pub use rewind_store::{PageRing, PatchStack};

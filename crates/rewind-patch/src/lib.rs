#![forbid(unsafe_code)]

//! Binary patch encoding substrate for the rewind engine.
//!
//! # Role in rewind
//! Every patch that flows through the engine (produced by a simulation's
//! `diff`, stored in a page ring, replayed on undo/redo) is a flat byte
//! sequence encoded and decoded through this crate. Higher layers never
//! interpret patch contents; they only move these bytes around.
//!
//! # Primary responsibilities
//! - **[`PatchBuf`]**: owned, growable LIFO byte region with push/pop
//!   helpers for fixed-width scalars, arrays, and raw spans.
//! - **[`PatchView`]**: borrowed, `Copy` cursor over patch bytes; pops
//!   consume from the tail, mirroring the push order in reverse.
//! - **[`xor_bytes`]**: byte-wise XOR used by symmetric-diff producers.
//!
//! # Encoding
//! Scalars are fixed-width native-endian. Arrays are stored as
//! `[payload bytes][u32 element count]`: the count trails the payload so
//! it is the first thing a pop sees. The encoding is bit-exact and could
//! serve as a wire format.

pub mod buf;
pub mod view;

pub use buf::{PatchBuf, xor_bytes};
pub use view::PatchView;

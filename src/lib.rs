//! Purpose: Library crate behind the `mkscript` game-script compiler.
//! Exports: `api` (compile pipeline, script decoding, errors); `core` (stage modules).
//! Role: Converts CSV/JSON event tables into binary script data files for the engine.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
//! Invariants: Output files are complete and internally consistent, or absent.
pub mod api;
#[doc(hidden)]
pub mod core;

//! Test module for integration and determinism tests.
//!
//! Unit tests live next to the code they cover; this module holds tests that
//! cross module boundaries:
//!
//! - **Integration tests**: Full ticks through a [`Session`](crate::session::Session),
//!   covering dispatch ordering, gates, shared-cell repeats, and mid-walk
//!   despawns
//! - **Determinism tests**: Seeded soak runs verifying identical reaction
//!   logs across identical runs
//! - **Helper functions**: Rule-book builders and a shared reaction log

mod determinism;
mod helpers;

// Re-export for convenience
pub use helpers::*;

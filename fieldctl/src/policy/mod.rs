//! Business policy rules that are pure functions over domain data.
//!
//! Keeping these free of clock and database access lets the HTTP layer pass
//! in "now" and the stored state explicitly, and lets tests pin both.

pub mod cutoff;

pub use cutoff::{CutoffPolicy, MarkDecision};

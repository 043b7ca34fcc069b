//! Bar-by-bar alert condition evaluation.
//!
//! [`evaluate`] is a pure function of one condition and a (current, previous)
//! pair of snapshots. It never panics and never returns an error: every
//! indeterminate case folds to `false` plus a log line. Use [`try_evaluate`]
//! to see why a bar was indeterminate.

pub mod cache;
pub mod evaluate;

pub use cache::PreviousValueCache;
pub use evaluate::{evaluate, evaluate_record, try_evaluate, Indeterminate};

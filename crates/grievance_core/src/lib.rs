//! Provide the pure data model, aggregation and text rendering for the grievance collector.
//!
//! This crate is intentionally small and dependency-free. It contains the deterministic pieces that the
//! collector runtime (`grievance` crate) drives at the end of a test run:
//! - the recorded entity ([`Disappointment`]) and its ordered tag set ([`TagSet`]),
//! - the frozen, ordered view of a run ([`Ledger`]),
//! - the aggregation pass ([`summarize`]) and its result ([`Summary`]),
//! - the human-readable report ([`render`]).
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no locking, no global state.
//! - Everything here is computed from already-collected in-memory data and cannot fail.

pub mod disappointment;
pub mod render;
pub mod summary;
pub mod tags;

pub use disappointment::Disappointment;
pub use render::{CLEAN_RUN_MESSAGE, render};
pub use summary::{Ledger, ReportRow, Summary, summarize};
pub use tags::TagSet;

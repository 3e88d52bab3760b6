//! Structured reports: the persisted document and the sinks it is written to.
//!
//! Text rendering lives in `grievance_core::render`; this module owns everything that touches serialization
//! or the filesystem.

pub mod document;
pub mod sink;

pub use document::{DisappointmentRecord, ReportDocument, SummaryRecord, decode_documents};
pub use sink::{FileSink, MemorySink, ReportSink, SinkMode};

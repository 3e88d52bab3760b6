//! Error taxonomy of the collector.
//!
//! Two kinds of failure exist:
//!
//! - **Misuse** (programming errors): touching the store outside the `Running` window of a session, or driving
//!   the session out of order. These panic at the caller's location via [`misuse`]; they are not recoverable.
//! - **Report errors** ([`ReportError`]): persisting the structured report failed. These surface to the
//!   session, which prints a diagnostic and forces a failing exit status.
//!
//! Aggregation and rendering work on in-memory data and have no error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while persisting a report to its sink.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not write report to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("existing content of {} is not a report stream: {source}", path.display())]
    CorruptSink {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Abort on collector misuse with a canonical message.
#[cold]
#[track_caller]
pub(crate) fn misuse(what: &str) -> ! {
    panic!("grievance misuse: {what}");
}

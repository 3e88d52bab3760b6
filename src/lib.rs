#![forbid(unsafe_code)]
//! Grievance: soft-failure telemetry for test suites
//!
//! Tests record *disappointments*: tagged, optionally error-bearing observations that do not fail the test.
//! At the end of the run the collector airs the grievances: a summary by tag, by error and by test, printed as
//! text and optionally persisted as a JSON document.
//!
//! ```
//! use grievance::{ParallelSuite, Session, SessionConfig, SessionState};
//!
//! let suite = ParallelSuite::new().test("checkout", |t, rec| {
//!     rec.grievance(t, "My son tells me your company stinks!", &[]);
//!     rec.grievance(t, "You're slow!", &["speed"]).set_error("timeout exceeded");
//!     Ok(())
//! });
//!
//! let outcome = Session::new(SessionConfig::default()).run(suite);
//! assert_eq!(outcome.state, SessionState::Done);
//! assert_eq!(outcome.summary.total, 2);
//! assert!(outcome.exit_code().is_success());
//! ```
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The crate enforces
//!   `#![deny(clippy::unwrap_used)]` and `#![deny(clippy::expect_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Misuse**: using the store outside a running session, or driving a session out of order, is a programming
//!   error and panics at the caller's location.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod cli;
pub mod config;
pub mod errors;
pub mod report;
pub mod session;
pub mod store;
pub mod suite;

pub use grievance_core::{CLEAN_RUN_MESSAGE, Disappointment, Ledger, ReportRow, Summary, TagSet, render, summarize};

pub use cli::ExitCode;
pub use config::{ReportArgs, SessionConfig};
pub use errors::ReportError;
pub use report::{FileSink, MemorySink, ReportDocument, ReportSink, SinkMode};
pub use session::{Session, SessionOutcome, SessionState};
pub use store::{Grievance, Recorder, Store};
pub use suite::{ConsoleReporter, ParallelSuite, Suite, SuiteStatus, TestCase, TestContext, TestOutcome};

/// Install the `tracing` subscriber used by the `grievance` binary: env-based filter, defaulting to `info`.
///
/// Harness binaries may call this before [`run`]; calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run `suite` inside a session configured from the environment and air the grievances.
///
/// Prints the text report to stdout and any persistence failure to stderr. The returned code is a failure
/// if the suite failed or the report could not be saved.
///
/// ```no_run
/// fn main() -> std::process::ExitCode {
///     let suite = grievance::ParallelSuite::new()
///         .with_reporter(grievance::ConsoleReporter::new(false))
///         .test("upload", |t, rec| {
///             rec.grievance(t, "You're sending too much data!", &["speed", "download"]);
///             Ok(())
///         });
///     grievance::run(suite).into()
/// }
/// ```
pub fn run<S: Suite>(suite: S) -> ExitCode {
    let outcome = Session::new(SessionConfig::from_env()).run(suite);
    outcome.print();
    outcome.exit_code()
}

//! Session lifecycle.
//!
//! ```text
//! Idle ──start──▶ Running ──finish──▶ Summarizing ──▶ Reported ──▶ Done
//!                                          │              │
//!                                          └──────────────┴──▶ Error   (sink write failed)
//! ```
//!
//! A [`Session`] is owned by the caller: there is no process-wide store. `start` allocates the store and hands
//! out a [`Recorder`]; `finish` freezes the store, summarizes it, renders the text report and persists the
//! structured report. Nothing is retried.

use std::fmt;
use std::sync::Arc;

use grievance_core::{Ledger, Summary, render, summarize};

use crate::cli::ExitCode;
use crate::config::SessionConfig;
use crate::errors::{ReportError, misuse};
use crate::report::{FileSink, ReportDocument, ReportSink};
use crate::store::{Echo, Recorder, Store};
use crate::suite::{Suite, SuiteStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Summarizing,
    Reported,
    Done,
    Error,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Done | SessionState::Error)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Summarizing => "summarizing",
            SessionState::Reported => "reported",
            SessionState::Done => "done",
            SessionState::Error => "error",
        };
        f.write_str(s)
    }
}

/// One run of a suite plus the aggregate-and-report steps around it.
pub struct Session {
    config: SessionConfig,
    sink: Option<Box<dyn ReportSink>>,
    echo: Option<Echo>,
    state: SessionState,
    store: Option<Arc<Store>>,
}

impl Session {
    /// Create an idle session. A file sink is configured when `config.output` is set, and a verbose session
    /// echoes every record to stdout.
    pub fn new(config: SessionConfig) -> Self {
        let sink = config
            .output
            .as_ref()
            .map(|path| Box::new(FileSink::new(path.clone(), config.sink_mode)) as Box<dyn ReportSink>);
        let echo = config.verbose.then(Echo::stdout);
        Self {
            config,
            sink,
            echo,
            state: SessionState::Idle,
            store: None,
        }
    }

    /// Replace the configured sink.
    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Send the verbose per-record echo to `writer` instead of stdout. Has no effect on a terse session.
    pub fn with_echo(mut self, writer: impl std::io::Write + Send + 'static) -> Self {
        if self.config.verbose {
            self.echo = Some(Echo::new(writer));
        }
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "session transition");
        self.state = next;
    }

    /// `Idle → Running`: allocate the store and return the recorder for the suite.
    ///
    /// # Panics
    ///
    /// Panics if the session was already started.
    #[track_caller]
    pub fn start(&mut self) -> Recorder {
        if self.state != SessionState::Idle {
            misuse("session started twice");
        }
        let store = Arc::new(Store::new());
        self.store = Some(Arc::clone(&store));
        self.transition(SessionState::Running);
        Recorder::new(store, self.echo.clone())
    }

    /// Another recorder for the running store.
    ///
    /// # Panics
    ///
    /// Panics if the store has not been allocated yet (the session was never started).
    #[track_caller]
    pub fn recorder(&self) -> Recorder {
        match &self.store {
            Some(store) => Recorder::new(Arc::clone(store), self.echo.clone()),
            None => misuse("store used before the session started"),
        }
    }

    /// `Running → Summarizing → Reported → Done | Error`.
    ///
    /// # Panics
    ///
    /// Panics unless the session is `Running`.
    #[track_caller]
    pub fn finish(&mut self, suite_status: SuiteStatus) -> SessionOutcome {
        let store = match (&self.store, self.state) {
            (Some(store), SessionState::Running) => Arc::clone(store),
            _ => misuse("session finished without running"),
        };

        self.transition(SessionState::Summarizing);
        let ledger = store.freeze();
        let summary = summarize_run(&ledger);

        let report = render(&summary, self.config.verbose);
        self.transition(SessionState::Reported);

        let sink_error = match &self.sink {
            Some(sink) => sink.persist(&ReportDocument::new(&ledger, &summary)).err(),
            None => None,
        };
        if let Some(err) = &sink_error {
            tracing::warn!(error = %err, "could not save report");
            self.transition(SessionState::Error);
        } else {
            self.transition(SessionState::Done);
        }

        SessionOutcome {
            state: self.state,
            suite_status,
            ledger,
            summary,
            report,
            sink_error,
        }
    }

    /// Start, run `suite`, and finish.
    pub fn run<S: Suite>(mut self, suite: S) -> SessionOutcome {
        let recorder = self.start();
        let suite_status = suite.run(&recorder);
        drop(recorder);
        self.finish(suite_status)
    }
}

#[tracing::instrument(skip_all, fields(tests = ledger.entries().len()))]
fn summarize_run(ledger: &Ledger) -> Summary {
    let summary = summarize(ledger);
    tracing::debug!(total = summary.total, "run summarized");
    summary
}

/// Everything a finished session produced.
#[derive(Debug)]
pub struct SessionOutcome {
    /// `Done` or `Error`.
    pub state: SessionState,
    pub suite_status: SuiteStatus,
    pub ledger: Ledger,
    pub summary: Summary,
    /// The rendered text report.
    pub report: String,
    pub sink_error: Option<ReportError>,
}

impl SessionOutcome {
    /// Success only if the suite passed and the report, when configured, was saved.
    pub fn is_success(&self) -> bool {
        self.state == SessionState::Done && self.suite_status.is_success()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
    }

    /// Print the text report to stdout and any sink failure to stderr.
    pub fn print(&self) {
        println!("{}", self.report);
        if let Some(err) = &self.sink_error {
            eprintln!("could not save report: {err}");
        }
    }
}

//! Test-suite boundary: identities, suite execution and progress reporting.
//!
//! The collector does not care how a suite is run. It hands a [`Recorder`] to something implementing
//! [`Suite`] and gets a [`SuiteStatus`] back. Closures work as suites, and [`ParallelSuite`] runs a list of
//! named test functions on one thread each, which is how most callers (and this crate's own tests) drive it.
//!
//! ## SuiteReporter Trait
//!
//! [`ParallelSuite`] separates progress output from execution through [`SuiteReporter`]. The default console
//! reporter is pytest-style: dots (or `name ... PASSED` lines when verbose) and a closing tally.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::store::Recorder;

// ============================================================================
// Test identity
// ============================================================================

/// Identity of the test a disappointment is filed under.
pub trait TestContext {
    /// Name the disappointment is recorded under.
    fn name(&self) -> &str;

    /// Mark the surrounding test as failed without stopping it.
    fn fail(&self);
}

/// Built-in [`TestContext`] handed to every test of a [`ParallelSuite`].
#[derive(Debug)]
pub struct TestCase {
    name: String,
    failed: AtomicBool,
}

impl TestCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failed: AtomicBool::new(false),
        }
    }

    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

impl TestContext for TestCase {
    fn name(&self) -> &str {
        &self.name
    }

    fn fail(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Suite
// ============================================================================

/// Pass/fail status of a whole suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteStatus {
    Passed,
    Failed,
}

impl SuiteStatus {
    pub fn is_success(self) -> bool {
        self == SuiteStatus::Passed
    }
}

impl From<bool> for SuiteStatus {
    fn from(passed: bool) -> Self {
        if passed { SuiteStatus::Passed } else { SuiteStatus::Failed }
    }
}

/// Something that runs tests while disappointments are being collected.
pub trait Suite {
    fn run(self, recorder: &Recorder) -> SuiteStatus;
}

impl<F> Suite for F
where
    F: FnOnce(&Recorder) -> SuiteStatus,
{
    fn run(self, recorder: &Recorder) -> SuiteStatus {
        self(recorder)
    }
}

/// What a single test function returns; `Err` carries the failure message.
pub type TestOutcome = Result<(), String>;

type TestFn = Box<dyn Fn(&TestCase, &Recorder) -> TestOutcome + Send + Sync>;

/// Result of running a single test.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Passed(Duration),
    Failed(Duration, String),
}

impl TestResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed(_))
    }
}

/// Tally of a finished suite.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

// ============================================================================
// Reporter
// ============================================================================

/// Progress callbacks of a [`ParallelSuite`].
pub trait SuiteReporter: Send {
    /// Called once the tests to run are known.
    fn on_collection_complete(&mut self, _test_count: usize) {}

    /// Called for every finished test, in registration order.
    fn on_test_complete(&mut self, name: &str, result: &TestResult);

    /// Called when all tests have completed.
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Reporter that prints nothing.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl SuiteReporter for SilentReporter {
    fn on_test_complete(&mut self, _name: &str, _result: &TestResult) {}

    fn on_run_complete(&mut self, _summary: &RunSummary) {}
}

/// Default console reporter (pytest-style).
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl SuiteReporter for ConsoleReporter {
    fn on_collection_complete(&mut self, test_count: usize) {
        if test_count == 0 {
            eprintln!("No tests collected");
        } else {
            eprintln!("collected {} item(s)", test_count);
        }
    }

    fn on_test_complete(&mut self, name: &str, result: &TestResult) {
        match result {
            TestResult::Passed(d) if self.verbose => {
                eprintln!("{} ... \x1b[32mPASSED\x1b[0m ({:.0}ms)", name, d.as_millis())
            }
            TestResult::Passed(_) => eprint!("\x1b[32m.\x1b[0m"),
            TestResult::Failed(d, msg) => {
                if self.verbose {
                    eprintln!("{} ... \x1b[31mFAILED\x1b[0m ({:.0}ms)", name, d.as_millis());
                } else {
                    eprint!("\x1b[31mF\x1b[0m");
                }
                eprintln!("\n\x1b[31m{}\x1b[0m", name);
                eprintln!("{}", msg);
            }
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if !self.verbose {
            eprintln!();
        }

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("\x1b[32m{} passed\x1b[0m", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("\x1b[31m{} failed\x1b[0m", summary.failed));
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }

        eprintln!(
            "====== {} in {:.2}s ======",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
    }
}

// ============================================================================
// Parallel suite
// ============================================================================

/// Named test functions run concurrently, one scoped thread per test, all sharing one recorder.
///
/// A test fails when it returns `Err`, panics, or calls [`TestContext::fail`].
pub struct ParallelSuite {
    tests: Vec<(String, TestFn)>,
    reporter: Box<dyn SuiteReporter>,
}

impl Default for ParallelSuite {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelSuite {
    pub fn new() -> Self {
        Self {
            tests: Vec::new(),
            reporter: Box::new(SilentReporter),
        }
    }

    /// Register a test.
    pub fn test<F>(mut self, name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&TestCase, &Recorder) -> TestOutcome + Send + Sync + 'static,
    {
        self.tests.push((name.into(), Box::new(test)));
        self
    }

    pub fn with_reporter(mut self, reporter: impl SuiteReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Run every test and return per-test results in registration order.
    pub fn execute(self, recorder: &Recorder) -> (Vec<(String, TestResult)>, RunSummary) {
        let ParallelSuite { tests, mut reporter } = self;
        let start_time = Instant::now();
        reporter.on_collection_complete(tests.len());

        let results: Vec<(String, TestResult)> = thread::scope(|scope| {
            let handles: Vec<_> = tests
                .iter()
                .map(|(name, test)| {
                    let recorder = recorder.clone();
                    let handle = scope.spawn(move || run_single_test(name, test, &recorder));
                    (name, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(name, handle)| {
                    let result = handle
                        .join()
                        .unwrap_or_else(|_| TestResult::Failed(Duration::ZERO, "test thread panicked".to_string()));
                    (name.clone(), result)
                })
                .collect()
        });

        let passed = results.iter().filter(|(_, r)| r.is_passed()).count();
        for (name, result) in &results {
            reporter.on_test_complete(name, result);
        }
        let summary = RunSummary {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration: start_time.elapsed(),
        };
        reporter.on_run_complete(&summary);
        tracing::debug!(passed = summary.passed, failed = summary.failed, "suite finished");

        (results, summary)
    }
}

impl Suite for ParallelSuite {
    fn run(self, recorder: &Recorder) -> SuiteStatus {
        let (_, summary) = self.execute(recorder);
        SuiteStatus::from(summary.failed == 0)
    }
}

fn run_single_test(name: &str, test: &TestFn, recorder: &Recorder) -> TestResult {
    let case = TestCase::new(name);
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| test(&case, recorder)));
    let elapsed = start.elapsed();

    match outcome {
        Ok(Ok(())) if !case.failed() => TestResult::Passed(elapsed),
        Ok(Ok(())) => TestResult::Failed(elapsed, "test marked as failed".to_string()),
        Ok(Err(msg)) => TestResult::Failed(elapsed, msg),
        Err(payload) => TestResult::Failed(elapsed, panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

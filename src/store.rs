//! Concurrency-safe disappointment store.
//!
//! One [`Store`] exists per session. Test workers reach it through cloned [`Recorder`]s and mutate individual
//! records through [`Grievance`] handles. Every structural change takes the same exclusive lock; records are
//! built and formatted before the lock is taken, and nothing performs I/O while holding it.
//!
//! ## Lifecycle
//!
//! The store is append-only while the suite runs. [`Store::freeze`] hands the whole contents to the session
//! exactly once; any later write is a misuse and panics at the caller.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use grievance_core::{Disappointment, Ledger};
use parking_lot::Mutex;

use crate::errors::misuse;
use crate::suite::TestContext;

#[derive(Debug, Default)]
struct Grievances {
    /// Position of each test name in `entries`.
    index: HashMap<String, usize>,
    /// Test names in first-record order, each with its records in insertion order.
    entries: Vec<(String, Vec<Disappointment>)>,
    frozen: bool,
}

/// All disappointments of one run, keyed by test name.
#[derive(Debug, Default)]
pub struct Store {
    inner: Mutex<Grievances>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    #[track_caller]
    fn insert(self: &Arc<Self>, disappointment: Disappointment) -> Grievance {
        let mut inner = self.inner.lock();
        if inner.frozen {
            drop(inner);
            misuse("disappointment recorded after the run was summarized");
        }

        let existing = inner.index.get(&disappointment.test_name).copied();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let slot = inner.entries.len();
                let name = disappointment.test_name.clone();
                inner.index.insert(name.clone(), slot);
                inner.entries.push((name, Vec::new()));
                slot
            }
        };
        let records = &mut inner.entries[slot].1;
        records.push(disappointment);
        let position = records.len() - 1;

        Grievance {
            store: Arc::clone(self),
            slot,
            position,
        }
    }

    /// Total number of recorded disappointments so far.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting writes and take the contents as an ordered ledger.
    ///
    /// # Panics
    ///
    /// Panics if the store was already frozen.
    #[track_caller]
    pub fn freeze(&self) -> Ledger {
        let entries = {
            let mut inner = self.inner.lock();
            if inner.frozen {
                drop(inner);
                misuse("the store was already summarized");
            }
            inner.frozen = true;
            inner.index.clear();
            std::mem::take(&mut inner.entries)
        };
        Ledger::from_entries(entries)
    }

    #[track_caller]
    fn with_record<R>(&self, slot: usize, position: usize, f: impl FnOnce(&mut Disappointment) -> R) -> R {
        let mut inner = self.inner.lock();
        if inner.frozen {
            drop(inner);
            misuse("disappointment modified after the run was summarized");
        }
        f(&mut inner.entries[slot].1[position])
    }
}

/// Handle to one recorded disappointment.
///
/// Mutators lock the store, change the record in place and return the same handle, so calls chain:
///
/// ```
/// # use grievance::{Session, SessionConfig};
/// let mut session = Session::new(SessionConfig::default());
/// let recorder = session.start();
/// recorder
///     .record("checkout", "You're slow!", &["speed"])
///     .set_error("timeout exceeded")
///     .add_tags(&["download"]);
/// ```
#[derive(Debug, Clone)]
pub struct Grievance {
    store: Arc<Store>,
    slot: usize,
    position: usize,
}

impl Grievance {
    #[track_caller]
    pub fn set_message(&self, message: &str) -> &Self {
        self.store.with_record(self.slot, self.position, |d| {
            d.set_message(message);
        });
        self
    }

    /// Attach an error; only its rendered text is kept.
    #[track_caller]
    pub fn set_error(&self, error: impl std::fmt::Display) -> &Self {
        let text = error.to_string();
        self.store.with_record(self.slot, self.position, |d| {
            d.error = Some(text);
        });
        self
    }

    #[track_caller]
    pub fn add_tags(&self, tags: &[&str]) -> &Self {
        self.store.with_record(self.slot, self.position, |d| {
            d.add_tags(tags.iter().copied());
        });
        self
    }

    /// A copy of the record as it currently stands.
    #[track_caller]
    pub fn get(&self) -> Disappointment {
        self.store.with_record(self.slot, self.position, |d| d.clone())
    }
}

/// Destination of the verbose per-record echo.
#[derive(Clone)]
pub(crate) struct Echo(Arc<Mutex<Box<dyn Write + Send>>>);

impl Echo {
    pub(crate) fn new(writer: impl Write + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Box::new(writer))))
    }

    pub(crate) fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn line(&self, disappointment: &Disappointment) {
        let mut writer = self.0.lock();
        if let Err(e) = writeln!(writer, "\tDISAPPOINTMENT: {disappointment}").and_then(|()| writer.flush()) {
            tracing::debug!(error = %e, "could not echo disappointment");
        }
    }
}

impl fmt::Debug for Echo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Echo(..)")
    }
}

/// Write-side view of a running session's store, shared by every test worker.
#[derive(Debug, Clone)]
pub struct Recorder {
    store: Arc<Store>,
    echo: Option<Echo>,
}

impl Recorder {
    pub(crate) fn new(store: Arc<Store>, echo: Option<Echo>) -> Self {
        Self { store, echo }
    }

    /// Record a disappointment against the test identified by `test`.
    #[track_caller]
    pub fn grievance<C: TestContext + ?Sized>(&self, test: &C, message: &str, tags: &[&str]) -> Grievance {
        self.record(test.name(), message, tags)
    }

    /// Record a disappointment under an explicit test name.
    ///
    /// Tags are deduplicated in first-occurrence order. A verbose session echoes the record before it is stored.
    #[track_caller]
    pub fn record(&self, test_name: &str, message: &str, tags: &[&str]) -> Grievance {
        let disappointment = Disappointment::new(test_name, message, tags.iter().copied());
        if let Some(echo) = &self.echo {
            echo.line(&disappointment);
        }
        tracing::trace!(test = test_name, tags = tags.len(), "disappointment recorded");
        self.store.insert(disappointment)
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recorder() -> Recorder {
        Recorder::new(Arc::new(Store::new()), None)
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    #[test]
    fn test_echo_prints_each_record() {
        let out = Captured::default();
        let rec = Recorder::new(Arc::new(Store::new()), Some(Echo::new(out.clone())));
        rec.record("A", "My son tells me your company stinks!", &[]);
        rec.record("A", "You're sending too much data!", &["speed", "download", "speed"]);

        assert_eq!(
            out.text(),
            "\tDISAPPOINTMENT: My son tells me your company stinks!\n\
             \tDISAPPOINTMENT: You're sending too much data! (speed, download)\n"
        );
        assert_eq!(rec.store().len(), 2);
    }

    #[test]
    fn test_echo_shows_the_record_as_filed() {
        let out = Captured::default();
        let rec = Recorder::new(Arc::new(Store::new()), Some(Echo::new(out.clone())));
        rec.record("A", "slow", &["speed"]).set_message("very slow");

        // Later handle mutations are not echoed again.
        assert_eq!(out.text(), "\tDISAPPOINTMENT: slow (speed)\n");
    }

    #[test]
    fn test_record_deduplicates_tags_in_one_call() {
        let rec = recorder();
        let g = rec.record("A", "You're sending too much data!", &["speed", "download", "speed"]);
        assert_eq!(g.get().tags.as_slice(), ["speed", "download"]);
    }

    #[test]
    fn test_handle_mutations_chain_in_place() {
        let rec = recorder();
        rec.record("A", "slow", &["speed"])
            .set_message("very slow")
            .set_error("timeout exceeded")
            .add_tags(&["download", "speed"]);

        let ledger = rec.store().freeze();
        let records = ledger.get("A").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "very slow");
        assert_eq!(records[0].error.as_deref(), Some("timeout exceeded"));
        assert_eq!(records[0].tags.as_slice(), ["speed", "download"]);
    }

    #[test]
    fn test_insertion_order_is_kept_per_test() {
        let rec = recorder();
        rec.record("B", "first", &[]);
        rec.record("A", "second", &[]);
        rec.record("B", "third", &[]);

        let ledger = rec.store().freeze();
        let names: Vec<&str> = ledger.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
        let b: Vec<&str> = ledger.get("B").unwrap().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(b, ["first", "third"]);
    }

    #[test]
    fn test_len_counts_every_record() {
        let rec = recorder();
        assert!(rec.store().is_empty());
        rec.record("A", "1", &[]);
        rec.record("B", "2", &[]);
        assert_eq!(rec.store().len(), 2);
    }

    #[test]
    #[should_panic(expected = "recorded after the run was summarized")]
    fn test_record_after_freeze_panics() {
        let rec = recorder();
        rec.store().freeze();
        rec.record("A", "late", &[]);
    }

    #[test]
    #[should_panic(expected = "modified after the run was summarized")]
    fn test_mutation_after_freeze_panics() {
        let rec = recorder();
        let g = rec.record("A", "on time", &[]);
        rec.store().freeze();
        g.set_message("late");
    }

    #[test]
    #[should_panic(expected = "already summarized")]
    fn test_double_freeze_panics() {
        let store = Store::new();
        store.freeze();
        store.freeze();
    }
}

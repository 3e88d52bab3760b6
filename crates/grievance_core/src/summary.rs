//! Aggregation of a finished run.
//!
//! [`summarize`] walks a frozen [`Ledger`] exactly once per dimension and produces counts by tag, by test
//! name and by error, plus row lists ordered for display.
//!
//! ## Ordering
//!
//! Rows are sorted by count descending. Equal counts keep the order in which their key was first met during
//! the aggregation pass (ledger order, then record order, then tag order). `HashMap` iteration order is never
//! consulted: every tally carries an explicit discovery sequence, so two runs over the same ledger always
//! render identically.

use std::collections::HashMap;

use crate::disappointment::Disappointment;

/// The frozen, ordered contents of a run: test names in first-record order, each with its disappointments in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<(String, Vec<Disappointment>)>,
    /// Position of each test name in `entries`.
    index: HashMap<String, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from already-grouped entries, keeping their order.
    ///
    /// Entries sharing a test name are folded into the first one.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Vec<Disappointment>)>) -> Self {
        let mut ledger = Ledger::new();
        for (name, records) in entries {
            ledger.slot(&name).extend(records);
        }
        ledger
    }

    /// Append a disappointment under its own test name.
    pub fn push(&mut self, disappointment: Disappointment) {
        let name = disappointment.test_name.clone();
        self.slot(&name).push(disappointment);
    }

    /// Append every entry of `other` after the entries of `self`.
    pub fn merge(&mut self, other: Ledger) {
        for (name, records) in other.entries {
            self.slot(&name).extend(records);
        }
    }

    fn slot(&mut self, name: &str) -> &mut Vec<Disappointment> {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(name.to_string(), idx);
                self.entries.push((name.to_string(), Vec::new()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn entries(&self) -> &[(String, Vec<Disappointment>)] {
        &self.entries
    }

    pub fn get(&self, test_name: &str) -> Option<&[Disappointment]> {
        self.index
            .get(test_name)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    /// Iterate over every disappointment in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = &Disappointment> {
        self.entries.iter().flat_map(|(_, records)| records.iter())
    }

    /// Total number of recorded disappointments.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One display row of a summary dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: String,
    pub count: usize,
}

impl ReportRow {
    pub fn new(id: impl Into<String>, count: usize) -> Self {
        Self { id: id.into(), count }
    }
}

/// Aggregated counts of a finished run. Computed once; never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub by_tag: HashMap<String, usize>,
    pub by_name: HashMap<String, usize>,
    pub by_error: HashMap<String, usize>,
    pub tag_rows: Vec<ReportRow>,
    pub name_rows: Vec<ReportRow>,
    pub error_rows: Vec<ReportRow>,
}

impl Summary {
    /// A run with no disappointments at all.
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

/// Counts keyed by string, remembering the order in which keys were first seen.
#[derive(Default)]
struct Tally {
    counts: HashMap<String, usize>,
    discovered: Vec<String>,
}

impl Tally {
    fn bump(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
                self.discovered.push(key.to_string());
            }
        }
    }

    fn finish(self) -> (HashMap<String, usize>, Vec<ReportRow>) {
        let mut rows: Vec<ReportRow> = self
            .discovered
            .iter()
            .map(|key| ReportRow::new(key.as_str(), self.counts.get(key).copied().unwrap_or(0)))
            .collect();
        // `sort_by` is stable: equal counts stay in discovery order.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        (self.counts, rows)
    }
}

/// Aggregate a frozen ledger.
///
/// ## Parameters
/// - `ledger`: the run's disappointments, in discovery order.
///
/// ## Returns
/// - (`Summary`): totals and per-dimension counts with display rows.
///
/// ## Notes
/// - `by_tag[t]` counts records whose tag set contains `t`; tag sets are already duplicate-free.
/// - Records without an error never appear in `by_error`.
/// - An empty ledger yields the clean-run summary (`total == 0`, empty maps and rows).
pub fn summarize(ledger: &Ledger) -> Summary {
    let mut tags = Tally::default();
    let mut names = Tally::default();
    let mut errors = Tally::default();
    let mut total = 0;

    for (name, records) in ledger.entries() {
        for record in records {
            total += 1;
            names.bump(name);
            for tag in record.tags.iter() {
                tags.bump(tag);
            }
            if let Some(error) = &record.error {
                errors.bump(error);
            }
        }
    }

    let (by_tag, tag_rows) = tags.finish();
    let (by_name, name_rows) = names.finish();
    let (by_error, error_rows) = errors.finish();

    Summary {
        total,
        by_tag,
        by_name,
        by_error,
        tag_rows,
        name_rows,
        error_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(test: &str, msg: &str, tags: &[&str]) -> Disappointment {
        Disappointment::new(test, msg, tags.iter().copied())
    }

    #[test]
    fn test_empty_ledger_is_clean() {
        let summary = summarize(&Ledger::new());
        assert!(summary.is_clean());
        assert!(summary.tag_rows.is_empty());
        assert!(summary.name_rows.is_empty());
        assert!(summary.error_rows.is_empty());
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let mut ledger = Ledger::new();
        ledger.push(record("t", "one", &["zeta", "alpha"]));
        ledger.push(record("t", "two", &["mid"]));

        let summary = summarize(&ledger);
        let ids: Vec<&str> = summary.tag_rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_higher_counts_sort_first() {
        let mut ledger = Ledger::new();
        ledger.push(record("first", "a", &["rare"]));
        ledger.push(record("second", "b", &["common"]));
        ledger.push(record("second", "c", &["common"]));

        let summary = summarize(&ledger);
        assert_eq!(summary.tag_rows, [ReportRow::new("common", 2), ReportRow::new("rare", 1)]);
        assert_eq!(summary.name_rows, [ReportRow::new("second", 2), ReportRow::new("first", 1)]);
    }

    #[test]
    fn test_records_without_error_are_not_counted_by_error() {
        let mut ledger = Ledger::new();
        ledger.push(record("t", "a", &[]));
        let mut failed = record("t", "b", &[]);
        failed.set_error("boom");
        ledger.push(failed);

        let summary = summarize(&ledger);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.by_error.len(), 1);
        assert_eq!(summary.by_error["boom"], 1);
    }

    #[test]
    fn test_from_entries_indexes_every_name() {
        let entries = (0..5_000).map(|i| {
            let name = format!("test-{i}");
            let records = vec![record(&name, "slow", &["speed"])];
            (name, records)
        });
        let repeat = ("test-7".to_string(), vec![record("test-7", "again", &[])]);
        let mut ledger = Ledger::from_entries(entries.chain([repeat]));

        assert_eq!(ledger.entries().len(), 5_000);
        assert_eq!(ledger.len(), 5_001);
        assert_eq!(ledger.get("test-4999").map(<[_]>::len), Some(1));
        assert_eq!(ledger.get("test-7").map(<[_]>::len), Some(2));
        assert!(ledger.get("test-5000").is_none());

        ledger.push(record("late", "new name", &[]));
        assert_eq!(ledger.entries().last().map(|(n, _)| n.as_str()), Some("late"));
        assert_eq!(ledger.get("late").map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_ledger_groups_by_test_name_in_first_seen_order() {
        let mut ledger = Ledger::new();
        ledger.push(record("b", "1", &[]));
        ledger.push(record("a", "2", &[]));
        ledger.push(record("b", "3", &[]));

        let names: Vec<&str> = ledger.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(ledger.get("b").map(|r| r.len()), Some(2));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_merge_appends_records() {
        let mut left = Ledger::new();
        left.push(record("a", "1", &[]));
        let mut right = Ledger::new();
        right.push(record("b", "2", &[]));
        right.push(record("a", "3", &[]));

        left.merge(right);
        let messages: Vec<&str> = left.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["1", "3", "2"]);
    }
}

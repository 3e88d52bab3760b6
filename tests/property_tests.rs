//! Property-based tests for aggregation and the report document
//!
//! These tests use proptest to verify invariants across many randomly
//! generated runs, catching edge cases that hand-written tests might miss.

use grievance::report::{ReportDocument, decode_documents};
use grievance::{Disappointment, Ledger, SinkMode, summarize};
use proptest::prelude::*;

/// One generated record: (test name, tags, optional error).
type Spec = (String, Vec<String>, Option<String>);

fn record_strategy() -> impl Strategy<Value = Spec> {
    (
        prop::sample::select(vec!["alpha", "beta", "gamma", "delta"]).prop_map(String::from),
        prop::collection::vec("[a-c]{1,2}", 0..5),
        prop::option::of(prop::sample::select(vec!["timeout", "refused", "eof"]).prop_map(String::from)),
    )
}

fn build_ledger(specs: &[Spec]) -> Ledger {
    let mut ledger = Ledger::new();
    for (i, (name, tags, error)) in specs.iter().enumerate() {
        let mut d = Disappointment::new(name.as_str(), format!("grievance #{i}"), tags.iter().map(String::as_str));
        if let Some(error) = error {
            d.set_error(error);
        }
        ledger.push(d);
    }
    ledger
}

// =============================================================================
// Aggregation Properties
// =============================================================================

#[cfg(test)]
mod summary_tests {
    use super::*;

    proptest! {
        /// Property: every record is counted once under its test name
        #[test]
        fn names_sum_to_total(specs in prop::collection::vec(record_strategy(), 0..40)) {
            let summary = summarize(&build_ledger(&specs));
            prop_assert_eq!(summary.total, specs.len());
            prop_assert_eq!(summary.by_name.values().sum::<usize>(), specs.len());
        }

        /// Property: errors are counted only for records that carry one
        #[test]
        fn errors_never_exceed_total(specs in prop::collection::vec(record_strategy(), 0..40)) {
            let summary = summarize(&build_ledger(&specs));
            let with_error = specs.iter().filter(|(_, _, e)| e.is_some()).count();
            prop_assert_eq!(summary.by_error.values().sum::<usize>(), with_error);
            prop_assert!(summary.by_error.values().all(|&n| n <= summary.total));
        }

        /// Property: a tag is counted at most once per record
        #[test]
        fn tag_counts_are_bounded_by_total(specs in prop::collection::vec(record_strategy(), 0..40)) {
            let summary = summarize(&build_ledger(&specs));
            for (tag, &count) in &summary.by_tag {
                let holders = specs.iter().filter(|(_, tags, _)| tags.contains(tag)).count();
                prop_assert_eq!(count, holders);
                prop_assert!(count <= summary.total);
            }
        }

        /// Property: display rows are sorted by count, descending, and mirror the maps
        #[test]
        fn rows_are_sorted_and_complete(specs in prop::collection::vec(record_strategy(), 0..40)) {
            let summary = summarize(&build_ledger(&specs));
            for (rows, counts) in [
                (&summary.tag_rows, &summary.by_tag),
                (&summary.name_rows, &summary.by_name),
                (&summary.error_rows, &summary.by_error),
            ] {
                prop_assert_eq!(rows.len(), counts.len());
                prop_assert!(rows.windows(2).all(|w| w[0].count >= w[1].count));
                for row in rows {
                    prop_assert_eq!(counts.get(&row.id).copied(), Some(row.count));
                }
            }
        }

        /// Property: merging ledgers adds their totals
        #[test]
        fn merge_adds_totals(
            left in prop::collection::vec(record_strategy(), 0..20),
            right in prop::collection::vec(record_strategy(), 0..20),
        ) {
            let mut merged = build_ledger(&left);
            merged.merge(build_ledger(&right));
            prop_assert_eq!(summarize(&merged).total, left.len() + right.len());
        }
    }
}

// =============================================================================
// Document Properties
// =============================================================================

#[cfg(test)]
mod document_tests {
    use super::*;
    use grievance::{FileSink, ReportSink};

    proptest! {
        /// Property: a persisted run re-summarizes to the same counts
        #[test]
        fn document_preserves_counts(specs in prop::collection::vec(record_strategy(), 0..30)) {
            let ledger = build_ledger(&specs);
            let summary = summarize(&ledger);
            let document = ReportDocument::new(&ledger, &summary);

            let restored = summarize(&document.to_ledger());
            prop_assert_eq!(restored.total, summary.total);
            prop_assert_eq!(restored.by_tag, summary.by_tag);
            prop_assert_eq!(restored.by_name, summary.by_name);
            prop_assert_eq!(restored.by_error, summary.by_error);
        }

        /// Property: both accumulation layouts decode to the runs in write order
        #[test]
        fn every_sink_mode_decodes_in_order(
            runs in prop::collection::vec(prop::collection::vec(record_strategy(), 0..6), 1..5),
            append in any::<bool>(),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("report.json");
            let mode = if append { SinkMode::Append } else { SinkMode::Array };
            let sink = FileSink::new(&path, mode);

            for specs in &runs {
                let ledger = build_ledger(specs);
                sink.persist(&ReportDocument::new(&ledger, &summarize(&ledger))).unwrap();
            }

            let decoded = decode_documents(&std::fs::read_to_string(&path).unwrap()).unwrap();
            prop_assert_eq!(decoded.len(), runs.len());
            for (document, specs) in decoded.iter().zip(&runs) {
                prop_assert_eq!(document.summary.total, specs.len());
            }
        }
    }
}

use grievance_core::{CLEAN_RUN_MESSAGE, Disappointment, Ledger, ReportRow, render, summarize};

fn scenario_a() -> Ledger {
    let mut ledger = Ledger::new();
    ledger.push(Disappointment::new("A", "My son tells me your company stinks!", Vec::<&str>::new()));
    ledger.push(Disappointment::new("A", "You're slow!", ["speed"]));
    ledger.push(Disappointment::new("A", "You're sending too much data!", ["speed", "download"]));
    ledger
}

#[test]
fn scenario_a_summary() {
    let summary = summarize(&scenario_a());
    assert_eq!(summary.total, 3);
    assert_eq!(summary.tag_rows, [ReportRow::new("speed", 2), ReportRow::new("download", 1)]);
    assert_eq!(summary.name_rows, [ReportRow::new("A", 3)]);
    assert!(summary.error_rows.is_empty());
}

#[test]
fn summarize_is_repeatable() {
    let ledger = scenario_a();
    assert_eq!(summarize(&ledger), summarize(&ledger));
}

#[test]
fn every_row_has_a_positive_count() {
    let mut ledger = scenario_a();
    let mut failed = Disappointment::new("B", "nope", ["speed"]);
    failed.set_error("connection refused");
    ledger.push(failed);

    let summary = summarize(&ledger);
    for rows in [&summary.tag_rows, &summary.name_rows, &summary.error_rows] {
        assert!(rows.iter().all(|r| r.count > 0), "zero-count row in {rows:?}");
    }
}

#[test]
fn empty_ledger_is_clean_in_both_modes() {
    let summary = summarize(&Ledger::new());
    assert!(summary.is_clean());
    assert!(summary.by_tag.is_empty() && summary.by_name.is_empty() && summary.by_error.is_empty());
    assert_eq!(render(&summary, false), CLEAN_RUN_MESSAGE);
    assert_eq!(render(&summary, true), CLEAN_RUN_MESSAGE);
}

#[test]
fn verbose_render_lists_sections_in_order() {
    let mut ledger = scenario_a();
    let mut failed = Disappointment::new("B", "nope", ["speed"]);
    failed.set_error("connection refused");
    ledger.push(failed);

    let text = render(&summarize(&ledger), true);
    let tag = text.find("By Tag:").unwrap();
    let error = text.find("By Error:").unwrap();
    let test = text.find("By Test:").unwrap();
    assert!(tag < error && error < test);
    assert!(!text.ends_with('\n'));
}

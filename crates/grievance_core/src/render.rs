//! Human-readable report text: the airing of grievances.

use std::fmt::Write as _;

use crate::summary::{ReportRow, Summary};

/// Printed instead of any count when a run recorded nothing.
pub const CLEAN_RUN_MESSAGE: &str = "No disappointments, you are truly master of your domain.";

const HEADER: &str = "=== The airing of grievances:";
const MARKER: &str = "|";

/// Render a summary as report text (no trailing newline).
///
/// ## Parameters
/// - `summary`: the aggregated run.
/// - `verbose`: when `false`, only the total line is produced.
///
/// ## Notes
/// - A clean run always renders [`CLEAN_RUN_MESSAGE`], verbose or not.
/// - Verbose output lists the non-empty dimensions in the order tag, error, test. Each section is
///   column-aligned on its own.
pub fn render(summary: &Summary, verbose: bool) -> String {
    if summary.is_clean() {
        return CLEAN_RUN_MESSAGE.to_string();
    }
    if !verbose {
        return total_line(summary.total);
    }

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&total_line(summary.total));

    for (label, rows) in [
        ("By Tag:", &summary.tag_rows),
        ("By Error:", &summary.error_rows),
        ("By Test:", &summary.name_rows),
    ] {
        if rows.is_empty() {
            continue;
        }
        out.push_str("\n\n");
        out.push_str(label);
        write_rows(&mut out, rows);
    }
    out
}

fn total_line(total: usize) -> String {
    let noun = if total == 1 { "disappointment" } else { "disappointments" };
    format!("I got a lot of problems with you people! ({total} {noun})")
}

fn write_rows(out: &mut String, rows: &[ReportRow]) {
    let id_width = rows.iter().map(|r| r.id.chars().count()).max().unwrap_or(0);
    let count_width = rows.iter().map(|r| r.count.to_string().len()).max().unwrap_or(0);
    for row in rows {
        // Writing to String cannot fail.
        let _ = write!(
            out,
            "\n  {:<id_width$}  {:<count_width$}  {}",
            row.id,
            row.count,
            MARKER.repeat(row.count)
        );
    }
}

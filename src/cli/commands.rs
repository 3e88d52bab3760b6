//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use grievance_core::{Ledger, render, summarize};

use crate::report::{ReportDocument, decode_documents};

use super::{CliError, CliResult, ExitCode};

/// Read and decode every run stored in a report file.
fn load_documents(path: &Path) -> CliResult<Vec<ReportDocument>> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading '{}': {}", path.display(), e)))?;
    decode_documents(&text)
        .map_err(|e| CliError::failure(format!("Error decoding report '{}': {}", path.display(), e)))
}

/// Re-summarize a persisted run, warning when the stored totals disagree with the stored records.
fn summarize_document(index: usize, document: &ReportDocument) -> grievance_core::Summary {
    let summary = summarize(&document.to_ledger());
    if summary.total != document.summary.total {
        tracing::warn!(
            run = index + 1,
            stored = document.summary.total,
            recomputed = summary.total,
            "stored summary does not match recorded grievances"
        );
    }
    summary
}

/// Print the report of every run in `path` (or only the most recent one).
pub fn show_report(path: &Path, verbose: bool, latest: bool) -> CliResult<ExitCode> {
    let documents = load_documents(path)?;
    if documents.is_empty() {
        eprintln!("No runs recorded in '{}'", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let count = documents.len();
    let skip = if latest { count - 1 } else { 0 };
    for (index, document) in documents.iter().enumerate().skip(skip) {
        let summary = summarize_document(index, document);
        if count > 1 {
            println!("--- Run {} of {} ---", index + 1, count);
        }
        println!("{}", render(&summary, verbose));
    }
    Ok(ExitCode::SUCCESS)
}

/// Fold every run in `path` into a single report.
pub fn merge_reports(path: &Path, verbose: bool) -> CliResult<ExitCode> {
    let documents = load_documents(path)?;
    let mut ledger = Ledger::new();
    for document in &documents {
        ledger.merge(document.to_ledger());
    }

    println!("Merged {} run(s) from '{}'", documents.len(), path.display());
    println!("{}", render(&summarize(&ledger), verbose));
    Ok(ExitCode::SUCCESS)
}

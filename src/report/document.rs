//! The persisted report document and its decoder.
//!
//! Field names are part of the on-disk format and must stay stable:
//!
//! ```json
//! {"grievances": {"<test>": [{"message": "...", "tags": ["..."], "error": null, "testName": "<test>"}]},
//!  "summary": {"total": 1, "byTag": {}, "byName": {"<test>": 1}}}
//! ```
//!
//! `byError` is omitted when no disappointment carried an error.

use std::collections::{BTreeMap, HashMap};

use grievance_core::{Disappointment, Ledger, Summary};
use serde::{Deserialize, Serialize};

/// One persisted disappointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisappointmentRecord {
    pub message: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "testName")]
    pub test_name: String,
}

impl From<&Disappointment> for DisappointmentRecord {
    fn from(d: &Disappointment) -> Self {
        Self {
            message: d.message.clone(),
            tags: d.tags.as_slice().to_vec(),
            error: d.error.clone(),
            test_name: d.test_name.clone(),
        }
    }
}

impl From<&DisappointmentRecord> for Disappointment {
    fn from(r: &DisappointmentRecord) -> Self {
        let mut d = Disappointment::new(r.test_name.as_str(), r.message.as_str(), r.tags.iter().map(String::as_str));
        d.error = r.error.clone();
        d
    }
}

/// Persisted counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub total: usize,
    #[serde(default)]
    pub by_tag: BTreeMap<String, usize>,
    #[serde(default)]
    pub by_name: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_error: BTreeMap<String, usize>,
}

impl From<&Summary> for SummaryRecord {
    fn from(s: &Summary) -> Self {
        fn sorted(counts: &HashMap<String, usize>) -> BTreeMap<String, usize> {
            counts.iter().map(|(k, v)| (k.clone(), *v)).collect()
        }
        Self {
            total: s.total,
            by_tag: sorted(&s.by_tag),
            by_name: sorted(&s.by_name),
            by_error: sorted(&s.by_error),
        }
    }
}

/// Full contents of one run plus its summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    #[serde(default)]
    pub grievances: BTreeMap<String, Vec<DisappointmentRecord>>,
    pub summary: SummaryRecord,
}

impl ReportDocument {
    pub fn new(ledger: &Ledger, summary: &Summary) -> Self {
        let grievances = ledger
            .entries()
            .iter()
            .map(|(name, records)| (name.clone(), records.iter().map(DisappointmentRecord::from).collect()))
            .collect();
        Self {
            grievances,
            summary: SummaryRecord::from(summary),
        }
    }

    /// Rebuild the ledger of a persisted run.
    ///
    /// Test names come back in lexical order; the persisted form does not keep discovery order.
    pub fn to_ledger(&self) -> Ledger {
        Ledger::from_entries(
            self.grievances
                .iter()
                .map(|(name, records)| (name.clone(), records.iter().map(Disappointment::from).collect())),
        )
    }
}

/// Decode every report document in `text`.
///
/// Accepts both accumulation layouts: a JSON array of documents, and documents written back-to-back
/// (optionally newline separated). A lone document is accepted too. Empty input yields no documents.
pub fn decode_documents(text: &str) -> Result<Vec<ReportDocument>, serde_json::Error> {
    let mut documents = Vec::new();
    for value in serde_json::Deserializer::from_str(text).into_iter::<serde_json::Value>() {
        match value? {
            serde_json::Value::Array(items) => {
                for item in items {
                    documents.push(serde_json::from_value(item)?);
                }
            }
            other => documents.push(serde_json::from_value(other)?),
        }
    }
    Ok(documents)
}

//! Report sinks: where the structured report goes once the run is summarized.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use super::document::{ReportDocument, decode_documents};
use crate::errors::ReportError;

/// Destination of the structured report.
pub trait ReportSink: Send + Sync {
    /// Persist one run's document. Called exactly once per session.
    fn persist(&self, document: &ReportDocument) -> Result<(), ReportError>;
}

/// How a file sink accumulates documents from repeated runs against the same path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SinkMode {
    /// Keep a single JSON array with one document per run.
    #[default]
    Array,
    /// Append each run's document after the previous ones, one per line.
    Append,
}

impl SinkMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "array" => Some(SinkMode::Array),
            "append" => Some(SinkMode::Append),
            _ => None,
        }
    }
}

/// File-backed sink.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    mode: SinkMode,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>, mode: SinkMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> SinkMode {
        self.mode
    }

    fn ensure_parent(&self) -> Result<(), ReportError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))
            }
            _ => Ok(()),
        }
    }

    fn persist_array(&self, document: &ReportDocument) -> Result<(), ReportError> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(ReportError::io(&self.path, e)),
        };
        let mut documents = decode_documents(&existing).map_err(|source| ReportError::CorruptSink {
            path: self.path.clone(),
            source,
        })?;
        documents.push(document.clone());

        let mut bytes = serde_json::to_vec_pretty(&documents)?;
        bytes.push(b'\n');
        replace_file(&self.path, |file| file.write_all(&bytes))
    }

    fn persist_append(&self, document: &ReportDocument) -> Result<(), ReportError> {
        let mut bytes = serde_json::to_vec(document)?;
        bytes.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| ReportError::io(&self.path, e))?;
        file.write_all(&bytes).map_err(|e| ReportError::io(&self.path, e))?;
        file.sync_all().map_err(|e| ReportError::io(&self.path, e))
    }
}

/// Replace the contents of `path` with what `write` produces.
///
/// The new contents go to a temporary file next to `path`, which is synced and renamed over the target only
/// once complete. A failure at any step leaves the previous file untouched.
fn replace_file(path: &Path, write: impl FnOnce(&mut File) -> io::Result<()>) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(|e| ReportError::io(dir, e))?;
    write(staged.as_file_mut()).map_err(|e| ReportError::io(path, e))?;
    staged.as_file().sync_all().map_err(|e| ReportError::io(path, e))?;
    staged.persist(path).map_err(|e| ReportError::io(path, e.error))?;
    Ok(())
}

impl ReportSink for FileSink {
    #[tracing::instrument(skip_all, fields(path = %self.path.display(), mode = ?self.mode))]
    fn persist(&self, document: &ReportDocument) -> Result<(), ReportError> {
        self.ensure_parent()?;
        match self.mode {
            SinkMode::Array => self.persist_array(document),
            SinkMode::Append => self.persist_append(document),
        }
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<ReportDocument>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents persisted so far.
    pub fn documents(&self) -> Vec<ReportDocument> {
        self.documents.lock().clone()
    }
}

impl ReportSink for MemorySink {
    fn persist(&self, document: &ReportDocument) -> Result<(), ReportError> {
        self.documents.lock().push(document.clone());
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for std::sync::Arc<S> {
    fn persist(&self, document: &ReportDocument) -> Result<(), ReportError> {
        (**self).persist(document)
    }
}

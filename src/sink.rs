use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::summary::Summary;
use crate::temporal::DailyCountTable;

pub const DAILY_COUNTS_FILE: &str = "daily_counts.json";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: TOTAL of {date} does not match its categories")]
    Inconsistent { path: PathBuf, date: String },
}

/// Accepts the two output documents of a run.
pub trait ReportSink {
    fn persist(&self, table: &DailyCountTable, summary: &Summary) -> Result<(), SinkError>;
}

/// Writes `daily_counts.json` and `summary.json` into one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path { &self.dir }

    /// Write `value` to a hidden temp file next to `name`; returns `(tmp, final)`.
    fn stage<T: Serialize>(&self, name: &str, value: &T) -> Result<(PathBuf, PathBuf), SinkError> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!(".{name}.tmp"));
        let mut body = serde_json::to_vec_pretty(value)?;
        body.push(b'\n');
        std::fs::write(&tmp, body).map_err(|source| SinkError::Io { path: tmp.clone(), source })?;
        Ok((tmp, path))
    }
}

impl ReportSink for DirectorySink {
    // Both documents are staged before either is renamed into place, so a
    // failed write leaves the previous pair untouched.
    fn persist(&self, table: &DailyCountTable, summary: &Summary) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io { path: self.dir.clone(), source })?;
        let counts = self.stage(DAILY_COUNTS_FILE, table)?;
        let report = match self.stage(SUMMARY_FILE, summary) {
            Ok(staged) => staged,
            Err(e) => {
                let _ = std::fs::remove_file(&counts.0);
                return Err(e);
            }
        };
        for (tmp, path) in [counts, report] {
            std::fs::rename(&tmp, &path).map_err(|source| SinkError::Io { path, source })?;
        }
        info!(dir = %self.dir.display(), days = table.len(), "report written");
        Ok(())
    }
}

/// Load a persisted `daily_counts.json`, rejecting tables whose `TOTAL`
/// entries disagree with their categories.
pub fn read_daily_counts(path: &Path) -> Result<DailyCountTable, SinkError> {
    let text = std::fs::read_to_string(path).map_err(|source| SinkError::Io { path: path.to_path_buf(), source })?;
    let table: DailyCountTable =
        serde_json::from_str(&text).map_err(|source| SinkError::Parse { path: path.to_path_buf(), source })?;
    if let Some(date) = table.check_totals() {
        return Err(SinkError::Inconsistent { path: path.to_path_buf(), date: date.to_string() });
    }
    info!(path = %path.display(), days = table.len(), "loaded daily counts");
    Ok(table)
}

/// Keeps the serialized documents in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub daily_counts: RefCell<Option<serde_json::Value>>,
    pub summary: RefCell<Option<serde_json::Value>>,
}

impl ReportSink for MemorySink {
    fn persist(&self, table: &DailyCountTable, summary: &Summary) -> Result<(), SinkError> {
        *self.daily_counts.borrow_mut() = Some(serde_json::to_value(table)?);
        *self.summary.borrow_mut() = Some(serde_json::to_value(summary)?);
        Ok(())
    }
}

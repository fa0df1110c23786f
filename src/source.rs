use chrono::{Days, NaiveDate};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::parser::{self, ParseError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("expected a JSON array of records, got {0}")]
    UnexpectedBody(&'static str),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Produces the raw records for one run. Failures must surface as errors,
/// never as an empty or truncated success.
pub trait RecordSource {
    fn fetch(&self, since: NaiveDate) -> Result<Vec<Value>, SourceError>;
}

/// First day of history to request, `days_back` days before `today`.
pub fn since_date(today: NaiveDate, days_back: u32) -> NaiveDate {
    today.checked_sub_days(Days::new(days_back.into())).unwrap_or(NaiveDate::MIN)
}

/// Socrata (SODA) JSON endpoint, paged with `$limit`/`$offset`.
#[derive(Debug, Clone)]
pub struct SocrataSource {
    config: SourceConfig,
    date_field: String,
}

impl SocrataSource {
    pub fn new(config: SourceConfig, date_field: impl Into<String>) -> Self {
        Self { config, date_field: date_field.into() }
    }

    fn where_clause(&self, since: NaiveDate) -> String {
        format!("{} >= '{}T00:00:00'", self.date_field, since.format("%Y-%m-%d"))
    }
}

impl RecordSource for SocrataSource {
    fn fetch(&self, since: NaiveDate) -> Result<Vec<Value>, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .gzip(true)
            .build()?;
        let where_clause = self.where_clause(since);
        // :id keeps paging stable when many rows share a date
        let order = format!("{} ASC, :id", self.date_field);
        let limit = self.config.page_size.to_string();
        info!(endpoint = %self.config.endpoint, %since, "fetching incidents");

        let mut records = Vec::new();
        loop {
            let offset = records.len().to_string();
            let resp = client
                .get(&self.config.endpoint)
                .query(&[
                    ("$where", where_clause.as_str()),
                    ("$order", order.as_str()),
                    ("$limit", limit.as_str()),
                    ("$offset", offset.as_str()),
                ])
                .send()?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().unwrap_or_default();
                return Err(SourceError::Status { status: status.as_u16(), body });
            }
            let page = match resp.json::<Value>()? {
                Value::Array(items) => items,
                other => return Err(SourceError::UnexpectedBody(json_kind(&other))),
            };
            let n = page.len();
            debug!(offset = %offset, rows = n, "page received");
            records.extend(page);
            if n < self.config.page_size { break; }
        }
        info!(fetched = records.len(), "fetch complete");
        Ok(records)
    }
}

/// A local JSON or JSON-lines export. Records are taken as-is; `since` is
/// not applied because the export already fixes its own range.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl RecordSource for FileSource {
    fn fetch(&self, _since: NaiveDate) -> Result<Vec<Value>, SourceError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|source| SourceError::Io { path: self.path.clone(), source })?;
        let records = parser::parse_records(&text)?;
        info!(path = %self.path.display(), fetched = records.len(), "loaded incidents from file");
        Ok(records)
    }
}

/// In-memory records, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource(pub Vec<Value>);

impl RecordSource for MemorySource {
    fn fetch(&self, _since: NaiveDate) -> Result<Vec<Value>, SourceError> {
        Ok(self.0.clone())
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Run configuration.
//!
//! Every field has a default, so an empty (or absent) TOML file yields the
//! stock SFPD setup. CLI flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::anomaly::{
    DetectOpts, DEFAULT_BASELINE_DAYS, DEFAULT_MIN_HISTORY_DAYS, DEFAULT_RECENT_DAYS, DEFAULT_THRESHOLD_SIGMA,
};
use crate::baseline::BaselineWindow;
use crate::category::Category;
use crate::parser::FieldNames;
use crate::summary::DEFAULT_TOP_N;

pub const DEFAULT_DAYS_BACK: u32 = 365;
pub const DEFAULT_ENDPOINT: &str = "https://data.sfgov.org/resource/wg3w-h783.json";
/// Largest `$limit` the SODA endpoint honours per request. A larger page
/// size would make a capped page look like the final one.
pub const MAX_PAGE_SIZE: usize = 50_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadarConfig {
    /// History requested from the source, in days before today.
    pub days_back: u32,
    pub threshold_sigma: f64,
    pub baseline_days: usize,
    pub recent_days: usize,
    /// Detection is skipped below this many distinct dates.
    pub min_history_days: usize,
    pub top_n: usize,
    pub baseline_window: BaselineWindow,
    pub watch_list: Vec<Category>,
    pub fields: FieldNames,
    pub source: SourceConfig,
    pub output_dir: PathBuf,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            threshold_sigma: DEFAULT_THRESHOLD_SIGMA,
            baseline_days: DEFAULT_BASELINE_DAYS,
            recent_days: DEFAULT_RECENT_DAYS,
            min_history_days: DEFAULT_MIN_HISTORY_DAYS,
            top_n: DEFAULT_TOP_N,
            baseline_window: BaselineWindow::default(),
            watch_list: Category::ALL.to_vec(),
            fields: FieldNames::default(),
            source: SourceConfig::default(),
            output_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub endpoint: String,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_ENDPOINT.to_string(), page_size: MAX_PAGE_SIZE, timeout_secs: 60 }
    }
}

impl RadarConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason: reason.into() })
        }
        if !self.threshold_sigma.is_finite() {
            return invalid("threshold_sigma", format!("{} is not a finite number", self.threshold_sigma));
        }
        if self.baseline_days == 0 { return invalid("baseline_days", "must be at least 1"); }
        if self.recent_days == 0 { return invalid("recent_days", "must be at least 1"); }
        if self.top_n == 0 { return invalid("top_n", "must be at least 1"); }
        if self.days_back == 0 { return invalid("days_back", "must be at least 1"); }
        if self.watch_list.is_empty() { return invalid("watch_list", "must name at least one category"); }
        if self.source.page_size == 0 || self.source.page_size > MAX_PAGE_SIZE {
            return invalid("source.page_size", format!("must be between 1 and {MAX_PAGE_SIZE}"));
        }
        if self.fields.date.is_empty() || self.fields.category.is_empty() {
            return invalid("fields", "field names must not be empty");
        }
        Ok(())
    }

    pub fn detect_opts(&self) -> DetectOpts {
        DetectOpts {
            threshold_sigma: self.threshold_sigma,
            min_history_days: self.min_history_days,
            recent_days: self.recent_days,
            baseline_days: self.baseline_days,
            window: self.baseline_window,
            watch_list: self.watch_list.clone(),
        }
    }
}

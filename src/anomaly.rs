use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::baseline::{self, BaselineStats, BaselineWindow};
use crate::category::Category;
use crate::temporal::DailyCountTable;

pub const DEFAULT_THRESHOLD_SIGMA: f64 = 2.0;
pub const DEFAULT_BASELINE_DAYS: usize = 90;
pub const DEFAULT_RECENT_DAYS: usize = 7;
pub const DEFAULT_MIN_HISTORY_DAYS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: String,
    pub category: Category,
    pub count: u64,
    pub baseline_mean: f64,
    pub z_score: f64,
    pub percent_above: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectOpts {
    pub threshold_sigma: f64,
    pub min_history_days: usize,
    pub recent_days: usize,
    pub baseline_days: usize,
    pub window: BaselineWindow,
    pub watch_list: Vec<Category>,
}

impl Default for DetectOpts {
    fn default() -> Self {
        Self {
            threshold_sigma: DEFAULT_THRESHOLD_SIGMA,
            min_history_days: DEFAULT_MIN_HISTORY_DAYS,
            recent_days: DEFAULT_RECENT_DAYS,
            baseline_days: DEFAULT_BASELINE_DAYS,
            window: BaselineWindow::default(),
            watch_list: Category::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectionStatus {
    Checked,
    InsufficientHistory { days: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub status: DetectionStatus,
    pub anomalies: Vec<Anomaly>,
}

/// Scan the last week of the table for watch-list categories whose count
/// exceeds the 90-day baseline by more than `threshold_sigma` deviations.
/// Returns nothing when the table spans fewer than 100 dates.
pub fn detect(table: &DailyCountTable, threshold_sigma: f64) -> Vec<Anomaly> {
    let opts = DetectOpts { threshold_sigma, ..Default::default() };
    detect_with(table, &opts).anomalies
}

pub fn detect_with(table: &DailyCountTable, opts: &DetectOpts) -> Detection {
    let dates = table.sorted_dates();
    if dates.len() < opts.min_history_days {
        debug!(days = dates.len(), required = opts.min_history_days, "not enough history for anomaly detection");
        return Detection {
            status: DetectionStatus::InsufficientHistory { days: dates.len(), required: opts.min_history_days },
            anomalies: Vec::new(),
        };
    }

    let recent = &dates[dates.len().saturating_sub(opts.recent_days)..];
    let mut anomalies = Vec::new();
    for date in recent {
        for &category in &opts.watch_list {
            let count = table.count(date, category.as_str());
            if count == 0 { continue; }
            let stats = baseline::estimate_for(table, category.as_str(), opts.baseline_days, date, opts.window);
            if let Some(a) = score(date, category, count, stats, opts.threshold_sigma) {
                debug!(date = %a.date, category = %a.category, z = a.z_score, "surge");
                anomalies.push(a);
            }
        }
    }
    // stable: equal scores keep chronological / declared-category order
    anomalies.sort_by(|a, b| b.z_score.total_cmp(&a.z_score));
    info!(scanned_days = recent.len(), found = anomalies.len(), "anomaly scan complete");
    Detection { status: DetectionStatus::Checked, anomalies }
}

fn score(date: &str, category: Category, count: u64, stats: BaselineStats, threshold: f64) -> Option<Anomaly> {
    if stats.stdev == 0.0 || !stats.stdev.is_finite() { return None; }
    let excess = count as f64 - stats.mean;
    let z = excess / stats.stdev;
    if !(z > threshold) { return None; }
    let percent = excess / stats.mean * 100.0;
    // A zero mean has no meaningful ratio; drop the pair rather than report inf.
    if stats.mean == 0.0 || !percent.is_finite() { return None; }
    Some(Anomaly {
        date: date.to_string(),
        category,
        count,
        baseline_mean: round_to(stats.mean, 1),
        z_score: round_to(z, 2),
        percent_above: round_to(percent, 1),
    })
}

// Decimal rounding of the exact binary value: 2.675 is stored as
// 2.67499.. and so rounds to 2.67. Scaling by 10^places first would not.
pub(crate) fn round_to(x: f64, places: usize) -> f64 {
    format!("{x:.places$}").parse().unwrap_or(x)
}

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::category::TOTAL_KEY;
use crate::temporal::{DailyCountTable, DayCounts};

pub const DEFAULT_TOP_N: usize = 10;
const UNKNOWN_DATE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    #[serde(rename = "SURGE DETECTED")]
    SurgeDetected,
    #[serde(rename = "NORMAL")]
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub start: Option<String>,
    pub end: String,
    pub total_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestDay {
    pub date: String,
    pub total_incidents: u64,
    pub by_category: DayCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub last_updated: String,
    pub data_range: DataRange,
    pub latest_day: LatestDay,
    pub current_anomalies: Vec<Anomaly>,
    pub alert_status: AlertStatus,
}

/// Assemble the report document. `anomalies` must already be ranked; only
/// the first `top_n` are kept, while the alert reflects the full list.
pub fn build_summary(
    table: &DailyCountTable,
    anomalies: &[Anomaly],
    top_n: usize,
    generated_at: DateTime<Utc>,
) -> Summary {
    let latest = table.last_date().unwrap_or(UNKNOWN_DATE);
    let by_category = table.day(latest).cloned().unwrap_or_default();
    let total_incidents = by_category.get(TOTAL_KEY).copied().unwrap_or(0);

    Summary {
        last_updated: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        data_range: DataRange {
            start: table.first_date().map(str::to_string),
            end: latest.to_string(),
            total_days: table.len(),
        },
        latest_day: LatestDay { date: latest.to_string(), total_incidents, by_category },
        current_anomalies: anomalies.iter().take(top_n).cloned().collect(),
        alert_status: if anomalies.is_empty() { AlertStatus::Normal } else { AlertStatus::SurgeDetected },
    }
}

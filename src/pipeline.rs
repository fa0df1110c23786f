use chrono::{DateTime, Utc};
use itertools::Itertools;
use tracing::{info, warn};

use crate::anomaly::{self, Detection, DetectionStatus};
use crate::config::RadarConfig;
use crate::error::Result;
use crate::sink::ReportSink;
use crate::source::{self, RecordSource};
use crate::summary::{self, Summary};
use crate::temporal::{AggregateStats, DailyCountTable};

const DIGEST_SURGES: usize = 5;

#[derive(Debug, Clone)]
pub struct Report {
    pub table: DailyCountTable,
    pub stats: AggregateStats,
    pub detection: Detection,
    pub summary: Summary,
}

impl Report {
    /// Console digest: run totals plus the strongest surges.
    pub fn digest(&self) -> String {
        let mut out = format!(
            "  - Total days: {}\n  - Latest date: {}\n  - Anomalies detected: {}\n",
            self.summary.data_range.total_days,
            self.summary.data_range.end,
            self.detection.anomalies.len(),
        );
        if let DetectionStatus::InsufficientHistory { days, required } = self.detection.status {
            out.push_str(&format!("  - Detection skipped: {days} of {required} days of history\n"));
        }
        if !self.detection.anomalies.is_empty() {
            let surges = self
                .detection
                .anomalies
                .iter()
                .take(DIGEST_SURGES)
                .map(|a| {
                    format!(
                        "  {}: {}\n    {} incidents ({:.1}% above baseline, {:.2}\u{3c3})",
                        a.date, a.category, a.count, a.percent_above, a.z_score
                    )
                })
                .join("\n");
            out.push_str("\nRECENT SURGES:\n");
            out.push_str(&surges);
            out.push('\n');
        }
        out
    }
}

/// Detection and summary over an already-built table. No I/O.
pub fn analyze(table: DailyCountTable, stats: AggregateStats, config: &RadarConfig, now: DateTime<Utc>) -> Report {
    let detection = anomaly::detect_with(&table, &config.detect_opts());
    if let DetectionStatus::InsufficientHistory { days, required } = detection.status {
        warn!(days, required, "not enough data for anomaly detection");
    }
    let summary = summary::build_summary(&table, &detection.anomalies, config.top_n, now);
    Report { table, stats, detection, summary }
}

/// One full pass: fetch, aggregate, detect, summarize, persist.
pub fn run(
    source: &dyn RecordSource,
    sink: &dyn ReportSink,
    config: &RadarConfig,
    now: DateTime<Utc>,
) -> Result<Report> {
    config.validate()?;
    let since = source::since_date(now.date_naive(), config.days_back);
    let records = source.fetch(since)?;

    let (table, stats) = DailyCountTable::aggregate(&records, &config.fields);
    info!(seen = stats.seen, kept = stats.kept, dropped = stats.dropped, days = table.len(), "aggregated");
    drop(records);

    let report = analyze(table, stats, config, now);
    sink.persist(&report.table, &report.summary)?;
    info!(status = ?report.summary.alert_status, "run complete");
    Ok(report)
}

/// Re-detect over a previously persisted table without touching the source.
pub fn rerun(
    table: DailyCountTable,
    sink: &dyn ReportSink,
    config: &RadarConfig,
    now: DateTime<Utc>,
) -> Result<Report> {
    config.validate()?;
    let incidents = table.incident_total() as usize;
    let stats = AggregateStats { seen: incidents, kept: incidents, dropped: 0 };
    let report = analyze(table, stats, config, now);
    sink.persist(&report.table, &report.summary)?;
    info!(status = ?report.summary.alert_status, "rerun complete");
    Ok(report)
}

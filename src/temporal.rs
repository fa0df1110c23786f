use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::category::TOTAL_KEY;
use crate::parser::{self, FieldNames};

pub type DayCounts = BTreeMap<String, u64>;

/// Per-day, per-category incident counts keyed by `YYYY-MM-DD`.
///
/// Every day also carries a `TOTAL` entry equal to the sum of its other
/// categories. Built once per run and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyCountTable {
    days: BTreeMap<String, DayCounts>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub seen: usize,
    pub kept: usize,
    pub dropped: usize,
}

impl DailyCountTable {
    pub fn new() -> Self { Self::default() }

    /// Normalize and count a batch of raw records. Input order is irrelevant.
    pub fn aggregate<'a, I>(records: I, fields: &FieldNames) -> (Self, AggregateStats)
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut table = Self::new();
        let mut stats = AggregateStats::default();
        for rec in records {
            stats.seen += 1;
            match parser::normalize(rec, fields) {
                Some(n) => {
                    table.record(&n.date, &n.category);
                    stats.kept += 1;
                }
                None => stats.dropped += 1,
            }
        }
        (table, stats)
    }

    /// Build a table from explicit per-day category counts; `TOTAL` is derived.
    pub fn from_days<I, D, C, K>(days: I) -> Self
    where
        I: IntoIterator<Item = (D, C)>,
        D: Into<String>,
        C: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let mut table = Self::new();
        for (date, counts) in days {
            let day = table.days.entry(date.into()).or_default();
            day.entry(TOTAL_KEY.to_string()).or_insert(0);
            for (cat, n) in counts {
                let cat = cat.into();
                if cat == TOTAL_KEY { continue; }
                *day.entry(cat).or_insert(0) += n;
                *day.entry(TOTAL_KEY.to_string()).or_insert(0) += n;
            }
        }
        table
    }

    pub fn record(&mut self, date: &str, category: &str) {
        let day = self.days.entry(date.to_string()).or_default();
        *day.entry(category.to_string()).or_insert(0) += 1;
        *day.entry(TOTAL_KEY.to_string()).or_insert(0) += 1;
    }

    /// Dates in chronological order (lexicographic on `YYYY-MM-DD`).
    pub fn sorted_dates(&self) -> Vec<&str> {
        self.days.keys().map(String::as_str).collect()
    }

    pub fn day(&self, date: &str) -> Option<&DayCounts> { self.days.get(date) }

    pub fn count(&self, date: &str, category: &str) -> u64 {
        self.days.get(date).and_then(|d| d.get(category)).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize { self.days.len() }

    pub fn is_empty(&self) -> bool { self.days.is_empty() }

    pub fn first_date(&self) -> Option<&str> { self.days.keys().next().map(String::as_str) }

    pub fn last_date(&self) -> Option<&str> { self.days.keys().next_back().map(String::as_str) }

    /// Sum of `TOTAL` over every day.
    pub fn incident_total(&self) -> u64 {
        self.days.values().filter_map(|d| d.get(TOTAL_KEY)).sum()
    }

    /// First date whose `TOTAL` differs from the sum of its categories, if any.
    /// Checked by [`crate::sink::read_daily_counts`] when a table is loaded from disk.
    pub fn check_totals(&self) -> Option<&str> {
        self.days.iter().find_map(|(date, day)| {
            let sum: u64 = day.iter().filter(|(k, _)| k.as_str() != TOTAL_KEY).map(|(_, v)| *v).sum();
            let total = day.get(TOTAL_KEY).copied().unwrap_or(0);
            (sum != total).then_some(date.as_str())
        })
    }
}

use serde::{Deserialize, Serialize};

use crate::temporal::DailyCountTable;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BaselineStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Which days feed the baseline of a day under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineWindow {
    /// Trailing window ending at the table's most recent date, so recent
    /// days under test are part of their own baseline.
    #[default]
    IncludeTested,
    /// Trailing window of the dates strictly before the day under test.
    ExcludeTested,
}

/// Mean and sample standard deviation of `category` over the trailing
/// `window_days` dates of the table. Days without the category count as 0.
pub fn estimate(table: &DailyCountTable, category: &str, window_days: usize) -> BaselineStats {
    let dates = table.sorted_dates();
    let start = dates.len().saturating_sub(window_days);
    stats_over(table, category, &dates[start..])
}

/// Like [`estimate`], but the window ends on the day before `date`.
pub fn estimate_before(table: &DailyCountTable, category: &str, window_days: usize, date: &str) -> BaselineStats {
    let dates = table.sorted_dates();
    let end = dates.partition_point(|d| *d < date);
    let start = end.saturating_sub(window_days);
    stats_over(table, category, &dates[start..end])
}

pub fn estimate_for(
    table: &DailyCountTable,
    category: &str,
    window_days: usize,
    date: &str,
    mode: BaselineWindow,
) -> BaselineStats {
    match mode {
        BaselineWindow::IncludeTested => estimate(table, category, window_days),
        BaselineWindow::ExcludeTested => estimate_before(table, category, window_days, date),
    }
}

fn stats_over(table: &DailyCountTable, category: &str, dates: &[&str]) -> BaselineStats {
    let counts: Vec<f64> = dates.iter().map(|d| table.count(d, category) as f64).collect();
    BaselineStats { mean: mean(&counts), stdev: sample_stdev(&counts) }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() { return 0.0; }
    xs.iter().sum::<f64>() / xs.len() as f64
}

// Bessel-corrected; fewer than two samples has no spread.
fn sample_stdev(xs: &[f64]) -> f64 {
    if xs.len() < 2 { return 0.0; }
    let m = mean(xs);
    let ss: f64 = xs.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (xs.len() - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stdev_uses_n_minus_one() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // population stdev is 2.0; sample stdev is sqrt(32/7)
        assert!((sample_stdev(&xs) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_have_zero_spread() {
        assert_eq!(sample_stdev(&[]), 0.0);
        assert_eq!(sample_stdev(&[3.0]), 0.0);
        assert_eq!(mean(&[]), 0.0);
    }
}

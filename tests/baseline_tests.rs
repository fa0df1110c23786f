use chrono::{Days, NaiveDate};
use crackdown_radar::baseline::{estimate, estimate_before, estimate_for, BaselineWindow};
use crackdown_radar::temporal::DailyCountTable;

fn day(i: usize) -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (start + Days::new(i as u64)).format("%Y-%m-%d").to_string()
}

fn warrant_series(counts: &[u64]) -> DailyCountTable {
    DailyCountTable::from_days(counts.iter().enumerate().map(|(i, &c)| (day(i), vec![("Warrant", c), ("Other", 1)])))
}

#[test]
fn empty_table_yields_zero_stats() {
    let b = estimate(&DailyCountTable::new(), "Warrant", 90);
    assert_eq!((b.mean, b.stdev), (0.0, 0.0));
}

#[test]
fn window_larger_than_history_uses_everything() {
    let table = warrant_series(&[1, 2, 3, 4]);
    let b = estimate(&table, "Warrant", 90);
    assert!((b.mean - 2.5).abs() < 1e-12);
    // sample variance of 1..=4 is 5/3
    assert!((b.stdev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
}

#[test]
fn only_trailing_window_is_used() {
    let table = warrant_series(&[100, 100, 1, 3]);
    let b = estimate(&table, "Warrant", 2);
    assert!((b.mean - 2.0).abs() < 1e-12);
    assert!((b.stdev - 2f64.sqrt()).abs() < 1e-12);
}

#[test]
fn constant_counts_have_zero_stdev() {
    let table = warrant_series(&[4; 30]);
    let b = estimate(&table, "Warrant", 90);
    assert_eq!(b.mean, 4.0);
    assert_eq!(b.stdev, 0.0);
}

#[test]
fn single_day_has_zero_stdev() {
    let table = warrant_series(&[7]);
    let b = estimate(&table, "Warrant", 90);
    assert_eq!((b.mean, b.stdev), (7.0, 0.0));
}

#[test]
fn absent_category_days_count_as_zero() {
    let table = DailyCountTable::from_days([
        (day(0), vec![("Warrant", 4u64)]),
        (day(1), vec![("Assault", 1)]),
    ]);
    let b = estimate(&table, "Warrant", 90);
    assert_eq!(b.mean, 2.0);
    assert!((b.stdev - 8f64.sqrt()).abs() < 1e-12);
    assert_eq!(estimate(&table, "Robbery", 90).mean, 0.0);
}

#[test]
fn excluding_window_ends_before_tested_day() {
    let table = warrant_series(&[2, 2, 2, 2, 20]);
    let last = day(4);
    let before = estimate_before(&table, "Warrant", 90, &last);
    assert_eq!((before.mean, before.stdev), (2.0, 0.0));

    let including = estimate_for(&table, "Warrant", 90, &last, BaselineWindow::IncludeTested);
    assert!(including.stdev > 0.0);
    assert_eq!(including, estimate(&table, "Warrant", 90));
}

#[test]
fn excluding_window_is_bounded_by_window_size() {
    let table = warrant_series(&[50, 1, 3, 9]);
    let b = estimate_before(&table, "Warrant", 2, &day(3));
    assert_eq!(b.mean, 2.0);
}

#[test]
fn excluding_window_on_first_day_is_empty() {
    let table = warrant_series(&[5, 6]);
    let b = estimate_before(&table, "Warrant", 90, &day(0));
    assert_eq!((b.mean, b.stdev), (0.0, 0.0));
}

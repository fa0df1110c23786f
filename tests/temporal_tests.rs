use crackdown_radar::parser::FieldNames;
use crackdown_radar::temporal::DailyCountTable;
use proptest::prelude::*;
use serde_json::{json, Value};

fn rec(date: &str, category: Option<&str>) -> Value {
    match category {
        Some(c) => json!({"incident_date": date, "incident_category": c, "incident_id": 1}),
        None => json!({"incident_date": date}),
    }
}

#[test]
fn counts_per_day_and_category_with_total() {
    let records = vec![
        rec("2024-01-01T08:00:00", Some("Assault")),
        rec("2024-01-01T09:00:00", Some("Assault")),
        rec("2024-01-01T10:00:00", Some("Warrant")),
        rec("2024-01-02T10:00:00", None),
    ];
    let (table, stats) = DailyCountTable::aggregate(&records, &FieldNames::default());
    assert_eq!(table.len(), 2);
    assert_eq!(table.count("2024-01-01", "Assault"), 2);
    assert_eq!(table.count("2024-01-01", "Warrant"), 1);
    assert_eq!(table.count("2024-01-01", "TOTAL"), 3);
    assert_eq!(table.count("2024-01-02", "Unknown"), 1);
    assert_eq!(table.count("2024-01-02", "TOTAL"), 1);
    assert_eq!(table.count("2024-01-02", "Assault"), 0);
    assert_eq!(stats.kept, 4);
    assert_eq!(stats.dropped, 0);
}

#[test]
fn incomplete_records_contribute_nothing() {
    let records = vec![
        json!({"incident_category": "Assault"}),
        json!({"incident_date": "", "incident_category": "Assault"}),
        rec("2024-01-01", Some("Burglary")),
    ];
    let (table, stats) = DailyCountTable::aggregate(&records, &FieldNames::default());
    assert_eq!(table.sorted_dates(), vec!["2024-01-01"]);
    assert_eq!(table.count("2024-01-01", "Assault"), 0);
    assert_eq!(table.count("2024-01-01", "TOTAL"), 1);
    assert_eq!((stats.seen, stats.kept, stats.dropped), (3, 1, 2));
}

#[test]
fn dates_sort_chronologically() {
    let records = vec![rec("2024-02-01", Some("A")), rec("2023-12-31", Some("A")), rec("2024-01-15", Some("A"))];
    let (table, _) = DailyCountTable::aggregate(&records, &FieldNames::default());
    assert_eq!(table.sorted_dates(), vec!["2023-12-31", "2024-01-15", "2024-02-01"]);
    assert_eq!(table.first_date(), Some("2023-12-31"));
    assert_eq!(table.last_date(), Some("2024-02-01"));
}

#[test]
fn serializes_as_plain_nested_mapping() {
    let table = DailyCountTable::from_days([("2024-01-01", vec![("Assault", 2u64), ("Warrant", 1)])]);
    let v = serde_json::to_value(&table).unwrap();
    assert_eq!(v, json!({"2024-01-01": {"Assault": 2, "TOTAL": 3, "Warrant": 1}}));
    let back: DailyCountTable = serde_json::from_value(v).unwrap();
    assert_eq!(back, table);
}

#[test]
fn check_totals_flags_inconsistent_loaded_table() {
    let v = json!({"2024-01-01": {"Assault": 2, "TOTAL": 2}, "2024-01-02": {"Assault": 2, "TOTAL": 5}});
    let table: DailyCountTable = serde_json::from_value(v).unwrap();
    assert_eq!(table.check_totals(), Some("2024-01-02"));
}

const CATS: [&str; 4] = ["Assault", "Warrant", "Robbery", "Larceny Theft"];

fn records_from(draws: &[(u8, Option<usize>)]) -> Vec<Value> {
    draws.iter()
        .map(|(day, cat)| rec(&format!("2024-01-{:02}T12:00:00", day + 1), cat.map(|i| CATS[i])))
        .collect()
}

proptest! {
    #[test]
    fn aggregation_is_order_independent(
        draws in prop::collection::vec((0u8..6, prop::option::of(0usize..4)), 0..60),
        rotate in 0usize..60,
    ) {
        let fields = FieldNames::default();
        let forward = records_from(&draws);
        let mut shuffled = forward.clone();
        shuffled.reverse();
        if !shuffled.is_empty() {
            let k = rotate % shuffled.len();
            shuffled.rotate_left(k);
        }
        let (a, _) = DailyCountTable::aggregate(&forward, &fields);
        let (b, _) = DailyCountTable::aggregate(&shuffled, &fields);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn total_equals_sum_of_categories(
        draws in prop::collection::vec((0u8..6, prop::option::of(0usize..4)), 0..60),
    ) {
        let (table, stats) = DailyCountTable::aggregate(&records_from(&draws), &FieldNames::default());
        prop_assert_eq!(table.check_totals(), None);
        let total: u64 = table.sorted_dates().iter().map(|d| table.count(d, "TOTAL")).sum();
        prop_assert_eq!(total as usize, stats.kept);
    }
}

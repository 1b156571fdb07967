use chrono::{Days, NaiveDate};
use coursetrack::dates::{Bucket, classify, priority_for};
use coursetrack::models::Priority;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_same_day_is_due_today_and_high() {
    for d in [date(2025, 11, 1), date(2024, 2, 29), date(2025, 12, 31)] {
        let c = classify(Some(d), d);
        assert_eq!(c.bucket, Bucket::DueToday);
        assert_eq!(c.priority, Priority::High);
    }
}

#[test]
fn test_window_boundary_is_inclusive() {
    let now = date(2025, 11, 1);

    let c = classify(Some(date(2025, 11, 8)), now);
    assert_eq!(c.bucket, Bucket::WithinWindow);
    assert_eq!(c.priority, Priority::Medium);

    let c = classify(Some(date(2025, 11, 2)), now);
    assert_eq!(c.bucket, Bucket::WithinWindow);

    let c = classify(Some(date(2025, 11, 9)), now);
    assert_eq!(c.bucket, Bucket::Future);
    assert_eq!(c.priority, Priority::Low);
}

#[test]
fn test_past_dates_are_overdue_and_low() {
    let now = date(2025, 11, 1);
    let c = classify(Some(date(2025, 10, 31)), now);
    assert_eq!(c.bucket, Bucket::Overdue);
    assert_eq!(c.priority, Priority::Low);

    let c = classify(Some(date(2020, 1, 1)), now);
    assert_eq!(c.bucket, Bucket::Overdue);
}

#[test]
fn test_missing_date_is_no_date_and_low() {
    let c = classify(None, date(2025, 11, 1));
    assert_eq!(c.bucket, Bucket::NoDate);
    assert_eq!(c.priority, Priority::Low);
}

#[test]
fn test_window_crosses_month_and_year_ends() {
    let now = date(2025, 12, 28);
    assert_eq!(classify(Some(date(2026, 1, 4)), now).bucket, Bucket::WithinWindow);
    assert_eq!(classify(Some(date(2026, 1, 5)), now).bucket, Bucket::Future);
}

#[test]
fn test_priority_for_matches_classify() {
    let now = date(2025, 11, 1);
    for offset in 0..12u64 {
        let d = now.checked_add_days(Days::new(offset)).unwrap();
        assert_eq!(priority_for(Some(d), now), classify(Some(d), now).priority);
    }
}

#[test]
fn test_bucket_serializes_camel_case() {
    assert_eq!(serde_json::to_string(&Bucket::WithinWindow).unwrap(), "\"withinWindow\"");
    assert_eq!(serde_json::to_string(&Bucket::NoDate).unwrap(), "\"noDate\"");
    assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
}

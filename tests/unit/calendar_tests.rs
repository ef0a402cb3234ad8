/// Day keys and target-day enumeration
use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use habit_streaks::calendar::*;
use habit_streaks::DomainError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_day_key_uses_utc_day() {
    let late = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    assert_eq!(day_key(late), "2024-02-29");
    assert_eq!(parse_day_key("2024-02-29").unwrap(), date(2024, 2, 29));
}

#[test]
fn test_parse_day_key_rejects_garbage() {
    assert!(matches!(parse_day_key("2024-13-01"), Err(DomainError::InvalidDate(_))));
    assert!(matches!(parse_day_key("yesterday"), Err(DomainError::InvalidDate(_))));
}

#[test]
fn test_fixed_calendar_today() {
    let calendar = Calendar::fixed(Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap());
    assert_eq!(calendar.today(), date(2024, 1, 7));
    assert_eq!(calendar.today_key(), "2024-01-07");
    assert_eq!(previous_day(calendar.today()), date(2024, 1, 6));
}

#[test]
fn test_days_between_crosses_month_end() {
    assert_eq!(days_between(date(2024, 1, 30), date(2024, 2, 2)), 3);
    assert_eq!(days_between(date(2024, 2, 2), date(2024, 1, 30)), -3);
}

#[test]
fn test_trailing_days_oldest_first() {
    let days = trailing_days(date(2024, 3, 2), 3);
    assert_eq!(days, vec![date(2024, 2, 29), date(2024, 3, 1), date(2024, 3, 2)]);
    assert!(trailing_days(date(2024, 3, 2), 0).is_empty());
}

#[test]
fn test_enumerate_weekend_days() {
    let days = enumerate_target_days(date(2024, 1, 1), date(2024, 1, 14), &[Weekday::Sat, Weekday::Sun]);
    assert_eq!(
        days,
        vec![date(2024, 1, 6), date(2024, 1, 7), date(2024, 1, 13), date(2024, 1, 14)]
    );
    assert!(enumerate_target_days(date(2024, 1, 14), date(2024, 1, 1), &[Weekday::Sat]).is_empty());
}

#[test]
fn test_weekday_indices_are_sunday_based() {
    assert_eq!(weekday_from_index(0).unwrap(), Weekday::Sun);
    assert_eq!(weekday_index(Weekday::Sat), 6);
    assert_eq!(weekday_from_index(7), Err(DomainError::InvalidWeekday(7)));
}

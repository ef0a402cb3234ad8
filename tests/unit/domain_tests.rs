/// Habit validation, frequencies and streak rendering
use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use habit_streaks::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn created() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
}

#[test]
fn test_habit_creation() {
    let habit = Habit::new(
        "  Morning Run ".to_string(),
        Some("Before breakfast".to_string()),
        Category::Sport,
        Frequency::Daily,
        created(),
    )
    .unwrap();

    assert_eq!(habit.name, "Morning Run");
    assert!(habit.is_active);
    assert_eq!(habit.created_day(), date(2024, 1, 1));
    assert_eq!(habit.completion_percentage, None);
}

#[test]
fn test_habit_name_is_required() {
    let result = Habit::new("   ".to_string(), None, Category::Other, Frequency::Daily, created());
    assert!(matches!(result, Err(DomainError::InvalidHabitName(_))));
}

#[test]
fn test_due_predicate_respects_creation_and_target_days() {
    let habit = Habit::new(
        "Gym".to_string(),
        None,
        Category::Health,
        Frequency::weekly(&[1, 3]).unwrap(),
        created(),
    )
    .unwrap();

    assert!(habit.is_due_on(date(2024, 1, 1)));
    assert!(!habit.is_due_on(date(2024, 1, 2)));
    assert!(habit.is_due_on(date(2024, 1, 3)));
    assert!(!habit.is_due_on(date(2023, 12, 27)));
}

#[test]
fn test_weekly_frequency_shape() {
    let frequency = Frequency::weekly(&[3, 1]).unwrap();
    assert_eq!(frequency, Frequency::Weekly { target_days: vec![Weekday::Mon, Weekday::Wed] });
    assert_eq!(frequency.target_day_indices(), vec![1, 3]);
    assert_eq!(frequency.label(), "weekly");
    assert!(Frequency::weekly(&[9]).is_err());
}

#[test]
fn test_entry_rejects_future_day() {
    let today = date(2024, 1, 7);
    assert!(HabitEntry::validate_not_future(today, today).is_ok());
    assert!(matches!(
        HabitEntry::validate_not_future(date(2024, 1, 8), today),
        Err(DomainError::InvalidDate(_))
    ));
}

#[test]
fn test_compute_streak_ignores_other_habits() {
    let habit = Habit::new("Read".to_string(), None, Category::Study, Frequency::Daily, created()).unwrap();
    let other = HabitId::new();
    let entries = vec![
        HabitEntry::new(habit.id.clone(), date(2024, 1, 6), true, None, None).unwrap(),
        HabitEntry::new(other.clone(), date(2024, 1, 7), true, None, None).unwrap(),
    ];

    let summary = compute_streak(&habit, &entries, date(2024, 1, 7));
    assert_eq!(summary, StreakSummary { current: 1, longest: 1 });
}

#[test]
fn test_streak_messages() {
    assert_eq!(streak_message(0), "Start your streak!");
    assert_eq!(streak_message(1), "1 day streak");
    assert_eq!(streak_message(5), "5 days streak");
    assert_eq!(streak_message(7), "1 week streak");
    assert_eq!(streak_message(10), "1w 3d streak");
    assert_eq!(streak_message(14), "2 weeks streak");
    assert_eq!(streak_message(60), "2 months streak");
    assert_eq!(streak_message(45), "1m 15d streak");
}

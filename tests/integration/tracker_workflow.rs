/// End-to-end tracker scenarios on the in-memory store
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use habit_streaks::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn tracker_at(now: DateTime<Utc>) -> HabitTracker<MemoryStore> {
    HabitTracker::new(MemoryStore::new(), Calendar::fixed(now), TrackerConfig::default())
}

fn habit(name: &str, frequency: Frequency) -> Habit {
    Habit::new(name.to_string(), None, Category::Other, frequency, at(2024, 1, 1, 8)).unwrap()
}

#[tokio::test]
async fn test_weekly_streak_broken_by_missed_target_day() {
    // Wednesday; target days Jan 1, 3, 8 and 10
    let tracker = tracker_at(at(2024, 1, 10, 18));
    let gym = habit("Gym", Frequency::weekly(&[1, 3]).unwrap());
    tracker.create_habit(&gym).await.unwrap();

    tracker.toggle_completion(&gym.id, date(2024, 1, 1), true, None).await.unwrap();
    let streak = tracker.toggle_completion(&gym.id, date(2024, 1, 3), true, None).await.unwrap();

    assert_eq!(streak.current_streak, 0);
    assert_eq!(streak.longest_streak, 2);
    assert_eq!(streak.last_completed, Some(date(2024, 1, 3)));
}

#[tokio::test]
async fn test_frequency_change_rebuilds_streak() {
    let tracker = tracker_at(at(2024, 1, 3, 20));
    let mut gym = habit("Gym", Frequency::Daily);
    tracker.create_habit(&gym).await.unwrap();

    tracker.toggle_completion(&gym.id, date(2024, 1, 1), true, None).await.unwrap();
    let daily = tracker.toggle_completion(&gym.id, date(2024, 1, 3), true, None).await.unwrap();
    assert_eq!((daily.current_streak, daily.longest_streak), (1, 1));

    gym.update(None, None, None, Some(Frequency::weekly(&[1, 3]).unwrap()), None).unwrap();
    let weekly = tracker.update_habit(&gym).await.unwrap();
    assert_eq!((weekly.current_streak, weekly.longest_streak), (2, 2));
    assert_eq!(tracker.streak(&gym.id).await.unwrap(), Some(weekly));
}

#[tokio::test]
async fn test_update_unknown_habit_fails() {
    let tracker = tracker_at(at(2024, 1, 3, 20));
    let ghost = habit("Ghost", Frequency::Daily);
    let result = tracker.update_habit(&ghost).await;
    assert!(matches!(result, Err(TrackerError::HabitNotFound { .. })));
}

#[tokio::test]
async fn test_dashboard_aggregates() {
    // Sunday: the Mon/Wed habit is not due today
    let tracker = tracker_at(at(2024, 1, 7, 12));
    let read = habit("Read", Frequency::Daily);
    let gym = habit("Gym", Frequency::weekly(&[1, 3]).unwrap());
    let mut paused = habit("Paused", Frequency::Daily);
    paused.is_active = false;

    for h in [&read, &gym, &paused] {
        tracker.create_habit(h).await.unwrap();
    }
    for day in 1..=7 {
        tracker.toggle_completion(&read.id, date(2024, 1, day), true, None).await.unwrap();
    }
    tracker.toggle_completion(&gym.id, date(2024, 1, 1), true, None).await.unwrap();
    tracker.toggle_completion(&gym.id, date(2024, 1, 3), true, None).await.unwrap();

    let dashboard = tracker.dashboard().await.unwrap();
    assert_eq!(dashboard.total_habits, 3);
    assert_eq!(dashboard.active_habits, 1);
    assert_eq!(dashboard.today_target, 1);
    assert_eq!(dashboard.today_completions, 1);
    assert_eq!(dashboard.weekly_progress, 100.0);
    assert_eq!(dashboard.monthly_progress, 100.0);

    let ranking: Vec<(&str, u32)> = dashboard
        .top_streaks
        .iter()
        .map(|top| (top.habit_name.as_str(), top.current_streak))
        .collect();
    assert_eq!(ranking, vec![("Read", 7), ("Gym", 2), ("Paused", 0)]);

    let due: Vec<String> = tracker.habits_due_today().await.unwrap().into_iter().map(|h| h.name).collect();
    assert_eq!(due, vec!["Read".to_string()]);
    assert!(!tracker.is_due_today(&gym));
    assert!(!tracker.is_due_today(&paused));
}

#[tokio::test]
async fn test_completion_percentage_and_history() {
    let tracker = tracker_at(at(2024, 1, 10, 9));
    let read = habit("Read", Frequency::Daily);
    tracker.create_habit(&read).await.unwrap();

    for day in [2, 4, 6, 8, 10] {
        tracker.toggle_completion(&read.id, date(2024, 1, day), true, None).await.unwrap();
    }

    // Ten due days since creation, five done
    assert_eq!(tracker.completion_percentage(&read.id).await.unwrap(), 50);
    assert_eq!(tracker.completion_percentage(&HabitId::new()).await.unwrap(), 0);
    assert_eq!(tracker.completion_percentage_over(&read.id, u32::MAX).await.unwrap(), 50);

    let week = tracker.weekly_completion_data(&read.id).await.unwrap();
    assert_eq!(week, vec![true, false, true, false, true, false, true]);

    assert_eq!(tracker.refresh_completion_percentages().await.unwrap(), 1);
    assert_eq!(tracker.refresh_completion_percentages().await.unwrap(), 0);
    let stored = tracker.store().get_habit(&read.id).await.unwrap().unwrap();
    assert_eq!(stored.completion_percentage, Some(50));
}

#[tokio::test]
async fn test_habit_stats() {
    let tracker = tracker_at(at(2024, 1, 10, 9));
    let read = habit("Read", Frequency::Daily);
    tracker.create_habit(&read).await.unwrap();

    for day in [1, 8, 9, 10] {
        tracker.toggle_completion(&read.id, date(2024, 1, day), true, None).await.unwrap();
    }
    tracker.toggle_completion(&read.id, date(2024, 1, 2), false, None).await.unwrap();

    let stats = tracker.habit_stats(&read.id).await.unwrap().unwrap();
    assert_eq!(stats.total_completions, 4);
    assert_eq!(stats.weekly_completions, 3);
    assert_eq!(stats.monthly_completions, 4);
    assert_eq!(stats.completion_rate, 80.0);
    assert_eq!(stats.average_weekly_completions, 1.0);
    assert_eq!((stats.streak.current_streak, stats.streak.longest_streak), (3, 3));

    assert_eq!(tracker.habit_stats(&HabitId::new()).await.unwrap(), None);
}

#[tokio::test]
async fn test_recompute_all_repairs_stale_cache() {
    let tracker = tracker_at(at(2024, 1, 7, 12));
    let read = habit("Read", Frequency::Daily);
    tracker.create_habit(&read).await.unwrap();

    // Entries written behind the tracker's back leave the cached streak stale
    for day in 5..=7 {
        let entry = HabitEntry::new(read.id.clone(), date(2024, 1, day), true, None, None).unwrap();
        tracker.store().upsert_entry(&entry).await.unwrap();
    }
    assert_eq!(tracker.streak(&read.id).await.unwrap().unwrap().current_streak, 0);

    let first = tracker.recompute_all().await.unwrap();
    let second = tracker.recompute_all().await.unwrap();
    assert_eq!(first, second);
    assert_eq!((first[0].current_streak, first[0].longest_streak), (3, 3));
}

#[tokio::test]
async fn test_delete_habit_removes_history() {
    let tracker = tracker_at(at(2024, 1, 7, 12));
    let read = habit("Read", Frequency::Daily);
    tracker.create_habit(&read).await.unwrap();
    tracker.toggle_completion(&read.id, date(2024, 1, 7), true, Some("done".to_string())).await.unwrap();

    assert!(tracker.delete_habit(&read.id).await.unwrap());
    assert!(!tracker.delete_habit(&read.id).await.unwrap());
    assert_eq!(tracker.streak(&read.id).await.unwrap(), None);
    assert!(tracker.store().list_entries(&read.id).await.unwrap().is_empty());
    assert_eq!(tracker.recompute_streak(&read.id).await.unwrap(), None);
}

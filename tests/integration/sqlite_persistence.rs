/// Tracker behavior against an on-disk SQLite store
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use habit_streaks::*;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 7, 21, 15, 0).unwrap()
}

fn open(dir: &TempDir) -> HabitTracker<SqliteStore> {
    let store = SqliteStore::new(dir.path().join("habits.db")).expect("Failed to open store");
    HabitTracker::new(store, Calendar::fixed(now()), TrackerConfig::default())
}

fn gym() -> Habit {
    Habit::new(
        "Gym".to_string(),
        Some("Upper body".to_string()),
        Category::Sport,
        Frequency::weekly(&[1, 3, 5]).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_streaks_survive_reopen() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let habit = gym();

    {
        let tracker = open(&dir);
        tracker.create_habit(&habit).await.unwrap();
        for day in [1, 3, 5] {
            tracker.toggle_completion(&habit.id, date(2024, 1, day), true, None).await.unwrap();
        }
    }

    let tracker = open(&dir);
    let stored = tracker.store().get_habit(&habit.id).await.unwrap().unwrap();
    assert_eq!(stored, habit);

    let cached = tracker.streak(&habit.id).await.unwrap().unwrap();
    assert_eq!((cached.current_streak, cached.longest_streak), (3, 3));
    assert_eq!(cached.last_completed, Some(date(2024, 1, 5)));

    // Startup repair reproduces the cached record exactly
    let repaired = tracker.recompute_all().await.unwrap();
    assert_eq!(repaired, vec![cached]);
}

#[tokio::test]
async fn test_toggle_overwrites_same_day_entry() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = open(&dir);
    let habit = gym();
    tracker.create_habit(&habit).await.unwrap();

    tracker.toggle_completion(&habit.id, date(2024, 1, 5), true, Some("PR".to_string())).await.unwrap();
    let streak = tracker.toggle_completion(&habit.id, date(2024, 1, 5), false, None).await.unwrap();

    let entries = tracker.store().list_entries(&habit.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].completed);
    assert_eq!(entries[0].notes, None);
    assert_eq!(entries[0].completed_at, Some(now()));
    assert_eq!(streak.last_completed, None);
}

#[tokio::test]
async fn test_delete_cascades_on_disk() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = open(&dir);
    let habit = gym();
    tracker.create_habit(&habit).await.unwrap();
    tracker.toggle_completion(&habit.id, date(2024, 1, 3), true, None).await.unwrap();

    assert!(tracker.delete_habit(&habit.id).await.unwrap());

    let reopened = open(&dir);
    assert!(reopened.store().list_habits().await.unwrap().is_empty());
    assert!(reopened.store().list_entries_for_date(date(2024, 1, 3)).await.unwrap().is_empty());
    assert!(reopened.store().list_streaks().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_all() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = open(&dir);
    tracker.create_habit(&gym()).await.unwrap();

    tracker.store().clear_all().await.unwrap();
    assert!(tracker.store().list_habits().await.unwrap().is_empty());
    assert!(tracker.recompute_all().await.unwrap().is_empty());
}

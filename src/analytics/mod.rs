/// Statistics engine for completion rates and dashboards
///
/// Rolling-window metrics for one habit or across all habits. A day counts
/// toward a window only when `Habit::is_due_on` says so, which is the same
/// rule the weekly streak scan uses, so displayed streaks and percentages
/// never disagree about which days mattered.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Days, NaiveDate, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::calendar::{day_of, days_from, trailing_days, window_start};
use crate::config::TrackerConfig;
use crate::domain::{compute_streak, Habit, HabitEntry, HabitId, HabitStreak};
use crate::storage::{CompletionStore, StorageError};

/// Due and completed-and-due day counts over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCounts {
    pub due: u32,
    pub completed: u32,
}

impl WindowCounts {
    /// Integer percentage, 0 when nothing was due
    pub fn percentage(&self) -> u32 {
        if self.due == 0 {
            return 0;
        }
        (100.0 * self.completed as f64 / self.due as f64).round() as u32
    }
}

impl std::ops::AddAssign for WindowCounts {
    fn add_assign(&mut self, other: Self) {
        self.due += other.due;
        self.completed += other.completed;
    }
}

/// One habit in the dashboard's streak ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopStreak {
    pub habit_id: HabitId,
    pub habit_name: String,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Aggregates across every habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_habits: usize,
    /// Habits that are active and due today
    pub active_habits: usize,
    /// Active, due-today habits already completed today
    pub today_completions: usize,
    pub today_target: usize,
    /// Percentage (0-100, two decimals) over the weekly window
    pub weekly_progress: f64,
    /// Percentage (0-100, two decimals) over the monthly window
    pub monthly_progress: f64,
    pub top_streaks: Vec<TopStreak>,
}

/// Per-habit completion summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStats {
    pub habit_id: HabitId,
    pub total_completions: u32,
    pub weekly_completions: u32,
    pub monthly_completions: u32,
    /// Completed entries as a percentage of stored entries (two decimals)
    pub completion_rate: f64,
    /// Monthly completions spread over four weeks (two decimals)
    pub average_weekly_completions: f64,
    pub streak: HabitStreak,
}

/// One day of a habit's completion history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCompletion {
    pub date: NaiveDate,
    pub completed: bool,
}

/// Round to two decimal places
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Days on which `habit` has a completed entry
pub fn completed_days(habit: &Habit, entries: &[HabitEntry]) -> HashSet<NaiveDate> {
    entries
        .iter()
        .filter(|e| e.habit_id == habit.id && e.completed)
        .map(|e| e.date)
        .collect()
}

/// Count due and completed-and-due days in the `window_days` ending today
pub fn window_counts(
    habit: &Habit,
    completed: &HashSet<NaiveDate>,
    today: NaiveDate,
    window_days: u32,
) -> WindowCounts {
    let mut counts = WindowCounts::default();
    let Some(start) = window_start(today, window_days) else {
        return counts;
    };

    // Nothing before the creation day is due
    for day in days_from(start.max(habit.created_day()), today) {
        if habit.is_due_on(day) {
            counts.due += 1;
            if completed.contains(&day) {
                counts.completed += 1;
            }
        }
    }
    counts
}

/// Rounded percentage of due days completed in the window
pub fn completion_percentage_for(
    habit: &Habit,
    entries: &[HabitEntry],
    today: NaiveDate,
    window_days: u32,
) -> u32 {
    window_counts(habit, &completed_days(habit, entries), today, window_days).percentage()
}

/// Completion flags for the `days` ending today, oldest first
pub fn completion_history_for(
    habit: &Habit,
    entries: &[HabitEntry],
    today: NaiveDate,
    days: u32,
) -> Vec<DayCompletion> {
    let completed = completed_days(habit, entries);
    trailing_days(today, days)
        .into_iter()
        .map(|date| DayCompletion {
            date,
            completed: completed.contains(&date),
        })
        .collect()
}

/// Statistics engine
///
/// Stateless apart from its configuration; every call reads the store and
/// works from the `today`/`now` it is handed.
#[derive(Debug, Clone, Default)]
pub struct StatisticsEngine {
    config: TrackerConfig,
}

impl StatisticsEngine {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Per-habit stats from its entries and cached streak
    pub fn habit_stats_for(
        &self,
        habit: &Habit,
        entries: &[HabitEntry],
        stored_streak: Option<HabitStreak>,
        now: DateTime<Utc>,
    ) -> HabitStats {
        let today = day_of(now);
        let own: Vec<&HabitEntry> = entries.iter().filter(|e| e.habit_id == habit.id).collect();
        let completed_in = |window_days: u32| -> u32 {
            let after = today.checked_sub_days(Days::new(u64::from(window_days)));
            own.iter()
                .filter(|e| e.completed && e.date <= today && after.map_or(true, |a| e.date > a))
                .count() as u32
        };

        let total_entries = own.len();
        let total_completions = own.iter().filter(|e| e.completed).count() as u32;
        let weekly_completions = completed_in(self.config.weekly_window_days);
        let monthly_completions = completed_in(self.config.monthly_window_days);

        let completion_rate = if total_entries > 0 {
            round_to_hundredths(total_completions as f64 / total_entries as f64 * 100.0)
        } else {
            0.0
        };

        HabitStats {
            habit_id: habit.id.clone(),
            total_completions,
            weekly_completions,
            monthly_completions,
            completion_rate,
            average_weekly_completions: round_to_hundredths(monthly_completions as f64 / 4.0),
            streak: stored_streak.unwrap_or_else(|| HabitStreak::empty(habit.id.clone(), now)),
        }
    }

    /// Dashboard from already-loaded data
    ///
    /// `entries_by_habit` must hold each habit's full history; streaks are
    /// derived from it rather than read from the cache.
    pub fn dashboard_for(
        &self,
        habits: &[Habit],
        entries_by_habit: &HashMap<HabitId, Vec<HabitEntry>>,
        today: NaiveDate,
    ) -> Dashboard {
        let no_entries = Vec::new();
        let mut weekly = WindowCounts::default();
        let mut monthly = WindowCounts::default();
        let mut due_today = 0;
        let mut done_today = 0;
        let mut ranking = Vec::with_capacity(habits.len());

        for habit in habits {
            let entries = entries_by_habit.get(&habit.id).unwrap_or(&no_entries);
            let completed = completed_days(habit, entries);

            if habit.is_active {
                weekly += window_counts(habit, &completed, today, self.config.weekly_window_days);
                monthly += window_counts(habit, &completed, today, self.config.monthly_window_days);

                if habit.is_due_on(today) {
                    due_today += 1;
                    if completed.contains(&today) {
                        done_today += 1;
                    }
                }
            }

            let summary = compute_streak(habit, entries, today);
            ranking.push(TopStreak {
                habit_id: habit.id.clone(),
                habit_name: habit.name.clone(),
                current_streak: summary.current,
                longest_streak: summary.longest,
            });
        }

        // Stable: ties keep listing order
        ranking.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));
        ranking.truncate(self.config.top_streaks);

        Dashboard {
            total_habits: habits.len(),
            active_habits: due_today,
            today_completions: done_today,
            today_target: due_today,
            weekly_progress: progress(weekly),
            monthly_progress: progress(monthly),
            top_streaks: ranking,
        }
    }

    /// 0-100 completion percentage of a habit over `window_days`
    ///
    /// An unknown habit reads as 0.
    pub async fn completion_percentage<S: CompletionStore + ?Sized>(
        &self,
        store: &S,
        habit_id: &HabitId,
        window_days: u32,
        today: NaiveDate,
    ) -> Result<u32, StorageError> {
        let Some(habit) = store.get_habit(habit_id).await? else {
            return Ok(0);
        };
        let entries = store.list_entries(habit_id).await?;
        Ok(completion_percentage_for(&habit, &entries, today, window_days))
    }

    pub async fn habit_stats<S: CompletionStore + ?Sized>(
        &self,
        store: &S,
        habit_id: &HabitId,
        now: DateTime<Utc>,
    ) -> Result<Option<HabitStats>, StorageError> {
        let Some(habit) = store.get_habit(habit_id).await? else {
            return Ok(None);
        };
        let entries = store.list_entries(habit_id).await?;
        let streak = store.get_streak(habit_id).await?;
        Ok(Some(self.habit_stats_for(&habit, &entries, streak, now)))
    }

    /// Completion flags for the last `days`, empty for an unknown habit
    pub async fn completion_history<S: CompletionStore + ?Sized>(
        &self,
        store: &S,
        habit_id: &HabitId,
        days: u32,
        today: NaiveDate,
    ) -> Result<Vec<DayCompletion>, StorageError> {
        let Some(habit) = store.get_habit(habit_id).await? else {
            return Ok(Vec::new());
        };
        let entries = store.list_entries(habit_id).await?;
        Ok(completion_history_for(&habit, &entries, today, days))
    }

    pub async fn dashboard<S: CompletionStore + ?Sized>(
        &self,
        store: &S,
        today: NaiveDate,
    ) -> Result<Dashboard, StorageError> {
        let habits = store.list_habits().await?;
        let histories = try_join_all(habits.iter().map(|habit| store.list_entries(&habit.id))).await?;

        let entries_by_habit: HashMap<HabitId, Vec<HabitEntry>> = habits
            .iter()
            .map(|habit| habit.id.clone())
            .zip(histories)
            .collect();

        let dashboard = self.dashboard_for(&habits, &entries_by_habit, today);
        tracing::debug!(
            "Dashboard for {}: {}/{} done today, weekly {}%, monthly {}%",
            today, dashboard.today_completions, dashboard.today_target,
            dashboard.weekly_progress, dashboard.monthly_progress
        );
        Ok(dashboard)
    }
}

fn progress(counts: WindowCounts) -> f64 {
    if counts.due == 0 {
        return 0.0;
    }
    round_to_hundredths(counts.completed as f64 / counts.due as f64 * 100.0)
}

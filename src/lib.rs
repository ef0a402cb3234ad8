/// Public library interface for the habit streak engine
///
/// This module exports the domain types, the completion store contract and
/// its implementations, the statistics engine, and the `HabitTracker` facade
/// that application code drives.

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::try_join_all;
use thiserror::Error;

// Internal modules
pub mod calendar;
pub mod config;
mod domain;
mod storage;
mod analytics;

// Re-export public modules and types
pub use domain::*;
pub use storage::{CompletionStore, MemoryStore, SqliteStore, StorageError};
pub use analytics::{
    completion_history_for, completion_percentage_for, round_to_hundredths, window_counts,
    Dashboard, DayCompletion, HabitStats, StatisticsEngine, TopStreak, WindowCounts,
};
pub use calendar::{Calendar, Clock, FixedClock, SystemClock};
pub use config::{ConfigError, TrackerConfig};

/// Errors surfaced by tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },
}

/// Entry point for application code
///
/// Wraps a completion store with a calendar and the statistics engine. Each
/// public operation reads the clock exactly once and threads that instant
/// through every computation it performs.
pub struct HabitTracker<S: CompletionStore> {
    store: S,
    calendar: Calendar,
    statistics: StatisticsEngine,
}

impl<S: CompletionStore> HabitTracker<S> {
    pub fn new(store: S, calendar: Calendar, config: TrackerConfig) -> Self {
        Self {
            store,
            calendar,
            statistics: StatisticsEngine::new(config),
        }
    }

    /// Get a reference to the store (useful for testing)
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn statistics(&self) -> &StatisticsEngine {
        &self.statistics
    }

    /// Persist a new habit and seed its streak record
    pub async fn create_habit(&self, habit: &Habit) -> Result<HabitStreak, TrackerError> {
        self.store.save_habit(habit).await?;
        tracing::info!("Created habit '{}' ({})", habit.name, habit.id);
        self.recompute_or_missing(&habit.id, self.calendar.now()).await
    }

    /// Save an edited habit and rebuild its streak
    ///
    /// Frequency and target-day edits change what counts as a streak, so the
    /// cached record is always recomputed.
    pub async fn update_habit(&self, habit: &Habit) -> Result<HabitStreak, TrackerError> {
        if self.store.get_habit(&habit.id).await?.is_none() {
            return Err(TrackerError::HabitNotFound { habit_id: habit.id.to_string() });
        }
        self.store.save_habit(habit).await?;
        self.recompute_or_missing(&habit.id, self.calendar.now()).await
    }

    /// Delete a habit together with its entries and streak
    ///
    /// Returns whether the habit existed.
    pub async fn delete_habit(&self, habit_id: &HabitId) -> Result<bool, TrackerError> {
        let existed = self.store.delete_habit_cascade(habit_id).await?;
        if existed {
            tracing::info!("Deleted habit {}", habit_id);
        }
        Ok(existed)
    }

    /// Mark a habit done (or not done) on `date` and rebuild its streak
    ///
    /// The entry upsert completes before the streak scan reads entries.
    pub async fn toggle_completion(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
        notes: Option<String>,
    ) -> Result<HabitStreak, TrackerError> {
        let now = self.calendar.now();
        HabitEntry::validate_not_future(date, calendar::day_of(now))?;

        let entry = HabitEntry::new(habit_id.clone(), date, completed, Some(now), notes)?;
        match self.store.upsert_entry(&entry).await {
            Err(StorageError::HabitNotFound { habit_id }) => {
                return Err(TrackerError::HabitNotFound { habit_id });
            }
            result => result?,
        }

        self.recompute_or_missing(habit_id, now).await
    }

    /// Rebuild one habit's streak from its full history
    ///
    /// A habit that no longer exists is skipped and yields `None`.
    pub async fn recompute_streak(&self, habit_id: &HabitId) -> Result<Option<HabitStreak>, TrackerError> {
        Ok(self.recompute_at(habit_id, self.calendar.now()).await?)
    }

    /// Rebuild every habit's streak, e.g. on startup
    ///
    /// Habits are independent, so they are recomputed concurrently; each
    /// habit's own read and write stay in order.
    pub async fn recompute_all(&self) -> Result<Vec<HabitStreak>, TrackerError> {
        let now = self.calendar.now();
        let habits = self.store.list_habits().await?;

        let results = try_join_all(habits.iter().map(|habit| self.recompute_at(&habit.id, now))).await?;
        let streaks: Vec<HabitStreak> = results.into_iter().flatten().collect();

        tracing::info!("Recomputed streaks for {} habits", streaks.len());
        Ok(streaks)
    }

    /// Cached streak for a habit
    pub async fn streak(&self, habit_id: &HabitId) -> Result<Option<HabitStreak>, TrackerError> {
        Ok(self.store.get_streak(habit_id).await?)
    }

    /// Completion percentage over the configured window
    pub async fn completion_percentage(&self, habit_id: &HabitId) -> Result<u32, TrackerError> {
        let window_days = self.statistics.config().completion_window_days;
        self.completion_percentage_over(habit_id, window_days).await
    }

    pub async fn completion_percentage_over(
        &self,
        habit_id: &HabitId,
        window_days: u32,
    ) -> Result<u32, TrackerError> {
        let today = self.calendar.today();
        Ok(self
            .statistics
            .completion_percentage(&self.store, habit_id, window_days, today)
            .await?)
    }

    /// Store each habit's current completion percentage on the habit
    ///
    /// Returns how many habits changed.
    pub async fn refresh_completion_percentages(&self) -> Result<usize, TrackerError> {
        let today = self.calendar.today();
        let window_days = self.statistics.config().completion_window_days;
        let mut changed = 0;

        for mut habit in self.store.list_habits().await? {
            let entries = self.store.list_entries(&habit.id).await?;
            let percentage = completion_percentage_for(&habit, &entries, today, window_days);

            if habit.completion_percentage != Some(percentage) {
                habit.completion_percentage = Some(percentage);
                self.store.save_habit(&habit).await?;
                changed += 1;
            }
        }

        tracing::debug!("Refreshed completion percentages, {} changed", changed);
        Ok(changed)
    }

    pub async fn dashboard(&self) -> Result<Dashboard, TrackerError> {
        let today = self.calendar.today();
        Ok(self.statistics.dashboard(&self.store, today).await?)
    }

    pub async fn habit_stats(&self, habit_id: &HabitId) -> Result<Option<HabitStats>, TrackerError> {
        let now = self.calendar.now();
        Ok(self.statistics.habit_stats(&self.store, habit_id, now).await?)
    }

    /// Completion flags for the last seven days, oldest first
    pub async fn weekly_completion_data(&self, habit_id: &HabitId) -> Result<Vec<bool>, TrackerError> {
        let history = self.completion_history(habit_id, 7).await?;
        Ok(history.into_iter().map(|day| day.completed).collect())
    }

    pub async fn completion_history(
        &self,
        habit_id: &HabitId,
        days: u32,
    ) -> Result<Vec<DayCompletion>, TrackerError> {
        let today = self.calendar.today();
        Ok(self
            .statistics
            .completion_history(&self.store, habit_id, days, today)
            .await?)
    }

    /// Whether an active habit is due on the current day
    pub fn is_due_today(&self, habit: &Habit) -> bool {
        habit.is_active && habit.is_due_on(self.calendar.today())
    }

    /// Active habits due today, in listing order
    pub async fn habits_due_today(&self) -> Result<Vec<Habit>, TrackerError> {
        let today = self.calendar.today();
        let habits = self.store.list_habits().await?;
        Ok(habits
            .into_iter()
            .filter(|habit| habit.is_active && habit.is_due_on(today))
            .collect())
    }

    async fn recompute_at(
        &self,
        habit_id: &HabitId,
        now: DateTime<Utc>,
    ) -> Result<Option<HabitStreak>, StorageError> {
        let Some(habit) = self.store.get_habit(habit_id).await? else {
            tracing::warn!("Skipping streak recompute for missing habit {}", habit_id);
            return Ok(None);
        };

        let entries = self.store.list_entries(habit_id).await?;
        let streak = HabitStreak::calculate(&habit, &entries, now);

        // The habit may have been deleted since it was read
        if !self.store.upsert_streak(&streak).await? {
            tracing::warn!("Skipping streak recompute for missing habit {}", habit_id);
            return Ok(None);
        }

        tracing::debug!(
            "Streak for '{}': current {}, longest {}",
            habit.name, streak.current_streak, streak.longest_streak
        );
        Ok(Some(streak))
    }

    async fn recompute_or_missing(
        &self,
        habit_id: &HabitId,
        now: DateTime<Utc>,
    ) -> Result<HabitStreak, TrackerError> {
        self.recompute_at(habit_id, now)
            .await?
            .ok_or_else(|| TrackerError::HabitNotFound { habit_id: habit_id.to_string() })
    }
}

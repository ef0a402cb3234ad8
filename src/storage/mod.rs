/// Storage layer for persisting habit data
///
/// The engine only talks to persistence through the `CompletionStore`
/// contract. Two implementations ship with the crate: SQLite for real use and
/// an in-memory store for tests and embedding.

pub mod sqlite;
pub mod migrations;
pub mod memory;

// Re-export the main storage types
pub use sqlite::SqliteStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Habit, HabitEntry, HabitId, HabitStreak};

/// Errors that can occur during storage operations
///
/// These are surfaced to the caller as-is; the engine never retries.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Persistence contract the engine is written against
///
/// Entries are keyed by `(habit_id, date)` and streaks by `habit_id`; both
/// upserts replace instead of duplicating, and neither leaves a row behind
/// for a habit that does not exist. Listing habits returns them in
/// insertion order.
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Get a habit by ID, `None` if it does not exist
    async fn get_habit(&self, habit_id: &HabitId) -> Result<Option<Habit>, StorageError>;

    /// All habits in insertion order
    async fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Insert or replace a habit by ID
    async fn save_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// All entries for one habit, in no particular order
    async fn list_entries(&self, habit_id: &HabitId) -> Result<Vec<HabitEntry>, StorageError>;

    /// Entries of every habit for a single day
    async fn list_entries_for_date(&self, date: NaiveDate) -> Result<Vec<HabitEntry>, StorageError>;

    /// Insert or replace the entry for `(entry.habit_id, entry.date)`
    ///
    /// Fails with `HabitNotFound` when the habit does not exist.
    async fn upsert_entry(&self, entry: &HabitEntry) -> Result<(), StorageError>;

    /// Cached streak for a habit, `None` if never computed
    async fn get_streak(&self, habit_id: &HabitId) -> Result<Option<HabitStreak>, StorageError>;

    async fn list_streaks(&self) -> Result<Vec<HabitStreak>, StorageError>;

    /// Insert or replace the streak for `streak.habit_id`
    ///
    /// Returns `false` without writing when the habit no longer exists.
    async fn upsert_streak(&self, streak: &HabitStreak) -> Result<bool, StorageError>;

    /// Remove a habit with its entries and streak as one unit
    ///
    /// Returns whether the habit existed.
    async fn delete_habit_cascade(&self, habit_id: &HabitId) -> Result<bool, StorageError>;

    /// Remove every habit, entry and streak
    async fn clear_all(&self) -> Result<(), StorageError>;
}

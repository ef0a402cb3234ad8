/// SQLite implementation of the completion store
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::calendar::{format_day_key, DAY_KEY_FORMAT};
use crate::domain::{Category, EntryId, Habit, HabitEntry, HabitId, HabitStreak};
use crate::storage::{migrations, CompletionStore, StorageError};

const HABIT_COLUMNS: &str =
    "id, name, description, category, frequency, created_at, is_active, completion_percentage";

const ENTRY_COLUMNS: &str = "id, habit_id, date, completed, completed_at, notes";

const STREAK_COLUMNS: &str =
    "habit_id, current_streak, longest_streak, last_completed, last_updated";

/// SQLite-backed completion store
///
/// The connection sits behind a mutex so the store can be shared across
/// tasks; the lock is never held across an `.await`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and migrate it
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let store = Self::from_connection(conn)?;
        tracing::info!("SQLite store initialized at: {}", db_path.display());
        Ok(store)
    }

    /// A private in-memory database, mostly for tests
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("Connection lock poisoned".to_string()))
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<HabitEntry>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, entry_from_row)?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }
}

fn invalid_column(index: usize, message: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(index, message.to_string(), rusqlite::types::Type::Text)
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_instant(index: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| invalid_column(index, "Invalid datetime"))
}

fn parse_day(index: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_KEY_FORMAT).map_err(|_| invalid_column(index, "Invalid date"))
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let id_str: String = row.get(0)?;
    let id = HabitId::parse(&id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let category_str: String = row.get(3)?;

    let frequency_json: String = row.get(4)?;
    let frequency = serde_json::from_str(&frequency_json)
        .map_err(|_| invalid_column(4, "Invalid frequency"))?;

    let created_at_str: String = row.get(5)?;
    let created_at = parse_instant(5, &created_at_str)?;

    Ok(Habit::from_existing(
        id,
        row.get(1)?, // name
        row.get(2)?, // description
        Category::from_slug(&category_str),
        frequency,
        created_at,
        row.get(6)?, // is_active
        row.get(7)?, // completion_percentage
    ))
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<HabitEntry> {
    let entry_id_str: String = row.get(0)?;
    let entry_id = EntryId::parse(&entry_id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let habit_id_str: String = row.get(1)?;
    let habit_id = HabitId::parse(&habit_id_str).map_err(|_| invalid_column(1, "Invalid UUID"))?;

    let date_str: String = row.get(2)?;
    let date = parse_day(2, &date_str)?;

    let completed_at_str: Option<String> = row.get(4)?;
    let completed_at = completed_at_str
        .map(|raw| parse_instant(4, &raw))
        .transpose()?;

    Ok(HabitEntry::from_existing(
        entry_id,
        habit_id,
        date,
        row.get(3)?, // completed
        completed_at,
        row.get(5)?, // notes
    ))
}

fn streak_from_row(row: &Row<'_>) -> rusqlite::Result<HabitStreak> {
    let habit_id_str: String = row.get(0)?;
    let habit_id = HabitId::parse(&habit_id_str).map_err(|_| invalid_column(0, "Invalid UUID"))?;

    let last_completed_str: Option<String> = row.get(3)?;
    let last_completed = last_completed_str
        .map(|raw| parse_day(3, &raw))
        .transpose()?;

    let last_updated_str: String = row.get(4)?;

    Ok(HabitStreak {
        habit_id,
        current_streak: row.get(1)?,
        longest_streak: row.get(2)?,
        last_completed,
        last_updated: parse_instant(4, &last_updated_str)?,
    })
}

#[async_trait]
impl CompletionStore for SqliteStore {
    async fn get_habit(&self, habit_id: &HabitId) -> Result<Option<Habit>, StorageError> {
        let conn = self.conn()?;
        let habit = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
                params![habit_id.to_string()],
                habit_from_row,
            )
            .optional()?;
        Ok(habit)
    }

    async fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM habits ORDER BY rowid", HABIT_COLUMNS))?;
        let habit_iter = stmt.query_map([], habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }
        Ok(habits)
    }

    async fn save_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let frequency_json = serde_json::to_string(&habit.frequency)?;
        let conn = self.conn()?;

        // ON CONFLICT keeps the rowid (listing order) and never fires the cascade
        conn.execute(
            "INSERT INTO habits (
                id, name, description, category, frequency, created_at, is_active, completion_percentage
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                frequency = excluded.frequency,
                created_at = excluded.created_at,
                is_active = excluded.is_active,
                completion_percentage = excluded.completion_percentage",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.category.slug(),
                frequency_json,
                format_instant(&habit.created_at),
                habit.is_active,
                habit.completion_percentage,
            ],
        )?;

        tracing::debug!("Saved habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    async fn list_entries(&self, habit_id: &HabitId) -> Result<Vec<HabitEntry>, StorageError> {
        self.query_entries(
            &format!("SELECT {} FROM habit_entries WHERE habit_id = ?1", ENTRY_COLUMNS),
            params![habit_id.to_string()],
        )
    }

    async fn list_entries_for_date(&self, date: NaiveDate) -> Result<Vec<HabitEntry>, StorageError> {
        self.query_entries(
            &format!("SELECT {} FROM habit_entries WHERE date = ?1", ENTRY_COLUMNS),
            params![format_day_key(date)],
        )
    }

    async fn upsert_entry(&self, entry: &HabitEntry) -> Result<(), StorageError> {
        let conn = self.conn()?;
        // Nothing is inserted for a habit that does not exist
        let written = conn.execute(
            "INSERT INTO habit_entries (id, habit_id, date, completed, completed_at, notes)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6
             WHERE EXISTS (SELECT 1 FROM habits WHERE id = ?2)
             ON CONFLICT(habit_id, date) DO UPDATE SET
                id = excluded.id,
                completed = excluded.completed,
                completed_at = excluded.completed_at,
                notes = excluded.notes",
            params![
                entry.id.to_string(),
                entry.habit_id.to_string(),
                format_day_key(entry.date),
                entry.completed,
                entry.completed_at.as_ref().map(format_instant),
                entry.notes,
            ],
        )?;

        if written == 0 {
            return Err(StorageError::HabitNotFound { habit_id: entry.habit_id.to_string() });
        }

        tracing::debug!(
            "Upserted entry for habit {} on {} (completed: {})",
            entry.habit_id, entry.date, entry.completed
        );
        Ok(())
    }

    async fn get_streak(&self, habit_id: &HabitId) -> Result<Option<HabitStreak>, StorageError> {
        let conn = self.conn()?;
        let streak = conn
            .query_row(
                &format!("SELECT {} FROM habit_streaks WHERE habit_id = ?1", STREAK_COLUMNS),
                params![habit_id.to_string()],
                streak_from_row,
            )
            .optional()?;
        Ok(streak)
    }

    async fn list_streaks(&self) -> Result<Vec<HabitStreak>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM habit_streaks", STREAK_COLUMNS))?;
        let streak_iter = stmt.query_map([], streak_from_row)?;

        let mut streaks = Vec::new();
        for streak in streak_iter {
            streaks.push(streak?);
        }
        Ok(streaks)
    }

    async fn upsert_streak(&self, streak: &HabitStreak) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        // A habit deleted since the streak was computed gets no row
        let written = conn.execute(
            "INSERT OR REPLACE INTO habit_streaks (
                habit_id, current_streak, longest_streak, last_completed, last_updated
            )
            SELECT ?1, ?2, ?3, ?4, ?5
            WHERE EXISTS (SELECT 1 FROM habits WHERE id = ?1)",
            params![
                streak.habit_id.to_string(),
                streak.current_streak,
                streak.longest_streak,
                streak.last_completed.map(format_day_key),
                format_instant(&streak.last_updated),
            ],
        )?;

        if written == 0 {
            tracing::debug!("Skipped streak for missing habit: {}", streak.habit_id);
            return Ok(false);
        }

        tracing::debug!("Updated streak for habit: {}", streak.habit_id);
        Ok(true)
    }

    async fn delete_habit_cascade(&self, habit_id: &HabitId) -> Result<bool, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = habit_id.to_string();

        let entries = tx.execute("DELETE FROM habit_entries WHERE habit_id = ?1", params![id])?;
        tx.execute("DELETE FROM habit_streaks WHERE habit_id = ?1", params![id])?;
        let habits = tx.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        tx.commit()?;

        tracing::debug!("Deleted habit {} with {} entries", habit_id, entries);
        Ok(habits > 0)
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM habit_entries;
             DELETE FROM habit_streaks;
             DELETE FROM habits;",
        )?;
        tx.commit()?;

        tracing::info!("Cleared all habit data");
        Ok(())
    }
}

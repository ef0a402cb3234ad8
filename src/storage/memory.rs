/// In-memory completion store
///
/// Holds everything in process memory behind a mutex. Useful for tests and
/// for embedding the engine where the host application owns persistence.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Habit, HabitEntry, HabitId, HabitStreak};
use crate::storage::{CompletionStore, StorageError};

#[derive(Debug, Default)]
struct MemoryState {
    /// Insertion order is the listing order
    habits: Vec<Habit>,
    entries: HashMap<(HabitId, NaiveDate), HabitEntry>,
    streaks: HashMap<HabitId, HabitStreak>,
}

impl MemoryState {
    fn has_habit(&self, habit_id: &HabitId) -> bool {
        self.habits.iter().any(|h| &h.id == habit_id)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Connection("Memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CompletionStore for MemoryStore {
    async fn get_habit(&self, habit_id: &HabitId) -> Result<Option<Habit>, StorageError> {
        let state = self.state()?;
        Ok(state.habits.iter().find(|h| &h.id == habit_id).cloned())
    }

    async fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        Ok(self.state()?.habits.clone())
    }

    async fn save_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let mut state = self.state()?;
        match state.habits.iter().position(|h| h.id == habit.id) {
            Some(index) => state.habits[index] = habit.clone(),
            None => state.habits.push(habit.clone()),
        }
        Ok(())
    }

    async fn list_entries(&self, habit_id: &HabitId) -> Result<Vec<HabitEntry>, StorageError> {
        let state = self.state()?;
        Ok(state
            .entries
            .values()
            .filter(|e| &e.habit_id == habit_id)
            .cloned()
            .collect())
    }

    async fn list_entries_for_date(&self, date: NaiveDate) -> Result<Vec<HabitEntry>, StorageError> {
        let state = self.state()?;
        Ok(state.entries.values().filter(|e| e.date == date).cloned().collect())
    }

    async fn upsert_entry(&self, entry: &HabitEntry) -> Result<(), StorageError> {
        let mut state = self.state()?;
        if !state.has_habit(&entry.habit_id) {
            return Err(StorageError::HabitNotFound { habit_id: entry.habit_id.to_string() });
        }
        state
            .entries
            .insert((entry.habit_id.clone(), entry.date), entry.clone());
        Ok(())
    }

    async fn get_streak(&self, habit_id: &HabitId) -> Result<Option<HabitStreak>, StorageError> {
        Ok(self.state()?.streaks.get(habit_id).cloned())
    }

    async fn list_streaks(&self) -> Result<Vec<HabitStreak>, StorageError> {
        Ok(self.state()?.streaks.values().cloned().collect())
    }

    async fn upsert_streak(&self, streak: &HabitStreak) -> Result<bool, StorageError> {
        let mut state = self.state()?;
        if !state.has_habit(&streak.habit_id) {
            return Ok(false);
        }
        state.streaks.insert(streak.habit_id.clone(), streak.clone());
        Ok(true)
    }

    async fn delete_habit_cascade(&self, habit_id: &HabitId) -> Result<bool, StorageError> {
        // One guard for all three collections, so no partial state is visible
        let mut state = self.state()?;
        let before = state.habits.len();
        state.habits.retain(|h| &h.id != habit_id);
        state.entries.retain(|(id, _), _| id != habit_id);
        state.streaks.remove(habit_id);
        Ok(state.habits.len() != before)
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        *self.state()? = MemoryState::default();
        Ok(())
    }
}

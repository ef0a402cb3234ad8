/// HabitEntry entity for tracking habit completions
///
/// An entry is one day's completion record for one habit. Entries are
/// logically keyed by `(habit_id, date)`: writing an entry for a pair that
/// already exists replaces the old one.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{DomainError, EntryId, HabitId};

/// A record of a habit's status on a specific day
///
/// A stored entry with `completed == false` is distinct from having no entry,
/// but both count as "not completed" for streaks and statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    /// Unique identifier for this entry
    pub id: EntryId,
    /// Which habit this entry is for
    pub habit_id: HabitId,
    /// Calendar day this entry is for (UTC day key, no time of day)
    pub date: NaiveDate,
    /// Whether the habit was done that day
    pub completed: bool,
    /// When the completion was toggled (advisory only)
    pub completed_at: Option<DateTime<Utc>>,
    /// User's notes about this day
    pub notes: Option<String>,
}

impl HabitEntry {
    /// Create a new entry with validation
    pub fn new(
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_notes(&notes)?;

        Ok(Self {
            id: EntryId::new(),
            habit_id,
            date,
            completed,
            completed_at,
            notes,
        })
    }

    /// Create an entry from existing data (used when loading from storage)
    pub fn from_existing(
        id: EntryId,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            habit_id,
            date,
            completed,
            completed_at,
            notes,
        }
    }

    /// Check if this entry has notes
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    /// Reject days after `today`
    pub fn validate_not_future(date: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
        if date > today {
            return Err(DomainError::InvalidDate(format!(
                "Cannot record {} before it happens (today is {})",
                date, today
            )));
        }
        Ok(())
    }

    fn validate_notes(notes: &Option<String>) -> Result<(), DomainError> {
        if let Some(note_text) = notes {
            if note_text.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Notes cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}

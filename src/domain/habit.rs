/// Habit entity and related functionality
///
/// This module defines the Habit struct that represents a behavior the user
/// wants to track, along with its validation rules.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

use crate::calendar::day_of;
use crate::domain::{Category, DomainError, Frequency, HabitId};

/// A tracked behavior definition
///
/// `created_at` is the first instant the habit is eligible for tracking; no
/// streak or statistics window reaches before its UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Category for organization
    pub category: Category,
    /// Cadence model used for streaks and statistics
    pub frequency: Frequency,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Whether this habit shows up in "today" views
    pub is_active: bool,
    /// Last stored 30-day completion percentage (0-100)
    pub completion_percentage: Option<u32>,
}

impl Habit {
    /// Create a new habit with validation
    pub fn new(
        name: String,
        description: Option<String>,
        category: Category,
        frequency: Frequency,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_description(&description)?;
        frequency.validate()?;

        Ok(Self {
            id: HabitId::new(),
            name: name.trim().to_string(),
            description,
            category,
            frequency,
            created_at,
            is_active: true,
            completion_percentage: None,
        })
    }

    /// Create a habit from existing data (used when loading from storage)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        category: Category,
        frequency: Frequency,
        created_at: DateTime<Utc>,
        is_active: bool,
        completion_percentage: Option<u32>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            frequency,
            created_at,
            is_active,
            completion_percentage,
        }
    }

    /// Update the habit's properties with validation
    ///
    /// Changing the frequency invalidates any stored streak; callers must
    /// recompute afterwards.
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        category: Option<Category>,
        frequency: Option<Frequency>,
        is_active: Option<bool>,
    ) -> Result<(), DomainError> {
        if let Some(ref new_name) = name {
            Self::validate_name(new_name)?;
        }
        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }
        if let Some(ref new_freq) = frequency {
            new_freq.validate()?;
        }

        if let Some(new_name) = name {
            self.name = new_name.trim().to_string();
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_category) = category {
            self.category = new_category;
        }
        if let Some(new_frequency) = frequency {
            self.frequency = new_frequency;
        }
        if let Some(new_is_active) = is_active {
            self.is_active = new_is_active;
        }

        Ok(())
    }

    /// UTC day the habit became trackable
    pub fn created_day(&self) -> NaiveDate {
        day_of(self.created_at)
    }

    /// Whether the habit is due on `day`
    ///
    /// A day is due when it is on or after the creation day and the
    /// frequency schedules it. Streaks and percentages share this rule.
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        day >= self.created_day() && self.frequency.is_scheduled_for_date(day)
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}

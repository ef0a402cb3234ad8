/// Core types and enums used throughout the domain layer
///
/// This module defines the ID newtypes, the habit category list and the
/// `Frequency` cadence model that drives streak and statistics computation.

use serde::{Deserialize, Serialize};
use chrono::{Datelike, NaiveDate, Weekday};
use uuid::Uuid;

use crate::calendar::{weekday_from_index, weekday_index};
use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// Wrapping the UUID keeps habit ids and entry ids from being mixed up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a habit ID (useful for database loading and CLI input)
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a habit entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Life areas habits are grouped under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Study,
    Religion,
    Sport,
    QuitBadHabit,
    Art,
    Entertainment,
    Social,
    Finance,
    Health,
    Work,
    Nutrition,
    Home,
    Outdoor,
    Other,
    /// User-defined category with custom name
    Custom(String),
}

impl Category {
    /// Stable slug used for storage
    pub fn slug(&self) -> String {
        match self {
            Category::Study => "study".to_string(),
            Category::Religion => "religion".to_string(),
            Category::Sport => "sport".to_string(),
            Category::QuitBadHabit => "quit-bad-habit".to_string(),
            Category::Art => "art".to_string(),
            Category::Entertainment => "entertainment".to_string(),
            Category::Social => "social".to_string(),
            Category::Finance => "finance".to_string(),
            Category::Health => "health".to_string(),
            Category::Work => "work".to_string(),
            Category::Nutrition => "nutrition".to_string(),
            Category::Home => "home".to_string(),
            Category::Outdoor => "outdoor".to_string(),
            Category::Other => "other".to_string(),
            Category::Custom(name) => format!("custom:{}", name),
        }
    }

    /// Inverse of `slug`; unknown slugs become `Custom`
    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "study" => Category::Study,
            "religion" => Category::Religion,
            "sport" => Category::Sport,
            "quit-bad-habit" => Category::QuitBadHabit,
            "art" => Category::Art,
            "entertainment" => Category::Entertainment,
            "social" => Category::Social,
            "finance" => Category::Finance,
            "health" => Category::Health,
            "work" => Category::Work,
            "nutrition" => Category::Nutrition,
            "home" => Category::Home,
            "outdoor" => Category::Outdoor,
            "other" => Category::Other,
            s => Category::Custom(s.strip_prefix("custom:").unwrap_or(s).to_string()),
        }
    }

    /// Get the display name for this category
    pub fn display_name(&self) -> &str {
        match self {
            Category::Study => "Study",
            Category::Religion => "Religion",
            Category::Sport => "Sport",
            Category::QuitBadHabit => "Quit Bad Habit",
            Category::Art => "Art",
            Category::Entertainment => "Entertainment",
            Category::Social => "Social",
            Category::Finance => "Finance",
            Category::Health => "Health",
            Category::Work => "Work",
            Category::Nutrition => "Nutrition",
            Category::Home => "Home",
            Category::Outdoor => "Outdoor",
            Category::Other => "Other",
            Category::Custom(name) => name,
        }
    }
}

/// How often a habit is due
///
/// Streaks and completion percentages both dispatch on this. A weekly habit
/// is due on each of its `target_days`; `Custom` carries a target count that
/// is not scheduled yet and is treated like `Daily`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    /// Every single day
    Daily,
    /// Specific days of the week, sorted Sunday-first without duplicates
    Weekly { target_days: Vec<Weekday> },
    /// Declared for a per-period target count; scheduled like `Daily`
    Custom { target_count: Option<u32> },
}

impl Frequency {
    /// Build a weekly frequency from Sunday-based weekday indices (0..=6)
    pub fn weekly(indices: &[u8]) -> Result<Self, DomainError> {
        let mut target_days = indices
            .iter()
            .map(|&index| weekday_from_index(index))
            .collect::<Result<Vec<_>, _>>()?;
        target_days.sort_by_key(|day| weekday_index(*day));
        target_days.dedup();

        Ok(Frequency::Weekly { target_days })
    }

    /// Sunday-based indices of the target days (empty unless weekly)
    pub fn target_day_indices(&self) -> Vec<u8> {
        match self {
            Frequency::Weekly { target_days } => {
                target_days.iter().map(|day| weekday_index(*day)).collect()
            }
            Frequency::Daily | Frequency::Custom { .. } => Vec::new(),
        }
    }

    /// Validate that a frequency value is usable
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Frequency::Weekly { target_days } if target_days.len() > 7 => {
                Err(DomainError::InvalidFrequency(
                    "Weekly frequency cannot have more than 7 target days".to_string(),
                ))
            }
            Frequency::Custom { target_count: Some(0) } => Err(DomainError::InvalidFrequency(
                "Custom target count must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Whether the cadence rule expects an action on `date`
    ///
    /// Ignores the habit's creation date; see `Habit::is_due_on`.
    pub fn is_scheduled_for_date(&self, date: NaiveDate) -> bool {
        match self {
            Frequency::Daily | Frequency::Custom { .. } => true,
            Frequency::Weekly { target_days } => target_days.contains(&date.weekday()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly { .. } => "weekly",
            Frequency::Custom { .. } => "custom",
        }
    }
}

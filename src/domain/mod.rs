/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, HabitEntry, HabitStreak),
/// their validation rules, and the streak engine that derives streaks from
/// completion history.

pub mod habit;
pub mod entry;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use entry::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Weekday index {0} is out of range (expected 0-6, Sunday = 0)")]
    InvalidWeekday(u8),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Streak calculation and tracking functionality
///
/// This module holds the cached `HabitStreak` record and the streak engine
/// that rebuilds it from a habit's full entry history. The engine never
/// patches a previous result: every call rescans the history, so repeated
/// calls with the same inputs give the same answer.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc, Weekday};

use crate::calendar::{day_of, days_between, enumerate_target_days, previous_day};
use crate::domain::{Frequency, Habit, HabitEntry, HabitId};

/// Current and longest run for one habit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

/// Cached streak state for a habit
///
/// Entirely derived from the habit's entries; `last_updated` records when
/// that derivation last ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStreak {
    /// Which habit this streak data is for
    pub habit_id: HabitId,
    /// Consecutive due periods completed, ending today or just before
    pub current_streak: u32,
    /// Best run found anywhere in the history
    pub longest_streak: u32,
    /// Most recent completed day (None if never completed)
    pub last_completed: Option<NaiveDate>,
    /// When this record was last recomputed
    pub last_updated: DateTime<Utc>,
}

impl HabitStreak {
    /// A zero streak stamped at `now`
    pub fn empty(habit_id: HabitId, now: DateTime<Utc>) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            last_completed: None,
            last_updated: now,
        }
    }

    /// Rebuild the streak record for `habit` from its entries
    ///
    /// `now` is the single clock reading for the whole operation; "today" is
    /// its UTC day.
    pub fn calculate(habit: &Habit, entries: &[HabitEntry], now: DateTime<Utc>) -> Self {
        let summary = compute_streak(habit, entries, day_of(now));
        let last_completed = entries
            .iter()
            .filter(|e| e.habit_id == habit.id && e.completed)
            .map(|e| e.date)
            .max();

        Self {
            habit_id: habit.id.clone(),
            current_streak: summary.current,
            longest_streak: summary.longest,
            last_completed,
            last_updated: now,
        }
    }

    pub fn summary(&self) -> StreakSummary {
        StreakSummary {
            current: self.current_streak,
            longest: self.longest_streak,
        }
    }

    /// Short human label for the current streak, e.g. "2w 3d streak"
    pub fn message(&self) -> String {
        streak_message(self.current_streak)
    }
}

/// Compute `{current, longest}` for a habit, dispatching on its frequency
///
/// Entries belonging to other habits are ignored. `Custom` habits are
/// scheduled every day and therefore use the daily rules.
pub fn compute_streak(habit: &Habit, entries: &[HabitEntry], today: NaiveDate) -> StreakSummary {
    let own_entries = entries.iter().filter(|e| e.habit_id == habit.id);

    match &habit.frequency {
        Frequency::Daily | Frequency::Custom { .. } => daily_streak(own_entries, today),
        Frequency::Weekly { target_days } => {
            weekly_streak(own_entries, target_days, habit.created_day(), today)
        }
    }
}

/// Daily rules: runs of completed days with no calendar gap
///
/// The current streak only survives if the latest completed day is today or
/// yesterday.
pub fn daily_streak<'a, I>(entries: I, today: NaiveDate) -> StreakSummary
where
    I: IntoIterator<Item = &'a HabitEntry>,
{
    let mut days: Vec<NaiveDate> = entries
        .into_iter()
        .filter(|e| e.completed)
        .map(|e| e.date)
        .collect();
    days.sort_unstable();
    days.dedup();

    let Some(&latest) = days.last() else {
        return StreakSummary::default();
    };

    let yesterday = previous_day(today);
    let mut run = 0u32;
    let mut longest = 0u32;
    let mut current = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for &day in &days {
        run = match previous {
            Some(prev) if days_between(prev, day) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);

        if day == today || day == yesterday {
            current = run;
        }
        previous = Some(day);
    }

    if latest != today && latest != yesterday {
        current = 0;
    }

    StreakSummary { current, longest }
}

/// Weekly rules: walk every due day from creation to today
///
/// A due day without a completed entry resets the run immediately. An
/// unfinished due "today" therefore already reads as a broken streak; no
/// extra adjustment is applied on top of the scan.
pub fn weekly_streak<'a, I>(
    entries: I,
    target_days: &[Weekday],
    created: NaiveDate,
    today: NaiveDate,
) -> StreakSummary
where
    I: IntoIterator<Item = &'a HabitEntry>,
{
    if target_days.is_empty() {
        return StreakSummary::default();
    }

    let completed: HashSet<NaiveDate> = entries
        .into_iter()
        .filter(|e| e.completed)
        .map(|e| e.date)
        .collect();

    let mut run = 0u32;
    let mut longest = 0u32;
    let mut current = 0u32;

    for day in enumerate_target_days(created, today, target_days) {
        if day > today {
            break;
        }

        if completed.contains(&day) {
            run += 1;
            longest = longest.max(run);
            current = run;
        } else {
            run = 0;
            current = 0;
        }
    }

    StreakSummary { current, longest }
}

/// Render a streak length as days, weeks or months
pub fn streak_message(streak: u32) -> String {
    match streak {
        0 => "Start your streak!".to_string(),
        1 => "1 day streak".to_string(),
        2..=6 => format!("{} days streak", streak),
        7..=29 => {
            let (weeks, days) = (streak / 7, streak % 7);
            if days == 0 {
                format!("{} week{} streak", weeks, if weeks > 1 { "s" } else { "" })
            } else {
                format!("{}w {}d streak", weeks, days)
            }
        }
        _ => {
            let (months, days) = (streak / 30, streak % 30);
            if days == 0 {
                format!("{} month{} streak", months, if months > 1 { "s" } else { "" })
            } else {
                format!("{}m {}d streak", months, days)
            }
        }
    }
}

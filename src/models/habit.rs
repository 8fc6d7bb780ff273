use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Hard cap on how many days back a streak is counted.
const STREAK_CAP: u32 = 365;

/// A habit and the calendar days on which it was completed.
///
/// `logs` holds local-calendar day keys; a day appears at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub logs: BTreeSet<NaiveDate>,
}

impl Habit {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Utc::now(),
            logs: BTreeSet::new(),
        }
    }

    /// Whether the habit was completed on the given day.
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.logs.contains(&date)
    }

    /// Flips completion for a day.
    ///
    /// Returns `true` when the day is logged after the call. Toggling the
    /// same day twice restores the original membership.
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.logs.remove(&date) {
            false
        } else {
            self.logs.insert(date);
            true
        }
    }

    /// Number of consecutive completed days walking backward from `as_of`
    /// (inclusive), stopping at the first missing day. Capped at 365.
    pub fn streak(&self, as_of: NaiveDate) -> u32 {
        let mut streak = 0;
        let mut day = as_of;
        while streak < STREAK_CAP && self.logs.contains(&day) {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_habit_new() {
        let habit = Habit::new("Drink water");

        assert_eq!(habit.title, "Drink water");
        assert!(habit.logs.is_empty());
    }

    #[test]
    fn test_toggle_is_involution() {
        let mut habit = Habit::new("Stretch");
        let today = date("2026-08-06");

        assert!(habit.toggle(today));
        assert!(habit.completed_on(today));
        assert!(!habit.toggle(today));
        assert!(!habit.completed_on(today));
    }

    #[test]
    fn test_logs_reject_duplicate_days() {
        let mut habit = Habit::new("Read");
        let day = date("2026-08-01");

        habit.logs.insert(day);
        habit.logs.insert(day);
        assert_eq!(habit.logs.len(), 1);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let mut habit = Habit::new("Run");
        let today = date("2026-08-06");
        habit.logs.insert(today);
        habit.logs.insert(today - Duration::days(1));
        habit.logs.insert(today - Duration::days(2));
        // day-3 absent

        assert_eq!(habit.streak(today), 3);
    }

    #[test]
    fn test_streak_empty_logs_is_zero() {
        let habit = Habit::new("Run");
        assert_eq!(habit.streak(date("2026-08-06")), 0);
    }

    #[test]
    fn test_streak_broken_by_missing_today() {
        let mut habit = Habit::new("Run");
        let today = date("2026-08-06");
        habit.logs.insert(today - Duration::days(1));
        habit.logs.insert(today - Duration::days(2));

        assert_eq!(habit.streak(today), 0);
    }

    #[test]
    fn test_streak_ignores_gap_in_history() {
        let mut habit = Habit::new("Run");
        let today = date("2026-08-06");
        habit.logs.insert(today);
        habit.logs.insert(today - Duration::days(1));
        // day-2 missing, older run should not count
        habit.logs.insert(today - Duration::days(3));
        habit.logs.insert(today - Duration::days(4));

        assert_eq!(habit.streak(today), 2);
    }

    #[test]
    fn test_streak_caps_at_365_days() {
        let mut habit = Habit::new("Run");
        let today = date("2026-08-06");
        for n in 0..400 {
            habit.logs.insert(today - Duration::days(n));
        }

        assert_eq!(habit.streak(today), 365);
    }

    #[test]
    fn test_habit_json_roundtrip() {
        let mut habit = Habit::new("Drink water");
        habit.logs.insert(date("2026-08-05"));
        habit.logs.insert(date("2026-08-06"));

        let json = serde_json::to_string(&habit).unwrap();
        let parsed: Habit = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, habit);
    }

    #[test]
    fn test_day_keys_serialize_as_dates() {
        let mut habit = Habit::new("Drink water");
        habit.logs.insert(date("2026-08-06"));

        let json = serde_json::to_string(&habit).unwrap();
        assert!(json.contains("\"2026-08-06\""));
    }
}

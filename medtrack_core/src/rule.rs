//! Recurrence rule: which weekdays and what time-of-day a medication is due.

use crate::types::{Medication, Weekday};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeSet;

/// Weekday-set plus time-of-day recurrence for a single medication.
///
/// Pure and side-effect free: given a calendar date it answers whether the
/// medication is scheduled that day and, if so, at which exact timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecurrenceRule {
    days: BTreeSet<Weekday>,
    time: NaiveTime,
}

impl RecurrenceRule {
    /// Create a rule from a weekday set and a time-of-day
    ///
    /// Scheduled timestamps carry whole minutes; any seconds on `time`
    /// are dropped.
    pub fn new(days: BTreeSet<Weekday>, time: NaiveTime) -> Self {
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        Self { days, time }
    }

    /// Build the rule for a medication's schedule
    pub fn for_medication(medication: &Medication) -> Self {
        Self::new(medication.days.clone(), medication.reminder_time)
    }

    /// Whether the medication is scheduled on the given calendar date
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.days.contains(&Weekday::from_chrono(date.weekday()))
    }

    /// The exact scheduled timestamp on `date`, or None if the rule
    /// does not match that date
    pub fn occurrence_at(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        if self.matches(date) {
            Some(date.and_time(self.time))
        } else {
            None
        }
    }

    /// True when the weekday set is empty (expansion yields nothing)
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(days: &[Weekday], hour: u32, minute: u32) -> RecurrenceRule {
        RecurrenceRule::new(
            days.iter().copied().collect(),
            NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
        )
    }

    // 2025-03-03 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_matches_enabled_weekday() {
        let rule = rule(&[Weekday::Monday, Weekday::Friday], 9, 0);

        assert!(rule.matches(monday()));
        assert!(rule.matches(monday() + chrono::Duration::days(4))); // Friday
        assert!(!rule.matches(monday() + chrono::Duration::days(1))); // Tuesday
    }

    #[test]
    fn test_occurrence_at_combines_date_and_time() {
        let rule = rule(&[Weekday::Monday], 9, 30);

        let scheduled = rule.occurrence_at(monday()).unwrap();
        assert_eq!(
            scheduled,
            monday().and_time(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_occurrence_at_none_on_disabled_day() {
        let rule = rule(&[Weekday::Monday], 9, 0);

        assert!(rule
            .occurrence_at(monday() + chrono::Duration::days(1))
            .is_none());
    }

    #[test]
    fn test_seconds_are_dropped() {
        let rule = RecurrenceRule::new(
            [Weekday::Monday].into_iter().collect(),
            NaiveTime::from_hms_opt(8, 15, 42).unwrap(),
        );

        let scheduled = rule.occurrence_at(monday()).unwrap();
        assert_eq!(scheduled.time(), NaiveTime::from_hms_opt(8, 15, 0).unwrap());
    }

    #[test]
    fn test_empty_weekday_set_matches_nothing() {
        let rule = rule(&[], 9, 0);

        assert!(rule.is_empty());
        for offset in 0..7 {
            assert!(!rule.matches(monday() + chrono::Duration::days(offset)));
        }
    }
}

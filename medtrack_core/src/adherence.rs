//! Daily and weekly adherence aggregation.
//!
//! Occurrences are bucketed by the local calendar date of their scheduled
//! timestamp (year/month/day components, not a 24-hour epoch window). The
//! overall rate considers resolved occurrences only — an upcoming dose has
//! not yet had a chance to be taken or missed.

use crate::types::{Occurrence, OccurrenceStatus, Weekday};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Per-day occurrence counts and adherence rate
#[derive(Clone, Debug, Serialize)]
pub struct DayAdherence {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub taken: u32,
    pub missed: u32,
    pub upcoming: u32,
    pub total: u32,
    /// taken / total, 0.0 for a day without occurrences (never NaN)
    pub adherence_rate: f64,
}

/// Aggregated adherence over a date range
#[derive(Clone, Debug, Serialize)]
pub struct AdherenceReport {
    /// One bucket per calendar date in the range, in date order
    pub days: Vec<DayAdherence>,
    /// Percentage of resolved (taken or missed) occurrences that were
    /// taken, rounded to the nearest integer; 0 when nothing is resolved
    pub overall_adherence: u32,
}

/// Monday of the week containing `date` (ISO week convention)
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Aggregate occurrences into per-day buckets over `[start, end]` inclusive
///
/// Occurrences scheduled outside the range are ignored.
pub fn aggregate(start: NaiveDate, end: NaiveDate, occurrences: &[Occurrence]) -> AdherenceReport {
    let mut days = Vec::new();
    let mut date = start;

    while date <= end {
        let mut day = DayAdherence {
            date,
            weekday: Weekday::from_chrono(date.weekday()),
            taken: 0,
            missed: 0,
            upcoming: 0,
            total: 0,
            adherence_rate: 0.0,
        };

        for occurrence in occurrences
            .iter()
            .filter(|o| o.scheduled_at.date() == date)
        {
            day.total += 1;
            match occurrence.status {
                OccurrenceStatus::Taken => day.taken += 1,
                OccurrenceStatus::Missed => day.missed += 1,
                OccurrenceStatus::Upcoming => day.upcoming += 1,
            }
        }

        if day.total > 0 {
            day.adherence_rate = f64::from(day.taken) / f64::from(day.total);
        }

        days.push(day);
        date = date + Duration::days(1);
    }

    let taken: u32 = days.iter().map(|d| d.taken).sum();
    let missed: u32 = days.iter().map(|d| d.missed).sum();
    let resolved = taken + missed;

    let overall_adherence = if resolved > 0 {
        (f64::from(taken) / f64::from(resolved) * 100.0).round() as u32
    } else {
        0
    };

    AdherenceReport {
        days,
        overall_adherence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, NaiveTime};
    use uuid::Uuid;

    // 2025-03-03 is a Monday
    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap() + Duration::days(offset)
    }

    fn occurrence(scheduled_at: NaiveDateTime, status: OccurrenceStatus) -> Occurrence {
        Occurrence {
            id: Uuid::new_v4(),
            medication_id: Uuid::new_v4(),
            scheduled_at,
            status,
            taken_at: match status {
                OccurrenceStatus::Taken => Some(scheduled_at),
                _ => None,
            },
            user_id: None,
        }
    }

    fn at(offset: i64, hour: u32) -> NaiveDateTime {
        day(offset).and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    #[test]
    fn test_week_start_is_monday() {
        for offset in 0..7 {
            assert_eq!(week_start(day(offset)), day(0));
        }
        assert_eq!(week_start(day(7)), day(7));
        assert_eq!(week_start(day(-1)), day(-7));
    }

    #[test]
    fn test_one_bucket_per_date_in_order() {
        let report = aggregate(day(0), day(6), &[]);

        assert_eq!(report.days.len(), 7);
        assert_eq!(report.days[0].date, day(0));
        assert_eq!(report.days[0].weekday, Weekday::Monday);
        assert_eq!(report.days[6].weekday, Weekday::Sunday);
    }

    #[test]
    fn test_empty_day_has_zero_rate() {
        let report = aggregate(day(0), day(0), &[]);

        let bucket = &report.days[0];
        assert_eq!(bucket.total, 0);
        assert_eq!(bucket.adherence_rate, 0.0);
        assert!(!bucket.adherence_rate.is_nan());
        assert_eq!(report.overall_adherence, 0);
    }

    #[test]
    fn test_day_counts_and_rate() {
        let occurrences = vec![
            occurrence(at(0, 9), OccurrenceStatus::Taken),
            occurrence(at(0, 13), OccurrenceStatus::Missed),
            occurrence(at(0, 21), OccurrenceStatus::Taken),
        ];

        let report = aggregate(day(0), day(0), &occurrences);
        let bucket = &report.days[0];

        assert_eq!(bucket.taken, 2);
        assert_eq!(bucket.missed, 1);
        assert_eq!(bucket.total, 3);
        assert!((bucket.adherence_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!(bucket.adherence_rate >= 0.0 && bucket.adherence_rate <= 1.0);
    }

    #[test]
    fn test_overall_excludes_upcoming() {
        // 4 taken, 1 missed, 2 upcoming across the week -> round(4/5 * 100)
        let occurrences = vec![
            occurrence(at(0, 9), OccurrenceStatus::Taken),
            occurrence(at(1, 9), OccurrenceStatus::Taken),
            occurrence(at(2, 9), OccurrenceStatus::Taken),
            occurrence(at(3, 9), OccurrenceStatus::Taken),
            occurrence(at(4, 9), OccurrenceStatus::Missed),
            occurrence(at(5, 9), OccurrenceStatus::Upcoming),
            occurrence(at(6, 9), OccurrenceStatus::Upcoming),
        ];

        let report = aggregate(day(0), day(6), &occurrences);
        assert_eq!(report.overall_adherence, 80);
    }

    #[test]
    fn test_buckets_match_calendar_date_not_24h_window() {
        // 23:59 Monday and 00:01 Tuesday land in different buckets
        let occurrences = vec![
            occurrence(
                day(0).and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap()),
                OccurrenceStatus::Taken,
            ),
            occurrence(
                day(1).and_time(NaiveTime::from_hms_opt(0, 1, 0).unwrap()),
                OccurrenceStatus::Missed,
            ),
        ];

        let report = aggregate(day(0), day(1), &occurrences);
        assert_eq!(report.days[0].taken, 1);
        assert_eq!(report.days[0].total, 1);
        assert_eq!(report.days[1].missed, 1);
        assert_eq!(report.days[1].total, 1);
    }

    #[test]
    fn test_occurrences_outside_range_ignored() {
        let occurrences = vec![
            occurrence(at(0, 9), OccurrenceStatus::Taken),
            occurrence(at(10, 9), OccurrenceStatus::Missed),
        ];

        let report = aggregate(day(0), day(6), &occurrences);
        assert_eq!(report.overall_adherence, 100);
    }

    #[test]
    fn test_rounding_to_nearest_integer() {
        // 1 taken, 2 missed -> round(33.33) = 33
        let occurrences = vec![
            occurrence(at(0, 9), OccurrenceStatus::Taken),
            occurrence(at(0, 13), OccurrenceStatus::Missed),
            occurrence(at(0, 21), OccurrenceStatus::Missed),
        ];

        let report = aggregate(day(0), day(0), &occurrences);
        assert_eq!(report.overall_adherence, 33);

        // 2 taken, 1 missed -> round(66.67) = 67
        let occurrences = vec![
            occurrence(at(0, 9), OccurrenceStatus::Taken),
            occurrence(at(0, 13), OccurrenceStatus::Taken),
            occurrence(at(0, 21), OccurrenceStatus::Missed),
        ];

        let report = aggregate(day(0), day(0), &occurrences);
        assert_eq!(report.overall_adherence, 67);
    }
}

//! Point-in-time status classification for occurrences.
//!
//! Status is stored, not derived: an explicit taken mark must survive any
//! later passage-of-time reclassification, so reads re-derive the status of
//! unresolved occurrences through this single function and treat `Taken` as
//! terminal-until-action.

use crate::types::{Occurrence, OccurrenceStatus};
use chrono::NaiveDateTime;

/// Reclassify an occurrence against `now`
///
/// Taken is sticky and never reverted by time passing. Anything else is
/// missed once its scheduled time is strictly in the past, and upcoming
/// while it is not. Pure: the stored row only changes if the caller
/// persists the result. Idempotent for any fixed `now`.
pub fn classify_on_read(occurrence: &Occurrence, now: NaiveDateTime) -> OccurrenceStatus {
    match occurrence.status {
        OccurrenceStatus::Taken => OccurrenceStatus::Taken,
        OccurrenceStatus::Upcoming | OccurrenceStatus::Missed => {
            if occurrence.scheduled_at < now {
                OccurrenceStatus::Missed
            } else {
                OccurrenceStatus::Upcoming
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn occurrence(status: OccurrenceStatus, scheduled_at: NaiveDateTime) -> Occurrence {
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

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    #[test]
    fn test_upcoming_flips_to_missed_once_past() {
        let occ = occurrence(OccurrenceStatus::Upcoming, at(9));

        assert_eq!(classify_on_read(&occ, at(10)), OccurrenceStatus::Missed);
    }

    #[test]
    fn test_upcoming_stays_upcoming_until_scheduled_time() {
        let occ = occurrence(OccurrenceStatus::Upcoming, at(9));

        assert_eq!(classify_on_read(&occ, at(8)), OccurrenceStatus::Upcoming);
        // Exactly at the scheduled time is not yet past
        assert_eq!(classify_on_read(&occ, at(9)), OccurrenceStatus::Upcoming);
    }

    #[test]
    fn test_taken_is_sticky_for_any_now() {
        let occ = occurrence(OccurrenceStatus::Taken, at(9));

        assert_eq!(classify_on_read(&occ, at(8)), OccurrenceStatus::Taken);
        assert_eq!(classify_on_read(&occ, at(10)), OccurrenceStatus::Taken);
        assert_eq!(
            classify_on_read(&occ, at(10) + Duration::days(365)),
            OccurrenceStatus::Taken
        );
    }

    #[test]
    fn test_idempotent_for_fixed_now() {
        let mut occ = occurrence(OccurrenceStatus::Upcoming, at(9));
        let now = at(10);

        let first = classify_on_read(&occ, now);
        occ.status = first;
        let second = classify_on_read(&occ, now);

        assert_eq!(first, second);
    }

    #[test]
    fn test_missed_already_missed_is_unchanged() {
        let occ = occurrence(OccurrenceStatus::Missed, at(9));

        assert_eq!(classify_on_read(&occ, at(10)), OccurrenceStatus::Missed);
    }
}

//! Occurrence materialization over the scheduling horizon.
//!
//! A new medication is expanded up front into one occurrence per matching
//! date in a fixed forward window. Each occurrence is a durable row with a
//! stable identity, which keeps status mutation (mark-taken, mark-missed)
//! a simple in-place update instead of a derived-value recomputation.

use crate::rule::RecurrenceRule;
use crate::types::{Medication, NewOccurrence, OccurrenceStatus};
use chrono::{Duration, NaiveDateTime};

/// Forward window over which occurrences are pre-generated, in days.
///
/// The horizon is never extended automatically; a fresh batch requires an
/// explicit re-materialization (see `tracker::extend_horizon`).
pub const HORIZON_DAYS: u32 = 30;

/// Expand a medication's schedule into occurrences for the default horizon
pub fn materialize(medication: &Medication, now: NaiveDateTime) -> Vec<NewOccurrence> {
    materialize_horizon(medication, now, HORIZON_DAYS)
}

/// Expand a medication's schedule over `[now.date(), now.date() + horizon)`
///
/// Produces exactly one occurrence per date the recurrence rule matches.
/// Today's occurrence starts as missed when its scheduled time is already
/// strictly in the past at materialization time; everything else starts
/// upcoming. An empty weekday set yields no occurrences — validation should
/// have rejected it upstream, but expansion itself is a no-op, not an error.
pub fn materialize_horizon(
    medication: &Medication,
    now: NaiveDateTime,
    horizon_days: u32,
) -> Vec<NewOccurrence> {
    let rule = RecurrenceRule::for_medication(medication);
    let start = now.date();
    let mut occurrences = Vec::new();

    for offset in 0..horizon_days {
        let date = start + Duration::days(i64::from(offset));

        if let Some(scheduled_at) = rule.occurrence_at(date) {
            // Only today's dose can already be in the past.
            let status = if scheduled_at < now {
                OccurrenceStatus::Missed
            } else {
                OccurrenceStatus::Upcoming
            };

            occurrences.push(NewOccurrence {
                medication_id: medication.id,
                scheduled_at,
                status,
                taken_at: None,
                user_id: medication.user_id,
            });
        }
    }

    tracing::debug!(
        "Materialized {} occurrences for medication {}",
        occurrences.len(),
        medication.id
    );

    occurrences
}

//! Tracker operations: the computations exposed to the routing/CLI layer.
//!
//! Each operation runs to completion against the record store with no
//! interleaving; materialization, classification and aggregation are pure
//! computation over already-fetched rows. The `reclassified` helper is the
//! single site that writes classification results back, so every read path
//! shares one time-classification policy.

use crate::adherence::{self, AdherenceReport};
use crate::error::{Error, Result};
use crate::schedule;
use crate::status::classify_on_read;
use crate::store::RecordStore;
use crate::types::{
    Medication, MedicationChanges, NewMedication, Occurrence, OccurrenceStatus,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use uuid::Uuid;

/// One row of the today view: an occurrence joined with its medication's
/// display fields
#[derive(Clone, Debug, serde::Serialize)]
pub struct TodayEntry {
    pub occurrence_id: Uuid,
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub notes: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub status: OccurrenceStatus,
    pub taken_at: Option<NaiveDateTime>,
}

/// Create a medication and persist its materialized horizon batch
pub fn add_medication(
    store: &mut dyn RecordStore,
    new: NewMedication,
    now: NaiveDateTime,
    horizon_days: u32,
) -> Result<Medication> {
    let medication = store.create_medication(new)?;
    let batch = schedule::materialize_horizon(&medication, now, horizon_days);

    tracing::info!(
        "Materializing {} occurrences for '{}'",
        batch.len(),
        medication.name
    );

    for occurrence in batch {
        store.create_occurrence(occurrence)?;
    }

    Ok(medication)
}

/// Today's occurrences, classified against `now` and joined with their
/// medication's display fields
///
/// Occurrences whose medication has since been deleted are skipped (the
/// store retains them, but there is nothing to display).
pub fn today_view(store: &mut dyn RecordStore, now: NaiveDateTime) -> Result<Vec<TodayEntry>> {
    let occurrences = store.occurrences_on(now.date())?;
    let occurrences = reclassified(store, occurrences, now)?;

    let mut entries = Vec::with_capacity(occurrences.len());
    for occurrence in occurrences {
        let medication = match store.medication(occurrence.medication_id) {
            Ok(m) => m,
            Err(Error::NotFound { .. }) => {
                tracing::debug!(
                    "Skipping occurrence {} of deleted medication {}",
                    occurrence.id,
                    occurrence.medication_id
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        entries.push(TodayEntry {
            occurrence_id: occurrence.id,
            medication_id: medication.id,
            name: medication.name,
            dosage: medication.dosage,
            notes: medication.notes,
            scheduled_at: occurrence.scheduled_at,
            status: occurrence.status,
            taken_at: occurrence.taken_at,
        });
    }

    Ok(entries)
}

/// Classify-then-aggregate over `[start, end]` inclusive
pub fn adherence_report(
    store: &mut dyn RecordStore,
    start: NaiveDate,
    end: NaiveDate,
    now: NaiveDateTime,
) -> Result<AdherenceReport> {
    let occurrences = store.occurrences_between(start, end)?;
    let occurrences = reclassified(store, occurrences, now)?;
    Ok(adherence::aggregate(start, end, &occurrences))
}

/// Default adherence range: Monday of the current week through today
pub fn weekly_adherence(store: &mut dyn RecordStore, now: NaiveDateTime) -> Result<AdherenceReport> {
    let today = now.date();
    adherence_report(store, adherence::week_start(today), today, now)
}

/// Mark an occurrence taken
///
/// Valid from any prior status — late-marking a missed dose is allowed and
/// overrides it. `taken_at` defaults to `now`; re-marking simply updates
/// the timestamp.
pub fn mark_taken(
    store: &mut dyn RecordStore,
    id: Uuid,
    taken_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Result<Occurrence> {
    let taken_at = taken_at.unwrap_or(now);
    let occurrence = store.update_occurrence_status(id, OccurrenceStatus::Taken, Some(taken_at))?;

    tracing::info!("Marked occurrence {} taken at {}", id, taken_at);
    Ok(occurrence)
}

/// Explicitly mark an occurrence missed, clearing any taken timestamp
pub fn mark_missed(store: &mut dyn RecordStore, id: Uuid) -> Result<Occurrence> {
    let occurrence = store.update_occurrence_status(id, OccurrenceStatus::Missed, None)?;

    tracing::info!("Marked occurrence {} missed", id);
    Ok(occurrence)
}

/// Apply field changes to a medication
///
/// Already-materialized occurrences keep the schedule they were created
/// under; changes only affect batches materialized afterwards.
pub fn update_medication(
    store: &mut dyn RecordStore,
    id: Uuid,
    changes: MedicationChanges,
) -> Result<Medication> {
    store.update_medication(id, changes)
}

/// Materialize a fresh horizon batch for an existing medication
///
/// The horizon is never extended implicitly; this is the explicit external
/// trigger. Dates that already carry an occurrence for the medication are
/// skipped, so re-running is idempotent. Returns the number of occurrences
/// created.
pub fn extend_horizon(
    store: &mut dyn RecordStore,
    id: Uuid,
    now: NaiveDateTime,
    horizon_days: u32,
) -> Result<usize> {
    let medication = store.medication(id)?;

    let start = now.date();
    let end = start + Duration::days(i64::from(horizon_days));
    let covered: HashSet<NaiveDate> = store
        .occurrences_between(start, end)?
        .into_iter()
        .filter(|o| o.medication_id == id)
        .map(|o| o.scheduled_at.date())
        .collect();

    let mut created = 0;
    for occurrence in schedule::materialize_horizon(&medication, now, horizon_days) {
        if covered.contains(&occurrence.scheduled_at.date()) {
            continue;
        }
        store.create_occurrence(occurrence)?;
        created += 1;
    }

    tracing::info!(
        "Extended horizon for '{}': {} new occurrences",
        medication.name,
        created
    );
    Ok(created)
}

/// Apply `classify_on_read` to each occurrence, writing back any change
fn reclassified(
    store: &mut dyn RecordStore,
    occurrences: Vec<Occurrence>,
    now: NaiveDateTime,
) -> Result<Vec<Occurrence>> {
    let mut result = Vec::with_capacity(occurrences.len());

    for occurrence in occurrences {
        let status = classify_on_read(&occurrence, now);
        if status != occurrence.status {
            result.push(store.update_occurrence_status(occurrence.id, status, occurrence.taken_at)?);
        } else {
            result.push(occurrence);
        }
    }

    Ok(result)
}

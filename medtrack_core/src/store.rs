//! Record store collaborator: trait plus the in-memory implementation.
//!
//! The tracker only needs the operations below; a durable backend can be
//! swapped in by implementing `RecordStore` (and bringing its own
//! `IdSource`, e.g. a database sequence).

use crate::error::{Error, Result};
use crate::snapshot::StoreSnapshot;
use crate::types::{
    Medication, MedicationChanges, NewMedication, NewOccurrence, Occurrence, OccurrenceStatus,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use uuid::Uuid;

/// Identity assignment strategy, injected so the store can be swapped for a
/// durable implementation without the core depending on in-process counters
pub trait IdSource {
    fn next_id(&mut self) -> Uuid;
}

/// Default identity source: random v4 UUIDs
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Store operations required by the tracker
///
/// Range queries match on the local calendar date of the scheduled
/// timestamp; both bounds are inclusive.
pub trait RecordStore {
    fn create_medication(&mut self, new: NewMedication) -> Result<Medication>;
    fn medication(&self, id: Uuid) -> Result<Medication>;
    fn medications(&self) -> Result<Vec<Medication>>;
    fn update_medication(&mut self, id: Uuid, changes: MedicationChanges) -> Result<Medication>;
    fn delete_medication(&mut self, id: Uuid) -> Result<()>;

    fn create_occurrence(&mut self, new: NewOccurrence) -> Result<Occurrence>;
    fn occurrence(&self, id: Uuid) -> Result<Occurrence>;
    fn update_occurrence_status(
        &mut self,
        id: Uuid,
        status: OccurrenceStatus,
        taken_at: Option<NaiveDateTime>,
    ) -> Result<Occurrence>;
    fn occurrences_on(&self, date: NaiveDate) -> Result<Vec<Occurrence>>;
    fn occurrences_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Occurrence>>;
}

/// In-memory store backed by two maps
///
/// `&mut self` receivers serialize mutations per store instance, which is
/// the per-identity update guard the tracker's read-classify-write cycle
/// relies on. Deleting a medication does not cascade to its occurrences;
/// history rows are retained.
pub struct MemoryStore {
    medications: HashMap<Uuid, Medication>,
    occurrences: HashMap<Uuid, Occurrence>,
    ids: Box<dyn IdSource + Send>,
}

impl MemoryStore {
    /// Create an empty store with random UUID identities
    pub fn new() -> Self {
        Self::with_ids(Box::new(RandomIds))
    }

    /// Create an empty store with an injected identity source
    pub fn with_ids(ids: Box<dyn IdSource + Send>) -> Self {
        Self {
            medications: HashMap::new(),
            occurrences: HashMap::new(),
            ids,
        }
    }

    /// Rebuild a store from a snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self::new();
        for medication in snapshot.medications {
            store.medications.insert(medication.id, medication);
        }
        for occurrence in snapshot.occurrences {
            store.occurrences.insert(occurrence.id, occurrence);
        }
        store
    }

    /// Capture the store contents for persistence
    ///
    /// Records are sorted by id so repeated snapshots of the same contents
    /// serialize identically.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut medications: Vec<Medication> = self.medications.values().cloned().collect();
        medications.sort_by_key(|m| m.id);

        let mut occurrences: Vec<Occurrence> = self.occurrences.values().cloned().collect();
        occurrences.sort_by_key(|o| o.id);

        StoreSnapshot {
            medications,
            occurrences,
        }
    }

    fn sorted_by_schedule(mut occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
        occurrences.sort_by_key(|o| o.scheduled_at);
        occurrences
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn create_medication(&mut self, new: NewMedication) -> Result<Medication> {
        let medication = Medication {
            id: self.ids.next_id(),
            name: new.name,
            dosage: new.dosage,
            reminder_time: new.reminder_time,
            frequency: new.frequency,
            days: new.days,
            notes: new.notes,
            user_id: new.user_id,
        };
        self.medications.insert(medication.id, medication.clone());
        Ok(medication)
    }

    fn medication(&self, id: Uuid) -> Result<Medication> {
        self.medications
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::medication_not_found(id))
    }

    fn medications(&self) -> Result<Vec<Medication>> {
        let mut all: Vec<Medication> = self.medications.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    fn update_medication(&mut self, id: Uuid, changes: MedicationChanges) -> Result<Medication> {
        let medication = self
            .medications
            .get_mut(&id)
            .ok_or_else(|| Error::medication_not_found(id))?;

        if let Some(name) = changes.name {
            medication.name = name;
        }
        if let Some(dosage) = changes.dosage {
            medication.dosage = Some(dosage);
        }
        if let Some(reminder_time) = changes.reminder_time {
            medication.reminder_time = reminder_time;
        }
        if let Some(frequency) = changes.frequency {
            medication.frequency = frequency;
        }
        if let Some(days) = changes.days {
            medication.days = days;
        }
        if let Some(notes) = changes.notes {
            medication.notes = Some(notes);
        }

        Ok(medication.clone())
    }

    fn delete_medication(&mut self, id: Uuid) -> Result<()> {
        self.medications
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::medication_not_found(id))
    }

    fn create_occurrence(&mut self, new: NewOccurrence) -> Result<Occurrence> {
        let occurrence = Occurrence {
            id: self.ids.next_id(),
            medication_id: new.medication_id,
            scheduled_at: new.scheduled_at,
            status: new.status,
            taken_at: new.taken_at,
            user_id: new.user_id,
        };
        self.occurrences.insert(occurrence.id, occurrence.clone());
        Ok(occurrence)
    }

    fn occurrence(&self, id: Uuid) -> Result<Occurrence> {
        self.occurrences
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::occurrence_not_found(id))
    }

    fn update_occurrence_status(
        &mut self,
        id: Uuid,
        status: OccurrenceStatus,
        taken_at: Option<NaiveDateTime>,
    ) -> Result<Occurrence> {
        let occurrence = self
            .occurrences
            .get_mut(&id)
            .ok_or_else(|| Error::occurrence_not_found(id))?;

        occurrence.status = status;
        occurrence.taken_at = taken_at;

        Ok(occurrence.clone())
    }

    fn occurrences_on(&self, date: NaiveDate) -> Result<Vec<Occurrence>> {
        let matching = self
            .occurrences
            .values()
            .filter(|o| o.scheduled_at.date() == date)
            .cloned()
            .collect();
        Ok(Self::sorted_by_schedule(matching))
    }

    fn occurrences_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Occurrence>> {
        let matching = self
            .occurrences
            .values()
            .filter(|o| {
                let date = o.scheduled_at.date();
                date >= start && date <= end
            })
            .cloned()
            .collect();
        Ok(Self::sorted_by_schedule(matching))
    }
}

//! Core domain types for the medication reminder system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Weekdays and frequency descriptors
//! - Medication definitions
//! - Occurrences (scheduled doses) and their status

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Schedule Types
// ============================================================================

/// Day of the week, Monday-first (ISO ordering).
///
/// Used uniformly by the recurrence rule, the materializer and the adherence
/// aggregator, so weekday handling never falls back to string keys.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in ISO order, Monday first
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Convert from the chrono weekday of a calendar date
    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }

    /// Three-letter display abbreviation ("Mon".."Sun")
    pub fn abbrev(&self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }

    /// Parse a weekday from its full or abbreviated lowercase name
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "mon" | "monday" => Some(Weekday::Monday),
            "tue" | "tues" | "tuesday" => Some(Weekday::Tuesday),
            "wed" | "wednesday" => Some(Weekday::Wednesday),
            "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thursday),
            "fri" | "friday" => Some(Weekday::Friday),
            "sat" | "saturday" => Some(Weekday::Saturday),
            "sun" | "sunday" => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// How often a medication is taken.
///
/// This is a descriptor carried on the medication record; occurrence
/// expansion is driven by the weekday set alone.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Daily,
    TwiceDaily,
    Weekly,
    Monthly,
    Custom,
}

impl Frequency {
    /// Parse a frequency from its wire form ("daily", "twice-daily", ...)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "twice-daily" => Some(Frequency::TwiceDaily),
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            "custom" => Some(Frequency::Custom),
            _ => None,
        }
    }
}

// ============================================================================
// Medication Types
// ============================================================================

/// A registered medication with its reminder schedule
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: Option<String>,
    pub reminder_time: NaiveTime,
    pub frequency: Frequency,
    pub days: BTreeSet<Weekday>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
}

/// Fields for creating a medication (identity is assigned by the store)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewMedication {
    pub name: String,
    pub dosage: Option<String>,
    pub reminder_time: NaiveTime,
    pub frequency: Frequency,
    pub days: BTreeSet<Weekday>,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
}

impl NewMedication {
    /// Validate the definition before it reaches the core
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Medication name is required".to_string());
        }
        if self.days.is_empty() {
            errors.push("At least one weekday must be selected".to_string());
        }

        errors
    }
}

/// Field-by-field medication update; `None` leaves the stored value as is
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct MedicationChanges {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub reminder_time: Option<NaiveTime>,
    pub frequency: Option<Frequency>,
    pub days: Option<BTreeSet<Weekday>>,
    pub notes: Option<String>,
}

// ============================================================================
// Occurrence Types
// ============================================================================

/// Status of a single scheduled dose
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Upcoming,
    Taken,
    Missed,
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OccurrenceStatus::Upcoming => "upcoming",
            OccurrenceStatus::Taken => "taken",
            OccurrenceStatus::Missed => "missed",
        };
        f.write_str(name)
    }
}

/// One concrete scheduled dose of a medication on a specific date/time
///
/// Invariant: `taken_at` is set exactly when `status` is `Taken`. Resolution
/// is monotonic — a resolved occurrence never returns to `Upcoming`, though
/// an explicit taken mark may override `Missed` (late-marking).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub scheduled_at: NaiveDateTime,
    pub status: OccurrenceStatus,
    pub taken_at: Option<NaiveDateTime>,
    pub user_id: Option<Uuid>,
}

/// Fields for creating an occurrence (identity is assigned by the store)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewOccurrence {
    pub medication_id: Uuid,
    pub scheduled_at: NaiveDateTime,
    pub status: OccurrenceStatus,
    pub taken_at: Option<NaiveDateTime>,
    pub user_id: Option<Uuid>,
}

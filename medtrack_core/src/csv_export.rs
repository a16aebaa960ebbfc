//! CSV export of occurrence history.

use crate::error::Result;
use crate::types::Occurrence;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    medication_id: String,
    scheduled_at: String,
    status: String,
    taken_at: Option<String>,
}

impl From<&Occurrence> for CsvRow {
    fn from(occurrence: &Occurrence) -> Self {
        CsvRow {
            id: occurrence.id.to_string(),
            medication_id: occurrence.medication_id.to_string(),
            scheduled_at: occurrence.scheduled_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            status: occurrence.status.to_string(),
            taken_at: occurrence
                .taken_at
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// Write occurrences to `path` as CSV with headers
///
/// Returns the number of rows written.
pub fn export_occurrences(path: &Path, occurrences: &[Occurrence]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;

    for occurrence in occurrences {
        writer.serialize(CsvRow::from(occurrence))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} occurrences to {:?}", occurrences.len(), path);
    Ok(occurrences.len())
}

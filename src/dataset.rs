use std::collections::HashMap;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, XlsxError, open_workbook};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::model::event::{Event, START_FORMAT, columns};
use crate::model::row::{RawRow, RowError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open workbook: {0}")]
    Open(#[source] XlsxError),
    #[error("workbook has no worksheet")]
    NoWorksheet,
    #[error("failed to read worksheet: {0}")]
    Worksheet(#[source] XlsxError),
    #[error("worksheet has no header row")]
    MissingHeader,
    #[error("header row is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: RowError,
    },
}

/// A complete, immutable load of the events sheet keyed by event id.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    events: HashMap<String, Event>,
    loaded_at: Option<DateTime<Utc>>,
    duplicates: usize,
    skipped: usize,
}

impl Snapshot {
    /// Build a snapshot from already parsed events; a later event replaces an earlier one with the same id.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut snapshot = Snapshot { loaded_at: Some(Utc::now()), ..Snapshot::default() };
        for event in events {
            snapshot.insert(event);
        }
        snapshot
    }

    fn insert(&mut self, event: Event) {
        if let Some(previous) = self.events.insert(event.event_id.clone(), event) {
            debug!(event_id = %previous.event_id, game_id = %previous.game_id, "Replaced event with duplicate id");
            self.duplicates += 1;
        }
    }

    pub fn get(&self, event_id: &str) -> Option<&Event> {
        self.events.get(event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// When this snapshot was built; `None` for the cold-start snapshot.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Rows that were overwritten by a later row with the same event id.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Data rows left out because they had no `Game ID`.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Read the first worksheet of an events workbook into a snapshot.
///
/// Rows without a `Game ID` are skipped and counted. Missing columns fail the whole load.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, LoadError> {
    let mut workbook: Xlsx<_> = open_workbook(path.as_ref()).map_err(LoadError::Open)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)?
        .map_err(LoadError::Worksheet)?;

    let mut rows = range.rows();
    let headers: Vec<Option<String>> = rows
        .next()
        .ok_or(LoadError::MissingHeader)?
        .iter()
        .map(cell_to_string)
        .collect();
    if headers.iter().all(Option::is_none) {
        return Err(LoadError::MissingHeader);
    }

    let missing: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|name| !headers.iter().any(|h| h.as_deref() == Some(**name)))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut snapshot = Snapshot { loaded_at: Some(Utc::now()), ..Snapshot::default() };
    let mut blank_rows = 0usize;
    // Spreadsheet row numbers are 1-based and the header occupies row 1.
    for (offset, cells) in rows.enumerate() {
        let raw: RawRow = headers
            .iter()
            .zip(cells.iter().map(cell_to_string))
            .filter_map(|(header, value)| header.clone().map(|h| (h, value)))
            .collect();
        if raw.is_blank() {
            blank_rows += 1;
            continue;
        }
        let row = offset + 2;
        match Event::from_row(&raw) {
            Ok(event) => snapshot.insert(event),
            Err(RowError::EmptyValue(column)) => {
                warn!(row, column, "Skipping row with empty required value");
                snapshot.skipped += 1;
            }
            Err(source) => return Err(LoadError::Row { row, source }),
        }
    }

    info!(
        events = snapshot.len(),
        duplicates = snapshot.duplicates,
        skipped = snapshot.skipped,
        blank_rows,
        "Loaded events workbook"
    );
    Ok(snapshot)
}

/// Text form of a cell; empty and error cells have no value.
fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Some(naive.format(START_FORMAT).to_string()),
            None => Some(dt.to_string()),
        },
        other => Some(other.to_string()),
    }
}

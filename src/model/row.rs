use std::collections::HashMap;

use thiserror::Error;

/// Why a single spreadsheet row could not become an [`Event`](crate::model::event::Event).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("empty value in required column '{0}'")]
    EmptyValue(&'static str),
}

/// One data row keyed by header name. A header that exists with an empty cell maps to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, Option<String>>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: Option<String>) {
        self.cells.insert(header.into(), value);
    }

    /// Cell value for a column the row cannot be built without.
    /// Fails only when the header itself is absent.
    pub fn required(&self, column: &'static str) -> Result<Option<&str>, RowError> {
        self.cells
            .get(column)
            .map(|v| v.as_deref())
            .ok_or(RowError::MissingColumn(column))
    }

    /// Cell value for a column with its own fallback; absent header, empty and blank cells are all `None`.
    pub fn optional(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .and_then(|v| v.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// True when every cell is empty (trailing rows in exported sheets).
    pub fn is_blank(&self) -> bool {
        self.cells
            .values()
            .all(|v| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

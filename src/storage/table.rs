//! The reconciled record table and its change application rules.
//!
//! Rows are `(date_added, address, name)` facts. Additions are deduplicated
//! on the exact normalized triple; deletions purge every row carrying the
//! name, compared case-insensitively.

use std::collections::HashSet;
use std::io::Read;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::Result;
use crate::models::ChangeEvent;
use crate::utils::dates::{ISO_FORMAT, parse_iso};

/// Header line of the persisted table.
pub const HEADER: &str = "date_added,address,name";

/// One persisted fact.
///
/// Fields are kept as read so rows that were written by hand survive a
/// rewrite untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreRow {
    #[serde(default)]
    pub date_added: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
}

impl StoreRow {
    /// Build a normalized row for an addition.
    pub fn new(date: NaiveDate, name: &str, address: &str) -> Self {
        Self {
            date_added: date.format(ISO_FORMAT).to_string(),
            address: address.trim().to_lowercase(),
            name: name.trim().to_string(),
        }
    }

    /// Parsed `date_added`, if well-formed.
    pub fn date(&self) -> Option<NaiveDate> {
        parse_iso(&self.date_added).ok()
    }

    /// Whether this row states the same fact as the normalized `other`.
    fn same_fact(&self, other: &StoreRow) -> bool {
        self.date_added.trim() == other.date_added
            && self.address.trim().to_lowercase() == other.address
            && self.name.trim() == other.name
    }

    /// CSV line; the name is always quoted, the other fields never are.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},\"{}\"",
            self.date_added,
            self.address,
            self.name.replace('"', "\"\"")
        )
    }
}

/// Outcome of applying a change list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub added: usize,
    pub skipped: usize,
    pub removed: usize,
}

/// Names already present in the table, used to gate deletions.
#[derive(Debug, Clone, Default)]
pub struct ExistingNames(HashSet<String>);

impl ExistingNames {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: &str) -> bool {
        self.0.insert(name.to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExistingNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// In-memory copy of the persisted table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    rows: Vec<StoreRow>,
}

impl RecordTable {
    pub fn new(rows: Vec<StoreRow>) -> Self {
        Self { rows }
    }

    /// Read a table from CSV with a `date_added,address,name` header.
    pub fn from_csv(reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let rows = csv_reader
            .deserialize::<StoreRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Serialize the whole table, header included.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(HEADER.len() + 1 + self.rows.len() * 64);
        out.push_str(HEADER);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.to_csv_line());
            out.push('\n');
        }
        out
    }

    pub fn rows(&self) -> &[StoreRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-empty stripped names currently in the table.
    pub fn existing_names(&self) -> ExistingNames {
        self.rows
            .iter()
            .map(|row| row.name.trim())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Most recent well-formed `date_added`.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.rows.iter().filter_map(StoreRow::date).max()
    }

    /// Apply `changes` in order.
    pub fn apply(&mut self, changes: &[ChangeEvent]) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for change in changes {
            match change {
                ChangeEvent::Deletion { name, .. } => {
                    let removed = self.remove_name(name);
                    if removed > 0 {
                        log::info!("Removed {} row(s) for deletion: {}", removed, name);
                    } else {
                        log::debug!("Deletion matched no rows: {}", name);
                    }
                    summary.removed += removed;
                }
                ChangeEvent::Addition {
                    date,
                    name,
                    address,
                } => {
                    let row = StoreRow::new(*date, name, address);
                    if self.rows.iter().any(|existing| existing.same_fact(&row)) {
                        log::info!("Skipped duplicate: {} - {}", row.name, row.address);
                        summary.skipped += 1;
                    } else {
                        log::info!("Added row: {} - {}", row.name, row.address);
                        self.rows.push(row);
                        summary.added += 1;
                    }
                }
            }
        }

        summary
    }

    /// Remove every row whose name matches `name` ignoring case and padding.
    fn remove_name(&mut self, name: &str) -> usize {
        let target = name.trim().to_lowercase();
        let before = self.rows.len();
        self.rows
            .retain(|row| row.name.trim().to_lowercase() != target);
        before - self.rows.len()
    }
}

//! Resume cursor for successive runs.

use chrono::NaiveDate;

use crate::error::Result;
use crate::storage::{RecordStorage, RecordTable};

/// Reads and advances the last fully processed date.
pub struct RunCursor<'a> {
    storage: &'a dyn RecordStorage,
}

impl<'a> RunCursor<'a> {
    pub fn new(storage: &'a dyn RecordStorage) -> Self {
        Self { storage }
    }

    /// Resume date: the saved cursor, else the newest row in `table`.
    pub async fn load(&self, table: &RecordTable) -> Result<Option<NaiveDate>> {
        if let Some(date) = self.storage.load_cursor().await? {
            return Ok(Some(date));
        }

        let latest = table.latest_date();
        if let Some(date) = latest {
            log::info!("Using last date from the record table: {}", date);
        }
        Ok(latest)
    }

    /// Record `date` as fully processed.
    pub async fn save(&self, date: NaiveDate) -> Result<()> {
        self.storage.save_cursor(date).await
    }
}

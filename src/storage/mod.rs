//! Storage abstractions for the record table and run cursor.
//!
//! The table is read once when a run starts and written once when it ends;
//! the cursor is written only after the table write succeeded, so a failed
//! run leaves the cursor behind the table and the next run reprocesses the
//! window.

pub mod cursor;
pub mod local;
pub mod table;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;

// Re-export for convenience
pub use cursor::RunCursor;
pub use local::LocalStorage;
pub use table::{ApplySummary, ExistingNames, RecordTable, StoreRow};

/// Trait for record table and cursor backends.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Load the full table; a missing table is empty.
    async fn load_table(&self) -> Result<RecordTable>;

    /// Replace the persisted table.
    async fn save_table(&self, table: &RecordTable) -> Result<()>;

    /// Saved cursor, if present and well-formed.
    async fn load_cursor(&self) -> Result<Option<NaiveDate>>;

    /// Overwrite the saved cursor.
    async fn save_cursor(&self, date: NaiveDate) -> Result<()>;
}

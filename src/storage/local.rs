//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml   # Tracker configuration
//! ├── data.csv      # Reconciled record table
//! └── log.txt       # Run cursor (last processed date)
//! ```
//!
//! File names come from `[paths]` in the configuration. Writes go to a
//! temporary file that is renamed over the target.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::PathsConfig;
use crate::storage::{RecordStorage, RecordTable};
use crate::utils::dates::{ISO_FORMAT, parse_iso};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    store_key: String,
    cursor_key: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            store_key: paths.store_file.clone(),
            cursor_key: paths.cursor_file.clone(),
        }
    }

    pub fn root_dir(&self) -> &PathBuf {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    pub fn store_path(&self) -> PathBuf {
        self.path(&self.store_key)
    }

    pub fn cursor_path(&self) -> PathBuf {
        self.path(&self.cursor_key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl RecordStorage for LocalStorage {
    async fn load_table(&self) -> Result<RecordTable> {
        let path = self.store_path();
        let bytes = self
            .read_bytes(&self.store_key)
            .await
            .map_err(|e| AppError::store(path.display(), e))?;

        match bytes {
            Some(bytes) => {
                let table = RecordTable::from_csv(bytes.as_slice())
                    .map_err(|e| AppError::store(path.display(), e))?;
                log::info!("Loaded {} row(s) from {}", table.len(), path.display());
                Ok(table)
            }
            None => {
                log::warn!("{} not found, starting with an empty table", path.display());
                Ok(RecordTable::default())
            }
        }
    }

    async fn save_table(&self, table: &RecordTable) -> Result<()> {
        self.write_bytes(&self.store_key, table.to_csv().as_bytes())
            .await
            .map_err(|e| AppError::store(self.store_path().display(), e))
    }

    async fn load_cursor(&self) -> Result<Option<NaiveDate>> {
        let Some(bytes) = self.read_bytes(&self.cursor_key).await? else {
            return Ok(None);
        };

        let text = String::from_utf8_lossy(&bytes);
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        match parse_iso(text) {
            Ok(date) => Ok(Some(date)),
            Err(e) => {
                log::warn!(
                    "Ignoring malformed cursor in {}: {:?} ({})",
                    self.cursor_path().display(),
                    text,
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save_cursor(&self, date: NaiveDate) -> Result<()> {
        let text = date.format(ISO_FORMAT).to_string();
        self.write_bytes(&self.cursor_key, text.as_bytes()).await?;
        log::info!("Saved last processed date to {}: {}", self.cursor_path().display(), text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeEvent;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn storage(tmp: &TempDir) -> LocalStorage {
        LocalStorage::new(tmp.path(), &PathsConfig::default())
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp.path().join("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn missing_table_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let table = storage(&tmp).load_table().await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn table_is_persisted_in_store_format() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        let mut table = RecordTable::default();
        table.apply(&[ChangeEvent::addition(date(2025, 1, 1), "DOE, JOHN", "0xABC")]);
        storage.save_table(&table).await.unwrap();

        let text = std::fs::read_to_string(tmp.path().join("data.csv")).unwrap();
        assert_eq!(text, "date_added,address,name\n2025-01-01,0xabc,\"DOE, JOHN\"\n");
        assert_eq!(storage.load_table().await.unwrap(), table);
    }

    #[tokio::test]
    async fn unreadable_table_is_a_store_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("data.csv")).unwrap();

        let err = storage(&tmp).load_table().await.unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
    }

    #[tokio::test]
    async fn cursor_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        assert_eq!(storage.load_cursor().await.unwrap(), None);
        storage.save_cursor(date(2025, 6, 30)).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("log.txt")).unwrap(),
            "2025-06-30"
        );
        assert_eq!(storage.load_cursor().await.unwrap(), Some(date(2025, 6, 30)));

        storage.save_cursor(date(2025, 7, 1)).await.unwrap();
        assert_eq!(storage.load_cursor().await.unwrap(), Some(date(2025, 7, 1)));
    }

    #[tokio::test]
    async fn malformed_or_blank_cursor_is_absent() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);

        std::fs::write(tmp.path().join("log.txt"), "June 30th").unwrap();
        assert_eq!(storage.load_cursor().await.unwrap(), None);

        std::fs::write(tmp.path().join("log.txt"), "  \n").unwrap();
        assert_eq!(storage.load_cursor().await.unwrap(), None);

        std::fs::write(tmp.path().join("log.txt"), "2025-01-10\n").unwrap();
        assert_eq!(storage.load_cursor().await.unwrap(), Some(date(2025, 1, 10)));
    }
}

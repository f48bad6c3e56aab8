// src/pipeline/run.rs

//! Incremental tracking run.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::ChangeEvent;
use crate::services::{BulletinIndex, BulletinSource, ChangeCollector, EntityResolver, SanctionsSearch};
use crate::storage::{ApplySummary, RecordStorage, RunCursor};

use super::window::RunWindow;

/// Command-line dates for a run.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Local date used as the open end of the window
    pub today: NaiveDate,
}

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub window: RunWindow,
    pub bulletin_count: usize,
    pub changes: Vec<ChangeEvent>,
    pub summary: ApplySummary,
}

/// Run the tracker over one date window.
///
/// The table is loaded before anything touches the network and a load
/// failure aborts the run. Changes are printed to stdout before they are
/// applied. The cursor advances to the window end only after the table has
/// been written.
pub async fn run_tracker<B, S>(
    storage: &dyn RecordStorage,
    source: &B,
    resolver: &EntityResolver<S>,
    request: &RunRequest,
) -> Result<RunReport>
where
    B: BulletinSource,
    S: SanctionsSearch,
{
    let mut table = storage.load_table().await?;
    let cursor = RunCursor::new(storage);

    // An explicit start ignores the cursor
    let resume = match request.start {
        Some(_) => None,
        None => cursor.load(&table).await?,
    };
    let window = RunWindow::resolve(request.start, request.end, resume, request.today)?;
    log::info!("Processing bulletins from {} to {}", window.start, window.end);

    let mut existing = table.existing_names();
    log::info!("Loaded {} known name(s)", existing.len());

    let bulletins = BulletinIndex::new(source)
        .collect(window.start, window.end)
        .await;
    log::info!("Found {} bulletin(s) in range", bulletins.len());

    let changes = ChangeCollector::new(source, resolver)
        .collect(&bulletins, &mut existing)
        .await;

    for change in &changes {
        println!("{change}");
    }

    let summary = table.apply(&changes);
    storage.save_table(&table).await.inspect_err(|e| {
        log::error!(
            "Failed to write record table, {} change(s) not persisted: {}",
            changes.len(),
            e
        );
    })?;
    log::info!(
        "Updated record table: {} deletion(s), {} addition(s), {} duplicate(s) skipped",
        summary.removed,
        summary.added,
        summary.skipped
    );

    cursor.save(window.end).await?;

    Ok(RunReport {
        window,
        bulletin_count: bulletins.len(),
        changes,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::error::AppError;
    use crate::models::{
        BulletinLink, BulletinSections, IdentificationRecord, PathsConfig, SearchCandidate,
    };
    use crate::storage::{LocalStorage, RecordTable, StoreRow};

    const ETH: &str = "Digital Currency Address - ETH";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// One listing page plus bulletin contents; counts listing requests.
    #[derive(Default)]
    struct FakeSite {
        listing: Vec<BulletinLink>,
        bulletins: HashMap<String, BulletinSections>,
        listing_requests: Mutex<usize>,
    }

    impl FakeSite {
        fn bulletin(mut self, url: &str, on: NaiveDate, sections: BulletinSections) -> Self {
            self.listing.push(BulletinLink::new(url, on));
            self.bulletins.insert(url.to_string(), sections);
            self
        }

        fn listing_requests(&self) -> usize {
            *self.listing_requests.lock().unwrap()
        }
    }

    #[async_trait]
    impl BulletinSource for FakeSite {
        async fn listing_page(&self, page: usize) -> Result<Vec<BulletinLink>> {
            *self.listing_requests.lock().unwrap() += 1;
            Ok(if page == 0 { self.listing.clone() } else { Vec::new() })
        }

        async fn bulletin(&self, url: &str) -> Result<BulletinSections> {
            Ok(self.bulletins.get(url).cloned().unwrap_or_default())
        }
    }

    /// Resolves `DOE, John` to `0xABC`.
    struct FakeSearch;

    #[async_trait]
    impl SanctionsSearch for FakeSearch {
        async fn search(&self, name: &str) -> Result<Vec<SearchCandidate>> {
            if name != "DOE, John" {
                return Ok(Vec::new());
            }
            Ok(vec![SearchCandidate {
                name: "DOE, John (a.k.a. DOE, Jack)".to_string(),
                detail_url: Some("doe".to_string()),
                ..SearchCandidate::default()
            }])
        }

        async fn identifications(&self, _detail_url: &str) -> Result<Vec<IdentificationRecord>> {
            Ok(vec![IdentificationRecord {
                id_type: ETH.to_string(),
                id_value: "0xABC".to_string(),
            }])
        }
    }

    fn added(names: &[&str]) -> BulletinSections {
        BulletinSections {
            individuals_added: names.iter().map(|n| n.to_string()).collect(),
            ..BulletinSections::default()
        }
    }

    fn deleted(names: &[&str]) -> BulletinSections {
        BulletinSections {
            deletions: names.iter().map(|n| n.to_string()).collect(),
            ..BulletinSections::default()
        }
    }

    fn site() -> FakeSite {
        FakeSite::default()
            .bulletin("/b2", date(2025, 3, 1), deleted(&["ROE, Richard", "UNKNOWN, Person"]))
            .bulletin("/b1", date(2025, 2, 1), added(&["DOE, John"]))
    }

    /// Storage whose table writes always fail.
    #[derive(Default)]
    struct ReadOnlyStorage {
        cursor: Mutex<Option<NaiveDate>>,
    }

    #[async_trait]
    impl RecordStorage for ReadOnlyStorage {
        async fn load_table(&self) -> Result<RecordTable> {
            Ok(RecordTable::default())
        }

        async fn save_table(&self, _table: &RecordTable) -> Result<()> {
            Err(AppError::store("memory", "read-only"))
        }

        async fn load_cursor(&self) -> Result<Option<NaiveDate>> {
            Ok(*self.cursor.lock().unwrap())
        }

        async fn save_cursor(&self, date: NaiveDate) -> Result<()> {
            *self.cursor.lock().unwrap() = Some(date);
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_applies_changes_and_advances_cursor() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), &PathsConfig::default());
        std::fs::write(
            tmp.path().join("data.csv"),
            "date_added,address,name\n2024-11-01,0x999,\"ROE, Richard\"\n2024-11-01,0x998,\"ROE, Richard\"\n",
        )
        .unwrap();
        std::fs::write(tmp.path().join("log.txt"), "2025-01-15").unwrap();

        let resolver = EntityResolver::new(FakeSearch, ETH);
        let request = RunRequest {
            start: None,
            end: None,
            today: date(2025, 3, 10),
        };
        let report = run_tracker(&storage, &site(), &resolver, &request).await.unwrap();

        assert_eq!(report.window, RunWindow { start: date(2025, 1, 15), end: date(2025, 3, 10) });
        assert_eq!(report.bulletin_count, 2);
        assert_eq!(
            report.changes,
            vec![
                ChangeEvent::addition(date(2025, 2, 1), "DOE, John", "0xabc"),
                ChangeEvent::deletion(date(2025, 3, 1), "ROE, Richard"),
            ]
        );
        assert_eq!(report.summary, ApplySummary { added: 1, skipped: 0, removed: 2 });

        let table = storage.load_table().await.unwrap();
        assert_eq!(table.rows(), &[StoreRow::new(date(2025, 2, 1), "DOE, John", "0xabc")]);
        assert_eq!(storage.load_cursor().await.unwrap(), Some(date(2025, 3, 10)));
    }

    #[tokio::test]
    async fn rerunning_a_window_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), &PathsConfig::default());
        let resolver = EntityResolver::new(FakeSearch, ETH);
        let request = RunRequest {
            start: Some(date(2025, 1, 1)),
            end: Some(date(2025, 2, 28)),
            today: date(2025, 3, 10),
        };

        run_tracker(&storage, &site(), &resolver, &request).await.unwrap();
        let first = std::fs::read_to_string(tmp.path().join("data.csv")).unwrap();
        let report = run_tracker(&storage, &site(), &resolver, &request).await.unwrap();
        let second = std::fs::read_to_string(tmp.path().join("data.csv")).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, "date_added,address,name\n2025-02-01,0xabc,\"DOE, John\"\n");
        assert_eq!(report.summary, ApplySummary { added: 0, skipped: 1, removed: 0 });
        assert_eq!(storage.load_cursor().await.unwrap(), Some(date(2025, 2, 28)));
    }

    #[tokio::test]
    async fn missing_cursor_fails_before_network() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), &PathsConfig::default());
        let source = site();
        let resolver = EntityResolver::new(FakeSearch, ETH);
        let request = RunRequest {
            start: None,
            end: None,
            today: date(2025, 3, 10),
        };

        let err = run_tracker(&storage, &source, &resolver, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Window(_)));
        assert_eq!(source.listing_requests(), 0);
        assert!(!tmp.path().join("data.csv").exists());
    }

    #[tokio::test]
    async fn failed_table_write_leaves_cursor_unchanged() {
        let storage = ReadOnlyStorage {
            cursor: Mutex::new(Some(date(2025, 1, 15))),
        };
        let resolver = EntityResolver::new(FakeSearch, ETH);
        let request = RunRequest {
            start: None,
            end: None,
            today: date(2025, 3, 10),
        };

        let err = run_tracker(&storage, &site(), &resolver, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Store { .. }));
        assert_eq!(storage.load_cursor().await.unwrap(), Some(date(2025, 1, 15)));
    }
}

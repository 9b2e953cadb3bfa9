//! Snapshot store backed by a CSV file.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use ticker_core::error::StoreError;
use ticker_core::retry::RetryPolicy;
use ticker_core::types::{Row, Snapshot};
use tracing::{debug, info, warn};

use crate::csv_table::{read_table, write_table};

/// Durable, crash-safe persistence of the row table.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    exchange: String,
    retry: RetryPolicy,
}

impl SnapshotStore {
    /// Create a store for the table at `path`. Rows read back from the file
    /// are qualified with `exchange`.
    pub fn new(path: impl Into<PathBuf>, exchange: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            exchange: exchange.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the retry policy for a locked destination.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted table. A missing file is an empty snapshot.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        read_table(BufReader::new(file), &self.exchange).map_err(|reason| StoreError::Corrupt {
            path: self.path.clone(),
            reason,
        })
    }

    /// Read the persisted table, falling back to an empty snapshot when it
    /// cannot be read.
    pub fn load_or_default(&self) -> Snapshot {
        match self.load() {
            Ok(snapshot) => {
                info!(path = %self.path.display(), rows = snapshot.len(), "loaded snapshot");
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "could not load snapshot, starting empty");
                Snapshot::new()
            }
        }
    }

    /// Merge one row into the persisted table: replace the row with the same
    /// key, or append. The whole table is re-read and re-written.
    ///
    /// A corrupt table is left untouched and reported as
    /// [`StoreError::Corrupt`].
    pub async fn upsert(&self, row: &Row) -> Result<(), StoreError> {
        let mut table = self.load()?;
        let replaced = table.upsert(row.clone());
        debug!(symbol = row.symbol(), replaced, rows = table.len(), "merging row into snapshot");
        self.save(&table).await
    }

    /// Replace the persisted table with `snapshot`.
    ///
    /// The table is written to a temp file next to the destination and then
    /// renamed over it. A rename refused because the destination is held
    /// open by another program (access denied, busy, or a sharing or lock
    /// violation on Windows) is retried per the store's policy; on exhaustion
    /// the temp file is discarded and [`StoreError::Locked`] is returned.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.save_with(snapshot, |from: &Path, to: &Path| std::fs::rename(from, to))
            .await
    }

    async fn save_with<F>(&self, snapshot: &Snapshot, rename: F) -> Result<(), StoreError>
    where
        F: Fn(&Path, &Path) -> io::Result<()>,
    {
        let dir = self.directory();
        std::fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        {
            let mut writer = BufWriter::new(&mut temp);
            write_table(&mut writer, snapshot).map_err(|e| self.io_error(io::Error::from(e)))?;
            writer.flush().map_err(|source| self.io_error(source))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|source| self.io_error(source))?;

        let temp_path = temp.into_temp_path();
        let result = self
            .retry
            .run(|| rename(&temp_path, &self.path), is_locked)
            .await;

        match result {
            Ok(()) => {
                // The temp path no longer exists; stop it from being cleaned up.
                let _ = temp_path.keep();
                Ok(())
            }
            Err(e) if is_locked(&e) => {
                let attempts = self.retry.attempts();
                warn!(
                    path = %self.path.display(),
                    attempts,
                    "cannot replace snapshot, file is open in another program"
                );
                Err(StoreError::Locked {
                    path: self.path.clone(),
                    attempts,
                })
            }
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// The destination is held open by another program.
fn is_locked(e: &io::Error) -> bool {
    if matches!(e.kind(), ErrorKind::PermissionDenied | ErrorKind::ResourceBusy) {
        return true;
    }
    // ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(e.raw_os_error(), Some(32) | Some(33))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use ticker_core::types::{Instrument, Quote, Signal, Timeframe};

    fn row(symbol: &str, open: f64, signal: Signal) -> Row {
        Row::unknown(Instrument::new(symbol, "NSE"))
            .with_quote(Quote::untimed(open, open + 1.0, open - 1.0, open + 0.5, 1000.0))
            .with_signal(Timeframe::Hour1, signal)
    }

    fn store(dir: &Path) -> SnapshotStore {
        SnapshotStore::new(dir.join("stock_data.csv"), "NSE")
            .with_retry(RetryPolicy::fixed(3, Duration::from_millis(1)))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = store(dir.path()).load().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(store.path(), "not,a,snapshot\n1,2,3\n").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
        assert!(store.load_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_appends_then_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        store.upsert(&row("A", 100.0, Signal::Buy)).await.unwrap();
        store.upsert(&row("B", 50.0, Signal::Sell)).await.unwrap();
        store.upsert(&row("A", 101.0, Signal::StrongBuy)).await.unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.symbols(), vec!["A", "B"]);
        let a = snapshot.get("A").unwrap();
        assert_eq!(a.quote.unwrap().open, 101.0);
        assert_eq!(a.signal(Timeframe::Hour1), Some(Signal::StrongBuy));
    }

    #[tokio::test]
    async fn test_upsert_keeps_rows_outside_watchlist() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.upsert(&row("OLD", 10.0, Signal::Neutral)).await.unwrap();
        store.upsert(&row("NEW", 20.0, Signal::Buy)).await.unwrap();

        assert_eq!(store.load().unwrap().symbols(), vec!["OLD", "NEW"]);
    }

    #[tokio::test]
    async fn test_resave_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.upsert(&row("A", 100.25, Signal::Buy)).await.unwrap();
        store
            .upsert(&Row::unknown(Instrument::new("B", "NSE")).with_signal(Timeframe::Daily, Signal::Sell))
            .await
            .unwrap();

        let before = std::fs::read(store.path()).unwrap();
        let snapshot = store.load().unwrap();
        store.save(&snapshot).await.unwrap();
        let after = std::fs::read(store.path()).unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_upsert_refuses_to_overwrite_corrupt_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(store.path(), "garbage\n").unwrap();

        let result = store.upsert(&row("A", 1.0, Signal::Buy)).await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "garbage\n");
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        for i in 0..5 {
            store.upsert(&row("A", i as f64, Signal::Buy)).await.unwrap();
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_interrupted_write_leaves_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.upsert(&row("A", 100.0, Signal::Buy)).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        // A writer that dies after writing part of the temp file never
        // reaches the rename.
        {
            let mut temp = NamedTempFile::new_in(dir.path()).unwrap();
            temp.write_all(b"stock,Open,Hi").unwrap();
        }

        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        assert!(store.load().is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_reader_never_sees_partial_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.upsert(&row("SEED", 1.0, Signal::Neutral)).await.unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let done = Arc::clone(&done);
            let path = store.path().to_path_buf();
            std::thread::spawn(move || {
                let mut reads = 0;
                loop {
                    let bytes = std::fs::read(&path).unwrap();
                    let snapshot = read_table(bytes.as_slice(), "NSE").unwrap();
                    assert!(snapshot.contains("SEED"));
                    reads += 1;
                    if done.load(Ordering::Relaxed) {
                        break reads;
                    }
                }
            })
        };

        for i in 0..50 {
            let symbol = format!("S{}", i % 7);
            store.upsert(&row(&symbol, i as f64, Signal::Buy)).await.unwrap();
        }
        done.store(true, Ordering::Relaxed);

        assert!(reader.join().unwrap() > 0);
        assert_eq!(store.load().unwrap().len(), 8);
    }

    fn locked_rename(calls: &Cell<u32>, kind: ErrorKind) -> impl Fn(&Path, &Path) -> io::Result<()> + '_ {
        move |_: &Path, _: &Path| {
            calls.set(calls.get() + 1);
            Err(io::Error::new(kind, "file in use"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_destination_gives_up_after_retries() {
        let dir = tempfile::tempdir().unwrap();
        let retry = RetryPolicy::fixed(5, Duration::from_secs(2));
        let store = SnapshotStore::new(dir.path().join("stock_data.csv"), "NSE").with_retry(retry);
        store.upsert(&row("A", 100.0, Signal::Buy)).await.unwrap();
        let before = std::fs::read(store.path()).unwrap();

        let calls = Cell::new(0);
        let start = tokio::time::Instant::now();
        let snapshot: Snapshot = vec![row("A", 200.0, Signal::Sell)].into_iter().collect();
        let result = store
            .save_with(&snapshot, locked_rename(&calls, ErrorKind::PermissionDenied))
            .await;

        assert_eq!(calls.get(), retry.attempts());
        assert_eq!(start.elapsed(), Duration::from_secs(8));
        match result {
            Err(err @ StoreError::Locked { attempts: 5, .. }) => assert!(err.is_recoverable()),
            other => panic!("expected Locked, got {:?}", other),
        }
        assert_eq!(std::fs::read(store.path()).unwrap(), before);
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_destination_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let calls = Cell::new(0);
        let result = store
            .save_with(&Snapshot::new(), locked_rename(&calls, ErrorKind::ResourceBusy))
            .await;

        assert_eq!(calls.get(), 3);
        assert!(matches!(result, Err(StoreError::Locked { attempts: 3, .. })));
        assert!(!store.path().exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_other_rename_errors_fail_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let calls = Cell::new(0);
        let result = store
            .save_with(&Snapshot::new(), locked_rename(&calls, ErrorKind::NotFound))
            .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_locked_error_kinds() {
        assert!(is_locked(&io::Error::from(ErrorKind::PermissionDenied)));
        assert!(is_locked(&io::Error::from(ErrorKind::ResourceBusy)));
        assert!(!is_locked(&io::Error::from(ErrorKind::NotFound)));
        assert_eq!(is_locked(&io::Error::from_raw_os_error(32)), cfg!(windows));
    }
}

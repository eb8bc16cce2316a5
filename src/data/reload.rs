use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::Result;

use super::loader::load_file;
use super::model::RecordTable;

struct LoadOutcome {
    generation: u64,
    result: Result<RecordTable>,
}

/// Loads record tables off the UI thread.
///
/// Every [`request`](Self::request) supersedes the previous one: results of
/// older requests are dropped when they arrive, so only the most recent load
/// is ever handed back.
pub struct TableLoader {
    generation: u64,
    pending: bool,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl Default for TableLoader {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            generation: 0,
            pending: false,
            tx,
            rx,
        }
    }
}

impl TableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `path`.  `notify` runs on the worker once the load has
    /// finished (e.g. to request a repaint).  Returns the request generation.
    pub fn request<F>(&mut self, path: PathBuf, notify: F) -> u64
    where
        F: FnOnce() + Send + 'static,
    {
        self.generation += 1;
        self.pending = true;
        let generation = self.generation;
        let tx = self.tx.clone();

        log::debug!("load #{generation} requested for {}", path.display());
        thread::spawn(move || {
            let result = load_file(&path);
            // The receiver only disappears when the loader is dropped.
            let _ = tx.send(LoadOutcome { generation, result });
            notify();
        });
        generation
    }

    /// Whether the latest request has not completed yet.
    pub fn is_loading(&self) -> bool {
        self.pending
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Non-blocking: the latest request's result if it has arrived.
    pub fn poll(&mut self) -> Option<Result<RecordTable>> {
        let mut latest = None;
        while let Ok(outcome) = self.rx.try_recv() {
            if let Some(result) = self.accept(outcome) {
                latest = Some(result);
            }
        }
        latest
    }

    /// Block until the latest request completes.  `None` when nothing is pending.
    pub fn wait(&mut self) -> Option<Result<RecordTable>> {
        while self.pending {
            let outcome = self.rx.recv().ok()?;
            if let Some(result) = self.accept(outcome) {
                return Some(result);
            }
        }
        None
    }

    fn accept(&mut self, outcome: LoadOutcome) -> Option<Result<RecordTable>> {
        if outcome.generation != self.generation {
            log::debug!(
                "discarding stale load #{} (latest is #{})",
                outcome.generation,
                self.generation
            );
            return None;
        }
        self.pending = false;
        Some(outcome.result)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn csv_with_rows(dir: &tempfile::TempDir, name: &str, rows: usize) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "work_year,experience_level,employment_type,salary_in_usd,remote_ratio,company_size"
        )
        .unwrap();
        for i in 0..rows {
            writeln!(f, "2023,SE,FT,{},0,M", 50000 + i).unwrap();
        }
        path
    }

    #[test]
    fn only_the_latest_request_is_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let first = csv_with_rows(&dir, "first.csv", 1);
        let second = csv_with_rows(&dir, "second.csv", 3);

        let mut loader = TableLoader::new();
        loader.request(first, || {});
        let latest = loader.request(second, || {});
        assert_eq!(loader.generation(), latest);
        assert!(loader.is_loading());

        let table = loader.wait().unwrap().unwrap();
        assert_eq!(table.len(), 3);
        assert!(!loader.is_loading());
        assert!(loader.wait().is_none());
    }

    #[test]
    fn stale_outcomes_are_discarded() {
        let mut loader = TableLoader::new();
        loader.generation = 2;
        loader.pending = true;

        let stale = LoadOutcome {
            generation: 1,
            result: Ok(RecordTable::default()),
        };
        assert!(loader.accept(stale).is_none());
        assert!(loader.is_loading());

        let current = LoadOutcome {
            generation: 2,
            result: Ok(RecordTable::from_records(vec![crate::data::model::tests::record(
                1.0, "EN",
            )])),
        };
        let table = loader.accept(current).unwrap().unwrap();
        assert_eq!(table.len(), 1);
        assert!(!loader.is_loading());
    }

    #[test]
    fn failures_are_delivered_as_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = TableLoader::new();
        loader.request(dir.path().join("missing.csv"), || {});
        assert!(loader.wait().unwrap().is_err());
    }

    #[test]
    fn poll_without_request_is_empty() {
        let mut loader = TableLoader::new();
        assert!(loader.poll().is_none());
        assert!(loader.wait().is_none());
    }
}

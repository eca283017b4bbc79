//! Capped, newest-first history of completed analyses.
//!
//! [`History`] owns the capping policy; where the list actually lives is up to
//! a [`HistoryStore`]. Two stores ship with the crate: [`MemoryStore`] and
//! [`JsonFileStore`].

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::PronounceError;
use crate::PronunciationResult;

/// Persistence backend for the history list.
///
/// `save` always receives the complete list, newest first.
pub trait HistoryStore: Send + fmt::Debug {
    fn load(&self) -> Result<Vec<PronunciationResult>, PronounceError>;

    fn save(&mut self, results: &[PronunciationResult]) -> Result<(), PronounceError>;
}

/// Keeps the history in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    results: Vec<PronunciationResult>,
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<PronunciationResult>, PronounceError> {
        Ok(self.results.clone())
    }

    fn save(&mut self, results: &[PronunciationResult]) -> Result<(), PronounceError> {
        self.results = results.to_vec();
        Ok(())
    }
}

/// Stores the history as a JSON array in a single file.
///
/// A missing file loads as an empty history.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<PronunciationResult>, PronounceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, results: &[PronunciationResult]) -> Result<(), PronounceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Replace via a sibling temp file so readers never see a partial write.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(results)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Newest-first list of results, truncated to a fixed capacity.
///
/// No de-duplication happens: practicing the same phrase twice yields two
/// entries.
#[derive(Debug)]
pub struct History {
    store: Box<dyn HistoryStore>,
    capacity: usize,
}

impl History {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new(store: Box<dyn HistoryStore>) -> Self {
        Self::with_capacity(store, Self::DEFAULT_CAPACITY)
    }

    /// A capacity of 0 is treated as 1.
    pub fn with_capacity(store: Box<dyn HistoryStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Put `result` at the front, dropping the oldest entries past capacity.
    pub fn append(&mut self, result: PronunciationResult) -> Result<(), PronounceError> {
        let mut results = self.store.load()?;
        results.insert(0, result);
        if results.len() > self.capacity {
            log::debug!(
                "History over capacity, evicting {} oldest entries",
                results.len() - self.capacity
            );
            results.truncate(self.capacity);
        }
        self.store.save(&results)
    }

    pub fn entries(&self) -> Result<Vec<PronunciationResult>, PronounceError> {
        self.store.load()
    }

    pub fn latest(&self) -> Result<Option<PronunciationResult>, PronounceError> {
        Ok(self.store.load()?.into_iter().next())
    }

    pub fn clear(&mut self) -> Result<(), PronounceError> {
        self.store.save(&[])
    }
}

/// Outcome of analyzing and recording in one step.
#[derive(Debug)]
pub struct RecordedResult {
    pub result: PronunciationResult,
    /// Set when the result could not be written to the history store.
    pub persist_error: Option<PronounceError>,
}

impl RecordedResult {
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionAnalyzer;

    fn result_for(target: &str) -> PronunciationResult {
        SessionAnalyzer::new().analyze(target, target)
    }

    fn targets(history: &History) -> Vec<String> {
        history
            .entries()
            .expect("load")
            .iter()
            .map(|r| r.word_breakdown[0].word.clone())
            .collect()
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut history = History::new(Box::new(MemoryStore::default()));
        history.append(result_for("first")).expect("append");
        history.append(result_for("second")).expect("append");
        assert_eq!(targets(&history), vec!["second", "first"]);
        assert_eq!(
            history.latest().expect("load").map(|r| r.word_breakdown[0].word.clone()),
            Some("second".to_string())
        );
    }

    #[test]
    fn evicts_oldest_past_default_capacity() {
        let mut history = History::new(Box::new(MemoryStore::default()));
        for i in 0..History::DEFAULT_CAPACITY {
            history.append(result_for(&format!("w{i}"))).expect("append");
        }
        assert_eq!(history.entries().expect("load").len(), 50);

        history.append(result_for("newest")).expect("append");
        let names = targets(&history);
        assert_eq!(names.len(), 50);
        assert_eq!(names[0], "newest");
        assert_eq!(names[49], "w1");
        assert!(!names.contains(&"w0".to_string()));
    }

    #[test]
    fn duplicates_are_kept() {
        let mut history = History::with_capacity(Box::new(MemoryStore::default()), 3);
        history.append(result_for("same")).expect("append");
        history.append(result_for("same")).expect("append");
        assert_eq!(targets(&history), vec!["same", "same"]);
    }

    #[test]
    fn zero_capacity_keeps_one_entry() {
        let mut history = History::with_capacity(Box::new(MemoryStore::default()), 0);
        history.append(result_for("a")).expect("append");
        history.append(result_for("b")).expect("append");
        assert_eq!(targets(&history), vec!["b"]);
    }

    #[test]
    fn clear_empties_history() {
        let mut history = History::new(Box::new(MemoryStore::default()));
        history.append(result_for("a")).expect("append");
        history.clear().expect("clear");
        assert!(history.entries().expect("load").is_empty());
        assert!(history.latest().expect("load").is_none());
    }

    #[test]
    fn json_file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("history.json");

        let mut history = History::new(Box::new(JsonFileStore::new(&path)));
        assert!(history.entries().expect("missing file is empty").is_empty());
        let stored = result_for("hello");
        history.append(stored.clone()).expect("append");

        let reopened = History::new(Box::new(JsonFileStore::new(&path)));
        assert_eq!(reopened.entries().expect("load"), vec![stored]);
    }

    #[test]
    fn json_file_uses_camel_case_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("history.json");
        let mut store = JsonFileStore::new(&path);
        store.save(&[result_for("hello")]).expect("save");

        let raw = std::fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"overallScore\": 100"));
        assert!(raw.contains("\"wordBreakdown\""));
        assert!(raw.contains("\"Perfect match\""));
    }

    #[test]
    fn corrupt_json_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").expect("write");
        let history = History::new(Box::new(JsonFileStore::new(&path)));
        assert!(matches!(history.entries(), Err(PronounceError::Json(_))));
    }
}

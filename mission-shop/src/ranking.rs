//! Persistent top-N leaderboard.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::constants::RANKING_CAPACITY;
use crate::session::Difficulty;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub name: String,
    pub score: i64,
    pub difficulty: Difficulty,
}

impl RankingEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, score: i64, difficulty: Difficulty) -> Self {
        Self {
            name: name.into(),
            score,
            difficulty,
        }
    }
}

/// Errors raised by ranking persistence.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("ranking file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ranking file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("ranking could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Trait for abstracting where the leaderboard is kept.
pub trait RankingStorage {
    /// Load the stored entries, creating an empty store if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or created.
    fn load(&self) -> Result<Vec<RankingEntry>, RankingError>;

    /// Replace the stored entries wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&self, entries: &[RankingEntry]) -> Result<(), RankingError>;
}

/// Leaderboard kept as a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRanking {
    path: PathBuf,
}

impl JsonFileRanking {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> RankingError {
        RankingError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RankingStorage for JsonFileRanking {
    fn load(&self) -> Result<Vec<RankingEntry>, RankingError> {
        if !self.path.exists() {
            log::info!("creating empty ranking at {}", self.path.display());
            self.save(&[])?;
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&text).map_err(|source| RankingError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, entries: &[RankingEntry]) -> Result<(), RankingError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut json = serde_json::to_string_pretty(entries)?;
        json.push('\n');

        let tmp_path = self.temp_path();
        let mut tmp_file = fs::File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        tmp_file
            .write_all(json.as_bytes())
            .and_then(|()| tmp_file.sync_all())
            .map_err(|e| self.io_error(e))?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))
    }
}

/// In-memory leaderboard storage.
#[derive(Debug, Default)]
pub struct MemoryRanking {
    entries: RefCell<Vec<RankingEntry>>,
}

impl MemoryRanking {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RankingStorage for MemoryRanking {
    fn load(&self) -> Result<Vec<RankingEntry>, RankingError> {
        Ok(self.entries.borrow().clone())
    }

    fn save(&self, entries: &[RankingEntry]) -> Result<(), RankingError> {
        *self.entries.borrow_mut() = entries.to_vec();
        Ok(())
    }
}

/// Order entries by descending score, keeping the order of equal scores,
/// and keep only the top [`RANKING_CAPACITY`].
pub fn rank_entries(entries: &mut Vec<RankingEntry>) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(RANKING_CAPACITY);
}

/// Serialized access to a ranking store.
///
/// Every read-modify-write runs under one lock, so sessions sharing an
/// `Arc<Leaderboard>` never lose each other's records.
#[derive(Debug)]
pub struct Leaderboard<S: RankingStorage> {
    storage: Mutex<S>,
}

impl<S: RankingStorage> Leaderboard<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self {
            storage: Mutex::new(storage),
        }
    }

    /// Current entries, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn entries(&self) -> Result<Vec<RankingEntry>, RankingError> {
        let storage = self.storage.lock().unwrap_or_else(PoisonError::into_inner);
        storage.load()
    }

    /// Append a score, re-rank, persist, and return the new top list.
    ///
    /// No deduplication by name is performed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written. The stored
    /// list is unchanged on a read failure.
    pub fn record_score(
        &self,
        name: &str,
        score: i64,
        difficulty: Difficulty,
    ) -> Result<Vec<RankingEntry>, RankingError> {
        let storage = self.storage.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = storage.load()?;
        entries.push(RankingEntry::new(name, score, difficulty));
        rank_entries(&mut entries);
        storage.save(&entries)?;
        log::info!("recorded {score} for {name}; {} entries kept", entries.len());
        Ok(entries)
    }

    /// Unwrap the underlying storage.
    pub fn into_inner(self) -> S {
        self.storage
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!(
                "mission-shop-ranking-{label}-{}",
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos()
            ))
            .join("ranking.json")
    }

    #[test]
    fn missing_file_is_created_empty() {
        let path = temp_path("lazy");
        let store = JsonFileRanking::new(&path);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn file_is_pretty_and_keeps_non_ascii() {
        let path = temp_path("pretty");
        let store = JsonFileRanking::new(&path);
        store
            .save(&[RankingEntry::new("김철수", 3180, Difficulty::Hard)])
            .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"name\": \"김철수\""));
        assert!(text.contains("\"difficulty\": \"Hard\""));
        assert!(text.contains('\n'));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileRanking::new(&path).load(),
            Err(RankingError::Corrupt { .. })
        ));
    }

    #[test]
    fn rank_entries_is_stable_on_ties() {
        let mut entries = vec![
            RankingEntry::new("a", 100, Difficulty::Easy),
            RankingEntry::new("b", 300, Difficulty::Easy),
            RankingEntry::new("c", 100, Difficulty::Hard),
            RankingEntry::new("d", 300, Difficulty::Normal),
        ];
        rank_entries(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "d", "a", "c"]);
    }

    #[test]
    fn record_score_keeps_duplicates_by_name() {
        let board = Leaderboard::new(MemoryRanking::new());
        board.record_score("민수", 10, Difficulty::Easy).unwrap();
        let entries = board.record_score("민수", 20, Difficulty::Easy).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].score, 20);
        assert_eq!(board.entries().unwrap(), entries);
    }

    #[test]
    fn record_score_caps_at_capacity() {
        let board = Leaderboard::new(MemoryRanking::new());
        for score in 0..15 {
            board
                .record_score(&format!("p{score}"), score, Difficulty::Normal)
                .unwrap();
        }
        let entries = board.into_inner().load().unwrap();
        assert_eq!(entries.len(), RANKING_CAPACITY);
        assert_eq!(entries[0].score, 14);
        assert_eq!(entries[9].score, 5);
    }
}

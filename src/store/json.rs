//! JSON file storage: one file for the card list, one for progress.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::{Card, Progress};

use super::{DeckStore, LogOnError, StoreError};

#[derive(Debug, Clone)]
pub struct JsonStore {
    cards_path: PathBuf,
    progress_path: PathBuf,
}

impl JsonStore {
    pub fn new(cards_path: impl Into<PathBuf>, progress_path: impl Into<PathBuf>) -> Self {
        Self {
            cards_path: cards_path.into(),
            progress_path: progress_path.into(),
        }
    }

    /// Store using the standard file names inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(
            crate::paths::cards_path(data_dir),
            crate::paths::progress_path(data_dir),
        )
    }

    pub fn cards_path(&self) -> &Path {
        &self.cards_path
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }
}

/// Read and parse `path`, falling back to the default on any problem.
fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("{} not found, starting empty", path.display());
            return T::default();
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return T::default();
        }
    };

    serde_json::from_slice::<T>(&bytes)
        .log_warn_default(&format!("Malformed JSON in {}", path.display()))
}

/// Write via a sibling temp file so a crash mid-write leaves the old file intact.
fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    what: &'static str,
) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let data =
        serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize { what, source })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, data).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

impl DeckStore for JsonStore {
    fn load_cards(&self) -> Vec<Card> {
        let cards: Vec<Card> = load_or_default(&self.cards_path);
        tracing::info!("Loaded {} cards from {}", cards.len(), self.cards_path.display());
        cards
    }

    fn load_progress(&self) -> Progress {
        let mut progress: Progress = load_or_default(&self.progress_path);
        if progress.normalize() {
            tracing::warn!(
                "Progress in {} had more correct answers than total, clamped",
                self.progress_path.display()
            );
        }
        progress
    }

    fn flush_cards(&self, cards: &[Card]) -> Result<(), StoreError> {
        write_json(&self.cards_path, cards, "cards")
    }

    fn flush_progress(&self, progress: &Progress) -> Result<(), StoreError> {
        write_json(&self.progress_path, progress, "progress")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryStats;
    use chrono::{Duration, Local, TimeZone, Utc};
    use tempfile::tempdir;

    fn sample_cards() -> Vec<Card> {
        let mut hello = Card::new("你好", "nǐ hǎo", "hello", "greetings");
        hello.ease = 4;
        hello.next_review = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap() + Duration::milliseconds(789);
        vec![hello, Card::new("米饭", "mǐfàn", "rice", "food")]
    }

    #[test]
    fn test_missing_files_load_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStore::in_dir(dir.path());
        assert!(store.load_cards().is_empty());
        assert_eq!(store.load_progress(), Progress::default());
    }

    #[test]
    fn test_malformed_files_load_empty() {
        let dir = tempdir().unwrap();
        let store = JsonStore::in_dir(dir.path());
        fs::write(store.cards_path(), "[{\"word\": ").unwrap();
        fs::write(store.progress_path(), "not json").unwrap();
        assert!(store.load_cards().is_empty());
        assert_eq!(store.load_progress(), Progress::default());
    }

    #[test]
    fn test_cards_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonStore::in_dir(dir.path());
        let cards = sample_cards();

        store.flush_cards(&cards).unwrap();
        assert_eq!(store.load_cards(), cards);

        // Reflushing what was loaded is stable
        store.flush_cards(&store.load_cards()).unwrap();
        assert_eq!(store.load_cards(), cards);
    }

    #[test]
    fn test_progress_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonStore::in_dir(dir.path());
        let mut progress = Progress {
            correct: 3,
            total: 5,
            ..Default::default()
        };
        progress.learned.insert("你好".into());
        progress
            .per_category
            .insert("greetings".into(), CategoryStats { correct: 3, total: 5 });

        store.flush_progress(&progress).unwrap();
        assert_eq!(store.load_progress(), progress);
    }

    #[test]
    fn test_non_ascii_written_unescaped() {
        let dir = tempdir().unwrap();
        let store = JsonStore::in_dir(dir.path());
        store.flush_cards(&sample_cards()).unwrap();
        let text = fs::read_to_string(store.cards_path()).unwrap();
        assert!(text.contains("你好"));
        assert!(text.contains("nǐ hǎo"));
    }

    #[test]
    fn test_flush_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("decks").join("hsk1");
        let store = JsonStore::in_dir(&nested);
        store.flush_progress(&Progress::default()).unwrap();
        assert!(nested.join("stats.json").exists());
        assert!(!nested.join("stats.json.tmp").exists());
    }

    #[test]
    fn test_loads_card_file_without_schedule_fields() {
        let dir = tempdir().unwrap();
        let store = JsonStore::in_dir(dir.path());
        fs::write(
            store.cards_path(),
            r#"[
              {"word": "你好", "pinyin": "nǐ hǎo", "meaning": "hello", "category": "greetings"},
              {"word": "谢谢", "pinyin": "xièxie", "meaning": "thanks", "category": "greetings",
               "ease": 3, "next_review": "2025-05-01T10:00:00.000001"}
            ]"#,
        )
        .unwrap();

        let cards = store.load_cards();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].ease, 2);
        assert_eq!(cards[1].ease, 3);
        let local = Local
            .with_ymd_and_hms(2025, 5, 1, 10, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(cards[1].next_review, local + Duration::microseconds(1));
    }

    #[test]
    fn test_corrupt_progress_normalized_on_load() {
        let dir = tempdir().unwrap();
        let store = JsonStore::in_dir(dir.path());
        fs::write(store.progress_path(), r#"{"correct": 10, "total": 2}"#).unwrap();
        let progress = store.load_progress();
        assert_eq!(progress.correct, 2);
        assert_eq!(progress.total, 2);
    }

    #[test]
    fn test_flush_into_unwritable_location_errors() {
        let dir = tempdir().unwrap();
        // A file where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let store = JsonStore::in_dir(&blocker.join("deck"));
        let err = store.flush_cards(&sample_cards()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}

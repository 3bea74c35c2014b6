//! Application configuration.
//!
//! Scheduling and quiz constants live here alongside the runtime settings
//! loaded from `config.toml`, the environment and `.env`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::CategoryFilter;
use crate::paths;

// ==================== Scheduling Configuration ====================

/// Lowest ease a card can reach (1-day interval)
pub const MIN_EASE: u8 = 1;

/// Highest ease a card can reach (25-day interval)
pub const MAX_EASE: u8 = 5;

/// Ease given to cards with no review history (4-day interval)
pub const DEFAULT_EASE: u8 = 2;

// ==================== Quiz Configuration ====================

/// Number of options in a multiple choice quiz (1 correct + 3 distractors)
pub const DEFAULT_CHOICE_COUNT: usize = 4;

/// Filter value meaning "every category"
pub const ALL_CATEGORIES: &str = "All";

// ==================== Runtime Configuration ====================

/// Default config file, overridable with `HANZI_DRILL_CONFIG`
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub data: Option<DataConfig>,
    pub quiz: Option<QuizConfig>,
    pub speech: Option<SpeechConfig>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct DataConfig {
    pub dir: Option<String>,
    pub cards: Option<String>,
    pub progress: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct QuizConfig {
    pub choices: Option<usize>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct SpeechConfig {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

impl FileConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file. A missing file is not an error.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents, path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Resolved settings used by the binary
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub cards_path: PathBuf,
    pub progress_path: PathBuf,
    pub choice_count: usize,
    pub category: CategoryFilter,
    pub speech_command: Option<String>,
    pub speech_args: Vec<String>,
}

impl Settings {
    /// Load settings with priority: config.toml > environment (.env) > default
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let path = std::env::var("HANZI_DRILL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));

        let file = match FileConfig::read(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Ignoring config file: {}", e);
                None
            }
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups.
    pub fn resolve(file: Option<FileConfig>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let data = file.data.unwrap_or_default();
        let quiz = file.quiz.unwrap_or_default();
        let speech = file.speech.unwrap_or_default();

        let data_dir = match (data.dir, env("DATA_DIR")) {
            (Some(dir), _) => {
                tracing::info!("Using data directory from config.toml: {}", dir);
                PathBuf::from(dir)
            }
            (None, Some(dir)) => {
                tracing::info!("Using data directory from DATA_DIR env: {}", dir);
                PathBuf::from(dir)
            }
            (None, None) => PathBuf::from(paths::DEFAULT_DATA_DIR),
        };

        let cards_path = data
            .cards
            .map(PathBuf::from)
            .unwrap_or_else(|| paths::cards_path(&data_dir));
        let progress_path = data
            .progress
            .map(PathBuf::from)
            .unwrap_or_else(|| paths::progress_path(&data_dir));

        let choice_count = quiz
            .choices
            .or_else(|| env("HANZI_DRILL_CHOICES").and_then(|v| v.trim().parse().ok()))
            .unwrap_or(DEFAULT_CHOICE_COUNT);

        let category = quiz
            .category
            .map(|c| CategoryFilter::parse(&c))
            .unwrap_or_default();

        let speech_command = if speech.enabled == Some(false) {
            None
        } else {
            speech
                .command
                .or_else(|| env("HANZI_DRILL_SPEECH"))
                .filter(|c| !c.trim().is_empty())
        };

        Self {
            cards_path,
            progress_path,
            choice_count,
            category,
            speech_command,
            speech_args: speech.args.unwrap_or_default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(None, |_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file_or_env() {
        let settings = Settings::default();
        assert_eq!(settings.cards_path, PathBuf::from("data/flashcards.json"));
        assert_eq!(settings.progress_path, PathBuf::from("data/stats.json"));
        assert_eq!(settings.choice_count, DEFAULT_CHOICE_COUNT);
        assert_eq!(settings.category, CategoryFilter::All);
        assert!(settings.speech_command.is_none());
    }

    #[test]
    fn test_file_overrides_env() {
        let file = FileConfig::from_toml_str(
            r#"
            [data]
            dir = "from_file"

            [quiz]
            choices = 3
            category = "greetings"
            "#,
            Path::new("config.toml"),
        )
        .unwrap();

        let settings = Settings::resolve(Some(file), |key| match key {
            "DATA_DIR" => Some("from_env".into()),
            "HANZI_DRILL_CHOICES" => Some("6".into()),
            _ => None,
        });

        assert_eq!(settings.cards_path, PathBuf::from("from_file/flashcards.json"));
        assert_eq!(settings.choice_count, 3);
        assert_eq!(settings.category, CategoryFilter::Category("greetings".into()));
    }

    #[test]
    fn test_env_used_when_file_silent() {
        let settings = Settings::resolve(None, |key| match key {
            "DATA_DIR" => Some("/tmp/deck".into()),
            "HANZI_DRILL_CHOICES" => Some(" 5 ".into()),
            "HANZI_DRILL_SPEECH" => Some("say".into()),
            _ => None,
        });

        assert_eq!(settings.progress_path, PathBuf::from("/tmp/deck/stats.json"));
        assert_eq!(settings.choice_count, 5);
        assert_eq!(settings.speech_command.as_deref(), Some("say"));
    }

    #[test]
    fn test_explicit_file_paths_win_over_dir() {
        let file = FileConfig::from_toml_str(
            r#"
            [data]
            dir = "ignored"
            cards = "deck.json"
            progress = "progress.json"
            "#,
            Path::new("config.toml"),
        )
        .unwrap();

        let settings = Settings::resolve(Some(file), |_| None);
        assert_eq!(settings.cards_path, PathBuf::from("deck.json"));
        assert_eq!(settings.progress_path, PathBuf::from("progress.json"));
    }

    #[test]
    fn test_speech_disabled_in_file() {
        let file = FileConfig::from_toml_str(
            r#"
            [speech]
            command = "espeak-ng"
            args = ["-v", "cmn"]
            enabled = false
            "#,
            Path::new("config.toml"),
        )
        .unwrap();

        let settings = Settings::resolve(Some(file), |_| Some("say".into()));
        assert!(settings.speech_command.is_none());
        assert_eq!(settings.speech_args, vec!["-v".to_string(), "cmn".to_string()]);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let err = FileConfig::from_toml_str("[quiz\nchoices = ", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let read = FileConfig::read(&dir.path().join("absent.toml")).unwrap();
        assert!(read.is_none());
    }
}

//! Loading and flushing of the card collection and progress aggregate.

pub mod json;
pub mod memory;

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{Card, Progress};

pub use json::JsonStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable")]
    Unavailable,
}

/// Durable storage for a deck and its progress.
///
/// Loads never fail: missing or malformed data yields an empty deck or zero progress.
pub trait DeckStore {
    fn load_cards(&self) -> Vec<Card>;
    fn load_progress(&self) -> Progress;
    fn flush_cards(&self, cards: &[Card]) -> Result<(), StoreError>;
    fn flush_progress(&self, progress: &Progress) -> Result<(), StoreError>;
}

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

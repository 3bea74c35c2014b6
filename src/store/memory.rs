use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{Card, Progress};

use super::{DeckStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    cards: Vec<Card>,
    progress: Progress,
    card_flushes: usize,
    progress_flushes: usize,
    fail_flushes: bool,
}

/// In-memory store. Clones share state, so a handle kept outside the
/// session sees every flush.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new(cards: Vec<Card>, progress: Progress) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                cards,
                progress,
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Unavailable)
    }

    /// Make every subsequent flush fail, to exercise best-effort persistence.
    pub fn set_fail_flushes(&self, fail: bool) {
        if let Ok(mut state) = self.lock() {
            state.fail_flushes = fail;
        }
    }

    pub fn cards(&self) -> Vec<Card> {
        self.lock().map(|s| s.cards.clone()).unwrap_or_default()
    }

    pub fn progress(&self) -> Progress {
        self.lock().map(|s| s.progress.clone()).unwrap_or_default()
    }

    /// (card flushes, progress flushes) that succeeded so far
    pub fn flush_counts(&self) -> (usize, usize) {
        self.lock()
            .map(|s| (s.card_flushes, s.progress_flushes))
            .unwrap_or_default()
    }
}

impl DeckStore for MemoryStore {
    fn load_cards(&self) -> Vec<Card> {
        self.cards()
    }

    fn load_progress(&self) -> Progress {
        self.progress()
    }

    fn flush_cards(&self, cards: &[Card]) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.fail_flushes {
            return Err(StoreError::Unavailable);
        }
        state.cards = cards.to_vec();
        state.card_flushes += 1;
        Ok(())
    }

    fn flush_progress(&self, progress: &Progress) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.fail_flushes {
            return Err(StoreError::Unavailable);
        }
        state.progress = progress.clone();
        state.progress_flushes += 1;
        Ok(())
    }
}

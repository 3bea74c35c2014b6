//! Next-card selection.
//!
//! Cards are drawn from the pool matching the active category filter.
//! Due cards are preferred; when nothing is due, any card in the pool may
//! be drawn so a session never runs dry.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::{Card, CategoryFilter};

/// The active filter left nothing to study
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmptyPoolError {
  #[error("No flashcards loaded.")]
  NoCards,
  #[error("No cards in category '{0}'.")]
  NoCardsInCategory(String),
}

/// Indices of the cards matching `filter`
pub fn filter_pool(cards: &[Card], filter: &CategoryFilter) -> Vec<usize> {
  cards
    .iter()
    .enumerate()
    .filter(|(_, c)| filter.matches(c))
    .map(|(i, _)| i)
    .collect()
}

/// Subset of `pool` whose review time has come
pub fn due_cards(cards: &[Card], pool: &[usize], now: DateTime<Utc>) -> Vec<usize> {
  pool.iter().copied().filter(|&i| cards[i].is_due(now)).collect()
}

pub fn due_count(cards: &[Card], filter: &CategoryFilter, now: DateTime<Utc>) -> usize {
  cards.iter().filter(|c| filter.matches(c) && c.is_due(now)).count()
}

/// Distinct categories, sorted
pub fn category_pool(cards: &[Card]) -> Vec<String> {
  cards
    .iter()
    .map(|c| c.category.clone())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Pick the next card to present, returning its index in `cards`.
///
/// Uniform over due cards in the pool, or over the whole pool when none are due.
pub fn select_next_card<R: Rng + ?Sized>(
  cards: &[Card],
  filter: &CategoryFilter,
  now: DateTime<Utc>,
  rng: &mut R,
) -> Result<usize, EmptyPoolError> {
  let pool = filter_pool(cards, filter);
  if pool.is_empty() {
    return Err(match filter {
      CategoryFilter::Category(name) if !cards.is_empty() => {
        EmptyPoolError::NoCardsInCategory(name.clone())
      }
      _ => EmptyPoolError::NoCards,
    });
  }

  let due = due_cards(cards, &pool, now);
  let candidates = if due.is_empty() { &pool } else { &due };

  tracing::debug!(
    pool = pool.len(),
    due = due.len(),
    filter = %filter,
    "Selecting next card"
  );

  // Non-empty by construction
  Ok(candidates.choose(rng).copied().unwrap_or(pool[0]))
}

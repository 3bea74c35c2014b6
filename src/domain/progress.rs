use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::domain::{Card, CategoryFilter};

/// Answer counts for one category (or the whole deck)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
  #[serde(default)]
  pub correct: u64,
  #[serde(default)]
  pub total: u64,
}

impl CategoryStats {
  fn record(&mut self, is_correct: bool) {
    self.total += 1;
    if is_correct {
      self.correct += 1;
    }
  }

  /// Percentage correct, 0 when nothing has been answered
  pub fn percent(&self) -> f64 {
    if self.total > 0 {
      self.correct as f64 / self.total as f64 * 100.0
    } else {
      0.0
    }
  }
}

/// Session-wide answer statistics, persisted after every answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
  #[serde(default)]
  pub correct: u64,
  #[serde(default)]
  pub total: u64,
  /// Words answered correctly at least once
  #[serde(default)]
  pub learned: BTreeSet<String>,
  #[serde(default)]
  pub per_category: BTreeMap<String, CategoryStats>,
}

impl Progress {
  /// Count one answered quiz for `card`.
  pub fn record_answer(&mut self, card: &Card, is_correct: bool) {
    self.total += 1;
    if is_correct {
      self.correct += 1;
      if !self.learned.contains(&card.word) {
        self.learned.insert(card.word.clone());
      }
    }
    self
      .per_category
      .entry(card.category.clone())
      .or_default()
      .record(is_correct);
  }

  pub fn category(&self, name: &str) -> CategoryStats {
    self.per_category.get(name).copied().unwrap_or_default()
  }

  pub fn is_learned(&self, word: &str) -> bool {
    self.learned.contains(word)
  }

  /// Restore `correct <= total` after loading a hand-edited or corrupt file.
  /// Returns true if anything changed.
  pub fn normalize(&mut self) -> bool {
    let mut changed = false;
    if self.correct > self.total {
      self.correct = self.total;
      changed = true;
    }
    for stats in self.per_category.values_mut() {
      if stats.correct > stats.total {
        stats.correct = stats.total;
        changed = true;
      }
    }
    changed
  }

  /// Status line for the active filter
  pub fn summary(&self, filter: &CategoryFilter) -> ProgressSummary {
    match filter {
      CategoryFilter::All => ProgressSummary::Overall(CategoryStats {
        correct: self.correct,
        total: self.total,
      }),
      CategoryFilter::Category(name) => ProgressSummary::Category {
        name: name.clone(),
        stats: self.category(name),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressSummary {
  Overall(CategoryStats),
  Category { name: String, stats: CategoryStats },
}

impl fmt::Display for ProgressSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Overall(stats) => write!(f, "Total: {} / {} correct", stats.correct, stats.total),
      Self::Category { name, stats } => write!(
        f,
        "{}: {} / {} correct ({:.0}%)",
        name,
        stats.correct,
        stats.total,
        stats.percent()
      ),
    }
  }
}

use std::fmt;

use crate::config::ALL_CATEGORIES;
use crate::domain::Card;

/// Active category filter for card selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
  /// Every card in the deck
  #[default]
  All,
  Category(String),
}

impl CategoryFilter {
  /// "All" is the no-filter sentinel, anything else names a category.
  ///
  /// A deck category literally named "All" therefore cannot be selected on
  /// its own; its cards only appear under the unfiltered view.
  pub fn parse(s: &str) -> Self {
    let s = s.trim();
    if s == ALL_CATEGORIES {
      Self::All
    } else {
      Self::Category(s.to_string())
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::All => ALL_CATEGORIES,
      Self::Category(name) => name,
    }
  }

  pub fn matches(&self, card: &Card) -> bool {
    match self {
      Self::All => true,
      Self::Category(name) => card.category == *name,
    }
  }
}

impl fmt::Display for CategoryFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

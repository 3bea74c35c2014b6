//! Multiple choice quiz generation.
//!
//! A quiz offers the card's meaning among distractors drawn from the other
//! meanings in the deck. Decks too small to supply enough distinct
//! distractors get a direct-answer quiz instead: the meaning is shown
//! outright and the user only acknowledges it.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::domain::Card;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quiz {
  MultipleChoice {
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
  },
  /// Too few distractors; the answer is shown with a single acknowledge action
  DirectAnswer { prompt: String, meaning: String },
}

impl Quiz {
  pub fn prompt(&self) -> &str {
    match self {
      Self::MultipleChoice { prompt, .. } | Self::DirectAnswer { prompt, .. } => prompt,
    }
  }

  pub fn is_multiple_choice(&self) -> bool {
    matches!(self, Self::MultipleChoice { .. })
  }

  /// Options in display order; empty in direct-answer mode
  pub fn options(&self) -> &[String] {
    match self {
      Self::MultipleChoice { options, .. } => options,
      Self::DirectAnswer { .. } => &[],
    }
  }

  pub fn correct_answer(&self) -> &str {
    match self {
      Self::MultipleChoice {
        options,
        correct_index,
        ..
      } => &options[*correct_index],
      Self::DirectAnswer { meaning, .. } => meaning,
    }
  }

  /// Exact, case and whitespace sensitive. Acknowledging a direct answer always counts.
  pub fn is_correct(&self, chosen: &str) -> bool {
    match self {
      Self::MultipleChoice { .. } => chosen == self.correct_answer(),
      Self::DirectAnswer { .. } => true,
    }
  }
}

pub fn quiz_prompt(card: &Card) -> String {
  format!("What does '{}' mean?", card.word)
}

/// Distinct meanings in `pool` other than `correct`, sorted
pub fn alternative_meanings(pool: &[Card], correct: &str) -> Vec<String> {
  let mut meanings: Vec<String> = pool
    .iter()
    .filter(|c| c.meaning != correct)
    .map(|c| c.meaning.clone())
    .collect();
  meanings.sort();
  meanings.dedup();
  meanings
}

/// Build a quiz for `card` with `choice_count` options drawn from `pool`.
pub fn generate_quiz<R: Rng + ?Sized>(
  card: &Card,
  pool: &[Card],
  choice_count: usize,
  rng: &mut R,
) -> Quiz {
  let prompt = quiz_prompt(card);
  let correct = card.meaning.clone();
  let direct = |prompt: String| Quiz::DirectAnswer {
    prompt,
    meaning: card.meaning.clone(),
  };

  let needed = choice_count.saturating_sub(1);
  let alternatives = alternative_meanings(pool, &correct);
  if needed == 0 || alternatives.len() < needed {
    tracing::debug!(
      available = alternatives.len(),
      needed,
      "Not enough distractors, using direct answer"
    );
    return direct(prompt);
  }

  let mut options: Vec<String> = alternatives.choose_multiple(rng, needed).cloned().collect();
  options.push(correct.clone());
  options.shuffle(rng);

  // Sampling must never drop or duplicate the answer
  let occurrences = options.iter().filter(|o| **o == correct).count();
  let correct_index = match options.iter().position(|o| *o == correct) {
    Some(i) if occurrences == 1 && options.len() == choice_count => i,
    _ => {
      tracing::error!(
        word = %card.word,
        occurrences,
        options = options.len(),
        "Quiz options lost the correct answer, falling back to direct answer"
      );
      return direct(prompt);
    }
  };

  Quiz::MultipleChoice {
    prompt,
    options,
    correct_index,
  }
}

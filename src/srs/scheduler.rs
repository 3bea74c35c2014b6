use chrono::{DateTime, Duration, Utc};

use crate::config::{MAX_EASE, MIN_EASE};
use crate::domain::{Card, clamp_ease};

/// Outcome of scheduling one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleResult {
  pub ease: u8,
  pub interval_days: i64,
  pub next_review: DateTime<Utc>,
}

/// Review interval for an ease level: ease squared (1, 4, 9, 16, 25 days)
pub fn interval_days(ease: u8) -> i64 {
  let ease = clamp_ease(ease as i64) as i64;
  ease * ease
}

/// One step up on a correct answer, one step down otherwise, within [1, 5].
pub fn next_ease(current: u8, is_correct: bool) -> u8 {
  let current = clamp_ease(current as i64);
  if is_correct {
    (current + 1).min(MAX_EASE)
  } else {
    current.saturating_sub(1).max(MIN_EASE)
  }
}

/// Compute the new schedule without touching a card.
pub fn calculate_review(current_ease: u8, is_correct: bool, now: DateTime<Utc>) -> ScheduleResult {
  let ease = next_ease(current_ease, is_correct);
  let interval_days = interval_days(ease);

  ScheduleResult {
    ease,
    interval_days,
    next_review: now + Duration::days(interval_days),
  }
}

/// Apply an answer to `card` in place.
pub fn apply_review(card: &mut Card, is_correct: bool, now: DateTime<Utc>) -> ScheduleResult {
  let result = calculate_review(card.ease, is_correct, now);
  card.ease = result.ease;
  card.next_review = result.next_review;
  result
}

//! Review session loop.
//!
//! A cycle selects a card, builds its quiz and hands it to the presenter.
//! The session then waits for exactly one answer, which updates progress
//! and the card's schedule, flushes both to the store and starts the next
//! cycle under the same category filter.

use rand::Rng;
use thiserror::Error;

use crate::clock::Clock;
use crate::config::DEFAULT_CHOICE_COUNT;
use crate::domain::{Card, CardFace, CategoryFilter, Progress, ProgressSummary};
use crate::speech::{NoSpeech, Speaker, SpeechError};
use crate::srs::{self, EmptyPoolError, Quiz, ScheduleResult};
use crate::store::{DeckStore, LogOnError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
  #[error("no quiz is waiting for an answer")]
  NoActiveQuiz,
  #[error("option {0} is not one of the offered choices")]
  InvalidOption(usize),
  #[error("this quiz needs one of the offered choices")]
  ChoiceRequired,
}

/// What the presenter is asked to display for a new quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
  pub card_face: String,
  pub quiz: Quiz,
  pub stats: String,
}

/// Result of one answered quiz
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
  pub word: String,
  pub chosen: String,
  pub correct_answer: String,
  pub is_correct: bool,
  pub schedule: ScheduleResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleState {
  /// A quiz is on screen, waiting for an answer
  Presented(QuizView),
  /// Nothing to study under the active filter
  Empty(EmptyPoolError),
}

impl CycleState {
  pub fn is_presented(&self) -> bool {
    matches!(self, Self::Presented(_))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
  pub outcome: AnswerOutcome,
  pub next: CycleState,
}

/// Display side of the session
pub trait Presenter {
  fn show_quiz(&mut self, view: &QuizView);
  fn show_empty(&mut self, reason: &EmptyPoolError);
  fn show_feedback(&mut self, outcome: &AnswerOutcome);
}

#[derive(Debug, Clone)]
struct ActiveQuiz {
  card_index: usize,
  quiz: Quiz,
}

pub struct SessionController<P: Presenter, R: Rng> {
  cards: Vec<Card>,
  progress: Progress,
  filter: CategoryFilter,
  choice_count: usize,
  current: Option<ActiveQuiz>,
  face: CardFace,
  clock: Clock,
  rng: R,
  presenter: P,
  store: Box<dyn DeckStore>,
  speaker: Box<dyn Speaker>,
}

impl<P: Presenter, R: Rng> SessionController<P, R> {
  /// Load the deck and progress from `store`. No cycle is started yet.
  pub fn new(store: Box<dyn DeckStore>, presenter: P, rng: R) -> Self {
    let cards = store.load_cards();
    let progress = store.load_progress();
    Self {
      cards,
      progress,
      filter: CategoryFilter::All,
      choice_count: DEFAULT_CHOICE_COUNT,
      current: None,
      face: CardFace::Front,
      clock: Clock::System,
      rng,
      presenter,
      store,
      speaker: Box::new(NoSpeech),
    }
  }

  pub fn with_clock(mut self, clock: Clock) -> Self {
    self.clock = clock;
    self
  }

  pub fn with_speaker(mut self, speaker: Box<dyn Speaker>) -> Self {
    self.speaker = speaker;
    self
  }

  pub fn with_choice_count(mut self, choice_count: usize) -> Self {
    self.choice_count = choice_count;
    self
  }

  pub fn with_filter(mut self, filter: CategoryFilter) -> Self {
    self.filter = filter;
    self
  }

  pub fn cards(&self) -> &[Card] {
    &self.cards
  }

  pub fn progress(&self) -> &Progress {
    &self.progress
  }

  pub fn filter(&self) -> &CategoryFilter {
    &self.filter
  }

  pub fn presenter(&self) -> &P {
    &self.presenter
  }

  pub fn presenter_mut(&mut self) -> &mut P {
    &mut self.presenter
  }

  pub fn clock_mut(&mut self) -> &mut Clock {
    &mut self.clock
  }

  pub fn current_quiz(&self) -> Option<&Quiz> {
    self.current.as_ref().map(|a| &a.quiz)
  }

  pub fn current_card(&self) -> Option<&Card> {
    self.current.as_ref().map(|a| &self.cards[a.card_index])
  }

  /// Distinct categories in the deck, sorted
  pub fn categories(&self) -> Vec<String> {
    srs::category_pool(&self.cards)
  }

  /// Cards under the active filter that are due now
  pub fn due_count(&self) -> usize {
    srs::due_count(&self.cards, &self.filter, self.clock.now())
  }

  pub fn summary(&self) -> ProgressSummary {
    self.progress.summary(&self.filter)
  }

  /// Select a card under the active filter and present its quiz.
  pub fn begin_cycle(&mut self) -> CycleState {
    self.current = None;
    let now = self.clock.now();

    match srs::select_next_card(&self.cards, &self.filter, now, &mut self.rng) {
      Ok(index) => self.present_quiz(index),
      Err(reason) => {
        tracing::debug!("Nothing to study: {}", reason);
        self.presenter.show_empty(&reason);
        CycleState::Empty(reason)
      }
    }
  }

  /// Build the quiz for `card_index` and hand it to the presenter.
  pub fn present_quiz(&mut self, card_index: usize) -> CycleState {
    let Some(card) = self.cards.get(card_index) else {
      tracing::warn!("Card index {} out of range, selecting again", card_index);
      return self.begin_cycle();
    };

    let quiz = srs::generate_quiz(card, &self.cards, self.choice_count, &mut self.rng);
    self.face = CardFace::Front;
    let view = QuizView {
      card_face: card.face_text(self.face),
      quiz: quiz.clone(),
      stats: self.summary().to_string(),
    };

    tracing::debug!(word = %card.word, multiple_choice = quiz.is_multiple_choice(), "Presenting quiz");
    self.current = Some(ActiveQuiz { card_index, quiz });
    self.presenter.show_quiz(&view);
    CycleState::Presented(view)
  }

  /// Answer the presented quiz with the chosen option text.
  pub fn record_answer(&mut self, chosen: &str) -> Result<AnswerResult, SessionError> {
    let active = self.current.take().ok_or(SessionError::NoActiveQuiz)?;
    let is_correct = active.quiz.is_correct(chosen);
    Ok(self.finish(active, chosen.to_string(), is_correct))
  }

  /// Answer by position in the option list (0-based).
  pub fn answer_option(&mut self, index: usize) -> Result<AnswerResult, SessionError> {
    let quiz = self.current_quiz().ok_or(SessionError::NoActiveQuiz)?;
    if !quiz.is_multiple_choice() {
      return self.acknowledge();
    }
    let chosen = quiz
      .options()
      .get(index)
      .cloned()
      .ok_or(SessionError::InvalidOption(index))?;
    self.record_answer(&chosen)
  }

  /// Acknowledge a direct-answer quiz. Counts as correct.
  pub fn acknowledge(&mut self) -> Result<AnswerResult, SessionError> {
    match self.current_quiz() {
      None => Err(SessionError::NoActiveQuiz),
      Some(quiz) if quiz.is_multiple_choice() => Err(SessionError::ChoiceRequired),
      Some(quiz) => {
        let meaning = quiz.correct_answer().to_string();
        self.record_answer(&meaning)
      }
    }
  }

  /// Switch category. Any unanswered quiz is dropped without counting against progress.
  pub fn set_filter(&mut self, filter: CategoryFilter) -> CycleState {
    tracing::debug!("Filter changed from {} to {}", self.filter, filter);
    self.filter = filter;
    self.begin_cycle()
  }

  /// Move on without answering. Neither progress nor the schedule change.
  pub fn skip(&mut self) -> CycleState {
    self.begin_cycle()
  }

  /// Turn the current card over and return the newly visible text.
  pub fn flip(&mut self) -> Option<String> {
    let index = self.current.as_ref()?.card_index;
    self.face = self.face.flipped();
    Some(self.cards[index].face_text(self.face))
  }

  /// Pronounce the current word, ignoring speech failures.
  pub fn speak_current(&self) {
    if let Some(card) = self.current_card() {
      self.speak(&card.word);
    }
  }

  fn speak(&self, word: &str) {
    match self.speaker.speak(word) {
      Ok(()) | Err(SpeechError::Disabled) => {}
      Err(e) => tracing::debug!("Speech unavailable: {}", e),
    }
  }

  fn finish(&mut self, active: ActiveQuiz, chosen: String, is_correct: bool) -> AnswerResult {
    let now = self.clock.now();
    let index = active.card_index;

    self.progress.record_answer(&self.cards[index], is_correct);
    if is_correct {
      let word = self.cards[index].word.clone();
      self.speak(&word);
    }
    let schedule = srs::apply_review(&mut self.cards[index], is_correct, now);

    self.flush();

    let card = &self.cards[index];
    tracing::debug!(
      word = %card.word,
      is_correct,
      ease = schedule.ease,
      next_review = %schedule.next_review,
      "Answer recorded"
    );
    let outcome = AnswerOutcome {
      word: card.word.clone(),
      chosen,
      correct_answer: active.quiz.correct_answer().to_string(),
      is_correct,
      schedule,
    };
    self.presenter.show_feedback(&outcome);

    let next = self.begin_cycle();
    AnswerResult { outcome, next }
  }

  /// Persist cards and progress before the next cycle. Failures are logged and the
  /// session carries on in memory.
  fn flush(&self) {
    self.store.flush_cards(&self.cards).log_warn("Failed to save cards");
    self.store.flush_progress(&self.progress).log_warn("Failed to save progress");
  }
}

//! Line-oriented terminal front end for the review session.

use std::io::{self, BufRead, Write};

use rand::Rng;
use thiserror::Error;

use crate::domain::CategoryFilter;
use crate::session::{AnswerOutcome, Presenter, QuizView, SessionController, SessionError};
use crate::srs::{EmptyPoolError, Quiz};
use crate::store::LogOnError;

const HELP: &str = "Commands: 1-9 answer, Enter acknowledge, f flip, n next, s speak, \
c <category> switch (c All for every card), l list categories, p stats, h help, q quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// 0-based option index
  Answer(usize),
  Acknowledge,
  Flip,
  Next,
  Speak,
  Category(CategoryFilter),
  List,
  Stats,
  Help,
  Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
  #[error("Unknown command '{0}'. Type h for help.")]
  Unknown(String),
  #[error("Options are numbered from 1.")]
  ZeroOption,
  #[error("Usage: c <category>")]
  MissingCategory,
}

impl Command {
  pub fn parse(line: &str) -> Result<Self, CommandError> {
    let line = line.trim();
    if line.is_empty() {
      return Ok(Self::Acknowledge);
    }

    if let Ok(n) = line.parse::<usize>() {
      return n.checked_sub(1).map(Self::Answer).ok_or(CommandError::ZeroOption);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
      Some((head, rest)) => (head, rest.trim()),
      None => (line, ""),
    };

    match (head, rest) {
      ("c", "") => Err(CommandError::MissingCategory),
      ("c", name) => Ok(Self::Category(CategoryFilter::parse(name))),
      ("f", "") => Ok(Self::Flip),
      ("n", "") => Ok(Self::Next),
      ("s", "") => Ok(Self::Speak),
      ("l", "") => Ok(Self::List),
      ("p", "") => Ok(Self::Stats),
      ("h" | "?", "") => Ok(Self::Help),
      ("q", "") => Ok(Self::Quit),
      _ => Err(CommandError::Unknown(line.to_string())),
    }
  }
}

/// Presenter writing plain text to any `Write`
pub struct TerminalPresenter<W: Write> {
  out: W,
}

impl<W: Write> TerminalPresenter<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }

  pub fn output(&self) -> &W {
    &self.out
  }

  /// Print a line outside the quiz flow
  pub fn message(&mut self, text: &str) {
    writeln!(self.out, "{}", text)
      .and_then(|_| self.out.flush())
      .log_warn("Failed to write to terminal");
  }

  fn write_quiz(&mut self, view: &QuizView) -> io::Result<()> {
    writeln!(self.out)?;
    writeln!(self.out, "  {}", view.card_face)?;
    writeln!(self.out, "{}", view.quiz.prompt())?;
    match &view.quiz {
      Quiz::MultipleChoice { options, .. } => {
        for (i, option) in options.iter().enumerate() {
          writeln!(self.out, "  {}) {}", i + 1, option)?;
        }
      }
      Quiz::DirectAnswer { meaning, .. } => {
        writeln!(self.out, "  Answer: {}  (press Enter)", meaning)?;
      }
    }
    writeln!(self.out, "[{}]", view.stats)?;
    write!(self.out, "> ")?;
    self.out.flush()
  }

  fn write_feedback(&mut self, outcome: &AnswerOutcome) -> io::Result<()> {
    if outcome.is_correct {
      writeln!(self.out, "Correct!")?;
    } else {
      writeln!(self.out, "Wrong. '{}' means: {}", outcome.word, outcome.correct_answer)?;
    }
    writeln!(
      self.out,
      "Next review of {} in {} days",
      outcome.word, outcome.schedule.interval_days
    )
  }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
  fn show_quiz(&mut self, view: &QuizView) {
    self.write_quiz(view).log_warn("Failed to write to terminal");
  }

  fn show_empty(&mut self, reason: &EmptyPoolError) {
    self.message(&reason.to_string());
  }

  fn show_feedback(&mut self, outcome: &AnswerOutcome) {
    self.write_feedback(outcome).log_warn("Failed to write to terminal");
  }
}

/// Read commands from `input` until quit or end of input.
pub fn run<Rd, W, R>(session: &mut SessionController<TerminalPresenter<W>, R>, input: Rd) -> io::Result<()>
where
  Rd: BufRead,
  W: Write,
  R: Rng,
{
  session.begin_cycle();

  for line in input.lines() {
    let line = line?;
    let command = match Command::parse(&line) {
      Ok(command) => command,
      Err(e) => {
        session.presenter_mut().message(&e.to_string());
        continue;
      }
    };

    tracing::debug!(?command, "Command");
    match command {
      Command::Quit => break,
      Command::Answer(index) => {
        let result = session.answer_option(index).map(|_| ());
        report(session, result);
      }
      Command::Acknowledge => {
        let result = session.acknowledge().map(|_| ());
        report(session, result);
      }
      Command::Next => {
        session.skip();
      }
      Command::Category(filter) => {
        session.set_filter(filter);
      }
      Command::Flip => match session.flip() {
        Some(text) => session.presenter_mut().message(&format!("  {}", text)),
        None => session.presenter_mut().message("No card to flip."),
      },
      Command::Speak => session.speak_current(),
      Command::List => {
        let categories = session.categories();
        let text = if categories.is_empty() {
          "No categories.".to_string()
        } else {
          format!("Categories: {}", categories.join(", "))
        };
        session.presenter_mut().message(&text);
      }
      Command::Stats => {
        let text = format!("{} | {} due", session.summary(), session.due_count());
        session.presenter_mut().message(&text);
      }
      Command::Help => session.presenter_mut().message(HELP),
    }
  }

  let summary = session.summary().to_string();
  session.presenter_mut().message(&summary);
  Ok(())
}

fn report<W: Write, R: Rng>(session: &mut SessionController<TerminalPresenter<W>, R>, result: Result<(), SessionError>) {
  let text = match result {
    Ok(()) => return,
    Err(SessionError::NoActiveQuiz) => "Nothing to answer. Try c All or l.".to_string(),
    Err(SessionError::ChoiceRequired) => {
      let count = session.current_quiz().map_or(0, |q| q.options().len());
      format!("Choose an option from 1 to {}.", count)
    }
    Err(e) => e.to_string(),
  };
  session.presenter_mut().message(&text);
}

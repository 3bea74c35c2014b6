use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hanzi_drill::config::Settings;
use hanzi_drill::domain::CategoryFilter;
use hanzi_drill::session::SessionController;
use hanzi_drill::speech::speaker_for;
use hanzi_drill::store::JsonStore;
use hanzi_drill::terminal::{self, TerminalPresenter};

/// Mandarin vocabulary drill with spaced repetition
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
  /// card file (JSON list of flashcards)
  #[arg(long)]
  cards: Option<PathBuf>,

  /// progress file
  #[arg(long)]
  progress: Option<PathBuf>,

  /// category to study, "All" for every card
  #[arg(short, long)]
  category: Option<String>,

  /// number of options per quiz
  #[arg(short = 'k', long)]
  choices: Option<usize>,

  /// seed for card and option selection
  #[arg(long)]
  seed: Option<u64>,

  /// do not pronounce words
  #[arg(long)]
  no_speech: bool,
}

fn main() -> io::Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hanzi_drill=warn".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();

  let args = Args::parse();
  let mut settings = Settings::load();
  if let Some(cards) = args.cards {
    settings.cards_path = cards;
  }
  if let Some(progress) = args.progress {
    settings.progress_path = progress;
  }
  if let Some(category) = args.category {
    settings.category = CategoryFilter::parse(&category);
  }
  if let Some(choices) = args.choices {
    settings.choice_count = choices;
  }
  if args.no_speech {
    settings.speech_command = None;
  }
  tracing::debug!(?settings, "Resolved settings");

  let rng = match args.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_os_rng(),
  };
  let store = JsonStore::new(&settings.cards_path, &settings.progress_path);
  let speaker = speaker_for(settings.speech_command.as_deref(), &settings.speech_args);

  let mut session = SessionController::new(Box::new(store), TerminalPresenter::new(io::stdout()), rng)
    .with_speaker(speaker)
    .with_choice_count(settings.choice_count)
    .with_filter(settings.category);

  terminal::run(&mut session, io::stdin().lock())
}

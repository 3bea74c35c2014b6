use chrono::{DateTime, Duration, Utc};

/// Time source for the session loop, fixed in tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
  #[default]
  System,
  Fixed(DateTime<Utc>),
}

impl Clock {
  pub fn fixed(at: DateTime<Utc>) -> Self {
    Self::Fixed(at)
  }

  pub fn now(&self) -> DateTime<Utc> {
    match self {
      Clock::System => Utc::now(),
      Clock::Fixed(t) => *t,
    }
  }

  /// Move a fixed clock forward. No effect on the system clock.
  pub fn advance(&mut self, delta: Duration) {
    if let Clock::Fixed(t) = self {
      *t += delta;
    }
  }
}

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{DEFAULT_EASE, MAX_EASE, MIN_EASE};

/// Which side of a card is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardFace {
  #[default]
  Front,
  Back,
}

impl CardFace {
  pub fn flipped(self) -> Self {
    match self {
      Self::Front => Self::Back,
      Self::Back => Self::Front,
    }
  }
}

/// A vocabulary flashcard. Identified by `word` within a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
  #[serde(default)]
  pub word: String,
  #[serde(default)]
  pub pinyin: String,
  #[serde(default)]
  pub meaning: String,
  #[serde(default)]
  pub category: String,

  // Schedule state. Clamped/defaulted on load so corrupt files never stall a session.
  #[serde(default = "default_ease", deserialize_with = "lenient_ease")]
  pub ease: u8,
  #[serde(
    default = "epoch",
    deserialize_with = "lenient_timestamp",
    serialize_with = "rfc3339"
  )]
  pub next_review: DateTime<Utc>,
}

impl Card {
  /// New card with no review history: default ease, due immediately.
  pub fn new(
    word: impl Into<String>,
    pinyin: impl Into<String>,
    meaning: impl Into<String>,
    category: impl Into<String>,
  ) -> Self {
    Self {
      word: word.into(),
      pinyin: pinyin.into(),
      meaning: meaning.into(),
      category: category.into(),
      ease: DEFAULT_EASE,
      next_review: epoch(),
    }
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review <= now
  }

  /// Text shown for the given face: the word on the front, meaning and pinyin on the back.
  pub fn face_text(&self, face: CardFace) -> String {
    match face {
      CardFace::Front => self.word.clone(),
      CardFace::Back => format!("{} ({})", self.meaning, self.pinyin),
    }
  }
}

/// Clamp any stored ease value into the valid range.
pub fn clamp_ease(raw: i64) -> u8 {
  raw.clamp(MIN_EASE as i64, MAX_EASE as i64) as u8
}

/// Parse a stored review timestamp.
///
/// Accepts RFC 3339, naive ISO-8601 date-times and bare dates. Values
/// without an offset are local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(local_to_utc(naive));
    }
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(local_to_utc)
}

/// Resolve a local wall-clock time. Times skipped by a DST jump are read as UTC.
fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
  naive
    .and_local_timezone(Local)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|| naive.and_utc())
}

fn default_ease() -> u8 {
  DEFAULT_EASE
}

fn epoch() -> DateTime<Utc> {
  DateTime::UNIX_EPOCH
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEase {
  Int(i64),
  Float(f64),
  Text(String),
  Other(IgnoredAny),
}

fn lenient_ease<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
  let ease = match RawEase::deserialize(deserializer)? {
    RawEase::Int(n) => clamp_ease(n),
    RawEase::Float(f) if f.is_finite() => clamp_ease(f.round() as i64),
    RawEase::Text(s) => s.trim().parse::<i64>().map(clamp_ease).unwrap_or(DEFAULT_EASE),
    RawEase::Float(_) | RawEase::Other(_) => DEFAULT_EASE,
  };
  Ok(ease)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
  Text(String),
  Other(IgnoredAny),
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
  let parsed = match RawTimestamp::deserialize(deserializer)? {
    RawTimestamp::Text(s) => {
      let parsed = parse_timestamp(&s);
      if parsed.is_none() {
        tracing::debug!("Unparseable next_review {:?}, treating card as due", s);
      }
      parsed
    }
    RawTimestamp::Other(_) => None,
  };
  Ok(parsed.unwrap_or_else(epoch))
}

fn rfc3339<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn parse(json: &str) -> Card {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn test_card_new_defaults() {
    let card = Card::new("你好", "nǐ hǎo", "hello", "greetings");
    assert_eq!(card.word, "你好");
    assert_eq!(card.ease, DEFAULT_EASE);
    assert_eq!(card.next_review, DateTime::UNIX_EPOCH);
  }

  #[test]
  fn test_face_text() {
    let card = Card::new("谢谢", "xièxie", "thanks", "greetings");
    assert_eq!(card.face_text(CardFace::Front), "谢谢");
    assert_eq!(card.face_text(CardFace::Back), "thanks (xièxie)");
    assert_eq!(CardFace::Front.flipped(), CardFace::Back);
    assert_eq!(CardFace::Back.flipped(), CardFace::Front);
  }

  #[test]
  fn test_missing_schedule_fields_default() {
    let card = parse(r#"{"word":"再见","pinyin":"zàijiàn","meaning":"goodbye","category":"greetings"}"#);
    assert_eq!(card.ease, 2);
    assert_eq!(card.next_review, DateTime::UNIX_EPOCH);
  }

  #[test]
  fn test_out_of_range_ease_is_clamped() {
    let low = parse(r#"{"word":"a","ease":0}"#);
    let high = parse(r#"{"word":"b","ease":7}"#);
    let negative = parse(r#"{"word":"c","ease":-40}"#);
    assert_eq!(low.ease, 1);
    assert_eq!(high.ease, 5);
    assert_eq!(negative.ease, 1);
  }

  #[test]
  fn test_non_numeric_ease_defaults() {
    assert_eq!(parse(r#"{"word":"a","ease":"hard"}"#).ease, 2);
    assert_eq!(parse(r#"{"word":"a","ease":null}"#).ease, 2);
    assert_eq!(parse(r#"{"word":"a","ease":[3]}"#).ease, 2);
    assert_eq!(parse(r#"{"word":"a","ease":"4"}"#).ease, 4);
    assert_eq!(parse(r#"{"word":"a","ease":3.6}"#).ease, 4);
  }

  fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Local
      .with_ymd_and_hms(y, mo, d, h, mi, s)
      .earliest()
      .unwrap()
      .with_timezone(&Utc)
  }

  #[test]
  fn test_naive_timestamp_is_local_time() {
    let card = parse(r#"{"word":"a","next_review":"2025-03-10T20:00:00"}"#);
    assert_eq!(card.next_review, local(2025, 3, 10, 20, 0, 0));

    let card = parse(r#"{"word":"a","next_review":"2025-03-01T08:30:00.123456"}"#);
    assert_eq!(card.next_review, local(2025, 3, 1, 8, 30, 0) + Duration::microseconds(123456));

    let spaced = parse_timestamp("2025-03-01 08:30:00").unwrap();
    assert_eq!(spaced, local(2025, 3, 1, 8, 30, 0));
  }

  #[test]
  fn test_naive_epoch_is_due() {
    let card = parse(r#"{"word":"a","next_review":"1970-01-01T00:00:00"}"#);
    assert_eq!(card.next_review, local(1970, 1, 1, 0, 0, 0));
    assert!(card.is_due(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()));
  }

  #[test]
  fn test_bare_date_is_local_midnight() {
    let card = parse(r#"{"word":"a","next_review":"2025-03-10"}"#);
    assert_eq!(card.next_review, local(2025, 3, 10, 0, 0, 0));
  }

  #[test]
  fn test_local_timestamp_written_back_as_utc() {
    let card = parse(r#"{"word":"a","next_review":"2025-03-10T20:00:00"}"#);
    let json = serde_json::to_string(&card).unwrap();
    assert!(json.contains(&card.next_review.to_rfc3339_opts(SecondsFormat::AutoSi, true)));
    assert_eq!(parse(&json).next_review, card.next_review);
  }

  #[test]
  fn test_invalid_timestamp_is_due_immediately() {
    assert_eq!(parse(r#"{"word":"a","next_review":"tomorrow"}"#).next_review, DateTime::UNIX_EPOCH);
    assert_eq!(parse(r#"{"word":"a","next_review":12}"#).next_review, DateTime::UNIX_EPOCH);
    assert_eq!(parse(r#"{"word":"a","next_review":null}"#).next_review, DateTime::UNIX_EPOCH);
  }

  #[test]
  fn test_rfc3339_with_offset_normalized_to_utc() {
    let card = parse(r#"{"word":"a","next_review":"2025-03-01T16:00:00+08:00"}"#);
    assert_eq!(card.next_review, Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap());
  }

  #[test]
  fn test_serialized_card_reloads_identically() {
    let mut card = Card::new("你好", "nǐ hǎo", "hello", "greetings");
    card.ease = 3;
    card.next_review = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap() + Duration::nanoseconds(987_654_321);

    let json = serde_json::to_string(&card).unwrap();
    assert!(json.contains("\"next_review\":\"2025-01-02T03:04:05.987654321Z\""));
    let back: Card = serde_json::from_str(&json).unwrap();
    assert_eq!(back, card);
  }

  #[test]
  fn test_is_due_boundary() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let mut card = Card::new("a", "", "b", "c");
    card.next_review = now;
    assert!(card.is_due(now));
    card.next_review = now + Duration::seconds(1);
    assert!(!card.is_due(now));
  }
}

pub mod card;
pub mod filter;
pub mod progress;

pub use card::{Card, CardFace, clamp_ease, parse_timestamp};
pub use filter::CategoryFilter;
pub use progress::{CategoryStats, Progress, ProgressSummary};

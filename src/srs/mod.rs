pub mod card_selector;
pub mod quiz;
pub mod scheduler;

pub use card_selector::{EmptyPoolError, category_pool, due_count, select_next_card};
pub use quiz::{Quiz, generate_quiz};
pub use scheduler::{ScheduleResult, apply_review, calculate_review, interval_days};
